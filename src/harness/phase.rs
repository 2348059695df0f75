/// Harness progress. Phases only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Phase {
    /// Runtime acquired, per-run state attached.
    #[default]
    Init,
    /// Natives installed as Lua globals.
    Registered,
    /// Script ran to completion and the runtime was released.
    Executed,
    /// Counts and expectations checked.
    Verified,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Init => "INIT",
            Phase::Registered => "REGISTERED",
            Phase::Executed => "EXECUTED",
            Phase::Verified => "VERIFIED",
        }
    }

    /// Move to `next`, which must come after the current phase.
    pub fn advance(&mut self, next: Phase) {
        debug_assert!(next > *self, "phase {} cannot follow {}", next.label(), self.label());
        tracing::debug!("phase {} -> {}", self.label(), next.label());
        *self = next;
    }
}
