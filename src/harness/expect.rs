/// Soft checks made by the natives during a run. A failed check is
/// recorded and execution continues.
#[derive(Debug, Default)]
pub struct Expectations {
    failures: Vec<String>,
}

impl Expectations {
    /// Record `message` as a failure unless `holds`. Returns `holds`.
    pub fn check(&mut self, holds: bool, message: &str) -> bool {
        if !holds {
            tracing::warn!("expectation failed: {message}");
            self.failures.push(message.to_string());
        }
        holds
    }

    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }

    pub fn failures(&self) -> &[String] {
        &self.failures
    }
}
