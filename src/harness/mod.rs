//! Binding self-test: register the natives, run a script that calls each
//! one, then check that every binding ran exactly once with correct values.

pub mod console;
pub mod expect;
pub mod natives;
pub mod phase;

use std::io;
use std::process::ExitCode;

use thiserror::Error;

use crate::bind::{BindError, CallLedger, ScriptRuntime};
use console::Console;
use expect::Expectations;
use phase::Phase;

pub const SELFTEST_SCRIPT: &str = "hello()\nlocal answer = get_answer()\nprint_answer(answer)";

const CHUNK_NAME: &str = "selftest";

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("binding setup failed: {0}")]
    Bind(#[from] BindError),

    #[error("script failed: {0}")]
    Runtime(#[source] mlua::Error),

    #[error("console output failed: {0}")]
    Console(#[from] io::Error),

    #[error("Not all tests completed successfully")]
    ExpectationsFailed { failed: usize },

    /// The total must equal the binding count and every binding must run
    /// exactly once, so `hello(); hello(); hello()` fails here too.
    #[error("Not all bound functions were called")]
    BindingsNotExercised {
        called: u32,
        expected: usize,
        uncalled: Vec<String>,
        repeated: Vec<String>,
    },
}

impl HarnessError {
    /// Assertion failures exit with 1; anything that stopped the run exits with 2.
    pub fn exit_status(&self) -> u8 {
        match self {
            HarnessError::ExpectationsFailed { .. } | HarnessError::BindingsNotExercised { .. } => 1,
            _ => 2,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub functions_verified: usize,
}

pub struct Harness {
    console: Console,
}

impl Harness {
    pub fn new(console: Console) -> Self {
        Self { console }
    }

    pub fn run(&self) -> Result<Verdict, HarnessError> {
        self.run_script(SELFTEST_SCRIPT)
    }

    /// Run `source` against freshly registered natives. Every call starts
    /// with a new runtime, so counts never leak between runs.
    pub fn run_script(&self, source: &str) -> Result<Verdict, HarnessError> {
        let mut phase = Phase::Init;
        let (expectations, ledger) = {
            let runtime = ScriptRuntime::new();
            runtime.attach(self.console.clone());
            runtime.attach(Expectations::default());

            let registry = natives::registry()?;
            for row in registry.listing() {
                tracing::debug!("  {row}");
            }
            runtime.register(registry)?;
            phase.advance(Phase::Registered);

            runtime.exec(source, CHUNK_NAME).map_err(script_error)?;

            let expectations = runtime.detach::<Expectations>().unwrap_or_default();
            (expectations, runtime.close())
        };
        phase.advance(Phase::Executed);

        let verdict = verify(&expectations, &ledger, natives::BINDING_COUNT);
        phase.advance(Phase::Verified);
        verdict
    }

    /// Print the pass line or the failure diagnostic.
    pub fn report(&self, result: &Result<Verdict, HarnessError>) -> io::Result<()> {
        match result {
            Ok(verdict) => {
                tracing::info!("self-test passed ({} bindings)", verdict.functions_verified);
                self.console.pass(format_args!(
                    "[Binding Test] All {} bound functions were called successfully",
                    verdict.functions_verified
                ))
            }
            Err(err) => {
                match err {
                    HarnessError::ExpectationsFailed { failed } => {
                        tracing::error!("self-test failed: {failed} expectation(s) failed");
                    }
                    HarnessError::BindingsNotExercised {
                        called,
                        expected,
                        uncalled,
                        repeated,
                    } => {
                        tracing::error!(
                            "self-test failed: {called} calls for {expected} bindings; \
                             uncalled: [{}], repeated: [{}]",
                            uncalled.join(", "),
                            repeated.join(", ")
                        );
                    }
                    other => tracing::error!("self-test failed: {other}"),
                }
                self.console.failure(err)
            }
        }
    }
}

/// Console write failures raised inside a native surface as `Console`;
/// everything else the script hit is a `Runtime` error.
fn script_error(err: mlua::Error) -> HarnessError {
    if let Some(io_err) = io_cause(&err) {
        return HarnessError::Console(io::Error::new(io_err.kind(), io_err.to_string()));
    }
    HarnessError::Runtime(err)
}

fn io_cause(err: &mlua::Error) -> Option<&io::Error> {
    match err {
        mlua::Error::CallbackError { cause, .. } => io_cause(cause),
        mlua::Error::WithContext { cause, .. } => io_cause(cause),
        mlua::Error::ExternalError(inner) => inner.downcast_ref::<io::Error>(),
        _ => None,
    }
}

fn verify(
    expectations: &Expectations,
    ledger: &CallLedger,
    expected: usize,
) -> Result<Verdict, HarnessError> {
    if expectations.failed_count() != 0 {
        for failure in expectations.failures() {
            tracing::error!("failed expectation: {failure}");
        }
        return Err(HarnessError::ExpectationsFailed {
            failed: expectations.failed_count(),
        });
    }

    if ledger.is_empty() {
        tracing::warn!("no bindings were registered");
    }

    let uncalled = ledger.uncalled();
    let repeated = ledger.repeated();
    let called = ledger.total();
    if called as usize != expected
        || ledger.len() != expected
        || !uncalled.is_empty()
        || !repeated.is_empty()
    {
        return Err(HarnessError::BindingsNotExercised {
            called,
            expected,
            uncalled,
            repeated,
        });
    }

    Ok(Verdict {
        functions_verified: expected,
    })
}
