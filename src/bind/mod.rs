//! Binding layer: exposes native Rust functions to an embedded Lua runtime.
//!
//! - [`registry`] — named bindings, validated before installation
//! - [`ledger`] — per-binding call counts for one runtime instance
//! - [`runtime`] — the exclusively owned Lua state the bindings live in

pub mod error;
pub mod ledger;
pub mod registry;
pub mod runtime;

pub use error::BindError;
pub use ledger::CallLedger;
pub use registry::BindingRegistry;
pub use runtime::ScriptRuntime;
