use mlua::Lua;

use crate::bind::error::BindError;
use crate::bind::ledger::CallLedger;
use crate::bind::registry::BindingRegistry;

/// An exclusively owned Lua state plus the per-run data its bindings use.
///
/// The state is released when the runtime is closed or dropped, so an early
/// return on an error path still frees it.
pub struct ScriptRuntime {
    lua: Lua,
}

impl ScriptRuntime {
    pub fn new() -> Self {
        let lua = Lua::new();
        lua.set_app_data(CallLedger::default());
        tracing::debug!("script runtime acquired");
        Self { lua }
    }

    /// Store per-run state for the natives. Replaces any value of the same type.
    pub fn attach<T: 'static>(&self, value: T) {
        self.lua.set_app_data(value);
    }

    pub fn detach<T: 'static>(&self) -> Option<T> {
        self.lua.remove_app_data::<T>()
    }

    /// Install every binding as a Lua global and start counting its calls.
    pub fn register(&self, registry: BindingRegistry) -> Result<Vec<String>, BindError> {
        tracing::info!("{}", registry.summary());
        let names = registry.install(&self.lua)?;

        if let Some(mut ledger) = self.lua.app_data_mut::<CallLedger>() {
            for name in &names {
                ledger.seed(name);
            }
        }

        Ok(names)
    }

    /// Run a chunk to completion.
    pub fn exec(&self, source: &str, chunk_name: &str) -> mlua::Result<()> {
        self.lua.load(source).set_name(chunk_name).exec()
    }

    #[cfg(test)]
    pub(crate) fn ledger(&self) -> CallLedger {
        self.lua
            .app_data_ref::<CallLedger>()
            .map(|ledger| ledger.clone())
            .unwrap_or_default()
    }

    /// Release the Lua state and hand back what was recorded.
    pub fn close(self) -> CallLedger {
        let ledger = self
            .lua
            .remove_app_data::<CallLedger>()
            .unwrap_or_default();
        drop(self.lua);
        tracing::debug!("script runtime released");
        ledger
    }

    #[cfg(test)]
    pub(crate) fn lua(&self) -> &Lua {
        &self.lua
    }
}

impl Default for ScriptRuntime {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ping(_: &Lua, _: ()) -> mlua::Result<&'static str> {
        Ok("pong")
    }

    #[test]
    fn register_seeds_ledger() {
        let runtime = ScriptRuntime::new();
        let mut registry = BindingRegistry::new();
        registry.bind("ping", "() -> string", ping).unwrap();

        let names = runtime.register(registry).unwrap();
        assert_eq!(names, vec!["ping"]);

        let ledger = runtime.ledger();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.uncalled(), vec!["ping"]);
    }

    #[test]
    fn close_returns_recorded_calls() {
        let runtime = ScriptRuntime::new();
        let mut registry = BindingRegistry::new();
        registry.bind("ping", "() -> string", ping).unwrap();
        runtime.register(registry).unwrap();

        runtime.exec("ping(); ping()", "twice").unwrap();
        let ledger = runtime.close();
        assert_eq!(ledger.count("ping"), 2);
        assert_eq!(ledger.repeated(), vec!["ping"]);
    }

    #[test]
    fn exec_reports_syntax_errors() {
        let runtime = ScriptRuntime::new();
        let err = runtime.exec("this is not lua", "broken").unwrap_err();
        assert!(matches!(err, mlua::Error::SyntaxError { .. }));
    }

    #[test]
    fn attached_data_round_trips() {
        let runtime = ScriptRuntime::new();
        runtime.attach(7u32);
        assert_eq!(runtime.lua().app_data_ref::<u32>().map(|v| *v), Some(7));
        assert_eq!(runtime.detach::<u32>(), Some(7));
        assert_eq!(runtime.detach::<u32>(), None);
    }

    #[test]
    fn each_runtime_starts_with_an_empty_ledger() {
        let first = ScriptRuntime::new();
        let mut registry = BindingRegistry::new();
        registry.bind("ping", "() -> string", ping).unwrap();
        first.register(registry).unwrap();
        first.exec("ping()", "first").unwrap();
        assert_eq!(first.close().total(), 1);

        let second = ScriptRuntime::new();
        assert!(second.ledger().is_empty());
    }
}
