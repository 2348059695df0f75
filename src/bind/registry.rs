use std::fmt;
use std::sync::LazyLock;

use mlua::{FromLuaMulti, Function, IntoLuaMulti, Lua};
use regex::Regex;

use crate::bind::error::BindError;
use crate::bind::ledger::CallLedger;

static LUA_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid lua name regex"));

const LUA_KEYWORDS: &[&str] = &[
    "and", "break", "do", "else", "elseif", "end", "false", "for", "function", "goto", "if", "in",
    "local", "nil", "not", "or", "repeat", "return", "then", "true", "until", "while",
];

type Installer = Box<dyn FnOnce(&Lua) -> mlua::Result<Function>>;

/// A native function waiting to be installed under a global name.
pub struct Binding {
    name: String,
    signature: String,
    install: Installer,
}

impl Binding {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// Ordered set of bindings. Every call through an installed binding is
/// recorded in the runtime's [`CallLedger`].
#[derive(Debug, Default)]
pub struct BindingRegistry {
    bindings: Vec<Binding>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `func` under the Lua global `name`.
    ///
    /// `signature` is only used for listings, e.g. `"(value: integer)"`.
    pub fn bind<A, R, F>(
        &mut self,
        name: &str,
        signature: &str,
        func: F,
    ) -> Result<&mut Self, BindError>
    where
        A: FromLuaMulti + 'static,
        R: IntoLuaMulti + 'static,
        F: Fn(&Lua, A) -> mlua::Result<R> + 'static,
    {
        validate_name(name)?;
        if self.contains(name) {
            return Err(BindError::Duplicate(name.to_string()));
        }

        let key = name.to_string();
        let install: Installer = Box::new(move |lua: &Lua| {
            lua.create_function(move |lua, args: A| {
                let ret = func(lua, args)?;
                if let Some(mut ledger) = lua.app_data_mut::<CallLedger>() {
                    ledger.record(&key);
                }
                Ok(ret)
            })
        });

        self.bindings.push(Binding {
            name: name.to_string(),
            signature: signature.to_string(),
            install,
        });
        Ok(self)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.iter().any(|b| b.name == name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.bindings.iter().map(Binding::name).collect()
    }

    pub fn summary(&self) -> String {
        if self.is_empty() {
            return "bindings: none registered".to_string();
        }

        format!(
            "bindings: {} registered ({})",
            self.len(),
            self.names().join(", ")
        )
    }

    pub fn listing(&self) -> Vec<String> {
        self.bindings
            .iter()
            .map(|b| format!("{}{}", b.name, b.signature))
            .collect()
    }

    /// Create the Lua functions and set them as globals. Returns the
    /// installed names in registration order.
    pub fn install(self, lua: &Lua) -> Result<Vec<String>, BindError> {
        let globals = lua.globals();
        let mut names = Vec::with_capacity(self.bindings.len());

        for binding in self.bindings {
            let function = (binding.install)(lua)?;
            globals.set(binding.name.as_str(), function)?;
            tracing::debug!("bound {}{}", binding.name, binding.signature);
            names.push(binding.name);
        }

        Ok(names)
    }
}

fn validate_name(name: &str) -> Result<(), BindError> {
    if !LUA_NAME_RE.is_match(name) || LUA_KEYWORDS.contains(&name) {
        return Err(BindError::InvalidName(name.to_string()));
    }
    Ok(())
}
