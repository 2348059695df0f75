//! The native functions exercised by the self-test.

use mlua::Lua;

use crate::bind::{BindError, BindingRegistry};
use crate::harness::console::Console;
use crate::harness::expect::Expectations;

pub const ANSWER: i64 = 42;
pub const BINDING_COUNT: usize = 3;

pub fn registry() -> Result<BindingRegistry, BindError> {
    let mut registry = BindingRegistry::new();
    registry
        .bind("hello", "()", hello)?
        .bind("get_answer", "() -> integer", get_answer)?
        .bind("print_answer", "(answer: integer)", print_answer)?;
    Ok(registry)
}

pub fn hello(lua: &Lua, _: ()) -> mlua::Result<()> {
    console(lua)?
        .line("Hello from C!")
        .map_err(mlua::Error::external)
}

pub fn get_answer(_: &Lua, _: ()) -> mlua::Result<i64> {
    Ok(ANSWER)
}

pub fn print_answer(lua: &Lua, answer: i64) -> mlua::Result<()> {
    let console = console(lua)?;
    console
        .line(format_args!("The answer is: {answer}"))
        .map_err(mlua::Error::external)?;

    let message = "Answer should be 42";
    let holds = lua
        .app_data_mut::<Expectations>()
        .map(|mut expectations| expectations.check(answer == ANSWER, message))
        .ok_or_else(|| mlua::Error::runtime("expectations not attached to runtime"))?;

    if !holds {
        console.failure(message).map_err(mlua::Error::external)?;
    }
    Ok(())
}

fn console(lua: &Lua) -> mlua::Result<Console> {
    lua.app_data_ref::<Console>()
        .map(|console| console.clone())
        .ok_or_else(|| mlua::Error::runtime("console not attached to runtime"))
}
