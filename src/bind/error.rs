use thiserror::Error;

#[derive(Debug, Error)]
pub enum BindError {
    #[error("invalid binding name {0:?}: must be a Lua identifier")]
    InvalidName(String),

    #[error("binding {0:?} is already registered")]
    Duplicate(String),

    #[error("lua: {0}")]
    Lua(#[from] mlua::Error),
}
