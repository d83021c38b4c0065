//! Error types for the script runtime

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or running scripts
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Lua error: {0}")]
    Lua(#[from] mlua::Error),

    #[error("Failed to read script {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
