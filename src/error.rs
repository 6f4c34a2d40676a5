use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by persistence, corpus loading and session starts.
///
/// Simulation, validation and practice bookkeeping never fail; they clamp or
/// degrade to a neutral result instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid exercise catalog at {path}: {reason}")]
    Catalog { path: PathBuf, reason: String },

    #[error("unknown module `{0}`")]
    UnknownModule(String),

    #[error("unknown exercise `{0}`")]
    UnknownExercise(String),

    #[error("module `{0}` has no boss fight")]
    NoBoss(String),

    #[error("module `{0}` is locked until the previous boss is beaten")]
    Locked(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn catalog(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::Catalog {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
