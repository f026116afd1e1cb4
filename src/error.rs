//! Errors at the data boundary
//!
//! The simulation itself never fails; only decoding level files, tuning
//! overrides and input traces can.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("no built-in level with id `{0}`")]
    UnknownLevel(String),
}
