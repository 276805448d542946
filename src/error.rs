use thiserror::Error;

/// Configuration problems found while building an engine. These point at a
/// broken response table or turn limit, so they are reported at startup and
/// never retried.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("response bank '{key}' has no lines")]
    EmptyBank { key: &'static str },

    #[error("turn limit must be at least 1")]
    InvalidTurnLimit,
}
