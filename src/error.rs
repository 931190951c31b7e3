// src/error.rs
use thiserror::Error;

/// Structural failures that abort a pipeline before any table is produced.
///
/// Everything recoverable (undefined references, non-consuming tokens,
/// conflicts) goes to [`crate::Diagnostics`] instead.
#[derive(Debug, Error)]
pub enum GenError {
    #[error("grammar has no productions")]
    EmptyGrammar,

    #[error("start non-terminal {0} is not declared")]
    MissingStart(u32),

    #[error("start non-terminal `{0}` has no productions")]
    StartWithoutProductions(String),

    #[error("no token definitions given")]
    NoTokens,

    #[error("no token definition survived construction ({0} rejected)")]
    AllTokensRejected(usize),

    #[error("invalid BNF input: {0}")]
    Bnf(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
