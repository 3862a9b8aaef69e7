//! Errors that halt a run.
//!
//! Model failures never appear here: stage 4 swallows them and falls back
//! to the static narrative.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// Context file exists but could not be read
    #[error("failed to read mission context {}: {source}", .path.display())]
    ContextIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Context file is not a JSON object of the expected shape
    #[error("malformed mission context {}: {source}", .path.display())]
    ContextParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode anonymized payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// A stage ran before the field it depends on was set
    #[error("stage {stage} requires {field}, which no earlier stage produced")]
    MissingState { stage: u8, field: &'static str },
}
