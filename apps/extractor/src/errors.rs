use thiserror::Error;

use crate::llm_client::CompletionError;

/// Pipeline-level error type.
///
/// Parse failures are NOT represented here — a malformed model response
/// degrades to a failure marker recorded in the pass context, not an error.
/// This enum covers the failures that escalate: configuration problems,
/// completion-service transport errors, and I/O around the result store.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("completion service error: {0}")]
    Completion(#[from] CompletionError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("result store error: {0}")]
    Store(String),
}
