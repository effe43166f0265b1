//! Error types for llm-quota

use thiserror::Error;

/// Library error type
#[derive(Debug, Error)]
pub enum Error {
    /// Usage record with negative token counts (caller bug)
    #[error("invalid usage: negative token counts (prompt={prompt}, completion={completion})")]
    InvalidUsage {
        /// Prompt token count as received
        prompt: i64,
        /// Completion token count as received
        completion: i64,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
