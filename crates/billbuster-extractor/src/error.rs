//! Error types for the extraction pipeline

use thiserror::Error;

/// Errors that can occur while turning a document into points
///
/// Only [`InvalidInput`](ExtractorError::InvalidInput),
/// [`Config`](ExtractorError::Config), [`NotFound`](ExtractorError::NotFound)
/// and [`UnsupportedFormat`](ExtractorError::UnsupportedFormat) end a document
/// run. Service failures are recorded per chunk and the run continues;
/// malformed replies never surface at all, they become an error point.
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Extraction call exceeded the configured timeout
    #[error("Extraction timeout")]
    Timeout,

    /// Invalid chunking or processing parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Source document does not exist
    #[error("Document not found: {0}")]
    NotFound(String),

    /// Source document exists but cannot be read as text
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    /// Malformed reply from the extraction service
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// JSON encoding or decoding error
    #[error("JSON error: {0}")]
    JsonParse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A background task failed to complete
    #[error("Task error: {0}")]
    Task(String),
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::JsonParse(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = ExtractorError::NotFound("/tmp/hb1.txt".into());
        assert_eq!(err.to_string(), "Document not found: /tmp/hb1.txt");
    }
}
