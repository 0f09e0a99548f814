//! @ai:module:intent Define error types for loading and rendering benchmark results
//! @ai:module:layer domain
//! @ai:module:public_api ViewerError, Result
//! @ai:module:stateless true

use thiserror::Error;

/// @ai:intent Unified error type for fetch and normalization failures
#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("No {benchmark} results found. Run `{hint}` to produce them.")]
    NotFound { benchmark: String, hint: String },

    #[error("Failed to fetch results: {0}")]
    Transport(String),

    #[error("Results API error ({status}): {detail}")]
    Api { status: u16, detail: String },

    #[error("Malformed results document: {0}")]
    MalformedDocument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ViewerError {
    /// @ai:intent Convert the error to the inline message shown in place of a result panel
    /// @ai:effects pure
    pub fn user_message(&self) -> String {
        match self {
            ViewerError::MalformedDocument(detail) => {
                format!("Error rendering results: {}", detail)
            }
            _ => self.to_string(),
        }
    }

    /// @ai:intent Whether the error means the document simply does not exist yet
    /// @ai:effects pure
    pub fn is_not_found(&self) -> bool {
        matches!(self, ViewerError::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, ViewerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_command() {
        let err = ViewerError::NotFound {
            benchmark: "locomo".to_string(),
            hint: "memora bench locomo --mode search".to_string(),
        };
        let message = err.user_message();
        assert!(message.contains("locomo"));
        assert!(message.contains("memora bench locomo --mode search"));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_malformed_document_is_rendering_error() {
        let err = ViewerError::MalformedDocument("item_results missing".to_string());
        assert_eq!(
            err.user_message(),
            "Error rendering results: item_results missing"
        );
    }

    #[test]
    fn test_io_error_converts_and_keeps_cause() {
        fn read_missing() -> Result<String> {
            Ok(std::fs::read_to_string("/nonexistent/memora/results.json")?)
        }

        let err = read_missing().unwrap_err();
        assert!(matches!(err, ViewerError::Io(_)));
        assert!(err.user_message().starts_with("IO error: "));
    }

    #[test]
    fn test_transport_message_keeps_raw_description() {
        let err = ViewerError::Transport("connection refused".to_string());
        assert_eq!(
            err.user_message(),
            "Failed to fetch results: connection refused"
        );
    }
}
