//! Structured error types for the LSP server.
//!
//! None of these reach the client as JSON-RPC errors; handlers log them and
//! answer with an empty result.

use crate::analysis::IndexError;
use thiserror::Error;
use tower_lsp::lsp_types::{Position, Url};

#[derive(Debug, Error)]
pub enum LspError {
    #[error("Document not found: {uri}")]
    DocumentNotFound { uri: String },

    #[error("Not a file URI: {uri}")]
    NotAFile { uri: String },

    #[error("Invalid position: line {line}, char {character} in {uri}")]
    InvalidPosition {
        uri: String,
        line: u32,
        character: u32,
    },

    #[error("Feature disabled: {feature}")]
    FeatureDisabled { feature: String },

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LspError {
    /// Log the error at debug level.
    pub fn log_debug(&self) {
        tracing::debug!("LSP Error: {}", self);
    }

    /// Log the error at warn level.
    pub fn log_warn(&self) {
        tracing::warn!("LSP Error: {}", self);
    }

    pub fn document_not_found(uri: &Url) -> Self {
        Self::DocumentNotFound {
            uri: uri.to_string(),
        }
    }

    pub fn not_a_file(uri: &Url) -> Self {
        Self::NotAFile {
            uri: uri.to_string(),
        }
    }

    pub fn invalid_position(uri: &Url, position: Position) -> Self {
        Self::InvalidPosition {
            uri: uri.to_string(),
            line: position.line,
            character: position.character,
        }
    }

    pub fn feature_disabled(feature: &str) -> Self {
        Self::FeatureDisabled {
            feature: feature.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_index_error_is_transparent() {
        let err: LspError = IndexError::Io {
            path: PathBuf::from("/ws/Makefile"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        }
        .into();
        assert_eq!(err.to_string(), "Failed to read /ws/Makefile: denied");
    }

    #[test]
    fn test_invalid_position_message() {
        let uri = Url::parse("file:///ws/Makefile").unwrap();
        let err = LspError::invalid_position(&uri, Position::new(3, 9));
        assert_eq!(
            err.to_string(),
            "Invalid position: line 3, char 9 in file:///ws/Makefile"
        );
    }
}
