//! Error handling for the CV tailoring pipeline

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TailorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unreadable document: {0}")]
    UnreadableDocument(String),

    #[error("Analysis service error: {0}")]
    AnalysisService(String),

    /// Failure talking to the generation service. `transient` marks the
    /// failures that qualify for the single retry.
    #[error("Generation service error: {message}")]
    Service { message: String, transient: bool },

    #[error("Write error: {0}")]
    Write(String),

    #[error("Text extraction error: {0}")]
    TextExtraction(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, TailorError>;

impl TailorError {
    pub fn is_transient(&self) -> bool {
        matches!(self, TailorError::Service { transient: true, .. })
    }

    /// Whether the error belongs to the generation-service family.
    pub fn is_service_failure(&self) -> bool {
        matches!(self, TailorError::Service { .. } | TailorError::AnalysisService(_))
    }
}

/// Convert zip container errors into the unreadable-document category
impl From<zip::result::ZipError> for TailorError {
    fn from(err: zip::result::ZipError) -> Self {
        TailorError::UnreadableDocument(err.to_string())
    }
}

/// Convert XML parse errors into the unreadable-document category
impl From<roxmltree::Error> for TailorError {
    fn from(err: roxmltree::Error) -> Self {
        TailorError::UnreadableDocument(format!("malformed document XML: {}", err))
    }
}

/// Convert HTTP client errors, flagging timeouts and connection failures as transient
impl From<reqwest::Error> for TailorError {
    fn from(err: reqwest::Error) -> Self {
        let transient = err.is_timeout()
            || err.is_connect()
            || err.status().map_or(false, |s| s.is_server_error());
        TailorError::Service {
            message: err.to_string(),
            transient,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        let transient = TailorError::Service {
            message: "502 Bad Gateway".to_string(),
            transient: true,
        };
        let permanent = TailorError::Service {
            message: "401 Unauthorized".to_string(),
            transient: false,
        };

        assert!(transient.is_transient());
        assert!(!permanent.is_transient());
        assert!(permanent.is_service_failure());
        assert!(!TailorError::Write("disk full".to_string()).is_service_failure());
    }
}
