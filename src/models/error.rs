//! Error taxonomy shared by the resolver, the generation client and the session.

use serde::Serialize;

/// Coarse classification used to decide how a failure is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The request could not complete (connection, timeout, non-2xx status)
    NetworkFailure,
    /// The body was malformed, empty or of the wrong type
    InvalidResponse,
    /// The geocoder returned no usable result
    NotFound,
    /// Missing or invalid coordinates or date on submission
    ValidationFailure,
    /// Local failures: closed session, nothing to export, bad configuration
    Internal,
}

/// Errors produced by the celestial map workflow
#[derive(Debug, thiserror::Error)]
pub enum CelestialError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    #[error("Unexpected status code: {0}")]
    Status(u16),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Location not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No generated map to export")]
    NothingToExport,

    #[error("Session is closed")]
    SessionClosed,
}

impl CelestialError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CelestialError::Network(_) | CelestialError::Timeout(_) | CelestialError::Status(_) => {
                ErrorKind::NetworkFailure
            }
            CelestialError::InvalidResponse(_) | CelestialError::Serialization(_) => {
                ErrorKind::InvalidResponse
            }
            CelestialError::NotFound(_) => ErrorKind::NotFound,
            CelestialError::Validation(_) => ErrorKind::ValidationFailure,
            CelestialError::InvalidUrl(_)
            | CelestialError::Io(_)
            | CelestialError::NothingToExport
            | CelestialError::SessionClosed => ErrorKind::Internal,
        }
    }

    /// Get a user-friendly message for the result panel
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::NetworkFailure | ErrorKind::InvalidResponse => {
                "Something went wrong while rendering the star map. Please try again.".to_string()
            }
            ErrorKind::NotFound => {
                "Location not found. Try including the city or state.".to_string()
            }
            ErrorKind::ValidationFailure => match self {
                CelestialError::Validation(msg) => msg.clone(),
                _ => "Invalid map request".to_string(),
            },
            ErrorKind::Internal => match self {
                CelestialError::NothingToExport => "There is no map to export yet".to_string(),
                _ => "The map session is unavailable".to_string(),
            },
        }
    }
}
