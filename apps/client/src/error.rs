use thiserror::Error;

/// Client-side error type.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Input the user must fix before anything is sent.
    #[error("{0}")]
    Validation(String),

    #[error("Not signed in")]
    NotSignedIn,

    #[error("Cannot move from {from} to {to}")]
    InvalidTransition { from: &'static str, to: &'static str },

    /// The relay answered with a non-success status.
    #[error("Relay error (status {status}): {message}")]
    Relay { status: u16, message: String },

    #[error("Geocoding failed: {0}")]
    Geocode(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("State file is corrupt: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported state schema version {0}")]
    UnsupportedSchema(u32),
}

pub type Result<T> = std::result::Result<T, ClientError>;
