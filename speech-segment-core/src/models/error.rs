use thiserror::Error;

/// Errors raised by capture sessions, encoders and segment sinks.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("device not available")]
    DeviceNotAvailable,

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("invalid session state: {0}")]
    InvalidState(String),

    #[error("encoding failed: {0}")]
    EncodingFailed(String),

    #[error("storage error: {0}")]
    StorageError(String),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("unknown error: {0}")]
    Unknown(String),
}

/// Failures reported by the remote transcription and translation collaborators.
///
/// Each variant is surfaced separately so callers can tell a missing key
/// from a throttled request or a silent segment.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("credential not configured: {0}")]
    MissingCredential(String),

    #[error("credential rejected by service")]
    Unauthorized,

    #[error("rate limited by service")]
    RateLimited,

    #[error("network error: {0}")]
    Network(String),

    #[error("service rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("transcription returned no text")]
    EmptyTranscription,
}

impl ServiceError {
    /// Map an HTTP status and body onto the matching variant.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            401 | 403 => Self::Unauthorized,
            429 => Self::RateLimited,
            _ => Self::Rejected {
                status,
                message: message.into(),
            },
        }
    }
}
