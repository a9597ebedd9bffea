//! Error types for Kondukto API operations.

use thiserror::Error;

/// Errors that can occur while talking to the Kondukto API.
#[derive(Debug, Error)]
pub enum KdtError {
    /// Configuration is missing or incomplete.
    #[error("Kondukto configuration required: {0}")]
    ConfigMissing(String),

    /// Configuration is present but unusable.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Caller supplied an argument the operation cannot use.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Entity not found.
    #[error("{entity_type} '{id}' not found")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Upstream returned a non-success status or reported a failure.
    #[error("Kondukto API error: {message}")]
    Upstream {
        message: String,
        status_code: Option<u16>,
    },

    /// Upstream returned a value outside the documented contract.
    #[error("unexpected response from Kondukto: {0}")]
    ProtocolViolation(String),

    /// A scan ended in the failed state.
    #[error("scan failed (event {event_id}): {message}")]
    ScanFailed { event_id: String, message: String },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Network(#[source] reqwest::Error),

    /// Request body could not be serialized.
    #[error("failed to encode request: {0}")]
    Encoding(#[source] serde_json::Error),

    /// Response body could not be decoded.
    #[error("failed to parse response: {0}")]
    Decoding(String),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Local file error (config file, import payloads).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl KdtError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                          |
    /// |------|----------------------------------|
    /// | 1    | Upstream / general failure       |
    /// | 2    | Configuration or argument error  |
    /// | 3    | Network failure                  |
    /// | 4    | Entity not found                 |
    /// | 5    | Malformed request or response    |
    /// | 6    | Scan failed                      |
    /// | 10   | IO error                         |
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::ConfigMissing(_) | Self::Config(_) | Self::InvalidArgument(_) | Self::Url(_) => {
                2
            }
            Self::Network(_) => 3,
            Self::NotFound { .. } => 4,
            Self::Encoding(_) | Self::Decoding(_) | Self::ProtocolViolation(_) => 5,
            Self::ScanFailed { .. } => 6,
            Self::Io(_) => 10,
            Self::Upstream { .. } => 1,
        }
    }
}

impl From<serde_json::Error> for KdtError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decoding(e.to_string())
    }
}

/// Result type alias for Kondukto operations.
pub type Result<T> = core::result::Result<T, KdtError>;
