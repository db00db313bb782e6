//! Error types for repository access

use thiserror::Error;

/// Result type alias for repository operations
pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Broad category of a repository failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request did not produce a successful response
    RemoteRequest,

    /// The response was not a valid document
    InvalidData,
}

/// Repository access errors
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Server answered with a non-success status
    #[error("Request to {url} failed with status {status}")]
    RemoteStatus { url: String, status: u16 },

    /// No response: connection, TLS or timeout failure
    #[error("Request to {url} failed: {source}")]
    RemoteTransport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Body could not be parsed or failed validation
    #[error("Invalid data from {url}: {reason}")]
    InvalidData { url: String, reason: String },
}

impl RepositoryError {
    pub fn remote_status(url: impl Into<String>, status: u16) -> Self {
        Self::RemoteStatus {
            url: url.into(),
            status,
        }
    }

    pub fn remote_transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::RemoteTransport {
            url: url.into(),
            source,
        }
    }

    pub fn invalid_data(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidData {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RemoteStatus { .. } | Self::RemoteTransport { .. } => ErrorKind::RemoteRequest,
            Self::InvalidData { .. } => ErrorKind::InvalidData,
        }
    }

    /// Whether trying again later could succeed
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::RemoteRequest
    }

    /// HTTP status, when the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RemoteStatus { status, .. } => Some(*status),
            Self::RemoteTransport { source, .. } => source.status().map(|s| s.as_u16()),
            Self::InvalidData { .. } => None,
        }
    }

    /// URL of the failed request
    pub fn url(&self) -> &str {
        match self {
            Self::RemoteStatus { url, .. }
            | Self::RemoteTransport { url, .. }
            | Self::InvalidData { url, .. } => url,
        }
    }
}
