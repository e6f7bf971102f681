//! Error types for release-cache.

use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Errors that can occur while configuring or refreshing the cache.
#[derive(Debug, Error)]
pub enum CacheError {
    // Config errors
    #[error("ACCOUNT is not defined")]
    MissingAccount,

    #[error("REPOSITORY is not defined")]
    MissingRepository,

    #[error("URL must be defined when TOKEN is set")]
    TokenWithoutUrl,

    #[error("Invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    // Network errors
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to connect to release server: {message}")]
    ConnectionFailed { message: String },

    #[error("Release server returned error {status}: {message}")]
    ServerError { status: u16, message: String },

    // Upstream data errors
    #[error("Malformed release list: {message}")]
    MalformedResponse { message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),
}

impl CacheError {
    /// Check if this error is a fatal configuration error.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::MissingAccount
                | Self::MissingRepository
                | Self::TokenWithoutUrl
                | Self::InvalidUrl { .. }
        )
    }

    /// Check if this error is a network error.
    pub fn is_network_error(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::ConnectionFailed { .. } | Self::ServerError { .. }
        )
    }
}

/// Errors raised while rewriting a `RELEASES` manifest.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManifestError {
    #[error("no .nupkg reference found in manifest")]
    NoPackageReference,

    #[error("invalid manifest source URL {url}")]
    InvalidSourceUrl { url: String },
}
