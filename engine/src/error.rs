//! Error types for configuration and location providers.
//!

use thiserror::Error;

/// Configuration errors, always reported when the registry or the configuration is built.
///
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Duplicate zone id {0}")]
    DuplicateZone(String),
    #[error("Invalid radius {1} for zone {0}, must be positive")]
    BadRadius(String, f64),
    #[error("Bad zone file version v{0}, need v{1}")]
    BadFileVersion(usize, usize),
    #[error("Invalid duration {0}")]
    BadDuration(String),
}

/// Errors coming from a location provider.
///
/// These never reach the engine: the `PositionSource` turns them into a `SourceStatus` and a
/// fallback sample.
///
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ProviderError {
    #[error("Location services unavailable")]
    Unavailable,
    #[error("Subscription already started on {0}")]
    AlreadyWatching(String),
    #[error("Device error: {0}")]
    Device(String),
}
