//! Error types for bundle export and import operations.

use thiserror::Error;

/// Primary error type for bundle operations.
#[derive(Error, Debug)]
pub enum BundleError {
    // Archive errors
    #[error("Failed to pack bundle: {0}")]
    PackFailure(String),

    #[error("Failed to unpack bundle: {0}")]
    UnpackFailure(String),

    #[error("Bundle settings document is missing or invalid: {0}")]
    MalformedDocument(String),

    // Transfer errors
    #[error("Network import failed: {0}")]
    NetworkFailure(String),

    #[error("Cannot read asset '{path}': {reason}")]
    AssetReadFailure { path: String, reason: String },

    #[error("Cannot write '{name}' to export destination: {reason}")]
    DestinationWriteFailure { name: String, reason: String },

    // Configuration errors
    #[error("Configuration parse error: {0}")]
    ConfigParse(String),

    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("{0}")]
    StoreRule(String),

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Fieldless discriminant of a [`BundleError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    PackFailure,
    UnpackFailure,
    MalformedDocument,
    NetworkFailure,
    AssetReadFailure,
    DestinationWriteFailure,
    ConfigParse,
    ConfigInvalid,
    StoreRule,
    Io,
    Other,
}

impl BundleError {
    /// Returns the kind of this error, for matching without payloads.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::PackFailure(_) => ErrorKind::PackFailure,
            Self::UnpackFailure(_) => ErrorKind::UnpackFailure,
            Self::MalformedDocument(_) => ErrorKind::MalformedDocument,
            Self::NetworkFailure(_) => ErrorKind::NetworkFailure,
            Self::AssetReadFailure { .. } => ErrorKind::AssetReadFailure,
            Self::DestinationWriteFailure { .. } => ErrorKind::DestinationWriteFailure,
            Self::ConfigParse(_) => ErrorKind::ConfigParse,
            Self::ConfigInvalid(_) => ErrorKind::ConfigInvalid,
            Self::StoreRule(_) => ErrorKind::StoreRule,
            Self::Io(_) => ErrorKind::Io,
            Self::Other(_) => ErrorKind::Other,
        }
    }

    /// Returns true if the error is recoverable by the user.
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::MalformedDocument(_)
                | Self::NetworkFailure(_)
                | Self::AssetReadFailure { .. }
                | Self::DestinationWriteFailure { .. }
                | Self::ConfigInvalid(_)
                | Self::StoreRule(_)
        )
    }

    /// Returns a suggestion for how to fix the error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::MalformedDocument(_) => Some("Make sure the file is a bundle containing readConfig.json"),
            Self::NetworkFailure(_) => Some("Check the URL and your network connection"),
            Self::AssetReadFailure { .. } => Some("Set on_missing_asset = \"skip\" to export without it"),
            Self::DestinationWriteFailure { .. } => Some("Choose a writable export directory"),
            Self::ConfigParse(_) => Some("Check the TOML syntax of the config file"),
            _ => None,
        }
    }
}

/// Convenience type alias for Results using BundleError.
pub type Result<T> = std::result::Result<T, BundleError>;

/// Extension trait for adding context to errors.
pub trait ResultExt<T> {
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E: std::error::Error> ResultExt<T> for std::result::Result<T, E> {
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| BundleError::Other(format!("{}: {e}", f().into())))
    }
}
