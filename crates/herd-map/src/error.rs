//! Error types for mapping operations.

use std::fmt;

/// Errors from mapping operations.
///
/// Failing to match a header is not an error; such headers come back as
/// `unmapped` detections.
#[derive(Debug, Clone, PartialEq)]
pub enum MappingError {
    /// Header not present in the current detection run.
    UnknownHeader(String),
    /// Canonical key not present in the registry.
    UnknownCanonicalKey { header: String, key: String },
    /// A matching setting outside `[0, 1]`.
    InvalidSetting { name: &'static str, value: f64 },
}

impl fmt::Display for MappingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownHeader(h) => write!(f, "Header not found: {h}"),
            Self::UnknownCanonicalKey { header, key } => {
                write!(f, "Canonical key '{key}' selected for '{header}' is not in the registry")
            }
            Self::InvalidSetting { name, value } => {
                write!(f, "Setting '{name}' must be between 0 and 1, got {value}")
            }
        }
    }
}

impl std::error::Error for MappingError {}

pub type Result<T> = std::result::Result<T, MappingError>;
