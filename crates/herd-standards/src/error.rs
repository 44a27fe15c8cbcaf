#![deny(unsafe_code)]

use std::path::PathBuf;

use herd_model::ModelError;

#[derive(Debug, thiserror::Error)]
pub enum StandardsError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse CSV {source_name}: {message}")]
    Csv {
        source_name: String,
        message: String,
    },

    #[error("required column '{column}' not found in {source_name}")]
    MissingColumn { source_name: String, column: String },

    #[error("invalid {field} value '{value}' in {source_name} (row {row})")]
    InvalidValue {
        source_name: String,
        row: usize,
        field: String,
        value: String,
    },

    #[error("invalid registry {source_name}: {source}")]
    InvalidRegistry {
        source_name: String,
        #[source]
        source: ModelError,
    },
}

impl StandardsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(source_name: &str, error: &csv::Error) -> Self {
        Self::Csv {
            source_name: source_name.to_string(),
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StandardsError>;
