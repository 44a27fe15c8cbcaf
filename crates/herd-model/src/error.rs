use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("canonical key must not be empty")]
    EmptyCanonicalKey,
    #[error("duplicate canonical key: {0}")]
    DuplicateCanonicalKey(String),
    #[error("unknown column category: {0}")]
    UnknownCategory(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
