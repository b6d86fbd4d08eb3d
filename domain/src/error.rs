use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("invalid tile coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("invalid color id: {0}")]
    InvalidColorId(String),

    #[error("display name too long: {0} bytes (max 64)")]
    NameTooLong(usize),

    #[error("configuration error: {message}")]
    ConfigError { message: String },
}

pub type DomainResult<T> = Result<T, DomainError>;
