use domain::error::DomainError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("validation error: {message}")]
    Validation { message: String },

    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("forbidden: {message}")]
    Forbidden { message: String },

    #[error("quota exhausted")]
    QuotaExhausted,

    #[error("database error: {message}")]
    Database { message: String },

    #[error("codec error: {message}")]
    Codec { message: String },

    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("internal error: {message}")]
    Internal { message: String },
}

pub type AppResult<T> = Result<T, AppError>;
