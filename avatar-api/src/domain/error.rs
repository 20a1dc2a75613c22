use thiserror::Error;

use super::models::AvatarKey;

/// Errors that can occur during avatar operations.
#[derive(Debug, Error)]
pub enum AvatarError {
    #[error("invalid image: {0}")]
    InvalidImage(String),
    #[error("image is {size} bytes, limit is {limit} bytes")]
    ImageTooLarge { size: usize, limit: usize },
    #[error("avatar not found")]
    NotFound,
    #[error("user not found")]
    UserNotFound,
    #[error("avatar was modified concurrently")]
    Conflict,
    #[error("content store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("user repository error: {0}")]
    Repository(String),
}

impl AvatarError {
    pub fn invalid_image(reason: impl Into<String>) -> Self {
        Self::InvalidImage(reason.into())
    }
}

/// Errors raised by a content store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("blob not found: {0}")]
    NotFound(AvatarKey),
    #[error("{0}")]
    Unavailable(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Unavailable(err.to_string())
    }
}

impl From<StoreError> for AvatarError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => Self::NotFound,
            StoreError::Unavailable(message) => Self::StoreUnavailable(message),
        }
    }
}
