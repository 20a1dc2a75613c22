use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;

use crate::domain::AvatarError;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<AvatarError> for ApiError {
    fn from(err: AvatarError) -> Self {
        match err {
            AvatarError::InvalidImage(reason) => {
                Self::bad_request(format!("invalid image: {reason}"))
            }
            AvatarError::ImageTooLarge { .. } => {
                Self::new(StatusCode::PAYLOAD_TOO_LARGE, err.to_string())
            }
            AvatarError::NotFound => Self::not_found("avatar not found"),
            AvatarError::UserNotFound => Self::not_found("user not found"),
            AvatarError::Conflict => {
                Self::conflict("avatar was modified concurrently, please retry")
            }
            AvatarError::StoreUnavailable(message) | AvatarError::Repository(message) => {
                tracing::error!("Avatar operation failed: {}", message);
                Self::internal("avatar operation failed")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn avatar_errors_map_to_status_codes() {
        let cases = [
            (AvatarError::invalid_image("bad"), StatusCode::BAD_REQUEST),
            (
                AvatarError::ImageTooLarge { size: 2, limit: 1 },
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (AvatarError::NotFound, StatusCode::NOT_FOUND),
            (AvatarError::UserNotFound, StatusCode::NOT_FOUND),
            (AvatarError::Conflict, StatusCode::CONFLICT),
            (
                AvatarError::StoreUnavailable("disk".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AvatarError::Repository("db".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn server_errors_hide_backend_details() {
        let err = ApiError::from(AvatarError::StoreUnavailable("/var/lib/secret".into()));
        assert!(!err.to_string().contains("/var/lib/secret"));
    }
}
