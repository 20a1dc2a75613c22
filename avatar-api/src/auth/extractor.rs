use std::ops::Deref;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::{domain::models::User, routes::ApiError};

/// Extracts the authenticated [`User`] placed in the request extensions by
/// [`require_user`](super::require_user). Returns 401 Unauthorized if there
/// is none.
///
/// Handlers pass the wrapped user explicitly into every service call.
#[derive(Debug, Clone)]
pub struct AuthUser(User);

impl AuthUser {
    pub fn into_inner(self) -> User {
        self.0
    }
}

impl Deref for AuthUser {
    type Target = User;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<User>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| ApiError::unauthorized("Not authenticated"))
    }
}
