use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{app_state::AppState, domain::models::UserId, routes::ApiError};

/// Resolves the current user from the id the authenticating gateway forwards
/// in the configured header, and stores the user record in the request
/// extensions for [`AuthUser`](super::AuthUser).
pub async fn require_user(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user_id = request
        .headers()
        .get(&*app_state.user_header)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<UserId>().ok())
        .ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;

    let user = app_state.users.get_user(&user_id).await?.ok_or_else(|| {
        tracing::debug!(%user_id, "authenticated id does not match a user");
        ApiError::unauthorized("Not authenticated")
    })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
