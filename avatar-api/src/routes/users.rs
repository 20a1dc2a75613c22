use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};
use base64::{prelude::BASE64_STANDARD, Engine};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    app_state::AppState,
    auth::AuthUser,
    domain::models::UserId,
    routes::{avatars::image_response, ApiError},
};

const AVATAR_CACHE_CONTROL: &str = "private, max-age=3600";

#[derive(Debug, Deserialize)]
pub struct UpdateUserAvatarOption {
    /// Base64-encoded image bytes.
    pub image: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileResponse {
    pub id: UserId,
    pub email: String,
    pub full_name: String,
    pub has_avatar: bool,
    pub avatar_url: String,
}

pub fn router(max_avatar_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/user", get(current_user))
        .route(
            "/user/avatar",
            get(my_avatar).post(update_avatar).delete(delete_avatar),
        )
        .route_layer(DefaultBodyLimit::max(upload_body_limit(max_avatar_bytes)))
}

/// Request body limit for a base64 payload of `max_avatar_bytes`, with room
/// for the JSON envelope.
fn upload_body_limit(max_avatar_bytes: usize) -> usize {
    max_avatar_bytes.div_ceil(3) * 4 + 1024
}

#[instrument(name = "GET /user", skip_all, fields(user_id = %user.id))]
async fn current_user(
    user: AuthUser,
    State(app_state): State<AppState>,
) -> Json<UserProfileResponse> {
    let avatar_url = app_state.avatar_service.avatar_url(&user);
    let user = user.into_inner();

    Json(UserProfileResponse {
        id: user.id,
        has_avatar: user.has_avatar(),
        email: user.email,
        full_name: user.full_name,
        avatar_url,
    })
}

#[instrument(name = "GET /user/avatar", skip_all, fields(user_id = %user.id))]
async fn my_avatar(user: AuthUser, State(app_state): State<AppState>) -> Response {
    let avatar = app_state.avatar_service.resolve_avatar(&user).await;
    image_response(StatusCode::OK, avatar, AVATAR_CACHE_CONTROL)
}

#[instrument(name = "POST /user/avatar", skip_all, fields(user_id = %user.id))]
async fn update_avatar(
    user: AuthUser,
    State(app_state): State<AppState>,
    Json(form): Json<UpdateUserAvatarOption>,
) -> Result<Response, ApiError> {
    let content = BASE64_STANDARD
        .decode(form.image.trim())
        .map_err(|err| ApiError::bad_request(format!("invalid base64 image: {err}")))?;

    let had_avatar = user.has_avatar();
    let avatar = app_state
        .avatar_service
        .upload_avatar(&user, content)
        .await?;

    let status = if had_avatar {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok(image_response(status, avatar, AVATAR_CACHE_CONTROL))
}

#[instrument(name = "DELETE /user/avatar", skip_all, fields(user_id = %user.id))]
async fn delete_avatar(
    user: AuthUser,
    State(app_state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    app_state.avatar_service.delete_avatar(&user).await?;

    Ok(StatusCode::NO_CONTENT)
}
