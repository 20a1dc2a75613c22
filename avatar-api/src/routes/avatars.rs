use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::Response,
    routing::get,
    Router,
};
use tracing::instrument;

use crate::{
    app_state::AppState,
    domain::{
        models::{AvatarImage, UserId},
        AvatarError,
    },
    routes::ApiError,
};

const DEFAULT_AVATAR_MIME: &str = "image/webp";
const PUBLIC_CACHE_CONTROL: &str = "public, max-age=3600";

pub fn router() -> Router<AppState> {
    Router::new().route("/users/:user_id/avatar", get(user_avatar))
}

#[instrument(name = "GET /users/:user_id/avatar", skip(app_state))]
async fn user_avatar(
    State(app_state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Result<Response, ApiError> {
    let user = app_state
        .users
        .get_user(&UserId::from(user_id))
        .await?
        .ok_or(AvatarError::UserNotFound)?;

    let avatar = app_state.avatar_service.resolve_avatar(&user).await;
    Ok(image_response(StatusCode::OK, avatar, PUBLIC_CACHE_CONTROL))
}

pub(crate) fn image_response(
    status: StatusCode,
    avatar: AvatarImage,
    cache_control: &'static str,
) -> Response {
    let mut response = Response::new(Body::from(avatar.bytes));
    *response.status_mut() = status;

    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&avatar.mime_type)
            .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_AVATAR_MIME)),
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache_control),
    );

    response
}
