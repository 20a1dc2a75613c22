use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::{app_state::AppState, auth, config::Settings, routes};

pub fn create(app_state: AppState, config: &Settings) -> Router<()> {
    let allowed_origins = config
        .application
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect::<Vec<_>>();

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(AllowOrigin::list(allowed_origins));

    build_routes(app_state, config.avatar.max_bytes)
        .layer(cors)
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
}

fn build_routes(app_state: AppState, max_avatar_bytes: usize) -> Router<()> {
    let authenticated = routes::users::router(max_avatar_bytes).route_layer(
        middleware::from_fn_with_state(app_state.clone(), auth::require_user),
    );

    Router::new()
        .route("/", get(|| async { "Hello, little World!" }))
        .merge(authenticated)
        .merge(routes::avatars::router())
        .with_state(app_state)
}
