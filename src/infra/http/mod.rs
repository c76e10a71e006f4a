mod auth;
mod error;
mod middleware;
mod models;
mod render;
mod state;

pub use error::{ApiError, codes};
pub use state::AppState;

use axum::{
    Router,
    http::StatusCode,
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::infra::assets::serve_highlight_css;

use self::middleware::{log_responses, require_admin, set_request_context};

/// Assemble the full HTTP surface.
pub fn build_router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/api/auth/session", get(auth::session))
        .route("/api/auth/change-password", post(auth::change_password))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_admin,
        ));

    Router::new()
        .route("/health", get(health))
        .route(
            "/api/auth/login",
            get(auth::login_status).post(auth::login),
        )
        .route("/api/render/html", post(render::render_html))
        .route("/api/render/parts", post(render::render_parts))
        .route("/assets/highlight.css", get(serve_highlight_css))
        .merge(admin)
        .fallback(not_found)
        .with_state(state)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}

async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn not_found() -> Response {
    ApiError::not_found()
        .with_source("infra::http::fallback")
        .into_response()
}
