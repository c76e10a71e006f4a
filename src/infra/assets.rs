//! Embedded stylesheet for highlighted code blocks.

use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};

/// Theme CSS generated at build time for the `syntax-` class prefix.
pub static HIGHLIGHT_CSS: &str = include_str!(env!("HIGHLIGHT_CSS_FILE"));

pub async fn serve_highlight_css() -> Response {
    let mut response = (StatusCode::OK, HIGHLIGHT_CSS).into_response();

    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/css; charset=utf-8"),
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=86400"),
    );

    response
}
