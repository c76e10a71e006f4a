use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};

use crate::application::render::coerce_markdown_source;

use super::error::ApiError;
use super::models::{RenderHtmlResponse, RenderPartsResponse, RenderRequest, ok};
use super::state::AppState;

pub async fn render_html(
    State(state): State<AppState>,
    payload: Result<Json<RenderRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload?;
    let source = coerce_markdown_source(&payload.content);
    let html = state.renderer.markdown_to_html(&source);

    Ok(ok(RenderHtmlResponse { html }).into_response())
}

pub async fn render_parts(
    State(state): State<AppState>,
    payload: Result<Json<RenderRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload?;
    let source = coerce_markdown_source(&payload.content);
    let parts = state.renderer.parse_markdown_parts(&source);

    Ok(ok(RenderPartsResponse { parts }).into_response())
}
