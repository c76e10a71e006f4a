use axum::Json;
use serde::{Deserialize, Serialize};

use crate::application::render::ContentSegment;

/// Success envelope shared by every JSON endpoint.
#[derive(Debug, Serialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub data: T,
}

pub fn ok<T: Serialize>(data: T) -> Json<ApiEnvelope<T>> {
    Json(ApiEnvelope {
        success: true,
        data,
    })
}

#[derive(Debug, Serialize)]
pub struct StatusMessage {
    pub success: bool,
    pub message: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub action: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: String,
    pub role: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HashToolResponse {
    pub password: String,
    pub hash: String,
    pub env_var: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
    pub confirm_password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordResponse {
    pub message: &'static str,
    pub new_password_hash: String,
    pub env_var: String,
    pub note: &'static str,
}

/// Markdown source; non-string JSON values are rendered as their printed form.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct RenderRequest {
    pub content: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct RenderHtmlResponse {
    pub html: String,
}

#[derive(Debug, Serialize)]
pub struct RenderPartsResponse {
    pub parts: Vec<ContentSegment>,
}
