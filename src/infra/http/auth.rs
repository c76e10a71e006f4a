use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Extension, Query, State};
use axum::response::{IntoResponse, Response};
use tracing::info;

use crate::application::auth::{AdminClaims, ChangePasswordCommand, admin_hash_env_line};

use super::error::ApiError;
use super::models::{
    ChangePasswordRequest, ChangePasswordResponse, HashToolResponse, LoginQuery, LoginRequest,
    LoginResponse, StatusMessage, ok,
};
use super::state::AppState;

const HASH_ACTION: &str = "hash";

/// Availability probe; doubles as the password hashing helper when enabled.
pub async fn login_status(
    State(state): State<AppState>,
    query: Result<Query<LoginQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query?;

    if state.expose_hash_tool && query.action.as_deref() == Some(HASH_ACTION) {
        let password = match query.password.filter(|value| !value.is_empty()) {
            Some(password) => password,
            None => {
                return Err(ApiError::bad_request(
                    "Query parameter `password` is required",
                    None,
                ));
            }
        };

        let hash = state.credentials.hash_password(&password);
        return Ok(ok(HashToolResponse {
            env_var: admin_hash_env_line(&hash),
            password,
            hash,
        })
        .into_response());
    }

    Ok(Json(StatusMessage {
        success: true,
        message: "Login API available",
    })
    .into_response())
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload?;

    let password = match payload.password.filter(|value| !value.is_empty()) {
        Some(password) => password,
        None => return Err(ApiError::bad_request("Password must not be empty", None)),
    };

    if !state.credentials.verify_admin_password(&password) {
        return Err(ApiError::invalid_credentials().with_source("infra::http::auth::login"));
    }

    let token = state.credentials.issue_admin_token()?;
    info!(target = "homeblog::http::auth", "admin login succeeded");

    Ok(ok(LoginResponse {
        token,
        expires_in: state.credentials.token_lifetime_label().to_string(),
        role: "admin",
    })
    .into_response())
}

pub async fn session(Extension(claims): Extension<AdminClaims>) -> Response {
    ok(claims).into_response()
}

pub async fn change_password(
    State(state): State<AppState>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload?;

    let command = ChangePasswordCommand {
        current_password: payload.current_password.unwrap_or_default(),
        new_password: payload.new_password.unwrap_or_default(),
        confirm_password: payload.confirm_password.unwrap_or_default(),
    };
    let change = state.credentials.change_password(&command)?;

    info!(
        target = "homeblog::http::auth",
        env_line = %change.env_line,
        "admin password changed; deploy the new digest to make it permanent"
    );

    Ok(ok(ChangePasswordResponse {
        message: "Password changed",
        new_password_hash: change.new_hash,
        env_var: change.env_line,
        note: "Set the new digest in the deployment environment for it to take effect",
    })
    .into_response())
}
