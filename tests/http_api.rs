use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, to_bytes};
use axum::Router;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use homeblog::application::auth::{CredentialEngine, hash_password};
use homeblog::application::render::{MarkdownRender, MarkdownRenderer};
use homeblog::infra::http::{AppState, build_router};

const SALT: &str = "integration-salt";
const PASSWORD: &str = "correct horse";

fn engine() -> Arc<CredentialEngine> {
    Arc::new(CredentialEngine::new(
        SALT,
        "integration-secret",
        Duration::from_secs(3600),
        hash_password(PASSWORD, SALT),
    ))
}

fn app_with(expose_hash_tool: bool) -> Router {
    let renderer: Arc<dyn MarkdownRender> = Arc::new(MarkdownRenderer::default());
    build_router(AppState::new(engine(), renderer).with_hash_tool(expose_hash_tool))
}

fn app() -> Router {
    app_with(false)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("router responds");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn json_request(method: Method, uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("request")
}

async fn login_token(app: &Router) -> String {
    let (status, body) = send(
        app.clone(),
        json_request(Method::POST, "/api/auth/login", json!({"password": PASSWORD}), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["data"]["token"]
        .as_str()
        .expect("token string")
        .to_string()
}

#[tokio::test]
async fn health_is_no_content() {
    let response = app().oneshot(get("/health", None)).await.expect("response");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn login_with_correct_password_issues_admin_token() {
    let (status, body) = send(
        app(),
        json_request(Method::POST, "/api/auth/login", json!({"password": PASSWORD}), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["role"], "admin");
    assert_eq!(body["data"]["expiresIn"], "1h");
    assert!(body["data"]["token"].as_str().is_some_and(|t| t.split('.').count() == 3));
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let (status, body) = send(
        app(),
        json_request(Method::POST, "/api/auth/login", json!({"password": "nope"}), None),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "invalid_credentials");
}

#[tokio::test]
async fn login_without_password_is_bad_request() {
    for payload in [json!({}), json!({"password": ""})] {
        let (status, body) =
            send(app(), json_request(Method::POST, "/api/auth/login", payload, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }
}

#[tokio::test]
async fn malformed_json_is_reported_in_envelope() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .expect("request");

    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn login_get_reports_availability() {
    let (status, body) = send(app(), get("/api/auth/login", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn hash_tool_is_hidden_unless_enabled() {
    let (status, body) = send(app(), get("/api/auth/login?action=hash&password=abc123", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn hash_tool_returns_digest_when_enabled() {
    let (status, body) = send(
        app_with(true),
        get("/api/auth/login?action=hash&password=abc123", None),
    )
    .await;

    let expected = hash_password("abc123", SALT);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["password"], "abc123");
    assert_eq!(body["data"]["hash"], expected.as_str());
    assert_eq!(
        body["data"]["envVar"],
        format!("ADMIN_PASSWORD_HASH={expected}").as_str()
    );

    let (status, _) = send(app_with(true), get("/api/auth/login?action=hash", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn session_requires_valid_bearer_token() {
    let app = app();

    let (status, body) = send(app.clone(), get("/api/auth/session", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "unauthorized");

    let (status, _) = send(app.clone(), get("/api/auth/session", Some("garbage"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = login_token(&app).await;
    let (status, body) = send(app, get("/api/auth/session", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "admin");
    assert!(body["data"]["loginTime"].is_string());
    assert!(body["data"]["exp"].as_i64() > body["data"]["iat"].as_i64());
}

#[tokio::test]
async fn token_from_other_secret_is_rejected() {
    let foreign = CredentialEngine::new(SALT, "other-secret", Duration::from_secs(60), "");
    let token = foreign.issue_admin_token().expect("token");

    let (status, _) = send(app(), get("/api/auth/session", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn change_password_validates_and_returns_digest() {
    let app = app();
    let token = login_token(&app).await;

    let (status, _) = send(
        app.clone(),
        json_request(
            Method::POST,
            "/api/auth/change-password",
            json!({"currentPassword": PASSWORD, "newPassword": "newpass1", "confirmPassword": "newpass1"}),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let invalid = [
        json!({"currentPassword": PASSWORD, "newPassword": "newpass1"}),
        json!({"currentPassword": PASSWORD, "newPassword": "newpass1", "confirmPassword": "newpass2"}),
        json!({"currentPassword": PASSWORD, "newPassword": "short", "confirmPassword": "short"}),
        json!({"currentPassword": "wrong", "newPassword": "newpass1", "confirmPassword": "newpass1"}),
    ];
    for payload in invalid {
        let (status, body) = send(
            app.clone(),
            json_request(Method::POST, "/api/auth/change-password", payload.clone(), Some(&token)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
        assert_eq!(body["error"]["code"], "invalid_input");
    }

    let (status, body) = send(
        app,
        json_request(
            Method::POST,
            "/api/auth/change-password",
            json!({"currentPassword": PASSWORD, "newPassword": "newpass1", "confirmPassword": "newpass1"}),
            Some(&token),
        ),
    )
    .await;

    let expected = hash_password("newpass1", SALT);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["newPasswordHash"], expected.as_str());
    assert_eq!(
        body["data"]["envVar"],
        format!("ADMIN_PASSWORD_HASH={expected}").as_str()
    );
    assert!(body["data"]["message"].is_string());
    assert!(body["data"]["note"].is_string());
}

#[tokio::test]
async fn render_html_endpoint_renders_markdown() {
    let (status, body) = send(
        app(),
        json_request(Method::POST, "/api/render/html", json!({"content": "# Hi"}), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(
        body["data"]["html"]
            .as_str()
            .is_some_and(|html| html.contains("<h1>Hi</h1>"))
    );
}

#[tokio::test]
async fn render_html_coerces_non_string_content() {
    let (status, body) = send(
        app(),
        json_request(Method::POST, "/api/render/html", json!({"content": 7}), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["html"].as_str().is_some_and(|html| html.contains("7")));

    let (status, body) =
        send(app(), json_request(Method::POST, "/api/render/html", json!({}), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["html"], "");
}

#[tokio::test]
async fn render_parts_endpoint_returns_segments() {
    let (status, body) = send(
        app(),
        json_request(
            Method::POST,
            "/api/render/parts",
            json!({"content": "A\n```js\nx\n```\nB\n```py\ny\n```"}),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let parts = body["data"]["parts"].as_array().expect("parts array");
    assert_eq!(parts.len(), 4);
    assert_eq!(parts[0]["kind"], "html");
    assert_eq!(parts[1], json!({"kind": "code", "source": "x", "language": "js", "ordinal": 0}));
    assert_eq!(parts[3], json!({"kind": "code", "source": "y", "language": "py", "ordinal": 1}));
}

#[tokio::test]
async fn highlight_stylesheet_is_served() {
    let response = app()
        .oneshot(get("/assets/highlight.css", None))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    assert!(String::from_utf8_lossy(&bytes).contains(".syntax-"));
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let (status, body) = send(app(), get("/api/nope", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "not_found");
}
