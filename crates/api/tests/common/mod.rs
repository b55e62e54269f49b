//! Shared helpers for the API integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use msgdesk_api::auth::jwt::{sign_access_token, JwtConfig, TokenSubject};
use msgdesk_api::config::ServerConfig;
use msgdesk_api::router::build_app_router;
use msgdesk_api::state::AppState;
use msgdesk_core::channels::DEFAULT_RATES;
use msgdesk_core::types::DbId;
use msgdesk_db::models::client::{Client, CreateClient};
use msgdesk_db::models::user::{CreateUser, User};
use msgdesk_db::repositories::{ClientRepo, UserRepo};
use sqlx::PgPool;
use tower::ServiceExt;

pub const ROLE_SUPER_ADMIN_ID: DbId = 1;
pub const ROLE_CLIENT_ADMIN_ID: DbId = 2;
pub const ROLE_AGENT_ID: DbId = 3;

pub const TEST_PASSWORD: &str = "test_password_123!";

const MULTIPART_BOUNDARY: &str = "msgdesk-test-boundary";

/// Build a test `ServerConfig` with safe defaults and the platform rates.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        db_max_connections: 5,
        max_upload_bytes: 1024 * 1024,
        default_rates: DEFAULT_RATES,
        admin_seed: None,
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_expiry_mins: 60,
            refresh_token_expiry_days: 7,
        },
    }
}

/// Build the full application router over `pool`, after creating the RCS
/// template tables the same way startup does.
pub async fn build_test_app(pool: PgPool) -> Router {
    let report = msgdesk_db::bootstrap_rcs_template_schema(&pool).await;
    assert!(report.is_complete(), "RCS schema bootstrap failed: {:?}", report.failed);

    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(test_config()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub async fn create_client(pool: &PgPool, name: &str) -> Client {
    ClientRepo::create(
        pool,
        &CreateClient {
            name: name.to_string(),
            company_name: None,
            email: format!("{}@clients.test", name.to_lowercase()),
            phone: None,
            plan_id: None,
            affiliate_id: None,
        },
    )
    .await
    .expect("client creation should succeed")
}

/// Insert a user with [`TEST_PASSWORD`].
pub async fn create_user(
    pool: &PgPool,
    username: &str,
    role_id: DbId,
    client_id: Option<DbId>,
) -> User {
    let password_hash = msgdesk_api::auth::password::hash_password(TEST_PASSWORD)
        .expect("hashing should succeed");
    UserRepo::create(
        pool,
        &CreateUser {
            client_id,
            role_id,
            username: username.to_string(),
            email: format!("{username}@users.test"),
            password_hash,
        },
    )
    .await
    .expect("user creation should succeed")
}

/// Access token for a super admin without a client.
pub fn super_admin_token(user_id: DbId) -> String {
    let subject = TokenSubject {
        user_id,
        role: "super_admin",
        client_id: None,
    };
    sign_access_token(subject, &test_config().jwt).expect("token generation should succeed")
}

/// Access token for a client admin of `client_id`.
pub fn client_admin_token(user_id: DbId, client_id: DbId) -> String {
    let subject = TokenSubject {
        user_id,
        role: "client_admin",
        client_id: Some(client_id),
    };
    sign_access_token(subject, &test_config().jwt).expect("token generation should succeed")
}

/// A client with one client admin; returns `(client, user, token)`.
pub async fn tenant(pool: &PgPool, name: &str) -> (Client, User, String) {
    let client = create_client(pool, name).await;
    let user = create_user(
        pool,
        &format!("{}_admin", name.to_lowercase()),
        ROLE_CLIENT_ADMIN_ID,
        Some(client.id),
    )
    .await;
    let token = client_admin_token(user.id, client.id);
    (client, user, token)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.expect("request should complete")
}

fn builder(method: Method, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(token) => builder.header(AUTHORIZATION, format!("Bearer {token}")),
        None => builder,
    }
}

fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    builder(method, uri, token)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, builder(Method::GET, uri, None).body(Body::empty()).unwrap()).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(
        app,
        builder(Method::GET, uri, Some(token))
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, json_request(Method::POST, uri, None, body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    send(app, json_request(Method::POST, uri, Some(token), body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    send(app, json_request(Method::PUT, uri, Some(token), body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(
        app,
        builder(Method::DELETE, uri, Some(token))
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

/// POST `csv` as the `file` field of a multipart form.
pub async fn post_csv_auth(app: Router, uri: &str, token: &str, csv: &str) -> Response {
    let body = format!(
        "--{MULTIPART_BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"contacts.csv\"\r\n\
         Content-Type: text/csv\r\n\r\n\
         {csv}\r\n\
         --{MULTIPART_BOUNDARY}--\r\n"
    );
    let request = builder(Method::POST, uri, Some(token))
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be valid JSON")
}

/// Collect a response body as text.
pub async fn body_text(response: Response) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("body should be UTF-8")
}
