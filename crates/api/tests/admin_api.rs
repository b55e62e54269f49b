//! Super-admin endpoints: clients, wallet top-ups and role checks.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete_auth, get_auth, post_json, post_json_auth};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn super_admin_creates_client_with_wallet(pool: PgPool) {
    let admin = common::create_user(&pool, "root", common::ROLE_SUPER_ADMIN_ID, None).await;
    let token = common::super_admin_token(admin.id);
    let app = common::build_test_app(pool).await;

    let response = post_json_auth(
        app.clone(),
        "/api/clients",
        &token,
        json!({ "name": "Initech", "email": "ops@initech.test" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let wallet =
        body_json(get_auth(app, &format!("/api/wallet/clients/{id}"), &token).await).await;
    assert_eq!(wallet["data"]["balance_cents"], 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn client_admin_cannot_manage_clients(pool: PgPool) {
    let (client, _user, token) = common::tenant(&pool, "Acme").await;
    let app = common::build_test_app(pool).await;

    let response = get_auth(app.clone(), "/api/clients", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_json_auth(
        app.clone(),
        "/api/clients",
        &token,
        json!({ "name": "Sneaky", "email": "sneaky@clients.test" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "FORBIDDEN");

    let response = post_json_auth(
        app,
        &format!("/api/wallet/clients/{}/credit", client.id),
        &token,
        json!({ "amount_cents": 100_000 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn credit_tops_up_the_client_wallet(pool: PgPool) {
    let (client, _user, client_token) = common::tenant(&pool, "Acme").await;
    let admin = common::create_user(&pool, "root", common::ROLE_SUPER_ADMIN_ID, None).await;
    let token = common::super_admin_token(admin.id);
    let app = common::build_test_app(pool).await;

    let response = post_json_auth(
        app.clone(),
        &format!("/api/wallet/clients/{}/credit", client.id),
        &token,
        json!({ "amount_cents": 5_000 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["kind"], "credit");
    assert_eq!(json["data"]["balance_after_cents"], 5_000);

    let wallet = body_json(get_auth(app.clone(), "/api/wallet", &client_token).await).await;
    assert_eq!(wallet["data"]["balance_cents"], 5_000);

    let ledger =
        body_json(get_auth(app, "/api/wallet/transactions", &client_token).await).await;
    assert_eq!(ledger["data"].as_array().unwrap().len(), 1);
    assert_eq!(ledger["data"][0]["description"], "Wallet top-up");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn non_positive_credit_is_rejected(pool: PgPool) {
    let (client, _user, _token) = common::tenant(&pool, "Acme").await;
    let admin = common::create_user(&pool, "root", common::ROLE_SUPER_ADMIN_ID, None).await;
    let token = common::super_admin_token(admin.id);
    let app = common::build_test_app(pool).await;

    let response = post_json_auth(
        app,
        &format!("/api/wallet/clients/{}/credit", client.id),
        &token,
        json!({ "amount_cents": 0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn deactivated_client_cannot_log_in(pool: PgPool) {
    let (client, user, _token) = common::tenant(&pool, "Acme").await;
    let admin = common::create_user(&pool, "root", common::ROLE_SUPER_ADMIN_ID, None).await;
    let token = common::super_admin_token(admin.id);
    let app = common::build_test_app(pool).await;

    let response = delete_auth(app.clone(), &format!("/api/clients/{}", client.id), &token).await;
    assert!(response.status().is_success());

    let response = post_json(
        app,
        "/api/auth/login",
        json!({ "username": user.username, "password": common::TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
