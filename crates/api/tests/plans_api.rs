//! Pricing plans over HTTP.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_json_auth, put_json_auth};
use msgdesk_core::types::DbId;
use serde_json::json;
use sqlx::PgPool;

fn starter_plan() -> serde_json::Value {
    json!({
        "name": "Starter",
        "monthly_fee_cents": 49_900,
        "sms_rate_cents": 10,
        "rcs_rate_cents": 30,
        "whatsapp_rate_cents": 50,
        "monthly_message_quota": 10_000
    })
}

async fn create_plan(app: axum::Router, token: &str) -> DbId {
    let response = post_json_auth(app, "/api/plans", token, starter_plan()).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["is_active"], true);
    json["data"]["id"].as_i64().unwrap()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn tenants_read_plans_but_cannot_write_them(pool: PgPool) {
    let admin = common::create_user(&pool, "root", common::ROLE_SUPER_ADMIN_ID, None).await;
    let admin_token = common::super_admin_token(admin.id);
    let (_client, _user, token) = common::tenant(&pool, "Acme").await;
    let app = common::build_test_app(pool).await;

    let id = create_plan(app.clone(), &admin_token).await;

    let response = get_auth(app.clone(), "/api/plans", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["id"], id);
    assert_eq!(json["data"][0]["sms_rate_cents"], 10);

    let response = post_json_auth(app.clone(), "/api/plans", &token, starter_plan()).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = put_json_auth(
        app,
        &format!("/api/plans/{id}"),
        &token,
        json!({ "sms_rate_cents": 1 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn negative_rate_and_duplicate_name_are_rejected(pool: PgPool) {
    let admin = common::create_user(&pool, "root", common::ROLE_SUPER_ADMIN_ID, None).await;
    let token = common::super_admin_token(admin.id);
    let app = common::build_test_app(pool).await;

    let response = post_json_auth(
        app.clone(),
        "/api/plans",
        &token,
        json!({
            "name": "Broken",
            "sms_rate_cents": -1,
            "rcs_rate_cents": 30,
            "whatsapp_rate_cents": 50
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    create_plan(app.clone(), &token).await;
    let response = post_json_auth(app, "/api/plans", &token, starter_plan()).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn inactive_plans_are_listed_for_super_admins_only(pool: PgPool) {
    let admin = common::create_user(&pool, "root", common::ROLE_SUPER_ADMIN_ID, None).await;
    let admin_token = common::super_admin_token(admin.id);
    let (_client, _user, token) = common::tenant(&pool, "Acme").await;
    let app = common::build_test_app(pool).await;

    let id = create_plan(app.clone(), &admin_token).await;
    let response = put_json_auth(
        app.clone(),
        &format!("/api/plans/{id}"),
        &admin_token,
        json!({ "is_active": false }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let tenant_view =
        body_json(get_auth(app.clone(), "/api/plans?include_inactive=true", &token).await).await;
    assert!(tenant_view["data"].as_array().unwrap().is_empty());

    let admin_view =
        body_json(get_auth(app, "/api/plans?include_inactive=true", &admin_token).await).await;
    assert_eq!(admin_view["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn plan_rates_drive_the_campaign_estimate(pool: PgPool) {
    let admin = common::create_user(&pool, "root", common::ROLE_SUPER_ADMIN_ID, None).await;
    let admin_token = common::super_admin_token(admin.id);
    let (client, _user, token) = common::tenant(&pool, "Acme").await;
    let app = common::build_test_app(pool).await;

    let plan_id = create_plan(app.clone(), &admin_token).await;
    let response = put_json_auth(
        app.clone(),
        &format!("/api/clients/{}", client.id),
        &admin_token,
        json!({ "plan_id": plan_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json_auth(
        app.clone(),
        "/api/contacts",
        &token,
        json!({ "name": "Asha", "phone": "+919800000001" }),
    )
    .await;
    let contact = body_json(response).await["data"]["id"].as_i64().unwrap();
    let response = post_json_auth(
        app.clone(),
        "/api/campaigns",
        &token,
        json!({ "name": "Plan priced", "channel": "sms", "body": "Hello" }),
    )
    .await;
    let campaign = body_json(response).await["data"]["id"].as_i64().unwrap();
    put_json_auth(
        app.clone(),
        &format!("/api/campaigns/{campaign}/audience"),
        &token,
        json!({ "contact_ids": [contact] }),
    )
    .await;

    let estimate =
        body_json(get_auth(app, &format!("/api/campaigns/{campaign}/estimate"), &token).await)
            .await;
    assert_eq!(estimate["data"]["rate_cents"], 10);
    assert_eq!(estimate["data"]["total_cents"], 10);
}
