//! Reports and dashboard numbers over HTTP.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{body_json, get_auth, post_json_auth, put_json_auth};
use msgdesk_core::types::DbId;
use serde_json::json;
use sqlx::PgPool;

/// Top up the tenant, then launch an SMS campaign to two contacts and mark
/// the first recipient delivered. Returns the campaign id.
async fn delivered_campaign(
    app: axum::Router,
    admin_token: &str,
    client_id: DbId,
    token: &str,
) -> DbId {
    let response = post_json_auth(
        app.clone(),
        &format!("/api/wallet/clients/{client_id}/credit"),
        admin_token,
        json!({ "amount_cents": 1_000 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let mut contacts = Vec::new();
    for (name, phone) in [("Asha", "+919800000001"), ("Ravi", "+919800000002")] {
        let response = post_json_auth(
            app.clone(),
            "/api/contacts",
            token,
            json!({ "name": name, "phone": phone }),
        )
        .await;
        contacts.push(body_json(response).await["data"]["id"].as_i64().unwrap());
    }

    let response = post_json_auth(
        app.clone(),
        "/api/campaigns",
        token,
        json!({ "name": "Weekend sale", "channel": "sms", "body": "Weekend sale is on" }),
    )
    .await;
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();
    put_json_auth(
        app.clone(),
        &format!("/api/campaigns/{id}/audience"),
        token,
        json!({ "contact_ids": contacts }),
    )
    .await;
    let response =
        post_json_auth(app.clone(), &format!("/api/campaigns/{id}/launch"), token, json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);

    let recipients =
        body_json(get_auth(app.clone(), &format!("/api/campaigns/{id}/recipients"), token).await)
            .await;
    let first = recipients["data"][0]["id"].as_i64().unwrap();
    let response = put_json_auth(
        app,
        &format!("/api/campaigns/{id}/recipients/{first}/status"),
        token,
        json!({ "status": "delivered" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    id
}

#[sqlx::test(migrations = "../db/migrations")]
async fn campaign_report_and_delivery_breakdown(pool: PgPool) {
    let admin = common::create_user(&pool, "root", common::ROLE_SUPER_ADMIN_ID, None).await;
    let admin_token = common::super_admin_token(admin.id);
    let (client, _user, token) = common::tenant(&pool, "Acme").await;
    let (_other, _other_user, other_token) = common::tenant(&pool, "Globex").await;
    let app = common::build_test_app(pool).await;

    let id = delivered_campaign(app.clone(), &admin_token, client.id, &token).await;

    let report = body_json(get_auth(app.clone(), "/api/reports/campaigns", &token).await).await;
    let row = &report["data"][0];
    assert_eq!(row["id"], id);
    assert_eq!(row["status"], "running");
    assert_eq!(row["audience_count"], 2);
    assert_eq!(row["estimated_cost_cents"], 50);
    assert_eq!(row["queued"], 1);
    assert_eq!(row["delivered"], 1);
    assert_eq!(row["failed"], 0);

    let uri = format!("/api/reports/campaigns/{id}/delivery");
    let breakdown = body_json(get_auth(app.clone(), &uri, &token).await).await;
    assert_eq!(
        breakdown["data"],
        json!([
            { "status": "delivered", "count": 1 },
            { "status": "queued", "count": 1 }
        ])
    );

    let response = get_auth(app, &uri, &other_token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn spend_report_totals_debits_and_credits(pool: PgPool) {
    let admin = common::create_user(&pool, "root", common::ROLE_SUPER_ADMIN_ID, None).await;
    let admin_token = common::super_admin_token(admin.id);
    let (client, _user, token) = common::tenant(&pool, "Acme").await;
    let app = common::build_test_app(pool).await;

    delivered_campaign(app.clone(), &admin_token, client.id, &token).await;

    let today = Utc::now().date_naive();
    let from = today - Duration::days(1);
    let to = today + Duration::days(1);
    let response = get_auth(
        app.clone(),
        &format!("/api/reports/spend?from={from}&to={to}"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let days = body_json(response).await["data"].clone();
    let rows = days.as_array().unwrap();
    let debits: i64 = rows.iter().map(|r| r["debit_cents"].as_i64().unwrap()).sum();
    let credits: i64 = rows.iter().map(|r| r["credit_cents"].as_i64().unwrap()).sum();
    assert_eq!(debits, 50);
    assert_eq!(credits, 1_000);

    let response = get_auth(app, &format!("/api/reports/spend?from={to}&to={from}"), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn dashboard_is_scoped_to_the_caller(pool: PgPool) {
    let admin = common::create_user(&pool, "root", common::ROLE_SUPER_ADMIN_ID, None).await;
    let admin_token = common::super_admin_token(admin.id);
    let (client, _user, token) = common::tenant(&pool, "Acme").await;
    let app = common::build_test_app(pool).await;

    delivered_campaign(app.clone(), &admin_token, client.id, &token).await;

    let response = get_auth(app.clone(), "/api/dashboard/stats", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let stats = body_json(response).await;
    assert_eq!(stats["data"]["scope"], "client");
    assert_eq!(stats["data"]["contacts"], 2);
    assert_eq!(stats["data"]["campaigns"], 1);
    assert_eq!(stats["data"]["active_campaigns"], 1);
    assert_eq!(stats["data"]["messages_sent"], 1);
    assert_eq!(stats["data"]["messages_delivered"], 1);
    assert_eq!(stats["data"]["balance_cents"], 950);

    let stats = body_json(get_auth(app, "/api/dashboard/stats", &admin_token).await).await;
    assert_eq!(stats["data"]["scope"], "platform");
    assert_eq!(stats["data"]["clients"], 1);
    assert_eq!(stats["data"]["campaigns"], 1);
    assert_eq!(stats["data"]["total_balance_cents"], 950);
    assert_eq!(stats["data"]["affiliates"], 0);
}
