//! Contact CRUD, CSV import/export and tenant isolation.

mod common;

use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use common::{
    body_json, body_text, delete_auth, get_auth, post_csv_auth, post_json_auth, ROLE_AGENT_ID,
};
use msgdesk_api::auth::jwt::{sign_access_token, TokenSubject};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn list_pages_and_searches_literally(pool: PgPool) {
    let (_, _, token) = common::tenant(&pool, "Acme").await;
    let app = common::build_test_app(pool).await;

    for (name, phone) in [
        ("Asha", "+919800000001"),
        ("Ravi", "+919800000002"),
        ("Ravi_K", "+919800000003"),
    ] {
        let response = post_json_auth(
            app.clone(),
            "/api/contacts",
            &token,
            json!({ "name": name, "phone": phone }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let json = body_json(get_auth(app.clone(), "/api/contacts?limit=2", &token).await).await;
    assert_eq!(json["data"]["total"], 3);
    assert_eq!(json["data"]["limit"], 2);
    assert_eq!(json["data"]["offset"], 0);
    assert_eq!(json["data"]["items"].as_array().unwrap().len(), 2);

    let json = body_json(get_auth(app, "/api/contacts?search=ravi_", &token).await).await;
    assert_eq!(json["data"]["total"], 1);
    assert_eq!(json["data"]["items"][0]["name"], "Ravi_K");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_phone_is_a_readable_conflict(pool: PgPool) {
    let (_, _, token) = common::tenant(&pool, "Acme").await;
    let app = common::build_test_app(pool).await;
    let body = json!({ "name": "Asha", "phone": "+919800000001" });

    let first = post_json_auth(app.clone(), "/api/contacts", &token, body.clone()).await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = post_json_auth(app, "/api/contacts", &token, body).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let json = body_json(second).await;
    assert_eq!(json["code"], "CONFLICT");
    assert_eq!(json["error"], "A contact with this phone number already exists");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn import_upserts_and_reports_rejected_rows(pool: PgPool) {
    let (_, _, token) = common::tenant(&pool, "Acme").await;
    let app = common::build_test_app(pool).await;

    let csv = "name,phone,city\nAsha,+919800000001,Pune\nNobody,abc,Delhi\n";
    let response = post_csv_auth(app.clone(), "/api/contacts/import", &token, csv).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["inserted"], 1);
    assert_eq!(json["data"]["updated"], 0);
    assert_eq!(json["data"]["rejected"][0]["line"], 3);

    let csv = "name,phone\nAsha Rao,+919800000001\n";
    let json = body_json(post_csv_auth(app.clone(), "/api/contacts/import", &token, csv).await).await;
    assert_eq!(json["data"]["inserted"], 0);
    assert_eq!(json["data"]["updated"], 1);

    let json = body_json(get_auth(app, "/api/contacts", &token).await).await;
    assert_eq!(json["data"]["total"], 1);
    assert_eq!(json["data"]["items"][0]["name"], "Asha Rao");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn csv_without_phone_column_is_rejected(pool: PgPool) {
    let (_, _, token) = common::tenant(&pool, "Acme").await;
    let app = common::build_test_app(pool).await;

    let response =
        post_csv_auth(app, "/api/contacts/import", &token, "name,city\nAsha,Pune\n").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn agent_can_export_contacts_as_csv(pool: PgPool) {
    let (client, _, admin_token) = common::tenant(&pool, "Acme").await;
    let agent = common::create_user(&pool, "acme_agent", ROLE_AGENT_ID, Some(client.id)).await;
    let agent_token = sign_access_token(
        TokenSubject {
            user_id: agent.id,
            role: "agent",
            client_id: Some(client.id),
        },
        &common::test_config().jwt,
    )
    .unwrap();
    let app = common::build_test_app(pool).await;

    let response = post_json_auth(
        app.clone(),
        "/api/contacts",
        &admin_token,
        json!({ "name": "Asha", "phone": "+919800000001", "attributes": { "city": "Pune" } }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = get_auth(app, "/api/contacts/export", &agent_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "text/csv");
    assert!(response.headers()[CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("contacts.csv"));

    let text = body_text(response).await;
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("name,phone,email,city"));
    assert_eq!(lines.next(), Some("Asha,+919800000001,,Pune"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn contacts_of_another_client_are_invisible(pool: PgPool) {
    let (_, _, acme) = common::tenant(&pool, "Acme").await;
    let (_, _, globex) = common::tenant(&pool, "Globex").await;
    let app = common::build_test_app(pool).await;

    let response = post_json_auth(
        app.clone(),
        "/api/contacts",
        &acme,
        json!({ "name": "Asha", "phone": "+919800000001" }),
    )
    .await;
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = get_auth(app.clone(), &format!("/api/contacts/{id}"), &globex).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = delete_auth(app.clone(), &format!("/api/contacts/{id}"), &globex).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete_auth(app, &format!("/api/contacts/{id}"), &acme).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
