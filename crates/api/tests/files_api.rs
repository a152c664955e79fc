//! HTTP-level integration tests for filing signed documents under staff
//! members and clients, including save idempotency.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_test_user, get_auth, login_as, post_json_auth};
use sqlx::PgPool;
use uuid::Uuid;

use opsdesk_db::models::client::CreateClient;
use opsdesk_db::repositories::{ClientRepo, SigningSessionRepo};

async fn create_signing_session(pool: &PgPool) -> Uuid {
    let token = Uuid::new_v4();
    SigningSessionRepo::create(
        pool,
        token,
        "Non-Disclosure Agreement.pdf",
        "cGRm",
        &serde_json::json!([]),
    )
    .await
    .unwrap();
    token
}

async fn create_client(pool: &PgPool) -> i64 {
    ClientRepo::create(
        pool,
        &CreateClient {
            name: "Filing Client".to_string(),
            email: format!("files-{}@test.com", Uuid::new_v4()),
        },
    )
    .await
    .unwrap()
    .id
}

// ---------------------------------------------------------------------------
// Saving
// ---------------------------------------------------------------------------

/// Filing a document succeeds and reappears in the recipient's listing.
#[sqlx::test(migrations = "../db/migrations")]
async fn save_and_list_for_client(pool: PgPool) {
    let app = common::build_test_app(pool.clone()).await;
    let operator = login_as(&pool, app.clone(), "filer", "staff").await;
    let token = create_signing_session(&pool).await;
    let client_id = create_client(&pool).await;

    let body = serde_json::json!({
        "signing_token": token,
        "recipient_type": "client",
        "recipient_id": client_id,
    });
    let response = post_json_auth(app.clone(), "/api/files", &operator, body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["already_saved"], false);
    assert_eq!(json["data"]["file"]["owner_type"], "client");
    assert_eq!(json["data"]["file"]["owner_id"], client_id);

    let listing = get_auth(app, &format!("/api/files/client/{client_id}"), &operator).await;
    assert_eq!(listing.status(), StatusCode::OK);
    let json = body_json(listing).await;
    let files = json["data"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["signing_token"], token.to_string());
}

/// Re-filing the same document for the same recipient is a no-op that
/// reports the existing row instead of duplicating it.
#[sqlx::test(migrations = "../db/migrations")]
async fn resave_is_idempotent(pool: PgPool) {
    let app = common::build_test_app(pool.clone()).await;
    let operator = login_as(&pool, app.clone(), "filer", "staff").await;
    let token = create_signing_session(&pool).await;
    let client_id = create_client(&pool).await;

    let body = serde_json::json!({
        "signing_token": token,
        "recipient_type": "client",
        "recipient_id": client_id,
    });
    let first = post_json_auth(app.clone(), "/api/files", &operator, body.clone()).await;
    assert_eq!(first.status(), StatusCode::OK);
    let first_id = body_json(first).await["data"]["file"]["id"].clone();

    let second = post_json_auth(app.clone(), "/api/files", &operator, body).await;
    assert_eq!(second.status(), StatusCode::OK);
    let json = body_json(second).await;
    assert_eq!(json["data"]["already_saved"], true);
    assert_eq!(json["data"]["file"]["id"], first_id);

    let listing = get_auth(app, &format!("/api/files/client/{client_id}"), &operator).await;
    let json = body_json(listing).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1, "no duplicate row");
}

/// The same document can be filed for several recipients independently.
#[sqlx::test(migrations = "../db/migrations")]
async fn same_document_filed_for_two_recipients(pool: PgPool) {
    let app = common::build_test_app(pool.clone()).await;
    let operator = login_as(&pool, app.clone(), "filer", "staff").await;
    let token = create_signing_session(&pool).await;
    let client_id = create_client(&pool).await;
    let (staff, _) = create_test_user(&pool, "recipient", "staff").await;

    for (rtype, rid) in [("client", client_id), ("staff", staff.id)] {
        let body = serde_json::json!({
            "signing_token": token,
            "recipient_type": rtype,
            "recipient_id": rid,
        });
        let response = post_json_auth(app.clone(), "/api/files", &operator, body).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["data"]["already_saved"], false);
    }

    let listing = get_auth(app, &format!("/api/files/staff/{}", staff.id), &operator).await;
    let json = body_json(listing).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Validation and lookups
// ---------------------------------------------------------------------------

/// An unrecognized recipient type is rejected with 400.
#[sqlx::test(migrations = "../db/migrations")]
async fn save_rejects_unknown_recipient_type(pool: PgPool) {
    let app = common::build_test_app(pool.clone()).await;
    let operator = login_as(&pool, app.clone(), "filer", "staff").await;
    let token = create_signing_session(&pool).await;

    let body = serde_json::json!({
        "signing_token": token,
        "recipient_type": "vendor",
        "recipient_id": 1,
    });
    let response = post_json_auth(app, "/api/files", &operator, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Filing an unknown signing session is 404.
#[sqlx::test(migrations = "../db/migrations")]
async fn save_unknown_signing_session(pool: PgPool) {
    let app = common::build_test_app(pool.clone()).await;
    let operator = login_as(&pool, app.clone(), "filer", "staff").await;
    let client_id = create_client(&pool).await;

    let body = serde_json::json!({
        "signing_token": Uuid::new_v4(),
        "recipient_type": "client",
        "recipient_id": client_id,
    });
    let response = post_json_auth(app, "/api/files", &operator, body).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Filing for a recipient that does not exist is 404.
#[sqlx::test(migrations = "../db/migrations")]
async fn save_unknown_recipient(pool: PgPool) {
    let app = common::build_test_app(pool.clone()).await;
    let operator = login_as(&pool, app.clone(), "filer", "staff").await;
    let token = create_signing_session(&pool).await;

    let body = serde_json::json!({
        "signing_token": token,
        "recipient_type": "client",
        "recipient_id": 424242,
    });
    let response = post_json_auth(app, "/api/files", &operator, body).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Listing validates the recipient type as well.
#[sqlx::test(migrations = "../db/migrations")]
async fn list_rejects_unknown_recipient_type(pool: PgPool) {
    let app = common::build_test_app(pool.clone()).await;
    let operator = login_as(&pool, app.clone(), "filer", "staff").await;

    let response = get_auth(app, "/api/files/vendor/1", &operator).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Filing is operator-only.
#[sqlx::test(migrations = "../db/migrations")]
async fn save_requires_operator(pool: PgPool) {
    let app = common::build_test_app(pool).await;

    let response = common::post_json(
        app,
        "/api/files",
        serde_json::json!({
            "signing_token": Uuid::new_v4(),
            "recipient_type": "client",
            "recipient_id": 1,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
