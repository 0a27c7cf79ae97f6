//! HTTP-level integration tests for the caller's profile.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get_auth, put_json_auth, register_and_sign_in};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_profile_is_created_on_first_read(pool: PgPool) {
    let test = build_test_app(pool);
    let token = register_and_sign_in(&test, "alice@example.com", "Alice").await;

    let response = get_auth(test.app(), "/api/v1/profile", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["user"]["email"], "alice@example.com");
    assert_eq!(json["data"]["profile"]["profile_completed"], false);
    assert!(json["data"]["profile"]["height_cm"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_profile_completion_is_derived(pool: PgPool) {
    let test = build_test_app(pool);
    let token = register_and_sign_in(&test, "alice@example.com", "Alice").await;

    let partial = put_json_auth(
        test.app(),
        "/api/v1/profile",
        &token,
        serde_json::json!({ "height_cm": 170, "weight_kg": 65, "profile_completed": true }),
    )
    .await;
    assert_eq!(partial.status(), StatusCode::OK);
    assert_eq!(body_json(partial).await["data"]["profile"]["profile_completed"], false);

    let complete = put_json_auth(
        test.app(),
        "/api/v1/profile",
        &token,
        serde_json::json!({
            "name": "Alice Liddell",
            "height_cm": 170,
            "weight_kg": 65,
            "paypal_email": " Alice@PayPal.com ",
        }),
    )
    .await;
    assert_eq!(complete.status(), StatusCode::OK);
    let json = body_json(complete).await;
    assert_eq!(json["data"]["profile"]["profile_completed"], true);
    assert_eq!(json["data"]["profile"]["paypal_email"], "alice@paypal.com");
    assert_eq!(json["data"]["user"]["name"], "Alice Liddell");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_profile_rejects_out_of_range_values(pool: PgPool) {
    let test = build_test_app(pool);
    let token = register_and_sign_in(&test, "alice@example.com", "Alice").await;

    let response = put_json_auth(
        test.app(),
        "/api/v1/profile",
        &token,
        serde_json::json!({ "height_cm": 20, "waist_cm": 500, "paypal_email": "nope" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    let fields = json["fields"].as_object().unwrap();
    assert!(fields.contains_key("height_cm"));
    assert!(fields.contains_key("waist_cm"));
    assert!(fields.contains_key("paypal_email"));
}
