//! HTTP-level tests for registration and login.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, post_json, send_multipart, Part};
use serde_json::json;

#[tokio::test]
async fn register_then_login_yields_a_usable_token() {
    let app = common::build_test_app();
    let res = post_json(
        &app.router,
        "/auth/register",
        json!({"email": "Ash@Kanto.jp", "password": "pikachu", "name": "Ash"}),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let json = body_json(res).await;
    assert_eq!(json["user"]["email"], "ash@kanto.jp");
    assert_eq!(json["user"]["name"], "Ash");
    assert!(json["user"].get("passwordHash").is_none());
    let user_id = json["user"]["id"].as_str().unwrap().to_string();

    let res = post_json(&app.router, "/auth/login", json!({"email": "ash@kanto.jp", "password": "pikachu"})).await;
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["tokenType"], "Bearer");
    assert_eq!(json["expiresIn"], 15 * 60);
    let token = json["accessToken"].as_str().unwrap().to_string();

    let res = send_multipart(
        &app.router,
        Method::POST,
        "/pokemon",
        Some(&token),
        &[Part::Text("name", "pikachu"), Part::Text("height", "4"), Part::Text("weight", "60")],
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(body_json(res).await["ownerId"], user_id);
}

#[tokio::test]
async fn register_validates_and_rejects_duplicates() {
    let app = common::build_test_app();
    let res = post_json(&app.router, "/auth/register", json!({"email": "a@b.c", "password": "12345"})).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(res).await["error"]["details"]["field"], "password");

    let res = post_json(&app.router, "/auth/register", json!({"password": "123456"})).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = post_json(&app.router, "/auth/register", json!({"email": "a@b.c", "password": "123456"})).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(body_json(res).await["user"]["name"], "a@b.c");

    let res = post_json(&app.router, "/auth/register", json!({"email": "A@B.C", "password": "654321"})).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn login_rejects_wrong_credentials() {
    let app = common::build_test_app();
    post_json(&app.router, "/auth/register", json!({"email": "misty@cerulean.jp", "password": "starmie"})).await;

    let res = post_json(&app.router, "/auth/login", json!({"email": "misty@cerulean.jp", "password": "staryu"})).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(res).await["error"]["code"], "unauthorized");

    let res = post_json(&app.router, "/auth/login", json!({"email": "brock@pewter.jp", "password": "onix00"})).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
