mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{error_body, TestServer};
use conduit_api::auth::TokenService;
use conduit_api::config::AppConfig;

#[tokio::test]
async fn register_login_and_fetch_current_user() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server
        .post("/users", None)
        .json(&json!({ "user": { "username": "sally", "email": "sally@example.com", "password": "secret" } }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    assert_eq!(body["user"]["username"], "sally");
    assert_eq!(body["user"]["email"], "sally@example.com");
    assert_eq!(body["user"]["bio"], "");
    assert_eq!(body["user"]["image"], "https://static.productionready.io/images/smiley-cyrus.jpg");

    let res = server
        .post("/users/login", None)
        .json(&json!({ "user": { "email": "sally@example.com", "password": "secret" } }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    let token = body["user"]["token"].as_str().unwrap().to_string();

    // Login token resolves to the same user as the registration token
    let tokens = TokenService::from_config(&AppConfig::testing().security);
    let registered = tokens.validate(&token)?;

    let res = server.get("/user", Some(&token)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["user"]["email"], "sally@example.com");
    let current = tokens.validate(body["user"]["token"].as_str().unwrap())?;
    assert_eq!(current.id, registered.id);
    Ok(())
}

#[tokio::test]
async fn login_failures_are_indistinguishable() -> Result<()> {
    let server = TestServer::spawn().await?;
    server.register("jake").await?;

    let unknown = server
        .post("/users/login", None)
        .json(&json!({ "user": { "email": "nobody@example.com", "password": "password123" } }))
        .send()
        .await?;
    let wrong = server
        .post("/users/login", None)
        .json(&json!({ "user": { "email": "jake@example.com", "password": "wrong" } }))
        .send()
        .await?;

    assert_eq!(unknown.status(), StatusCode::FORBIDDEN);
    assert_eq!(wrong.status(), StatusCode::FORBIDDEN);
    let unknown = unknown.bytes().await?;
    let wrong = wrong.bytes().await?;
    assert_eq!(unknown, wrong);
    assert_eq!(serde_json::from_slice::<Value>(&unknown)?, error_body("email or password"));
    Ok(())
}

#[tokio::test]
async fn registration_rejects_missing_fields_and_duplicates() -> Result<()> {
    let server = TestServer::spawn().await?;
    server.register("jake").await?;

    let res = server
        .post("/users", None)
        .json(&json!({ "user": { "username": "other", "email": "", "password": "x" } }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?, error_body("Parameter"));

    let res = server
        .post("/users", None)
        .json(&json!({ "user": { "username": "jake", "email": "new@example.com", "password": "x" } }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?, error_body("Parameter"));

    let res = server
        .post("/users", None)
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn current_user_requires_valid_token_for_live_user() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server.get("/user", None).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.json::<Value>().await?, error_body("Authorization Header"));

    let res = server.get("/user", Some("not.a.jwt")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.json::<Value>().await?, error_body("JWT Token"));

    let forged = TokenService::from_config(&AppConfig::testing().security).issue(4242)?;
    let res = server.get("/user", Some(&forged)).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.json::<Value>().await?, error_body("User data"));
    Ok(())
}

#[tokio::test]
async fn update_user_changes_only_supplied_fields() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.register("jake").await?;

    let res = server
        .put("/user", Some(&token))
        .json(&json!({ "user": { "bio": "I work at statefarm", "image": "", "password": "newpassword" } }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["user"]["bio"], "I work at statefarm");
    assert_eq!(body["user"]["username"], "jake");
    assert_eq!(body["user"]["email"], "jake@example.com");
    assert_eq!(body["user"]["image"], "https://static.productionready.io/images/smiley-cyrus.jpg");
    assert!(body["user"]["token"].as_str().is_some());

    let res = server
        .post("/users/login", None)
        .json(&json!({ "user": { "email": "jake@example.com", "password": "newpassword" } }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn unknown_routes_use_error_body() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server.get("/does-not-exist", None).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>().await?, error_body("Route"));

    let res = server.get("/health", None).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!({ "status": "ok" }));
    Ok(())
}
