mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{error_body, TestServer};
use conduit_api::config::AppConfig;

#[tokio::test]
async fn add_list_and_delete_comments() -> Result<()> {
    let server = TestServer::spawn().await?;
    let jake = server.register("jake").await?;
    let sally = server.register("sally").await?;
    let article = server.create_article(&jake, "Dragons", &[]).await?;
    let comments_path = format!("/articles/{}/comments", article["slug"].as_str().unwrap());

    let mut ids = Vec::new();
    for (token, text) in [(&jake, "first!"), (&sally, "second")] {
        let res = server
            .post(&comments_path, Some(token.as_str()))
            .json(&json!({ "comment": { "body": text } }))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = res.json().await?;
        assert_eq!(body["comment"]["body"], text);
        ids.push(body["comment"]["id"].as_i64().unwrap());
    }

    let res = server.get(&comments_path, None).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    let comments = body["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["body"], "first!");
    assert_eq!(comments[0]["author"]["username"], "jake");
    assert_eq!(comments[1]["author"]["username"], "sally");

    let res = server
        .delete(&format!("{}/{}", comments_path, ids[0]), Some(&sally))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!({}));

    let body: Value = server.get(&comments_path, None).send().await?.json().await?;
    assert_eq!(body["comments"].as_array().unwrap().len(), 1);
    assert_eq!(body["comments"][0]["body"], "second");
    Ok(())
}

#[tokio::test]
async fn comment_validation() -> Result<()> {
    let server = TestServer::spawn().await?;
    let jake = server.register("jake").await?;
    let article = server.create_article(&jake, "Dragons", &[]).await?;
    let comments_path = format!("/articles/{}/comments", article["slug"].as_str().unwrap());

    let res = server
        .post(&comments_path, Some(&jake))
        .json(&json!({ "comment": { "body": "" } }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?, error_body("Parameter"));

    let res = server
        .post(&comments_path, None)
        .json(&json!({ "comment": { "body": "hi" } }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server
        .post("/articles/missing-slug/comments", Some(&jake))
        .json(&json!({ "comment": { "body": "hi" } }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>().await?, error_body("article"));
    Ok(())
}

#[tokio::test]
async fn deleting_absent_comment_succeeds() -> Result<()> {
    let server = TestServer::spawn().await?;
    let jake = server.register("jake").await?;

    let res = server.delete("/articles/whatever/comments/999", Some(&jake)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = server.delete("/articles/whatever/comments/abc", Some(&jake)).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>().await?, error_body("comment"));
    Ok(())
}

#[tokio::test]
async fn ownership_enforcement_protects_comments() -> Result<()> {
    let mut config = AppConfig::testing();
    config.security.enforce_ownership = true;
    let server = TestServer::spawn_with(config).await?;

    let jake = server.register("jake").await?;
    let sally = server.register("sally").await?;
    let article = server.create_article(&jake, "Dragons", &[]).await?;
    let comments_path = format!("/articles/{}/comments", article["slug"].as_str().unwrap());

    let body: Value = server
        .post(&comments_path, Some(&jake))
        .json(&json!({ "comment": { "body": "mine" } }))
        .send()
        .await?
        .json()
        .await?;
    let id = body["comment"]["id"].as_i64().unwrap();

    let res = server.delete(&format!("{}/{}", comments_path, id), Some(&sally)).send().await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(res.json::<Value>().await?, error_body("author"));

    let res = server.delete(&format!("{}/{}", comments_path, id), Some(&jake)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}
