#![allow(dead_code)]

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use conduit_api::config::AppConfig;
use conduit_api::{app, AppState};

/// A server bound to an ephemeral port with its own in-memory database
pub struct TestServer {
    pub base_url: String,
    pub client: Client,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(AppConfig::testing()).await
    }

    pub async fn spawn_with(config: AppConfig) -> Result<Self> {
        let state = AppState::from_config(config).await.context("failed to build app state")?;
        let listener = TcpListener::bind("127.0.0.1:0").await.context("failed to bind")?;
        let addr = listener.local_addr()?;

        tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        Ok(Self {
            base_url: format!("http://{}/api", addr),
            client: Client::new(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn get(&self, path: &str, token: Option<&str>) -> RequestBuilder {
        authorize(self.client.get(self.url(path)), token)
    }

    pub fn post(&self, path: &str, token: Option<&str>) -> RequestBuilder {
        authorize(self.client.post(self.url(path)), token)
    }

    pub fn put(&self, path: &str, token: Option<&str>) -> RequestBuilder {
        authorize(self.client.put(self.url(path)), token)
    }

    pub fn delete(&self, path: &str, token: Option<&str>) -> RequestBuilder {
        authorize(self.client.delete(self.url(path)), token)
    }

    /// Register `username` with password `password123`; returns the token
    pub async fn register(&self, username: &str) -> Result<String> {
        let res = self
            .post("/users", None)
            .json(&json!({
                "user": {
                    "username": username,
                    "email": format!("{}@example.com", username),
                    "password": "password123",
                }
            }))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::CREATED, "registering {}", username);

        let body: Value = res.json().await?;
        body["user"]["token"]
            .as_str()
            .map(str::to_string)
            .context("registration response carries no token")
    }

    /// Publish an article and return its JSON representation
    pub async fn create_article(&self, token: &str, title: &str, tags: &[&str]) -> Result<Value> {
        let res = self
            .post("/articles", Some(token))
            .json(&json!({
                "article": {
                    "title": title,
                    "description": format!("About {}", title),
                    "body": "Lorem ipsum",
                    "tagList": tags,
                }
            }))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::CREATED, "creating {}", title);

        let body: Value = res.json().await?;
        Ok(body["article"].clone())
    }
}

fn authorize(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => request.header("Authorization", format!("Token {}", token)),
        None => request,
    }
}

pub fn error_body(field: &str) -> Value {
    json!({ "errors": { field: "is invalid" } })
}
