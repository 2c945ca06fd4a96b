#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use movieshelf::{AppState, app, config::Config, db, store::Catalog};
use sea_orm::ConnectOptions;
use serde_json::Value;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub catalog: Catalog,
}

pub struct Reply {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is json")
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("response body is utf-8")
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(Config::default()).await
}

pub async fn spawn_app_with(config: Config) -> TestApp {
    // a single long-lived connection keeps the in-memory database alive
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1).idle_timeout(Duration::from_secs(600));

    let db = db::connect_and_migrate(options).await.expect("in-memory database");
    let catalog = Catalog::new(db);
    let state = Arc::new(AppState { config: Arc::new(config), catalog: catalog.clone() });

    TestApp { router: app(state), catalog }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Reply {
        let response = self.router.clone().oneshot(request).await.expect("router is infallible");
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body").to_vec();
        Reply { status, content_type, body }
    }

    pub async fn call(&self, method: &str, uri: &str, body: Option<Value>) -> Reply {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        };
        self.send(request).await
    }

    pub async fn get(&self, uri: &str) -> Reply {
        self.call("GET", uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> Reply {
        self.call("POST", uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> Reply {
        self.call("PUT", uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> Reply {
        self.call("DELETE", uri, None).await
    }

    pub async fn create_category(&self, title: &str) -> i64 {
        let reply = self.post("/api/category", serde_json::json!({ "title": title })).await;
        assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.text());
        reply.json()["id"].as_i64().expect("category id")
    }

    pub async fn create_movie(&self, title: &str) -> i64 {
        let reply = self
            .post(
                "/api/movie",
                serde_json::json!({
                    "title": title,
                    "description": format!("About {title}"),
                    "releasedAt": "2024-01-01",
                    "rating": 3,
                }),
            )
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.text());
        reply.json()["id"].as_i64().expect("movie id")
    }
}
