#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::Value;
use sqlx::SqlitePool;
use tower::ServiceExt;

use taskboard::api::router;
use taskboard::db;
use taskboard::openai::dto::{ChatCompletionRequest, ChatCompletionResponse};
use taskboard::openai::{ChatCompletion, ProviderError};
use taskboard::services::DescriptionGenerator;
use taskboard::state::AppState;

pub async fn memory_pool() -> SqlitePool {
    db::connect("sqlite::memory:")
        .await
        .expect("Failed to create database")
}

pub fn app(db: SqlitePool, generator: DescriptionGenerator) -> Router {
    router(AppState { db, generator })
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("Failed to build request");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to call router");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Response body is not JSON")
    };
    (status, value)
}

/// Scripted completion provider; counts how often it is called.
pub struct ScriptedCompletion {
    pub response: Result<&'static str, (&'static str, &'static str)>,
    pub calls: AtomicUsize,
}

impl ScriptedCompletion {
    pub fn replying(content: &'static str) -> Arc<Self> {
        Arc::new(Self {
            response: Ok(content),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(code: &'static str, message: &'static str) -> Arc<Self> {
        Arc::new(Self {
            response: Err((code, message)),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatCompletion for ScriptedCompletion {
    async fn create_chat_completion(
        &self,
        _request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.response {
            Ok(content) => {
                let body = serde_json::json!({
                    "choices": [{ "message": { "role": "assistant", "content": content } }]
                });
                Ok(serde_json::from_value(body).expect("valid completion body"))
            }
            Err((code, message)) => Err(ProviderError::Api {
                status: 429,
                code: Some(code.to_string()),
                message: message.to_string(),
            }),
        }
    }
}
