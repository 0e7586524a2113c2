//! Shared test helpers: stub gateways and request builders

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use termscope_common::config::SessionConfig;
use termscope_server::gateway::{ChatMessage, GatewayError, ModelGateway};
use termscope_server::{build_router, AppState};

/// Gateway stub replaying scripted replies; `None` fails the call.
/// When the script runs out, every further call fails.
pub struct StubGateway {
    replies: Mutex<VecDeque<Option<String>>>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl StubGateway {
    pub fn scripted(replies: Vec<Option<&str>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().map(|r| r.map(String::from)).collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Self::scripted(Vec::new())
    }

    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelGateway for StubGateway {
    fn model(&self) -> &str {
        "stub/model"
    }

    async fn invoke(&self, messages: &[ChatMessage]) -> Result<String, GatewayError> {
        self.requests.lock().unwrap().push(messages.to_vec());
        match self.replies.lock().unwrap().pop_front().flatten() {
            Some(reply) => Ok(reply),
            None => Err(GatewayError::Api(503, "service unavailable".to_string())),
        }
    }
}

/// Gateway whose every call panics
pub struct PanickingGateway;

#[async_trait]
impl ModelGateway for PanickingGateway {
    fn model(&self) -> &str {
        "stub/panicking"
    }

    async fn invoke(&self, _messages: &[ChatMessage]) -> Result<String, GatewayError> {
        panic!("gateway exploded");
    }
}

/// Router over the given gateway with default session bounds
pub fn setup_app(gateway: Arc<dyn ModelGateway>) -> axum::Router {
    build_router(AppState::new(gateway, &SessionConfig::default()))
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Extract JSON body from response
pub async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}
