//! termscope-server library
//!
//! Document analysis and document Q&A over a hosted chat model, served over
//! HTTP. Exposes the router and workflows for integration testing.

pub mod api;
pub mod chat;
pub mod error;
pub mod extraction;
pub mod gateway;
pub mod prompts;
pub mod scoring;
pub mod session;
pub mod text;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use termscope_common::config::SessionConfig;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::chat::ChatService;
use crate::extraction::AnalysisPipeline;
use crate::gateway::ModelGateway;
use crate::session::SessionStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Model identifier reported by /health
    pub model: String,
    /// Document analysis workflow
    pub analyzer: AnalysisPipeline,
    /// Chatbot workflow and its session store
    pub chat: ChatService,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(gateway: Arc<dyn ModelGateway>, sessions: &SessionConfig) -> Self {
        let store = Arc::new(SessionStore::new(sessions));
        Self {
            model: gateway.model().to_string(),
            analyzer: AnalysisPipeline::new(gateway.clone()),
            chat: ChatService::new(gateway, store),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::analysis_routes())
        .merge(api::chatbot_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
