//! Chatbot endpoints: ask, reset, history

use axum::{extract::rejection::JsonRejection, extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use termscope_common::Turn;

use super::require_field;
use crate::{ApiResult, AppState};

/// Chatbot request body
#[derive(Debug, Deserialize)]
pub struct ChatbotRequest {
    pub terms_data: Option<String>,
    pub message: Option<String>,
    pub conversation_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatbotResponse {
    pub response: String,
    pub conversation_id: String,
}

/// Body of the reset and history requests; a missing or null id is treated as `""`
#[derive(Debug, Deserialize)]
pub struct ConversationRequest {
    #[serde(default)]
    pub conversation_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub conversation_id: String,
    pub history: Vec<Turn>,
    pub message_count: usize,
}

/// POST /api/chatbot
pub async fn chatbot(
    State(state): State<AppState>,
    payload: Result<Json<ChatbotRequest>, JsonRejection>,
) -> ApiResult<Json<ChatbotResponse>> {
    let Json(request) = payload?;
    let terms_data = require_field(request.terms_data, "terms_data")?;
    let message = require_field(request.message, "message")?;

    let reply = state
        .chat
        .respond(&terms_data, request.conversation_id.as_deref(), &message)
        .await;

    Ok(Json(ChatbotResponse {
        response: reply.response,
        conversation_id: reply.conversation_id,
    }))
}

/// POST /api/chatbot/reset
pub async fn reset_conversation(
    State(state): State<AppState>,
    payload: Result<Json<ConversationRequest>, JsonRejection>,
) -> ApiResult<Json<ResetResponse>> {
    let Json(request) = payload?;
    let conversation_id = request.conversation_id.unwrap_or_default();
    state.chat.reset(&conversation_id).await;

    Ok(Json(ResetResponse {
        message: "Conversation reset successfully".to_string(),
    }))
}

/// POST /api/chatbot/history
pub async fn conversation_history(
    State(state): State<AppState>,
    payload: Result<Json<ConversationRequest>, JsonRejection>,
) -> ApiResult<Json<HistoryResponse>> {
    let Json(request) = payload?;
    let conversation_id = request.conversation_id.unwrap_or_default();
    let history = state.chat.history(&conversation_id).await;

    Ok(Json(HistoryResponse {
        message_count: history.len(),
        conversation_id,
        history,
    }))
}

/// Build chatbot routes
pub fn chatbot_routes() -> Router<AppState> {
    Router::new()
        .route("/api/chatbot", post(chatbot))
        .route("/api/chatbot/reset", post(reset_conversation))
        .route("/api/chatbot/history", post(conversation_history))
}
