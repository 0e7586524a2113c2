//! Context-aware Q&A over a document with per-session history

use std::sync::Arc;
use termscope_common::{Role, Turn};

use crate::gateway::{ChatMessage, ModelGateway};
use crate::prompts;
use crate::session::SessionStore;
use crate::text::clip_with_marker;

/// Documents are clipped to this many characters in the system prompt
pub const CHAT_DOCUMENT_CHARS: usize = 3000;

/// Assistant reply plus the session it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub response: String,
    pub conversation_id: String,
}

/// Chatbot workflow: session lookup, one gateway call, history append
#[derive(Clone)]
pub struct ChatService {
    gateway: Arc<dyn ModelGateway>,
    sessions: Arc<SessionStore>,
}

impl ChatService {
    pub fn new(gateway: Arc<dyn ModelGateway>, sessions: Arc<SessionStore>) -> Self {
        Self { gateway, sessions }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Answer one user message.
    ///
    /// Gateway failures are answered with an apology and leave the session
    /// history untouched.
    pub async fn respond(
        &self,
        document: &str,
        session_id: Option<&str>,
        user_message: &str,
    ) -> ChatReply {
        let session = self.sessions.open(session_id).await;
        if session.created {
            tracing::info!(conversation_id = %session.id, "Started conversation");
        }

        let messages = build_messages(document, &session.recent_turns, user_message);
        tracing::debug!(
            conversation_id = %session.id,
            replayed = session.recent_turns.len(),
            "Sending chatbot request"
        );

        let response = match self.gateway.invoke(&messages).await {
            Ok(text) => {
                self.sessions
                    .append_exchange(&session.id, Turn::user(user_message), Turn::assistant(text.as_str()))
                    .await;
                text
            }
            Err(e) => {
                tracing::error!(conversation_id = %session.id, error = %e, "Chatbot call failed");
                format!("I apologize, but I encountered an error: {e}")
            }
        };

        ChatReply {
            response,
            conversation_id: session.id,
        }
    }

    pub async fn reset(&self, session_id: &str) {
        if self.sessions.reset(session_id).await {
            tracing::info!(conversation_id = %session_id, "Conversation reset");
        }
    }

    pub async fn history(&self, session_id: &str) -> Vec<Turn> {
        self.sessions.history(session_id).await
    }
}

/// System prompt with the clipped document, replayed turns, new user message
fn build_messages(document: &str, recent_turns: &[Turn], user_message: &str) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(recent_turns.len() + 2);
    messages.push(prompts::chat_system(&clip_with_marker(document, CHAT_DOCUMENT_CHARS)));
    messages.extend(recent_turns.iter().map(|turn| match turn.role {
        Role::User => ChatMessage::user(turn.content.as_str()),
        Role::Assistant => ChatMessage::assistant(turn.content.as_str()),
    }));
    messages.push(ChatMessage::user(user_message));
    messages
}
