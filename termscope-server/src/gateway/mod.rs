//! Model gateway boundary
//!
//! The hosted model is an external collaborator with a single capability:
//! given an ordered list of role-tagged messages, return one text completion.
//! Everything that talks to the model goes through [`ModelGateway`] so the
//! workflows can be driven by stub gateways in tests.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub mod chat_completions;

pub use chat_completions::ChatCompletionsClient;

/// Gateway call errors
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Model returned an empty completion")]
    EmptyCompletion,
}

/// Role tag of a message sent to the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// One message in a gateway request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Chat-completion capability of the hosted model
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Model identifier reported by the health endpoint
    fn model(&self) -> &str;

    /// Send the messages and return the completion text
    ///
    /// # Returns
    /// * `Ok(String)` - Raw completion text (may be malformed or markdown-wrapped)
    /// * `Err(GatewayError)` - Call failed; callers degrade rather than propagate
    async fn invoke(&self, messages: &[ChatMessage]) -> Result<String, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles_serialize_for_chat_completions() {
        let json = serde_json::to_value(ChatMessage::system("be brief")).unwrap();
        assert_eq!(json["role"], "system");
        assert_eq!(json["content"], "be brief");

        let json = serde_json::to_value(ChatMessage::assistant("ok")).unwrap();
        assert_eq!(json["role"], "assistant");
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            GatewayError::Api(401, "bad key".to_string()).to_string(),
            "API error 401: bad key"
        );
        assert_eq!(
            GatewayError::Timeout(60).to_string(),
            "Request timed out after 60s"
        );
    }
}
