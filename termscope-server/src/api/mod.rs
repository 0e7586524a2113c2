//! HTTP API handlers for termscope-server

pub mod analyze;
pub mod chatbot;
pub mod health;

pub use analyze::analysis_routes;
pub use chatbot::chatbot_routes;
pub use health::health_routes;

use crate::ApiError;

/// Treat an absent or empty string field as missing
pub(crate) fn require_field(value: Option<String>, name: &str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("{name} is required")))
}
