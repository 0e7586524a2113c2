//! Document analysis endpoint

use axum::{extract::rejection::JsonRejection, extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use termscope_common::{ExtractionTier, Finding};

use super::require_field;
use crate::{ApiError, ApiResult, AppState};

/// Analysis request body
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub terms_data: Option<String>,
}

/// Analysis response body
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub score: u8,
    pub summary: String,
    pub items: Vec<Finding>,
    /// Candidate findings dropped by validation
    pub rejected: usize,
    pub tier: ExtractionTier,
}

/// POST /api/analyze
///
/// The pipeline itself never fails; it runs on its own task so that a panic
/// inside it is reported as a 500 instead of dropping the connection.
pub async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> ApiResult<Json<AnalyzeResponse>> {
    let Json(request) = payload?;
    let terms_data = require_field(request.terms_data, "terms_data")?;

    tracing::info!(chars = terms_data.chars().count(), "Analyzing document");

    let analyzer = state.analyzer.clone();
    let result = tokio::spawn(async move { analyzer.extract(&terms_data).await })
        .await
        .map_err(|e| ApiError::Internal(format!("Analysis task failed: {e}")))?;

    tracing::info!(
        score = result.score,
        findings = result.findings.len(),
        tier = ?result.tier,
        "Analysis complete"
    );

    Ok(Json(AnalyzeResponse {
        score: result.score,
        summary: result.summary,
        items: result.findings,
        rejected: result.rejected,
        tier: result.tier,
    }))
}

/// Build analysis routes
pub fn analysis_routes() -> Router<AppState> {
    Router::new().route("/api/analyze", post(analyze))
}
