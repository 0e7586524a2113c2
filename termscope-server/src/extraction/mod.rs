//! Document analysis pipeline
//!
//! Turns a raw document into a scored [`AnalysisResult`], degrading through
//! three tiers so that every input produces a well-formed result:
//!
//! 1. Structured prompt, parsed as JSON (directly, then markdown-unwrapped)
//! 2. Line-format prompt, parsed as labeled blocks, then keyword-sniffed
//! 3. Static degraded result when the fallback call itself fails
//!
//! Gateway errors and malformed output never reach the caller.

use std::sync::Arc;
use termscope_common::{AnalysisResult, Category, ExtractionTier, Finding, Flag};

use crate::gateway::{GatewayError, ModelGateway};
use crate::prompts;
use crate::scoring;
use crate::text::clip_chars;

pub mod block_parser;
pub mod json_output;
pub mod keyword;

/// Documents are clipped to this many characters before submission
pub const ANALYSIS_DOCUMENT_CHARS: usize = 2000;

/// Score reported when no tier could produce findings
pub const DEGRADED_SCORE: u8 = 50;

const DEFAULT_SUMMARY: &str = "Analysis of the provided terms and conditions.";
const FALLBACK_SUMMARY: &str =
    "The terms and conditions have been analyzed. See specific findings below.";
const DEGRADED_SUMMARY: &str =
    "The terms and conditions could not be analyzed automatically. Please try again later.";

/// Characters of raw model output included in debug logs
const LOG_PREVIEW_CHARS: usize = 200;

/// Analysis workflow over a model gateway
#[derive(Clone)]
pub struct AnalysisPipeline {
    gateway: Arc<dyn ModelGateway>,
}

impl AnalysisPipeline {
    pub fn new(gateway: Arc<dyn ModelGateway>) -> Self {
        Self { gateway }
    }

    /// Analyze a document. Total: always returns a result.
    pub async fn extract(&self, document: &str) -> AnalysisResult {
        let (document, clipped) = clip_chars(document, ANALYSIS_DOCUMENT_CHARS);
        if clipped {
            tracing::debug!(
                limit = ANALYSIS_DOCUMENT_CHARS,
                "Document clipped before analysis"
            );
        }

        if let Some(result) = self.structured_tier(document).await {
            return result;
        }

        match self.fallback_tier(document).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "Fallback analysis call failed, returning degraded result");
                degraded_result(&e)
            }
        }
    }

    async fn structured_tier(&self, document: &str) -> Option<AnalysisResult> {
        let response = match self.gateway.invoke(&prompts::structured_analysis(document)).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "Structured analysis call failed, using fallback prompt");
                return None;
            }
        };

        tracing::debug!(
            preview = %clip_chars(&response, LOG_PREVIEW_CHARS).0,
            "Structured analysis raw response"
        );

        let Some(output) = json_output::parse_structured(&response) else {
            tracing::warn!("Structured response unusable, using fallback prompt");
            return None;
        };

        tracing::info!(
            findings = output.findings.len(),
            rejected = output.rejected,
            "Structured analysis parsed"
        );

        Some(build_result(
            output.summary.unwrap_or_else(|| DEFAULT_SUMMARY.to_string()),
            output.findings,
            output.rejected,
            ExtractionTier::Structured,
        ))
    }

    async fn fallback_tier(&self, document: &str) -> Result<AnalysisResult, GatewayError> {
        let response = self
            .gateway
            .invoke(&prompts::line_format_analysis(document))
            .await?;

        tracing::debug!(
            preview = %clip_chars(&response, LOG_PREVIEW_CHARS).0,
            "Fallback analysis raw response"
        );

        let parsed = block_parser::parse_line_format(&response);
        let summary = parsed
            .summary
            .unwrap_or_else(|| FALLBACK_SUMMARY.to_string());

        if !parsed.findings.is_empty() {
            tracing::info!(findings = parsed.findings.len(), "Line-format analysis parsed");
            return Ok(build_result(summary, parsed.findings, 0, ExtractionTier::LineFormat));
        }

        let findings = keyword::sniff_findings(&response);
        tracing::info!(findings = findings.len(), "No labeled blocks, used keyword sniffing");
        Ok(build_result(summary, findings, 0, ExtractionTier::Keyword))
    }
}

fn build_result(
    summary: String,
    findings: Vec<Finding>,
    rejected: usize,
    tier: ExtractionTier,
) -> AnalysisResult {
    AnalysisResult {
        score: scoring::score(&findings),
        summary,
        findings,
        rejected,
        tier,
    }
}

/// Static result used when every gateway call failed
pub fn degraded_result(error: &GatewayError) -> AnalysisResult {
    AnalysisResult {
        score: DEGRADED_SCORE,
        summary: DEGRADED_SUMMARY.to_string(),
        findings: vec![Finding::new(
            "Analysis Error",
            format!(
                "Unable to analyze the terms ({error}). Please try again or check the server logs."
            ),
            Flag::Warning,
            Category::General,
        )],
        rejected: 0,
        tier: ExtractionTier::Degraded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::ChatMessage;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned responses in order; `None` entries fail the call
    struct Scripted {
        responses: Mutex<VecDeque<Option<String>>>,
        prompts: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl Scripted {
        fn new(responses: Vec<Option<&str>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into_iter().map(|r| r.map(String::from)).collect()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ModelGateway for Scripted {
        fn model(&self) -> &str {
            "scripted"
        }

        async fn invoke(&self, messages: &[ChatMessage]) -> Result<String, GatewayError> {
            self.prompts.lock().unwrap().push(messages.to_vec());
            match self.responses.lock().unwrap().pop_front().flatten() {
                Some(text) => Ok(text),
                None => Err(GatewayError::Network("connection refused".to_string())),
            }
        }
    }

    const VALID: &str = r#"{"summary":"S","findings":[{"title":"T","description":"D","flag":"warning","category":"privacy"}]}"#;

    fn expected_valid() -> AnalysisResult {
        AnalysisResult {
            score: 93,
            summary: "S".to_string(),
            findings: vec![Finding::new("T", "D", Flag::Warning, Category::Privacy)],
            rejected: 0,
            tier: ExtractionTier::Structured,
        }
    }

    #[tokio::test]
    async fn test_valid_json_single_call() {
        let gateway = Scripted::new(vec![Some(VALID)]);
        let result = AnalysisPipeline::new(gateway.clone()).extract("terms").await;
        assert_eq!(result, expected_valid());
        assert_eq!(gateway.calls(), 1);
    }

    #[tokio::test]
    async fn test_markdown_wrapped_json() {
        let wrapped = format!("Sure, here you go:\n\n```json\n{VALID}\n```");
        let gateway = Scripted::new(vec![Some(wrapped.as_str())]);
        let result = AnalysisPipeline::new(gateway).extract("terms").await;
        assert_eq!(result, expected_valid());
    }

    #[tokio::test]
    async fn test_prose_then_line_format() {
        let fallback = "SUMMARY: Risky terms.\nFINDING 1: No refunds\nAll sales are final.\nFLAG: critical\nCATEGORY: payment";
        let gateway = Scripted::new(vec![Some("I think these terms are fine."), Some(fallback)]);
        let result = AnalysisPipeline::new(gateway.clone()).extract("terms").await;

        assert_eq!(gateway.calls(), 2);
        assert_eq!(result.tier, ExtractionTier::LineFormat);
        assert_eq!(result.summary, "Risky terms.");
        assert_eq!(
            result.findings,
            vec![Finding::new("No refunds", "All sales are final.", Flag::Critical, Category::Payment)]
        );
        assert_eq!(result.score, 85);
    }

    #[tokio::test]
    async fn test_wrong_shape_goes_to_fallback() {
        let gateway = Scripted::new(vec![
            Some(r#"{"summary":"S"}"#),
            Some("The data retention clause is concerning for privacy."),
        ]);
        let result = AnalysisPipeline::new(gateway).extract("terms").await;
        assert_eq!(result.tier, ExtractionTier::Keyword);
        assert_eq!(result.summary, FALLBACK_SUMMARY);
        assert_eq!(result.findings.len(), 1);
        assert_eq!(result.findings[0].flag, Flag::Critical);
    }

    #[tokio::test]
    async fn test_first_call_error_goes_to_fallback() {
        let gateway = Scripted::new(vec![None, Some("FINDING 1: Cookies\nTracking.\nFLAG: good")]);
        let result = AnalysisPipeline::new(gateway).extract("terms").await;
        assert_eq!(result.tier, ExtractionTier::LineFormat);
        assert_eq!(result.score, 100);
    }

    #[tokio::test]
    async fn test_all_calls_fail() {
        let gateway = Scripted::new(vec![None, None]);
        let result = AnalysisPipeline::new(gateway.clone()).extract("terms").await;

        assert_eq!(gateway.calls(), 2);
        assert_eq!(result.score, 50);
        assert!(!result.summary.is_empty());
        assert_eq!(result.findings.len(), 1);
        assert_eq!(result.findings[0].flag, Flag::Warning);
        assert_eq!(result.findings[0].category, Category::General);
        assert_eq!(result.tier, ExtractionTier::Degraded);
    }

    #[tokio::test]
    async fn test_rejected_count_reported() {
        let text = r#"{"summary":"S","findings":[{"title":"T","description":"D","flag":"good"},{"title":"x"}]}"#;
        let gateway = Scripted::new(vec![Some(text)]);
        let result = AnalysisPipeline::new(gateway).extract("terms").await;
        assert_eq!(result.findings.len(), 1);
        assert_eq!(result.rejected, 1);
    }

    #[tokio::test]
    async fn test_long_document_clipped_in_prompt() {
        let document = "a".repeat(50_000);
        let gateway = Scripted::new(vec![Some(VALID)]);
        let result = AnalysisPipeline::new(gateway.clone()).extract(&document).await;
        assert_eq!(result.score, 93);

        let prompts = gateway.prompts.lock().unwrap();
        let body = &prompts[0][1].content;
        assert!(body.contains(&"a".repeat(ANALYSIS_DOCUMENT_CHARS)));
        assert!(!body.contains(&"a".repeat(ANALYSIS_DOCUMENT_CHARS + 1)));
    }

    #[tokio::test]
    async fn test_empty_and_whitespace_documents() {
        for document in ["", "   \n\t  "] {
            let gateway = Scripted::new(vec![]);
            let result = AnalysisPipeline::new(gateway).extract(document).await;
            assert!(result.score <= 100);
            assert!(!result.summary.is_empty());
        }
    }
}
