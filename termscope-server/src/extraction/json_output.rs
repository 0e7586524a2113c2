//! Structured tier: JSON parsing, markdown unwrapping and shape validation

use serde_json::{Map, Value};
use termscope_common::{Category, Finding, Flag};

const FENCE: &str = "```";

/// Findings accepted from a valid JSON response
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredOutput {
    pub summary: Option<String>,
    pub findings: Vec<Finding>,
    /// Candidates dropped by shape validation
    pub rejected: usize,
}

/// Parse and validate a structured-tier response.
///
/// Returns `None` when neither the raw text nor its markdown-unwrapped object
/// parses as JSON, or when the parsed value has no usable `findings` list.
pub fn parse_structured(response: &str) -> Option<StructuredOutput> {
    let value = parse_json(response)?;
    validate(&value)
}

/// Direct parse first, then the markdown-unwrap retry
fn parse_json(response: &str) -> Option<Value> {
    let trimmed = response.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Some(value);
    }

    if !trimmed.contains(FENCE) {
        return None;
    }

    let candidate = unwrap_markdown(trimmed)?;
    tracing::debug!(chars = candidate.len(), "Retrying parse on unwrapped JSON object");
    serde_json::from_str(candidate).ok()
}

/// Locate the JSON object inside markdown-wrapped text.
///
/// Prefers an object inside a fenced block; otherwise the first top-level
/// brace-matched object anywhere in the text.
pub(crate) fn unwrap_markdown(text: &str) -> Option<&str> {
    fenced_blocks(text)
        .find_map(first_object)
        .or_else(|| first_object(text))
}

/// Bodies of complete fenced blocks, with the info string (e.g. `json`) removed
fn fenced_blocks(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        let open = rest.find(FENCE)?;
        let after_open = &rest[open + FENCE.len()..];
        let body_start = after_open.find('\n').map(|i| i + 1).unwrap_or(0);
        let body = &after_open[body_start..];
        let close = body.find(FENCE)?;
        rest = &body[close + FENCE.len()..];
        Some(&body[..close])
    })
}

/// First balanced `{...}` span, ignoring braces inside JSON strings
pub(crate) fn first_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut depth: usize = 0;
    let mut in_string = false;
    let mut escaped = false;
    let mut start_idx: Option<usize> = None;

    for (idx, &byte) in bytes.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }
        match byte {
            b'"' if start_idx.is_some() => in_string = true,
            b'{' => {
                if depth == 0 {
                    start_idx = Some(idx);
                }
                depth += 1;
            }
            b'}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    let start = start_idx?;
                    return Some(&text[start..=idx]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Accept only an object with a `findings` array; keep well-shaped findings
fn validate(value: &Value) -> Option<StructuredOutput> {
    let object = value.as_object()?;
    let candidates = object.get("findings")?.as_array()?;

    let mut findings = Vec::with_capacity(candidates.len());
    let mut rejected = 0;
    for candidate in candidates {
        match finding_from_value(candidate) {
            Some(finding) => findings.push(finding),
            None => rejected += 1,
        }
    }

    if rejected > 0 {
        tracing::debug!(rejected, kept = findings.len(), "Dropped malformed findings");
    }

    let summary = object
        .get("summary")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Some(StructuredOutput {
        summary,
        findings,
        rejected,
    })
}

fn finding_from_value(value: &Value) -> Option<Finding> {
    let object = value.as_object()?;
    let title = string_field(object, "title")?;
    let description =
        string_field(object, "description").or_else(|| string_field(object, "analysis"))?;
    let flag = Flag::from_label(string_field(object, "flag")?);
    let category = string_field(object, "category")
        .map(Category::from_label)
        .unwrap_or_default();

    Some(Finding::new(title, description, flag, category))
}

fn string_field<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    object.get(key).and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{"summary":"S","findings":[{"title":"T","description":"D","flag":"warning","category":"privacy"}]}"#;

    #[test]
    fn test_direct_parse() {
        let output = parse_structured(VALID).unwrap();
        assert_eq!(output.summary.as_deref(), Some("S"));
        assert_eq!(
            output.findings,
            vec![Finding::new("T", "D", Flag::Warning, Category::Privacy)]
        );
        assert_eq!(output.rejected, 0);
    }

    #[test]
    fn test_fenced_with_leading_prose() {
        let wrapped = format!("Here is the analysis you asked for:\n```json\n{VALID}\n```\nLet me know!");
        assert_eq!(parse_structured(&wrapped), parse_structured(VALID));
    }

    #[test]
    fn test_fence_without_object_falls_back_to_brace_scan() {
        let text = format!("```\nnot json\n```\nActually: {VALID} done");
        assert_eq!(parse_structured(&text).unwrap().findings.len(), 1);
    }

    #[test]
    fn test_unfenced_prose_is_not_unwrapped() {
        let text = format!("Sure! {VALID}");
        assert!(parse_structured(&text).is_none());
    }

    #[test]
    fn test_first_object_respects_strings() {
        let text = r#"prefix {"a":"}{","b":{"c":1}} suffix {"z":2}"#;
        assert_eq!(first_object(text), Some(r#"{"a":"}{","b":{"c":1}}"#));
    }

    #[test]
    fn test_first_object_unbalanced() {
        assert_eq!(first_object(r#"{"a": {"b": 1}"#), None);
        assert_eq!(first_object("no braces"), None);
    }

    #[test]
    fn test_missing_findings_key_rejected() {
        assert!(parse_structured(r#"{"summary":"S"}"#).is_none());
        assert!(parse_structured(r#"[{"title":"T"}]"#).is_none());
        assert!(parse_structured(r#"{"findings":"none"}"#).is_none());
    }

    #[test]
    fn test_malformed_findings_dropped_and_counted() {
        let text = r#"{"summary":"S","findings":[
            {"title":"T1","description":"D1","flag":"critical"},
            {"title":"T2","flag":"warning"},
            "just a string",
            {"title":"T3","analysis":"D3","flag":"Good","category":"Payment"}
        ]}"#;
        let output = parse_structured(text).unwrap();
        assert_eq!(output.rejected, 2);
        assert_eq!(
            output.findings,
            vec![
                Finding::new("T1", "D1", Flag::Critical, Category::General),
                Finding::new("T3", "D3", Flag::Good, Category::Payment),
            ]
        );
    }

    #[test]
    fn test_blank_summary_is_none() {
        let output = parse_structured(r#"{"summary":"  ","findings":[]}"#).unwrap();
        assert!(output.summary.is_none());
        assert!(output.findings.is_empty());
    }
}
