//! Domain types shared between the analysis and chatbot workflows
//!
//! Findings and analysis results are produced fresh per request and never
//! persisted. Turns make up the bounded per-session conversation history.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity attached to a single finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flag {
    Critical,
    Warning,
    Good,
    Info,
}

impl Flag {
    /// Parse a model-supplied flag label.
    ///
    /// Matching is case-insensitive after trimming. Labels that are not one of
    /// the four known flags map to `Info`, which carries no scoring weight.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "critical" => Flag::Critical,
            "warning" => Flag::Warning,
            "good" => Flag::Good,
            _ => Flag::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Flag::Critical => "critical",
            Flag::Warning => "warning",
            Flag::Good => "good",
            Flag::Info => "info",
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Topic a finding belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Privacy,
    Payment,
    Security,
    Liability,
    Usage,
    Legal,
    #[default]
    General,
}

impl Category {
    /// Parse a model-supplied category label, falling back to `General`
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "privacy" => Category::Privacy,
            "payment" => Category::Payment,
            "security" => Category::Security,
            "liability" => Category::Liability,
            "usage" => Category::Usage,
            "legal" => Category::Legal,
            _ => Category::General,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Privacy => "privacy",
            Category::Payment => "payment",
            Category::Security => "security",
            Category::Liability => "liability",
            Category::Usage => "usage",
            Category::Legal => "legal",
            Category::General => "general",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One flagged observation about a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub title: String,
    pub description: String,
    pub flag: Flag,
    #[serde(default)]
    pub category: Category,
}

impl Finding {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        flag: Flag,
        category: Category,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            flag,
            category,
        }
    }
}

/// Which extraction tier produced an analysis result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionTier {
    /// JSON output from the structured prompt (direct or markdown-unwrapped)
    Structured,
    /// Labeled `FINDING`/`FLAG`/`CATEGORY` blocks from the fallback prompt
    LineFormat,
    /// Keyword sniffing over fallback prose
    Keyword,
    /// Static result after every gateway call failed
    Degraded,
}

/// Scored analysis of one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Risk score, always within 0..=100
    pub score: u8,
    pub summary: String,
    pub findings: Vec<Finding>,
    /// Candidate findings dropped by shape validation
    pub rejected: usize,
    pub tier: ExtractionTier,
}

/// Speaker of a stored conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in a conversation session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}
