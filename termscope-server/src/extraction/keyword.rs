//! Last-resort keyword sniffing over free-form fallback prose

use termscope_common::{Category, Finding, Flag};

use super::block_parser::{tokenize_line, LineToken};

/// Lines this short or shorter carry no meaningful content
const MIN_LINE_CHARS: usize = 20;
const TITLE_CHARS: usize = 50;

const CRITICAL_WORDS: &[&str] = &["critical", "serious", "concerning", "dangerous"];
const GOOD_WORDS: &[&str] = &["good", "positive", "clear", "transparent", "protects"];

fn sniff_flag(line: &str) -> Flag {
    let lower = line.to_lowercase();
    if CRITICAL_WORDS.iter().any(|w| lower.contains(w)) {
        Flag::Critical
    } else if GOOD_WORDS.iter().any(|w| lower.contains(w)) {
        Flag::Good
    } else {
        Flag::Warning
    }
}

fn title_for(line: &str) -> String {
    if line.chars().count() > TITLE_CHARS {
        let cut: String = line.chars().take(TITLE_CHARS).collect();
        format!("{cut}...")
    } else {
        line.to_string()
    }
}

/// One finding per meaningful line, flagged by keyword
pub fn sniff_findings(text: &str) -> Vec<Finding> {
    text.lines()
        .map(str::trim)
        .filter(|line| !matches!(tokenize_line(line), LineToken::Summary(_) | LineToken::Blank))
        .filter(|line| line.chars().count() > MIN_LINE_CHARS)
        .map(|line| Finding::new(title_for(line), line, sniff_flag(line), Category::General))
        .collect()
}
