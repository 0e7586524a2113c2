//! Fallback tier: tokenizer and state machine for labeled finding blocks
//!
//! Grammar (one token per line, labels case-insensitive):
//!
//! ```text
//! document  := (summary | text | blank)* block*
//! block     := FINDING [n] [:|-|.] title? NL (text | flag | category | summary | blank)*
//! summary   := SUMMARY: text
//! flag      := FLAG: text
//! category  := CATEGORY: text
//! ```
//!
//! A block ends at the next `FINDING` line or end of input. Text lines before
//! the `FLAG` line form the description; text after it is ignored.

use termscope_common::{Category, Finding, Flag};

/// One classified input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineToken<'a> {
    Summary(&'a str),
    Finding(&'a str),
    Flag(&'a str),
    Category(&'a str),
    Text(&'a str),
    Blank,
}

/// Classify one line. Leading list bullets, `1.`/`2)` list numbers, headings
/// and `**`/`__` emphasis around a label are tolerated.
pub(crate) fn tokenize_line(line: &str) -> LineToken<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineToken::Blank;
    }

    let bare = strip_decoration(trimmed);
    if let Some(rest) = strip_label(bare, "SUMMARY") {
        if let Some(value) = after_colon(rest) {
            return LineToken::Summary(value);
        }
    }
    if let Some(rest) = strip_label(bare, "FINDING") {
        if let Some(title) = finding_title(rest) {
            return LineToken::Finding(title);
        }
    }
    if let Some(rest) = strip_label(bare, "FLAG") {
        if let Some(value) = after_colon(rest) {
            return LineToken::Flag(value);
        }
    }
    if let Some(rest) = strip_label(bare, "CATEGORY") {
        if let Some(value) = after_colon(rest) {
            return LineToken::Category(value);
        }
    }

    LineToken::Text(trimmed)
}

fn strip_decoration(line: &str) -> &str {
    let line = strip_bullets(line);
    strip_bullets(strip_list_number(line).unwrap_or(line))
}

fn strip_bullets(line: &str) -> &str {
    line.trim_start_matches(|c: char| matches!(c, '-' | '*' | '#' | '_' | '>') || c.is_whitespace())
}

/// `12. rest` or `3) rest` -> `rest`
fn strip_list_number(line: &str) -> Option<&str> {
    let rest = line.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() == line.len() {
        return None;
    }
    rest.strip_prefix(['.', ')'])
}

/// Case-insensitive label prefix match
fn strip_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let head = line.get(..label.len())?;
    if head.eq_ignore_ascii_case(label) {
        Some(&line[label.len()..])
    } else {
        None
    }
}

/// `": value"` after a label, with emphasis markers removed
fn after_colon(rest: &str) -> Option<&str> {
    let rest = trim_emphasis(rest.trim_start());
    let value = rest.strip_prefix(':')?;
    Some(trim_emphasis(value.trim()))
}

/// Title after `FINDING`: optional number, optional `:`/`-`/`.` separator.
/// `None` when the word continues (e.g. `Findings show ...`).
fn finding_title(rest: &str) -> Option<&str> {
    let continues_word = rest
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic());
    if continues_word {
        return None;
    }

    let rest = trim_emphasis(rest.trim_start_matches(|c: char| c.is_ascii_digit() || c.is_whitespace()));
    let rest = rest
        .strip_prefix([':', '-', '.', ')'])
        .unwrap_or(rest);
    Some(trim_emphasis(rest.trim()))
}

fn trim_emphasis(s: &str) -> &str {
    s.trim_matches(|c: char| c == '*' || c == '_').trim()
}

/// Fallback flag mapping: `critical`, `good`, otherwise `warning`
fn line_format_flag(value: &str) -> Flag {
    let lower = value.to_ascii_lowercase();
    if lower.contains("critical") {
        Flag::Critical
    } else if lower.contains("good") {
        Flag::Good
    } else {
        Flag::Warning
    }
}

/// Result of scanning a line-format response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineFormatOutput {
    pub summary: Option<String>,
    pub findings: Vec<Finding>,
}

#[derive(Debug, Default)]
struct OpenBlock {
    title: String,
    description: Vec<String>,
    flag: Option<Flag>,
    category: Option<Category>,
}

impl OpenBlock {
    fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Self::default()
        }
    }

    /// Close the block. A title-less block takes its first description line
    /// as the title; an empty block yields nothing.
    fn finish(mut self) -> Option<Finding> {
        if self.title.is_empty() {
            if self.description.is_empty() {
                return None;
            }
            self.title = self.description.remove(0);
        }
        let description = if self.description.is_empty() {
            self.title.clone()
        } else {
            self.description.join(" ")
        };
        Some(Finding::new(
            self.title,
            description,
            self.flag.unwrap_or(Flag::Warning),
            self.category.unwrap_or_default(),
        ))
    }
}

enum State {
    Preamble,
    InBlock(OpenBlock),
}

/// Scan labeled finding blocks out of a fallback response
pub fn parse_line_format(text: &str) -> LineFormatOutput {
    let mut output = LineFormatOutput::default();
    let mut state = State::Preamble;

    for line in text.lines() {
        let token = tokenize_line(line);

        if let LineToken::Summary(value) = token {
            if output.summary.is_none() && !value.is_empty() {
                output.summary = Some(value.to_string());
            }
            continue;
        }

        state = match (state, token) {
            (State::Preamble, LineToken::Finding(title)) => State::InBlock(OpenBlock::new(title)),
            (State::Preamble, _) => State::Preamble,
            (State::InBlock(block), LineToken::Finding(title)) => {
                output.findings.extend(block.finish());
                State::InBlock(OpenBlock::new(title))
            }
            (State::InBlock(mut block), LineToken::Flag(value)) => {
                block.flag = Some(line_format_flag(value));
                State::InBlock(block)
            }
            (State::InBlock(mut block), LineToken::Category(value)) => {
                block.category = Some(Category::from_label(value));
                State::InBlock(block)
            }
            (State::InBlock(mut block), LineToken::Text(text)) => {
                if block.flag.is_none() {
                    block.description.push(text.to_string());
                }
                State::InBlock(block)
            }
            (in_block, _) => in_block,
        };
    }

    if let State::InBlock(block) = state {
        output.findings.extend(block.finish());
    }

    output
}
