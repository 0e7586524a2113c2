//! Character-boundary-safe text clipping

/// Return at most `max_chars` leading characters of `text` and whether
/// anything was cut off. Never splits a UTF-8 character.
pub fn clip_chars(text: &str, max_chars: usize) -> (&str, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => (&text[..byte_idx], true),
        None => (text, false),
    }
}

/// Like [`clip_chars`], appending `...` when the text was clipped
pub fn clip_with_marker(text: &str, max_chars: usize) -> String {
    let (clipped, truncated) = clip_chars(text, max_chars);
    if truncated {
        format!("{clipped}...")
    } else {
        clipped.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_untouched() {
        assert_eq!(clip_chars("abc", 10), ("abc", false));
        assert_eq!(clip_chars("", 10), ("", false));
        assert_eq!(clip_chars("abc", 3), ("abc", false));
    }

    #[test]
    fn test_long_text_clipped() {
        assert_eq!(clip_chars("abcdef", 4), ("abcd", true));
    }

    #[test]
    fn test_multibyte_boundary() {
        let text = "é".repeat(10);
        let (clipped, truncated) = clip_chars(&text, 3);
        assert_eq!(clipped, "ééé");
        assert!(truncated);
    }

    #[test]
    fn test_marker_only_when_clipped() {
        assert_eq!(clip_with_marker("abcdef", 3), "abc...");
        assert_eq!(clip_with_marker("abc", 3), "abc");
    }
}
