//! Small text helpers shared by the answering stages.

/// Cut `text` to `max_chars` characters, marking the cut with `" ..."`.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars).collect();
    format!("{} ...", head.trim_end())
}

/// Replace newlines with spaces.
pub fn flatten_newlines(text: &str) -> String {
    text.replace('\n', " ")
}

/// Remove bracketed spans like `[doc:chunk]`.
///
/// An unterminated `[` is kept along with the rest of the text.
pub fn strip_citations(answer: &str) -> String {
    let mut out = String::with_capacity(answer.len());
    let mut rest = answer;
    while let Some(open) = rest.find('[') {
        out.push_str(&rest[..open]);
        match rest[open + 1..].find(']') {
            Some(close) => rest = &rest[open + 1 + close + 1..],
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out.trim().to_string()
}

/// Count whitespace-delimited words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("exactly10!", 10), "exactly10!");
        assert_eq!(truncate_text("hello world again", 6), "hello ...");
    }

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(truncate_text("ééééé", 3), "ééé ...");
    }

    #[test]
    fn test_strip_citations() {
        assert_eq!(strip_citations("An answer [doc1:c0001]."), "An answer .");
        assert_eq!(strip_citations("[a:b] [c:d]"), "");
        assert_eq!(strip_citations("keep [unterminated"), "keep [unterminated");
        assert_eq!(strip_citations("x [a] y [b"), "x  y [b");
        assert_eq!(strip_citations("  no markers  "), "no markers");
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("  one\ttwo\nthree "), 3);
    }
}
