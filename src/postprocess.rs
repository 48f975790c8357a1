//! Post-processing: deterministic cleanup of model-transcribed text.
//!
//! Even with a strict prompt, vision models sometimes wrap the transcript in
//! code fences, emit Windows line endings, or leave zero-width characters
//! behind. These rules fix that without touching the words themselves.
//!
//! Rules run in order: fences are stripped before line endings are
//! normalised, and the final trim happens last so earlier rules can rely on
//! the original line structure.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to a raw transcript.
///
/// 1. Strip outer code fences (```` ``` ```` / ```` ```text ````)
/// 2. Normalise line endings (CRLF / CR → LF)
/// 3. Trim trailing whitespace per line
/// 4. Collapse 3+ consecutive blank lines down to 2
/// 5. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens)
/// 6. Trim leading/trailing blank lines
pub fn clean_transcript(input: &str) -> String {
    let s = strip_outer_fences(input);
    let s = normalise_line_endings(&s);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    let s = remove_invisible_chars(&s);
    s.trim_matches('\n').to_string()
}

// ── Rule 1: Strip outer fences ───────────────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^```(?:text|plaintext|markdown|md)?\r?\n(.*?)\r?\n```\s*$").unwrap()
});

fn strip_outer_fences(input: &str) -> String {
    match RE_OUTER_FENCES.captures(input.trim()) {
        Some(caps) => caps[1].to_string(),
        None => input.to_string(),
    }
}

// ── Rule 2: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 3: Trim trailing whitespace per line ────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 4: Collapse excessive blank lines ───────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{4,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n\n").to_string()
}

// ── Rule 5: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_plain_fence() {
        assert_eq!(strip_outer_fences("```\nHello\nWorld\n```"), "Hello\nWorld");
    }

    #[test]
    fn strip_text_fence() {
        assert_eq!(strip_outer_fences("```text\nHello\n```\n"), "Hello");
    }

    #[test]
    fn inner_fences_untouched() {
        let input = "Intro\n```\ncode\n```\nOutro";
        assert_eq!(strip_outer_fences(input), input);
    }

    #[test]
    fn test_normalise_line_endings() {
        assert_eq!(normalise_line_endings("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn test_collapse_blank_lines() {
        assert_eq!(collapse_blank_lines("a\n\n\n\n\n\nb"), "a\n\n\nb");
    }

    #[test]
    fn test_remove_invisible() {
        let input = "hello\u{200B}world\u{FEFF}foo\u{00AD}bar";
        assert_eq!(remove_invisible_chars(input), "helloworldfoobar");
    }

    #[test]
    fn full_pipeline() {
        let input = "```\r\nHello World   \r\n\r\n\r\n\r\n\r\nBye\u{200B}\r\n```";
        assert_eq!(clean_transcript(input), "Hello World\n\n\nBye");
    }

    #[test]
    fn plain_text_is_preserved() {
        assert_eq!(clean_transcript("Hello World"), "Hello World");
        assert_eq!(clean_transcript("  indented\nline"), "  indented\nline");
    }

    #[test]
    fn empty_stays_empty() {
        assert_eq!(clean_transcript(""), "");
        assert_eq!(clean_transcript("\n\n"), "");
    }
}
