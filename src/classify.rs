//! Executor log classification.
//!
//! The executor's log stream marks line meaning with a small set of marker
//! characters. Those markers are a versioned protocol detail shared with the
//! backend; changing them there requires a matching change here.

use serde::{Deserialize, Serialize};

const HEADER_MARKER: &str = "---";
const SUCCESS_MARKER: &str = "✅";
const ERROR_MARKER: &str = "❌";
const AI_MARKER: &str = "🤖";
// The emoji presentation sequence (U+26A0 U+FE0F), exactly as the executor
// emits it; a bare U+26A0 is not part of the protocol.
const WARN_MARKER: &str = "⚠️";
const PROGRESS_MARKER: &str = "⏳";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogCategory {
    Header,
    Success,
    Error,
    AiNote,
    Plain,
    /// Blank lines and progress/spinner lines: passed through without styling.
    Raw,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledLine {
    pub category: LogCategory,
    pub text: String,
}

impl StyledLine {
    pub fn new(category: LogCategory, text: impl Into<String>) -> Self {
        Self {
            category,
            text: text.into(),
        }
    }
}

/// Classify a raw multi-line log string into styled lines.
///
/// Total and deterministic: every line lands in exactly one category, no line
/// is dropped or reordered, and the empty string yields no lines. Header lines
/// have their hyphens stripped from the rendered text; every other category
/// preserves the line verbatim.
pub fn classify(raw: &str) -> Vec<StyledLine> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split('\n').map(classify_line).collect()
}

// Precedence order is part of the contract: first match wins.
fn classify_line(line: &str) -> StyledLine {
    if line.contains(HEADER_MARKER) {
        StyledLine::new(
            LogCategory::Header,
            line.chars().filter(|&c| c != '-').collect::<String>(),
        )
    } else if line.contains(SUCCESS_MARKER) {
        StyledLine::new(LogCategory::Success, line)
    } else if line.contains(ERROR_MARKER) {
        StyledLine::new(LogCategory::Error, line)
    } else if line.contains(AI_MARKER) || line.contains(WARN_MARKER) {
        StyledLine::new(LogCategory::AiNote, line)
    } else if !line.trim().is_empty() && !line.contains(PROGRESS_MARKER) {
        StyledLine::new(LogCategory::Plain, line)
    } else {
        StyledLine::new(LogCategory::Raw, line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories(raw: &str) -> Vec<LogCategory> {
        classify(raw).into_iter().map(|l| l.category).collect()
    }

    #[test]
    fn empty_input_yields_no_lines() {
        assert!(classify("").is_empty());
    }

    #[test]
    fn each_line_lands_in_exactly_one_category() {
        let raw = "--- step 1 ---\n✅ tapped login\n❌ element not found\n🤖 replanning\n⚠️ flaky selector\nplain progress note\n\n⏳ waiting";
        assert_eq!(
            categories(raw),
            vec![
                LogCategory::Header,
                LogCategory::Success,
                LogCategory::Error,
                LogCategory::AiNote,
                LogCategory::AiNote,
                LogCategory::Plain,
                LogCategory::Raw,
                LogCategory::Raw,
            ]
        );
    }

    #[test]
    fn header_wins_over_other_markers() {
        let lines = classify("--- ✅ ❌ 🤖 ---");
        assert_eq!(lines[0].category, LogCategory::Header);
        // Hyphens stripped, everything else preserved.
        assert_eq!(lines[0].text, " ✅ ❌ 🤖 ");
    }

    #[test]
    fn success_wins_over_error_and_ai() {
        assert_eq!(categories("✅ ❌ 🤖"), vec![LogCategory::Success]);
        assert_eq!(categories("❌ 🤖"), vec![LogCategory::Error]);
    }

    #[test]
    fn warning_marker_requires_the_exact_emoji_sequence() {
        // U+26A0 U+FE0F is the marker; a bare U+26A0 is ordinary text.
        assert_eq!(categories("⚠️ flaky selector"), vec![LogCategory::AiNote]);
        assert_eq!(categories("\u{26a0} bare sign"), vec![LogCategory::Plain]);
    }

    #[test]
    fn spinner_and_blank_lines_pass_through_raw() {
        let lines = classify("⏳ Mode: DYNAMIC AI 🧠\n   \n");
        assert_eq!(lines[0].category, LogCategory::Raw);
        assert_eq!(lines[0].text, "⏳ Mode: DYNAMIC AI 🧠");
        assert_eq!(lines[1].category, LogCategory::Raw);
        assert_eq!(lines[2].category, LogCategory::Raw);
        assert_eq!(lines[2].text, "");
    }

    #[test]
    fn non_marker_text_preserved_verbatim() {
        let raw = "✅ done\nsome plain line\n❌ fail";
        let joined = classify(raw)
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(joined, raw);
    }

    #[test]
    fn round_trip_reproduces_input_modulo_header_stripping() {
        let raw = "--- LOG (P1) ---\n✅ ok\n\n⏳ tick\nfinal";
        let lines = classify(raw);
        assert_eq!(lines.len(), raw.split('\n').count());
        for (line, original) in lines.iter().zip(raw.split('\n')) {
            if line.category == LogCategory::Header {
                let stripped: String = original.chars().filter(|&c| c != '-').collect();
                assert_eq!(line.text, stripped);
            } else {
                assert_eq!(line.text, original);
            }
        }
    }
}
