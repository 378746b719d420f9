//! Append-only transcript view model.
//!
//! Two insertion paths with an explicit trust boundary: `append` stores text
//! verbatim as a single entry and is the only path for strings whose content
//! the core did not classify itself (user-adjacent text, error messages);
//! `append_classified` accepts classifier output only. Neither path ever
//! interprets its input as markup.

use crate::classify::{LogCategory, StyledLine};

#[derive(Debug)]
pub struct Transcript {
    entries: Vec<StyledLine>,
    follow: bool,
    offset: usize,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcript {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            follow: true,
            offset: 0,
        }
    }

    /// Escaping text path: one verbatim entry with an explicit style.
    pub fn append(&mut self, text: impl Into<String>, category: LogCategory) {
        self.entries.push(StyledLine::new(category, text));
        self.follow = true;
    }

    /// Markup path: extend with pre-classified lines.
    pub fn append_classified(&mut self, lines: Vec<StyledLine>) {
        self.entries.extend(lines);
        self.follow = true;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.follow = true;
        self.offset = 0;
    }

    pub fn entries(&self) -> &[StyledLine] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flatten entries into display lines (verbatim entries may span lines).
    pub fn display_lines(&self) -> Vec<(LogCategory, &str)> {
        self.entries
            .iter()
            .flat_map(|e| e.text.split('\n').map(move |t| (e.category, t)))
            .collect()
    }

    /// Whole transcript as plain text, for the headless mode and clipboard copy.
    pub fn plain_text(&self) -> String {
        self.entries
            .iter()
            .map(|e| e.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn follows_tail(&self) -> bool {
        self.follow
    }

    /// Index of the first visible display line for the given geometry.
    pub fn top_offset(&self, total: usize, viewport: usize) -> usize {
        let max = total.saturating_sub(viewport);
        if self.follow {
            max
        } else {
            self.offset.min(max)
        }
    }

    pub fn scroll_up(&mut self, lines: usize, total: usize, viewport: usize) {
        let top = self.top_offset(total, viewport);
        self.follow = false;
        self.offset = top.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: usize, total: usize, viewport: usize) {
        let max = total.saturating_sub(viewport);
        let top = self.top_offset(total, viewport) + lines;
        if top >= max {
            // Back at the bottom: re-engage auto-scroll.
            self.follow = true;
            self.offset = max;
        } else {
            self.offset = top;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_stores_text_verbatim_as_single_entry() {
        let mut t = Transcript::new();
        t.append("<div>not markup</div>\nsecond line", LogCategory::Error);
        assert_eq!(t.entries().len(), 1);
        assert_eq!(t.entries()[0].text, "<div>not markup</div>\nsecond line");
        assert_eq!(t.entries()[0].category, LogCategory::Error);
        // The verbatim entry still renders as two display lines.
        assert_eq!(t.display_lines().len(), 2);
    }

    #[test]
    fn append_classified_preserves_order() {
        let mut t = Transcript::new();
        t.append_classified(vec![
            StyledLine::new(LogCategory::Header, " LOG "),
            StyledLine::new(LogCategory::Success, "✅ done"),
        ]);
        t.append("All good", LogCategory::Plain);
        let texts: Vec<_> = t.entries().iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec![" LOG ", "✅ done", "All good"]);
    }

    #[test]
    fn clear_removes_everything() {
        let mut t = Transcript::new();
        t.append("x", LogCategory::Plain);
        t.clear();
        assert!(t.is_empty());
        assert!(t.follows_tail());
    }

    #[test]
    fn appending_reengages_auto_scroll() {
        let mut t = Transcript::new();
        for i in 0..20 {
            t.append(format!("line {i}"), LogCategory::Plain);
        }
        t.scroll_up(5, 20, 10);
        assert!(!t.follows_tail());
        assert_eq!(t.top_offset(20, 10), 5);
        t.append("new", LogCategory::Plain);
        assert!(t.follows_tail());
        assert_eq!(t.top_offset(21, 10), 11);
    }

    #[test]
    fn scroll_down_to_bottom_resumes_follow() {
        let mut t = Transcript::new();
        for i in 0..20 {
            t.append(format!("line {i}"), LogCategory::Plain);
        }
        t.scroll_up(100, 20, 10);
        assert_eq!(t.top_offset(20, 10), 0);
        t.scroll_down(100, 20, 10);
        assert!(t.follows_tail());
    }
}
