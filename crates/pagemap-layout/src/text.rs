//! Label text sizing, truncation, and wrapping.

/// Label of a page without a title.
pub const UNTITLED_PAGE: &str = "Untitled";

/// Label of a section without a heading.
pub const UNTITLED_SECTION: &str = "Untitled Content";

const ELLIPSIS: &str = "...";

/// Fixed-advance text metric.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextMetrics {
    /// Advance of one character.
    pub char_width: f64,
    /// Height of one line.
    pub line_height: f64,
}

impl TextMetrics {
    /// Width of a single line.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // label lengths are far below 2^52
    pub fn width(&self, text: &str) -> f64 {
        text.chars().count() as f64 * self.char_width
    }

    /// Width of the widest line.
    #[must_use]
    pub fn max_width<'a>(&self, lines: impl IntoIterator<Item = &'a str>) -> f64 {
        lines
            .into_iter()
            .map(|line| self.width(line))
            .fold(0.0, f64::max)
    }

    /// Height of `lines` lines.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn height(&self, lines: usize) -> f64 {
        lines as f64 * self.line_height
    }
}

/// Cut `text` to `max_chars` characters, marking the cut with `...`.
#[must_use]
pub fn truncate(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }
    let kept: String = text.chars().take(max_chars).collect();
    format!("{}{ELLIPSIS}", kept.trim_end())
}

/// Greedy word wrap into at most `max_lines` lines of `max_chars` characters.
///
/// Whitespace is collapsed. Words longer than a line are split. When text
/// remains after the last line, that line ends with `...`.
#[must_use]
pub fn wrap(text: &str, max_chars: usize, max_lines: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace().flat_map(|word| split_long(word, max_chars)) {
        let word_len = word.chars().count();
        if line_len > 0 && line_len + 1 + word_len > max_chars {
            lines.push(std::mem::take(&mut line));
            line_len = 0;
            if lines.len() > max_lines {
                break;
            }
        }
        if line_len > 0 {
            line.push(' ');
            line_len += 1;
        }
        line.push_str(&word);
        line_len += word_len;
    }
    if line_len > 0 {
        lines.push(line);
    }

    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            last.push_str(ELLIPSIS);
        }
    }
    lines
}

fn split_long(word: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    chars
        .chunks(max_chars)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Display label of a page title.
pub(crate) fn page_label(title: &str, max_chars: usize) -> String {
    if title.trim().is_empty() {
        return UNTITLED_PAGE.to_owned();
    }
    truncate(title, max_chars)
}

/// Display label of a section heading.
pub(crate) fn section_label(heading: &str, max_chars: usize) -> String {
    if heading.trim().is_empty() {
        return UNTITLED_SECTION.to_owned();
    }
    truncate(heading, max_chars)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_truncate_short_text_unchanged() {
        assert_eq!(truncate("  Overview ", 30), "Overview");
    }

    #[test]
    fn test_truncate_long_text() {
        let title = "Architecture Decision Records for the Platform";

        assert_eq!(truncate(title, 30), "Architecture Decision Records...");
    }

    #[test]
    fn test_labels_fall_back_for_empty_text() {
        assert_eq!(page_label("", 30), "Untitled");
        assert_eq!(section_label("  ", 30), "Untitled Content");
    }

    #[test]
    fn test_wrap_fills_lines_greedily() {
        assert_eq!(
            wrap("the quick brown fox jumps", 10, 5),
            vec!["the quick", "brown fox", "jumps"]
        );
    }

    #[test]
    fn test_wrap_marks_remaining_text() {
        assert_eq!(
            wrap("one two three four five six", 9, 2),
            vec!["one two", "three..."]
        );
    }

    #[test]
    fn test_wrap_splits_long_words() {
        assert_eq!(wrap("abcdefghij", 4, 5), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_wrap_zero_lines() {
        assert!(wrap("text", 10, 0).is_empty());
        assert!(wrap("", 10, 2).is_empty());
    }

    #[test]
    fn test_metrics() {
        let metrics = TextMetrics {
            char_width: 7.0,
            line_height: 16.0,
        };

        assert_eq!(metrics.width("abc"), 21.0);
        assert_eq!(metrics.max_width(["a", "abcd", "ab"]), 28.0);
        assert_eq!(metrics.height(3), 48.0);
    }
}
