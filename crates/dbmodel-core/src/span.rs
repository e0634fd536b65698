//! Source tokens carried by model entities for error attribution.

use serde::{Deserialize, Serialize};

/// A byte range in the DSL source that an entity was declared at.
///
/// Parsers attach one of these to every raw record as `token`. Records built
/// without a source (tests, auto-created schemas and tags) carry the empty
/// span at offset zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset.
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

impl Span {
    /// Create a new span.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Get the length of the span.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if the span is empty.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Render the location of the span and the source line it starts on,
    /// underlined from the start column to the end of the span or line.
    pub fn snippet(&self, source: &str) -> String {
        let (line, col) = offset_to_line_col(source, self.start);
        let location = format!("  --> line {}:{}\n", line, col);
        let Some(text) = source.lines().nth(line - 1) else {
            return location;
        };

        let room = (text.chars().count() + 1).saturating_sub(col).max(1);
        let width = self.len().clamp(1, room);
        format!(
            "{location}   |\n{line:3}| {text}\n   |{pad}^{tail}\n",
            pad = " ".repeat(col),
            tail = "~".repeat(width - 1),
        )
    }
}

impl From<std::ops::Range<usize>> for Span {
    fn from(range: std::ops::Range<usize>) -> Self {
        Span {
            start: range.start,
            end: range.end,
        }
    }
}

/// Convert byte offset to 1-based line/column.
pub fn offset_to_line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;

    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }

        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }

    (line, col)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_to_line_col() {
        let source = "Table users {\n  id int\n}";

        assert_eq!(offset_to_line_col(source, 0), (1, 1));
        assert_eq!(offset_to_line_col(source, 6), (1, 7));
        assert_eq!(offset_to_line_col(source, 14), (2, 1));
        assert_eq!(offset_to_line_col(source, 16), (2, 3));
    }

    #[test]
    fn test_snippet_underlines_within_line() {
        let source = "Table users {\n  id int\n}";

        let snippet = Span::new(16, 18).snippet(source);
        assert_eq!(snippet, "  --> line 2:3\n   |\n  2|   id int\n   |   ^~\n");

        let snippet = Span::new(16, 40).snippet(source);
        assert!(snippet.ends_with("   |   ^~~~~~\n"));

        assert_eq!(Span::new(0, 0).snippet(""), "  --> line 1:1\n");
    }

    #[test]
    fn test_span_deserializes_from_token() {
        let span: Span = serde_json::from_str(r#"{"start": 4, "end": 9}"#).unwrap();
        assert_eq!(span, Span::new(4, 9));
        assert_eq!(span.len(), 5);
        assert!(!span.is_empty());
        assert!(Span::default().is_empty());
    }
}
