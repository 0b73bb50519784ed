use std::fmt;

/// A 1-based line and column. Columns count bytes, not characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineCol {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Byte offsets of the line starts of one source text.
///
/// Only the offsets are kept, so an index can outlive the text it was built from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineIndex {
    starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();

        Self {
            starts,
            len: text.len(),
        }
    }

    /// Number of lines, counting a trailing empty line after a final newline.
    pub fn lines(&self) -> usize {
        self.starts.len()
    }

    /// Length in bytes of the indexed text.
    pub fn text_len(&self) -> usize {
        self.len
    }

    /// Position of `offset`. Offsets past the end are clamped to the end.
    pub fn line_col(&self, offset: usize) -> LineCol {
        let offset = offset.min(self.len);
        let line = match self.starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };

        LineCol {
            line: line + 1,
            column: offset - self.starts[line] + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_line() {
        let index = LineIndex::new("class Foo {}");
        assert_eq!(index.line_col(0), LineCol { line: 1, column: 1 });
        assert_eq!(index.line_col(6), LineCol { line: 1, column: 7 });
    }

    #[test]
    fn later_lines() {
        let index = LineIndex::new("a\nbc\n\nd");
        assert_eq!(index.lines(), 4);
        assert_eq!(index.line_col(2), LineCol { line: 2, column: 1 });
        assert_eq!(index.line_col(3), LineCol { line: 2, column: 2 });
        // the newline itself belongs to the line it ends
        assert_eq!(index.line_col(4), LineCol { line: 2, column: 3 });
        assert_eq!(index.line_col(5), LineCol { line: 3, column: 1 });
        assert_eq!(index.line_col(6), LineCol { line: 4, column: 1 });
    }

    #[test]
    fn clamps_past_end() {
        let index = LineIndex::new("ab\n");
        assert_eq!(index.line_col(100), LineCol { line: 2, column: 1 });
    }

    #[test]
    fn empty_text() {
        let index = LineIndex::new("");
        assert_eq!(index.lines(), 1);
        assert_eq!(index.line_col(0).to_string(), "1:1");
    }
}
