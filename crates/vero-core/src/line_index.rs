//! Mapping from byte offsets to line and column numbers.
//!
//! Diagnostics carry byte-range [`Span`](crate::Span)s; user-facing
//! output wants 1-based line/column pairs. [`LineIndex`] precomputes the
//! line-start table for a source text so lookups are a binary search.

/// A 1-based line/column position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCol {
    pub line: usize,
    pub column: usize,
}

/// Precomputed line-start offsets for one source text.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset of the first character of each line.
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    /// Build the index for a source text.
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (offset, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(offset + 1);
            }
        }
        Self {
            line_starts,
            len: source.len(),
        }
    }

    /// Number of lines in the source (at least 1, even for empty input).
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Convert a byte offset to a 1-based line/column pair.
    ///
    /// Offsets past the end of the source clamp to the final position.
    /// Columns count bytes from the line start; multi-byte characters
    /// occupy multiple columns, matching how editors expose offsets.
    pub fn line_col(&self, offset: usize) -> LineCol {
        let offset = offset.min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        LineCol {
            line: line + 1,
            column: offset - self.line_starts[line] + 1,
        }
    }

    /// Byte offset of the start of a 1-based line, if it exists.
    pub fn line_start(&self, line: usize) -> Option<usize> {
        if line == 0 {
            return None;
        }
        self.line_starts.get(line - 1).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_source() {
        let index = LineIndex::new("");
        assert_eq!(index.line_count(), 1);
        assert_eq!(index.line_col(0), LineCol { line: 1, column: 1 });
    }

    #[test]
    fn test_single_line() {
        let index = LineIndex::new("page Home");
        assert_eq!(index.line_count(), 1);
        assert_eq!(index.line_col(0), LineCol { line: 1, column: 1 });
        assert_eq!(index.line_col(5), LineCol { line: 1, column: 6 });
    }

    #[test]
    fn test_multi_line() {
        let source = "page Home {\n  field a = \"x\"\n}\n";
        let index = LineIndex::new(source);
        assert_eq!(index.line_count(), 4);
        // Offset of 'field' on line 2
        let offset = source.find("field").unwrap();
        assert_eq!(index.line_col(offset), LineCol { line: 2, column: 3 });
        // Closing brace on line 3
        let offset = source.rfind('}').unwrap();
        assert_eq!(index.line_col(offset), LineCol { line: 3, column: 1 });
    }

    #[test]
    fn test_offset_at_newline() {
        let source = "ab\ncd";
        let index = LineIndex::new(source);
        // The newline itself belongs to line 1
        assert_eq!(index.line_col(2), LineCol { line: 1, column: 3 });
        // First character after it starts line 2
        assert_eq!(index.line_col(3), LineCol { line: 2, column: 1 });
    }

    #[test]
    fn test_offset_past_end_clamps() {
        let index = LineIndex::new("ab");
        assert_eq!(index.line_col(100), LineCol { line: 1, column: 3 });
    }

    #[test]
    fn test_line_start() {
        let index = LineIndex::new("ab\ncd\n");
        assert_eq!(index.line_start(1), Some(0));
        assert_eq!(index.line_start(2), Some(3));
        assert_eq!(index.line_start(3), Some(6));
        assert_eq!(index.line_start(0), None);
        assert_eq!(index.line_start(4), None);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// line_col agrees with a naive scan over the source.
            #[test]
            fn matches_naive_scan(source in "[a-z\n ]{0,200}", offset in 0usize..200) {
                let offset = offset.min(source.len());
                let index = LineIndex::new(&source);

                let mut line = 1;
                let mut column = 1;
                for byte in source.bytes().take(offset) {
                    if byte == b'\n' {
                        line += 1;
                        column = 1;
                    } else {
                        column += 1;
                    }
                }

                prop_assert_eq!(index.line_col(offset), LineCol { line, column });
            }

            /// Positions are monotonic in the offset.
            #[test]
            fn monotonic(source in "[a-z\n]{0,100}") {
                let index = LineIndex::new(&source);
                let mut prev = (0, 0);
                for offset in 0..=source.len() {
                    let pos = index.line_col(offset);
                    let current = (pos.line, pos.column);
                    prop_assert!(current > prev || offset == 0);
                    prev = current;
                }
            }
        }
    }
}
