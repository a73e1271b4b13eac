//! source locations
use std::path::PathBuf;

/// 1-based line and column (columns count bytes)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// Location of a block or attribute
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct SourceRange {
    /// `None` for documents that were not loaded from a file
    pub path: Option<PathBuf>,
    pub start: Position,
    pub end: Position,
}

impl std::fmt::Display for SourceRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(path) = &self.path {
            write!(f, "{}:", path.display())?;
        }

        if self.start.line == self.end.line {
            write!(f, "{}", self.start.line)
        } else {
            write!(f, "{}-{}", self.start.line, self.end.line)
        }
    }
}

/// Byte offset to [Position] lookup for one source text
#[derive(Debug, Clone, Default)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(offset, _)| offset + 1))
            .collect();

        Self { line_starts }
    }

    pub fn position(&self, offset: usize) -> Position {
        let line = self
            .line_starts
            .partition_point(|start| *start <= offset)
            .max(1);

        Position {
            line,
            column: offset - self.line_starts[line - 1] + 1,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn positions() {
        let index = LineIndex::new("ab\ncd\n\nef");

        assert_eq!(index.position(0), Position { line: 1, column: 1 });
        assert_eq!(index.position(1), Position { line: 1, column: 2 });
        assert_eq!(index.position(3), Position { line: 2, column: 1 });
        assert_eq!(index.position(6), Position { line: 3, column: 1 });
        assert_eq!(index.position(8), Position { line: 4, column: 2 });
    }

    #[test]
    fn display() {
        let range = SourceRange {
            path: Some("main.tf".into()),
            start: Position { line: 3, column: 1 },
            end: Position { line: 7, column: 2 },
        };
        assert_eq!(range.to_string(), "main.tf:3-7");
    }
}
