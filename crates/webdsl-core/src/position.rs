//! Column spans on a single line.

/// A half-open column span `[start, end)` on a single line, guaranteed
/// `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// Create a span, ensuring `start <= end`.
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// Span covering the non-whitespace content of `line`.
    ///
    /// A blank line yields an empty span at column 0.
    pub fn of_content(line: &str) -> Self {
        let indent = indentation(line);
        let trimmed_len = line.trim_end().chars().count();
        Self::new(indent.min(trimmed_len), trimmed_len)
    }
}

/// Width of the leading whitespace of `line`, in chars.
pub fn indentation(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}
