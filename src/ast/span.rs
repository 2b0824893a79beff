//! Source spans and spanned AST values.

use std::ops::Range;

/// A byte range in the query text.
///
/// Every AST node carries one so diagnostics can quote the argument exactly as
/// the user wrote it.
pub type Span = Range<usize>;

/// Returns a span covering both `start` and `end`.
pub fn merge_spans(start: &Span, end: &Span) -> Span {
    start.start.min(end.start)..start.end.max(end.end)
}

/// Returns the source text for `span`, or an empty string for spans outside `source`.
pub fn span_text<'a>(source: &'a str, span: &Span) -> &'a str {
    source.get(span.clone()).unwrap_or("")
}

/// A value paired with its location in the query text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned<T> {
    /// The wrapped value.
    pub node: T,
    /// Where the value appears in the query text.
    pub span: Span,
}

impl<T> Spanned<T> {
    /// Creates a new spanned value.
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }

    /// Maps the inner value while preserving the span.
    pub fn map<U, F>(self, f: F) -> Spanned<U>
    where
        F: FnOnce(T) -> U,
    {
        Spanned {
            node: f(self.node),
            span: self.span,
        }
    }

    /// Extracts the inner value, discarding the span.
    pub fn into_inner(self) -> T {
        self.node
    }
}

impl<T> AsRef<T> for Spanned<T> {
    fn as_ref(&self) -> &T {
        &self.node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_covers_both_ends() {
        assert_eq!(merge_spans(&(4..7), &(10..15)), 4..15);
        assert_eq!(merge_spans(&(10..15), &(4..7)), 4..15);
    }

    #[test]
    fn span_text_slices_source() {
        let source = "ROW TEST(1.1)";
        assert_eq!(span_text(source, &(9..12)), "1.1");
        assert_eq!(span_text(source, &(9..100)), "");
    }

    #[test]
    fn spanned_map_keeps_span() {
        let spanned = Spanned::new("idx", 5..8).map(str::len);
        assert_eq!(spanned.node, 3);
        assert_eq!(spanned.span, 5..8);
        assert_eq!(spanned.into_inner(), 3);
    }
}
