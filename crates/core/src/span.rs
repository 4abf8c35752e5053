//! Half-open character ranges into canonical source text.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A half-open range `[start, end)` of character offsets.
///
/// Offsets count `char`s, not bytes, so that spans computed by the lexers
/// line up with what an editor shows as caret positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        if end < start {
            Span { start: end, end: start }
        } else {
            Span { start, end }
        }
    }

    /// A zero-width span at `pos`, used for insertion points.
    pub fn empty(pos: usize) -> Self {
        Span { start: pos, end: pos }
    }

    /// `fromTo(a, b)`: from the start of `self` to the end of `other`.
    pub fn to(self, other: Span) -> Span {
        Span::new(self.start, other.end.max(self.start))
    }

    /// The gap between the end of `self` and the start of `other`.
    pub fn gap_to(self, other: Span) -> Span {
        Span::new(self.end, other.start.max(self.end))
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_orders_endpoints() {
        assert_eq!(Span::new(5, 2), Span { start: 2, end: 5 });
    }

    #[test]
    fn to_spans_both() {
        let a = Span::new(1, 3);
        let b = Span::new(7, 9);
        assert_eq!(a.to(b), Span::new(1, 9));
    }

    #[test]
    fn gap_between_adjacent_spans_is_empty() {
        let a = Span::new(1, 3);
        let b = Span::new(3, 4);
        assert!(a.gap_to(b).is_empty());
        assert_eq!(a.gap_to(Span::new(6, 8)), Span::new(3, 6));
    }

    #[test]
    fn overlap_is_half_open() {
        assert!(!Span::new(0, 2).overlaps(&Span::new(2, 4)));
        assert!(Span::new(0, 3).overlaps(&Span::new(2, 4)));
    }
}
