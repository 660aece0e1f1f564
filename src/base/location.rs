use text_size::{TextRange, TextSize};

use super::FileId;

/// A half-open byte range `[start, end)` inside one file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Location {
    pub file: FileId,
    pub range: TextRange,
}

impl Location {
    pub fn new(file: FileId, range: TextRange) -> Self {
        Self { file, range }
    }

    pub fn start(&self) -> TextSize {
        self.range.start()
    }

    pub fn end(&self) -> TextSize {
        self.range.end()
    }

    /// Whether `offset` falls inside the range (end exclusive).
    pub fn contains(&self, offset: TextSize) -> bool {
        self.range.contains(offset)
    }

    /// Strict containment: `range` lies inside with a margin on both ends.
    pub fn envelops(&self, range: TextRange) -> bool {
        envelops(self.range, range)
    }

    /// Shares at least one byte with `range`. An empty range overlaps only
    /// when it lies strictly inside.
    pub fn overlaps(&self, range: TextRange) -> bool {
        overlaps(self.range, range)
    }

    pub fn shifted(mut self, delta: i64) -> Self {
        self.shift(delta);
        self
    }

    /// Location covering both `self` and `other` (same file assumed).
    pub fn cover(&self, other: &Location) -> Location {
        Location::new(self.file, self.range.cover(other.range))
    }
}

/// Strict containment of `inner` in `outer` on both ends.
pub(crate) fn envelops(outer: TextRange, inner: TextRange) -> bool {
    outer.start() < inner.start() && inner.end() < outer.end()
}

/// Interior intersection. Ranges that only share an endpoint do not
/// overlap; an empty range overlaps a range it lies strictly inside.
pub(crate) fn overlaps(a: TextRange, b: TextRange) -> bool {
    if a.is_empty() || b.is_empty() {
        return envelops(a, b) || envelops(b, a);
    }
    a.start() < b.end() && b.start() < a.end()
}

/// Moving positioned data after an edit.
///
/// Implemented by everything that stores source positions so untouched
/// elements after an edit can follow the text without being re-parsed.
pub trait Shift {
    /// Move every stored position by `delta` bytes.
    fn shift(&mut self, delta: i64);
}

fn shift_offset(offset: TextSize, delta: i64) -> TextSize {
    let moved = (u32::from(offset) as i64 + delta).clamp(0, u32::MAX as i64);
    TextSize::new(moved as u32)
}

impl Shift for TextRange {
    fn shift(&mut self, delta: i64) {
        if delta != 0 {
            *self = TextRange::new(
                shift_offset(self.start(), delta),
                shift_offset(self.end(), delta),
            );
        }
    }
}

impl Shift for Location {
    fn shift(&mut self, delta: i64) {
        self.range.shift(delta);
    }
}

impl<T: Shift> Shift for Option<T> {
    fn shift(&mut self, delta: i64) {
        if let Some(inner) = self {
            inner.shift(delta);
        }
    }
}

impl<T: Shift> Shift for Vec<T> {
    fn shift(&mut self, delta: i64) {
        for item in self {
            item.shift(delta);
        }
    }
}

impl<T: Shift> Shift for Box<T> {
    fn shift(&mut self, delta: i64) {
        (**self).shift(delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(start: u32, end: u32) -> Location {
        Location::new(FileId::new(0), TextRange::new(start.into(), end.into()))
    }

    fn range(start: u32, end: u32) -> TextRange {
        TextRange::new(start.into(), end.into())
    }

    #[test]
    fn test_envelops_is_strict() {
        let outer = loc(10, 20);
        assert!(outer.envelops(range(11, 19)));
        assert!(!outer.envelops(range(10, 19)));
        assert!(!outer.envelops(range(11, 20)));
    }

    #[test]
    fn test_overlap_excludes_adjacency() {
        let el = loc(10, 20);
        assert!(el.overlaps(range(19, 25)));
        assert!(el.overlaps(range(5, 11)));
        assert!(el.overlaps(range(15, 15)));
        assert!(el.overlaps(range(0, 30)));
        assert!(!el.overlaps(range(20, 25)));
        assert!(!el.overlaps(range(5, 10)));
        assert!(!el.overlaps(range(10, 10)));
        assert!(!el.overlaps(range(20, 20)));
    }

    #[test]
    fn test_shift_both_directions() {
        assert_eq!(loc(10, 20).shifted(5), loc(15, 25));
        assert_eq!(loc(10, 20).shifted(-4), loc(6, 16));
    }
}
