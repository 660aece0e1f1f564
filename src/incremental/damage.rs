//! Damage regions and their growth over a list of sibling elements.

use std::ops::Range;

use text_size::{TextRange, TextSize};

use crate::base::{envelops, overlaps};

/// A text replacement in old-text coordinates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextEdit {
    pub range: TextRange,
    pub text: String,
}

impl TextEdit {
    pub fn new(range: TextRange, text: impl Into<String>) -> Self {
        Self {
            range,
            text: text.into(),
        }
    }

    pub fn insert(offset: TextSize, text: impl Into<String>) -> Self {
        Self::new(TextRange::empty(offset), text)
    }

    pub fn delete(range: TextRange) -> Self {
        Self::new(range, String::new())
    }

    /// Change of the text length.
    pub fn delta(&self) -> i64 {
        self.text.len() as i64 - i64::from(u32::from(self.range.len()))
    }

    /// The edited text, or `None` when the range is not inside `text` or
    /// splits a character.
    pub fn apply(&self, text: &str) -> Option<String> {
        let range = std::ops::Range::<usize>::from(self.range);
        if !text.is_char_boundary(range.start) || !text.is_char_boundary(range.end) {
            return None;
        }
        let mut result = String::with_capacity(text.len() + self.text.len());
        result.push_str(text.get(..range.start)?);
        result.push_str(&self.text);
        result.push_str(text.get(range.end..)?);
        Some(result)
    }
}

/// What an edit did to the text: the replaced range in old coordinates and
/// the length change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DamageRegion {
    pub range: TextRange,
    pub delta: i64,
    /// The edit changed the nesting balance of `{}`, `()` or `[]`.
    pub delimiter_change: bool,
}

impl DamageRegion {
    pub fn new(old_text: &str, edit: &TextEdit) -> Self {
        let removed = old_text
            .get(std::ops::Range::<usize>::from(edit.range))
            .unwrap_or_default();
        Self {
            range: edit.range,
            delta: edit.delta(),
            delimiter_change: balance(removed) != balance(&edit.text),
        }
    }

    /// `range`, which must cover the damage, in new-text coordinates.
    pub fn to_new(&self, range: TextRange) -> TextRange {
        debug_assert!(range.contains_range(self.range));
        let end = (i64::from(u32::from(range.end())) + self.delta).max(i64::from(u32::from(range.start())));
        TextRange::new(range.start(), TextSize::new(end as u32))
    }

    /// An offset at or after the damage end, in new-text coordinates.
    pub fn offset_to_new(&self, offset: TextSize) -> TextSize {
        if offset < self.range.end() {
            return offset;
        }
        TextSize::new((i64::from(u32::from(offset)) + self.delta).max(0) as u32)
    }
}

fn balance(text: &str) -> [i64; 3] {
    let mut balance = [0; 3];
    for c in text.chars() {
        match c {
            '{' => balance[0] += 1,
            '}' => balance[0] -= 1,
            '(' => balance[1] += 1,
            ')' => balance[1] -= 1,
            '[' => balance[2] += 1,
            ']' => balance[2] -= 1,
            _ => {}
        }
    }
    balance
}

// ============================================================================
// CLASSIFICATION
// ============================================================================

/// Sibling elements sorted against a damage range.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DamageClassification {
    /// Elements strictly containing the damage.
    pub enveloped: Vec<usize>,
    /// Elements overlapping the damage without containing it. Bordering the
    /// damage is not enough; lexical extension is decided during growth.
    pub damaged: Vec<usize>,
    /// Closest untouched element ending before the damage.
    pub last_appendable: Option<usize>,
    /// Closest untouched element starting after the damage.
    pub last_prependable: Option<usize>,
}

/// Classify sorted, non-overlapping `ranges` against `damage`.
pub fn classify_elements(ranges: impl IntoIterator<Item = TextRange>, damage: TextRange) -> DamageClassification {
    let mut result = DamageClassification::default();
    for (index, range) in ranges.into_iter().enumerate() {
        if envelops(range, damage) {
            result.enveloped.push(index);
        } else if overlaps(range, damage) {
            result.damaged.push(index);
        } else if range.end() <= damage.start() {
            result.last_appendable = Some(index);
        } else if result.last_prependable.is_none() {
            result.last_prependable = Some(index);
        }
    }
    result
}

// ============================================================================
// GROWTH
// ============================================================================

/// The region to re-parse: old-coordinate text range and the elements it
/// replaces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Growth {
    pub range: TextRange,
    pub elements: Range<usize>,
}

/// Grow `damage` over the `damaged` elements, then keep absorbing the
/// neighbour before the region while `extends` says the new text now
/// continues it, and the neighbour after it while `prefixed` says the new
/// text now attaches to its front. `prefixed` receives the current region.
///
/// The result always covers `damage`. Each round absorbs a neighbour or
/// stops, so the loop ends after at most `ranges.len()` rounds.
pub fn grow(
    ranges: &[TextRange],
    damage: TextRange,
    damaged: &[usize],
    mut extends: impl FnMut(usize) -> bool,
    mut prefixed: impl FnMut(usize, TextRange) -> bool,
) -> Growth {
    let (mut lo, mut hi) = match (damaged.iter().min(), damaged.iter().max()) {
        (Some(min), Some(max)) => (*min, *max + 1),
        _ => {
            let at = ranges
                .iter()
                .take_while(|range| range.end() <= damage.start())
                .count();
            (at, at)
        }
    };
    let mut region = ranges[lo..hi]
        .iter()
        .fold(damage, |region, range| region.cover(*range));

    loop {
        let mut absorbed = false;
        if lo > 0 && extends(lo - 1) {
            lo -= 1;
            region = region.cover(ranges[lo]);
            absorbed = true;
        }
        if hi < ranges.len() && prefixed(hi, region) {
            region = region.cover(ranges[hi]);
            hi += 1;
            absorbed = true;
        }
        if !absorbed {
            break;
        }
    }
    tracing::trace!("[REPARSE] grown to {:?}, elements {}..{}", region, lo, hi);
    Growth {
        range: region,
        elements: lo..hi,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(start: u32, end: u32) -> TextRange {
        TextRange::new(TextSize::new(start), TextSize::new(end))
    }

    #[test]
    fn test_edit_apply_and_delta() {
        let edit = TextEdit::new(r(2, 5), "XY");
        assert_eq!(edit.apply("abcdefg").as_deref(), Some("abXYfg"));
        assert_eq!(edit.delta(), -1);
        assert_eq!(TextEdit::insert(TextSize::new(9), "x").apply("abc"), None);
        assert_eq!(TextEdit::insert(TextSize::new(1), "é").apply("ab").as_deref(), Some("aéb"));
        assert_eq!(TextEdit::delete(r(1, 2)).apply("é"), None);
    }

    #[test]
    fn test_delimiter_balance() {
        let old = "f() { x := 1; }";
        let balanced = DamageRegion::new(old, &TextEdit::insert(TextSize::new(13), " { }"));
        assert!(!balanced.delimiter_change);
        let opened = DamageRegion::new(old, &TextEdit::insert(TextSize::new(13), " {"));
        assert!(opened.delimiter_change);
        let swapped = DamageRegion::new(old, &TextEdit::new(r(4, 5), "("));
        assert!(swapped.delimiter_change);
    }

    #[test]
    fn test_to_new_coordinates() {
        let damage = DamageRegion {
            range: r(10, 12),
            delta: 5,
            delimiter_change: false,
        };
        assert_eq!(damage.to_new(r(4, 20)), r(4, 25));
        assert_eq!(damage.offset_to_new(TextSize::new(8)), TextSize::new(8));
        assert_eq!(damage.offset_to_new(TextSize::new(12)), TextSize::new(17));
    }

    #[test]
    fn test_classification() {
        let ranges = [r(0, 10), r(11, 20), r(21, 30), r(31, 40)];
        let inside = classify_elements(ranges, r(14, 16));
        assert_eq!(inside.enveloped, vec![1]);
        assert!(inside.damaged.is_empty());
        assert_eq!(inside.last_appendable, Some(0));
        assert_eq!(inside.last_prependable, Some(2));

        let across = classify_elements(ranges, r(18, 23));
        assert!(across.enveloped.is_empty());
        assert_eq!(across.damaged, vec![1, 2]);
        assert_eq!(across.last_prependable, Some(3));

        // Insertions and replacements that only border an element leave it
        // untouched.
        let at_end = classify_elements(ranges, r(20, 20));
        assert!(at_end.damaged.is_empty());
        assert_eq!(at_end.last_appendable, Some(1));
        assert_eq!(at_end.last_prependable, Some(2));
        let gap = classify_elements(ranges, r(20, 21));
        assert!(gap.damaged.is_empty() && gap.enveloped.is_empty());
        let at_start = classify_elements(ranges, r(11, 11));
        assert_eq!(at_start.last_appendable, Some(0));
        assert_eq!(at_start.last_prependable, Some(1));
    }

    #[test]
    fn test_grow_without_neighbours() {
        let ranges = [r(0, 10), r(11, 20), r(21, 30)];
        let growth = grow(&ranges, r(18, 23), &[1, 2], |_| false, |_, _| false);
        assert_eq!(growth.range, r(11, 30));
        assert_eq!(growth.elements, 1..3);
    }

    #[test]
    fn test_grow_absorbs_to_fixed_point() {
        let ranges = [r(0, 5), r(6, 10), r(11, 20), r(21, 30), r(31, 40)];
        let mut asked = Vec::new();
        let growth = grow(
            &ranges,
            r(14, 16),
            &[2],
            |i| {
                asked.push(i);
                i >= 1
            },
            |i, _| i == 3,
        );
        assert_eq!(growth.elements, 1..4);
        assert_eq!(growth.range, r(6, 30));
        assert_eq!(asked, vec![1, 0]);
    }

    #[test]
    fn test_grow_at_element_end_starts_after_it() {
        let ranges = [r(0, 10), r(20, 30)];
        let mut asked = Vec::new();
        let growth = grow(
            &ranges,
            r(10, 10),
            &[],
            |i| {
                asked.push(i);
                false
            },
            |_, _| false,
        );
        assert_eq!(growth.elements, 1..1);
        assert_eq!(asked, vec![0]);
    }

    #[test]
    fn test_grow_in_gap() {
        let ranges = [r(0, 10), r(20, 30)];
        let growth = grow(&ranges, r(14, 15), &[], |_| false, |_, _| false);
        assert_eq!(growth.elements, 1..1);
        assert_eq!(growth.range, r(14, 15));
        assert!(growth.range.contains_range(r(14, 15)));
    }
}
