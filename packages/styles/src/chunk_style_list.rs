//! # Chunk Style List
//!
//! All inline style ranges for one text run, kept in insertion order.
//!
//! ## Normalized form
//!
//! After [`ChunkStyleList::normalize`]:
//! - no two ranges with the same type and payload touch or overlap
//! - superscript ranges never overlap and carry their net level as `data`
//! - no zero-length ranges remain, except the `(0, 0)` placeholder

use crate::style_range::{RangeComparison, StyleRange};
use crate::StyleType;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeSet;
use tracing::warn;

/// Ranges grouped by how they relate to a queried interval
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StyleComparisons<'a> {
    pub after: Vec<&'a StyleRange>,
    pub before: Vec<&'a StyleRange>,
    pub contains: Vec<&'a StyleRange>,
    pub encapsulated_by: Vec<&'a StyleRange>,
    pub left: Vec<&'a StyleRange>,
    pub right: Vec<&'a StyleRange>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChunkStyleList {
    styles: Vec<StyleRange>,
}

impl ChunkStyleList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn length(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&StyleRange> {
        self.styles.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StyleRange> {
        self.styles.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut StyleRange> {
        self.styles.iter_mut()
    }

    pub fn clear(&mut self) {
        self.styles.clear();
    }

    /// Append without merging; call [`normalize`](Self::normalize) afterwards
    /// if merge-on-insert is wanted.
    pub fn add(&mut self, range: StyleRange) {
        self.styles.push(range);
    }

    /// Strip `range`'s span from every range of the same type (every type
    /// when `range.style_type` is unset), splitting ranges that strictly
    /// contain it.
    pub fn remove(&mut self, range: &StyleRange) {
        let mut tails = Vec::new();

        for existing in self.styles.iter_mut() {
            if !range.style_type.is_unset() && existing.style_type != range.style_type {
                continue;
            }

            match existing.compare_to_range(range.start, Some(range.end)) {
                RangeComparison::EncapsulatedBy => existing.invalidate(),
                RangeComparison::Contains => {
                    if existing.start == range.start && existing.end == range.end {
                        existing.invalidate();
                        continue;
                    }

                    if existing.end > range.end {
                        let mut tail = existing.clone();
                        tail.start = range.end;
                        tails.push(tail);
                    }

                    existing.end = range.start;
                    if existing.end <= existing.start {
                        existing.invalidate();
                    }
                }
                RangeComparison::InsideLeft => existing.end = range.start,
                RangeComparison::InsideRight => existing.start = range.end,
                RangeComparison::Before | RangeComparison::After => {}
            }
        }

        self.styles.extend(tails);
        self.styles.retain(|s| !s.is_invalid());
    }

    /// Classify every range (optionally only those of `style_type`) against
    /// `[from, to)`.
    ///
    /// Without `to` this is a point lookup: only `after` and `before` are
    /// ever populated, even for a point strictly inside a range.
    pub fn get_style_comparisons_for_range(
        &self,
        from: usize,
        to: Option<usize>,
        style_type: Option<&StyleType>,
    ) -> StyleComparisons<'_> {
        let mut comparisons = StyleComparisons::default();

        for range in &self.styles {
            if let Some(t) = style_type {
                if range.style_type != *t {
                    continue;
                }
            }

            let bucket = match range.compare_to_range(from, to) {
                RangeComparison::After => &mut comparisons.after,
                RangeComparison::Before => &mut comparisons.before,
                RangeComparison::Contains => &mut comparisons.contains,
                RangeComparison::EncapsulatedBy => &mut comparisons.encapsulated_by,
                RangeComparison::InsideLeft => &mut comparisons.left,
                RangeComparison::InsideRight => &mut comparisons.right,
            };
            bucket.push(range);
        }

        comparisons
    }

    /// Whether some range of `style_type` covers all of `[from, to)`
    ///
    /// Only the `contains` bucket counts. A range lying inside `[from, to)`
    /// (`encapsulated_by`) or overlapping one end of it answers `false`, as
    /// does an empty span.
    pub fn range_has_style(&self, from: usize, to: usize, style_type: &StyleType) -> bool {
        !self
            .get_style_comparisons_for_range(from, Some(to), Some(style_type))
            .contains
            .is_empty()
    }

    /// Styles covering all of `[from, to)`; partial overlaps don't count
    pub fn get_styles_in_range(&self, from: usize, to: usize) -> BTreeSet<StyleType> {
        self.get_style_comparisons_for_range(from, Some(to), None)
            .contains
            .into_iter()
            .map(|r| r.style_type.clone())
            .collect()
    }

    /// Every distinct style type present, regardless of coverage
    pub fn get_styles(&self) -> BTreeSet<StyleType> {
        self.styles.iter().map(|r| r.style_type.clone()).collect()
    }

    /// Merge touching or overlapping ranges with the same type and payload,
    /// collapse superscripts by level and drop invalid ranges.
    ///
    /// Ranges are swept once in `(type, payload, start)` order. Each merged
    /// range keeps the position of the earliest range it absorbed.
    pub fn normalize(&mut self) {
        self.cleanup_superscripts();
        self.styles.retain(|s| !s.is_invalid());

        let keys: Vec<String> = self.styles.iter().map(|r| payload_key(&r.data)).collect();
        let mut order: Vec<usize> = (0..self.styles.len()).collect();
        order.sort_by(|&a, &b| {
            let (x, y) = (&self.styles[a], &self.styles[b]);
            (&x.style_type, &keys[a], x.start).cmp(&(&y.style_type, &keys[b], y.start))
        });

        let mut merged: Vec<(usize, StyleRange)> = Vec::with_capacity(order.len());
        for i in order {
            let range = &self.styles[i];
            if let Some((first, last)) = merged.last_mut() {
                if range.start <= last.end && last.is_mergeable(&range.style_type, &range.data) {
                    last.end = last.end.max(range.end);
                    *first = (*first).min(i);
                    continue;
                }
            }
            merged.push((i, range.clone()));
        }

        merged.sort_by_key(|(first, _)| *first);
        self.styles = merged.into_iter().map(|(_, range)| range).collect();
    }

    /// Replace all superscript ranges with non-overlapping runs carrying the
    /// summed level at each offset. Runs that net to zero disappear; the rest
    /// take the place of the first superscript in the list.
    pub fn cleanup_superscripts(&mut self) {
        let Some(at) = self.styles.iter().position(|r| r.style_type == StyleType::Superscript) else {
            return;
        };
        let (sups, rest): (Vec<_>, Vec<_>) = self
            .styles
            .drain(..)
            .partition(|r| r.style_type == StyleType::Superscript);
        self.styles = rest;

        let sups: Vec<StyleRange> = sups.into_iter().filter(|r| r.end > r.start).collect();
        if sups.is_empty() {
            return;
        }

        let mut points: Vec<usize> = sups.iter().flat_map(|r| [r.start, r.end]).collect();
        points.sort_unstable();
        points.dedup();

        let mut runs: Vec<StyleRange> = Vec::new();
        for window in points.windows(2) {
            let (from, to) = (window[0], window[1]);
            let level: i64 = sups
                .iter()
                .filter(|r| r.start <= from && r.end >= to)
                .map(StyleRange::level)
                .sum();

            if level == 0 {
                continue;
            }

            if let Some(last) = runs.last_mut() {
                if last.end == from && last.level() == level {
                    last.end = to;
                    continue;
                }
            }

            runs.push(StyleRange::new(from, to, StyleType::Superscript, json!(level)));
        }

        self.styles.splice(at..at, runs);
    }

    /// Order by position then type; only used to compare lists as multisets
    pub fn sort(&mut self) {
        self.styles.sort_by(|a, b| {
            (a.start, a.end, &a.style_type)
                .cmp(&(b.start, b.end, &b.style_type))
                .then_with(|| a.data.to_string().cmp(&b.data.to_string()))
        });
    }

    /// Persisted shape, or `None` when there are no ranges
    pub fn get_exported_object(&self) -> Option<Vec<Value>> {
        if self.styles.is_empty() {
            return None;
        }
        Some(self.styles.iter().map(StyleRange::get_exported_object).collect())
    }

    /// Build from persisted data. Anything but an array yields an empty list.
    pub fn create_from_object(value: &Value) -> Self {
        match value {
            Value::Array(items) => Self {
                styles: items.iter().map(StyleRange::create_from_object).collect(),
            },
            Value::Null => Self::new(),
            other => {
                warn!(found = %other, "Style list is not an array, using an empty list");
                Self::new()
            }
        }
    }
}

/// Payload rendered with object keys in sorted order, so deep-equal payloads
/// share a key whatever order their keys were written in
fn payload_key(data: &Value) -> String {
    match data {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let inner: Vec<String> = entries
                .into_iter()
                .map(|(key, value)| format!("{:?}:{}", key, payload_key(value)))
                .collect();
            format!("{{{}}}", inner.join(","))
        }
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(payload_key).collect();
            format!("[{}]", inner.join(","))
        }
        other => other.to_string(),
    }
}

impl FromIterator<StyleRange> for ChunkStyleList {
    fn from_iter<I: IntoIterator<Item = StyleRange>>(iter: I) -> Self {
        Self {
            styles: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ChunkStyleList {
    type Item = &'a StyleRange;
    type IntoIter = std::slice::Iter<'a, StyleRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.styles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sup(start: usize, end: usize, level: i64) -> StyleRange {
        StyleRange::new(start, end, StyleType::Superscript, json!(level))
    }

    #[test]
    fn test_add_does_not_merge() {
        let mut list = ChunkStyleList::new();
        list.add(StyleRange::plain(0, 5, "b"));
        list.add(StyleRange::plain(3, 8, "b"));
        assert_eq!(list.length(), 2);
    }

    #[test]
    fn test_remove_exact_range_empties_list() {
        for (start, end) in [(0, 5), (3, 9)] {
            let mut list = ChunkStyleList::new();
            list.add(StyleRange::plain(start, end, "i"));
            list.remove(&StyleRange::plain(start, end, "i"));
            assert!(list.is_empty(), "[{}, {}) should be gone", start, end);
        }
    }

    #[test]
    fn test_remove_splits_containing_range() {
        let mut list = ChunkStyleList::new();
        list.add(StyleRange::new(5, 15, "a", json!({"href": "google.com"})));
        list.add(StyleRange::plain(10, 20, "b"));

        list.remove(&StyleRange::plain(10, 11, "a"));

        let mut ranges: Vec<String> = list.iter().map(|r| r.to_string()).collect();
        ranges.sort();
        assert_eq!(
            ranges,
            vec![
                "a:11,15({\"href\":\"google.com\"})",
                "a:5,10({\"href\":\"google.com\"})",
                "b:10,20({})",
            ]
        );
    }

    #[test]
    fn test_remove_trims_partial_overlaps() {
        let mut list = ChunkStyleList::new();
        list.add(StyleRange::plain(0, 10, "b"));
        list.add(StyleRange::plain(20, 30, "b"));

        list.remove(&StyleRange::plain(5, 25, "b"));

        assert_eq!(list.get(0).map(|r| (r.start, r.end)), Some((0, 5)));
        assert_eq!(list.get(1).map(|r| (r.start, r.end)), Some((25, 30)));
    }

    #[test]
    fn test_remove_touching_start_of_range() {
        let mut list = ChunkStyleList::new();
        list.add(StyleRange::plain(0, 10, "b"));

        list.remove(&StyleRange::plain(0, 4, "b"));

        assert_eq!(list.length(), 1);
        assert_eq!(list.get(0).map(|r| (r.start, r.end)), Some((4, 10)));
    }

    #[test]
    fn test_remove_unset_type_hits_every_type() {
        let mut list = ChunkStyleList::new();
        list.add(StyleRange::plain(0, 10, "b"));
        list.add(StyleRange::plain(0, 10, "i"));

        list.remove(&StyleRange::plain(0, 10, StyleType::unset()));

        assert!(list.is_empty());
    }

    #[test]
    fn test_remove_zero_length_is_noop() {
        let mut list = ChunkStyleList::new();
        list.add(StyleRange::plain(0, 10, "b"));
        list.remove(&StyleRange::plain(4, 4, "b"));
        assert_eq!(list.get(0).map(|r| (r.start, r.end)), Some((0, 10)));
    }

    #[test]
    fn test_comparisons_for_range() {
        let mut list = ChunkStyleList::new();
        list.add(StyleRange::plain(0, 5, "b"));
        list.add(StyleRange::plain(10, 20, "b"));
        list.add(StyleRange::plain(12, 14, "i"));
        list.add(StyleRange::plain(8, 12, "b"));
        list.add(StyleRange::plain(14, 30, "b"));
        list.add(StyleRange::plain(40, 50, "b"));

        let c = list.get_style_comparisons_for_range(11, Some(16), None);
        assert_eq!(c.before.len(), 1);
        assert_eq!(c.contains.len(), 1);
        assert_eq!(c.encapsulated_by.len(), 1);
        assert_eq!(c.left.len(), 1);
        assert_eq!(c.right.len(), 1);
        assert_eq!(c.after.len(), 1);

        let c = list.get_style_comparisons_for_range(11, Some(16), Some(&StyleType::Italic));
        assert_eq!(c.encapsulated_by.len(), 1);
        assert_eq!(c.contains.len() + c.before.len() + c.after.len(), 0);
    }

    #[test]
    fn test_point_comparisons_only_fill_before_and_after() {
        let mut list = ChunkStyleList::new();
        list.add(StyleRange::plain(0, 10, "b"));
        list.add(StyleRange::plain(20, 30, "b"));

        // 5 is inside the first range but is still reported as `before`
        let c = list.get_style_comparisons_for_range(5, None, None);
        assert_eq!(c.before.len(), 1);
        assert_eq!(c.after.len(), 1);
        assert!(c.contains.is_empty());
        assert!(c.encapsulated_by.is_empty());
        assert!(c.left.is_empty());
        assert!(c.right.is_empty());
    }

    #[test]
    fn test_range_has_style() {
        let mut list = ChunkStyleList::new();
        list.add(StyleRange::plain(5, 10, "b"));

        assert!(list.range_has_style(5, 10, &StyleType::Bold));
        assert!(list.range_has_style(6, 8, &StyleType::Bold));
        assert!(!list.range_has_style(4, 8, &StyleType::Bold));
        // the bold range lies inside the query span
        assert!(!list.range_has_style(4, 11, &StyleType::Bold));
        assert!(!list.range_has_style(6, 8, &StyleType::Italic));
        assert!(!list.range_has_style(6, 6, &StyleType::Bold));
    }

    #[test]
    fn test_get_styles_in_range_ignores_partial_overlap() {
        let mut list = ChunkStyleList::new();
        list.add(StyleRange::plain(0, 10, "b"));
        list.add(StyleRange::plain(5, 15, "i"));
        list.add(StyleRange::plain(0, 3, "del"));

        let styles = list.get_styles_in_range(2, 8);
        assert_eq!(styles.into_iter().collect::<Vec<_>>(), vec![StyleType::Bold]);

        assert_eq!(list.get_styles().len(), 3);
    }

    #[test]
    fn test_normalize_merges_overlapping_and_adjacent() {
        let mut list = ChunkStyleList::new();
        list.add(StyleRange::plain(0, 5, "b"));
        list.add(StyleRange::plain(5, 10, "b"));
        list.add(StyleRange::plain(8, 12, "b"));
        list.add(StyleRange::plain(20, 25, "b"));

        list.normalize();

        let ranges: Vec<_> = list.iter().map(|r| (r.start, r.end)).collect();
        assert_eq!(ranges, vec![(0, 12), (20, 25)]);
    }

    #[test]
    fn test_normalize_keeps_different_payloads_apart() {
        let mut list = ChunkStyleList::new();
        list.add(StyleRange::new(0, 5, "a", json!({"href": "a.com"})));
        list.add(StyleRange::new(5, 10, "a", json!({"href": "b.com"})));

        list.normalize();

        assert_eq!(list.length(), 2);
    }

    #[test]
    fn test_normalize_drops_invalid_keeps_sentinel() {
        let mut list = ChunkStyleList::new();
        list.add(StyleRange::plain(0, 0, "b"));
        list.add(StyleRange::plain(4, 4, "i"));
        list.add(StyleRange::plain(9, 3, "i"));

        list.normalize();

        assert_eq!(list.length(), 1);
        assert!(list.get(0).is_some_and(StyleRange::is_sentinel));
    }

    #[test]
    fn test_superscripts_cancel() {
        let mut list = ChunkStyleList::new();
        list.add(sup(2, 6, 3));
        list.add(sup(2, 6, -3));

        list.normalize();

        assert!(list.is_empty());
    }

    #[test]
    fn test_superscripts_sum() {
        let mut list = ChunkStyleList::new();
        list.add(sup(2, 6, 3));
        list.add(sup(2, 6, -2));

        list.normalize();

        assert_eq!(list.length(), 1);
        assert_eq!(list.get(0), Some(&sup(2, 6, 1)));
    }

    #[test]
    fn test_superscripts_keep_their_place() {
        let mut list = ChunkStyleList::new();
        list.add(StyleRange::plain(0, 6, "b"));
        list.add(sup(17, 18, -1));
        list.add(StyleRange::new(34, 39, "a", json!({"href": "x.org"})));

        list.normalize();

        let types: Vec<&str> = list.iter().map(|r| r.style_type.as_str()).collect();
        assert_eq!(types, vec!["b", "sup", "a"]);
    }

    #[test]
    fn test_superscripts_nested() {
        let mut list = ChunkStyleList::new();
        list.add(sup(0, 10, 1));
        list.add(sup(3, 5, -1));

        list.cleanup_superscripts();

        let ranges: Vec<_> = list.iter().map(|r| r.to_string()).collect();
        assert_eq!(ranges, vec!["sup:0,3(1)", "sup:5,10(1)"]);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let mut list = ChunkStyleList::new();
        list.add(StyleRange::plain(0, 5, "b"));
        list.add(StyleRange::plain(3, 9, "b"));
        list.add(StyleRange::plain(2, 4, "i"));
        list.add(sup(1, 7, 1));
        list.add(sup(4, 9, 1));
        list.add(StyleRange::plain(7, 7, "q"));

        list.normalize();
        let once = list.clone();
        list.normalize();

        assert_eq!(list, once);
    }

    #[test]
    fn test_normalize_merges_payloads_regardless_of_key_order() {
        let mut list = ChunkStyleList::new();
        list.add(StyleRange::new(0, 4, "color", json!({"text": "red", "bg": "none"})));
        list.add(StyleRange::plain(2, 3, "b"));
        list.add(StyleRange::new(4, 9, "color", json!({"bg": "none", "text": "red"})));

        list.normalize();

        let ranges: Vec<_> = list.iter().map(|r| (r.style_type.as_str().to_string(), r.start, r.end)).collect();
        assert_eq!(ranges, vec![("color".to_string(), 0, 9), ("b".to_string(), 2, 3)]);
    }

    #[test]
    fn test_normalize_keeps_first_seen_order() {
        let mut list = ChunkStyleList::new();
        list.add(StyleRange::plain(10, 12, "i"));
        list.add(StyleRange::plain(4, 6, "b"));
        list.add(StyleRange::plain(0, 11, "i"));

        list.normalize();

        let ranges: Vec<_> = list.iter().map(|r| r.to_string()).collect();
        assert_eq!(ranges, vec!["i:0,12({})", "b:4,6({})"]);
    }

    fn arb_range() -> impl Strategy<Value = StyleRange> {
        (0..4usize, 0..20usize, 0..8usize, -2..=2i64, 0..2u8).prop_map(|(kind, start, len, level, site)| {
            let end = start + len;
            match kind {
                0 => StyleRange::plain(start, end, "b"),
                1 => StyleRange::plain(start, end, "i"),
                2 => StyleRange::new(start, end, "a", json!({"href": format!("site{}.com", site)})),
                _ => sup(start, end, level),
            }
        })
    }

    proptest! {
        #[test]
        fn test_normalize_is_idempotent_for_generated_lists(ranges in prop::collection::vec(arb_range(), 0..16)) {
            let mut list: ChunkStyleList = ranges.into_iter().collect();
            list.normalize();
            let once = list.clone();
            list.normalize();
            prop_assert_eq!(&list, &once);

            for (i, a) in once.iter().enumerate() {
                prop_assert!(!a.is_invalid() || a.is_sentinel(), "{} is invalid", a);
                for b in once.iter().skip(i + 1) {
                    let touching = a.start <= b.end && b.start <= a.end;
                    prop_assert!(
                        !(touching && a.is_mergeable(&b.style_type, &b.data)),
                        "{} and {} were left unmerged",
                        a,
                        b
                    );
                }
            }
        }
    }

    #[test]
    fn test_exported_object() {
        assert_eq!(ChunkStyleList::new().get_exported_object(), None);

        let mut list = ChunkStyleList::new();
        list.add(StyleRange::plain(0, 1, "b"));
        assert_eq!(
            list.get_exported_object(),
            Some(vec![json!({"type": "b", "start": 0, "end": 1, "data": {}})])
        );
    }

    #[test]
    fn test_create_from_malformed_data() {
        assert!(ChunkStyleList::create_from_object(&Value::Null).is_empty());
        assert!(ChunkStyleList::create_from_object(&json!({"type": "b"})).is_empty());
        assert!(ChunkStyleList::create_from_object(&json!("b")).is_empty());

        let list = ChunkStyleList::create_from_object(&json!([
            {"type": "b", "start": 0, "end": 3, "data": {}}
        ]));
        assert_eq!(list.length(), 1);
    }
}
