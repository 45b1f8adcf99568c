//! Build-time associative map from ordered bounds to values.
//!
//! A `SegmentedLine` divides `[lower, upper)` into contiguous segments,
//! each carrying one value. Segment `i` spans
//! `[breakpoints[i], breakpoints[i + 1])`, the last segment ending at the
//! upper bound. The table generator paints statuses and mappings onto a
//! line covering all Unicode scalars, compacts equal runs, and feeds the
//! result to the database builder. None of this survives into lookups.

use core::ops::Range;

#[derive(Debug, Clone)]
pub struct SegmentedLine<B, V> {
    breakpoints: Vec<B>,
    values: Vec<V>,
    upper_bound: B,
}

impl<B: Ord + Copy, V: Clone> SegmentedLine<B, V> {
    /// A line spanning `bounds` with a single segment holding `value`.
    pub fn new(bounds: Range<B>, value: V) -> Self {
        debug_assert!(bounds.start < bounds.end);
        Self {
            breakpoints: vec![bounds.start],
            values: vec![value],
            upper_bound: bounds.end,
        }
    }

    pub fn lower_bound(&self) -> B {
        self.breakpoints[0]
    }

    pub fn upper_bound(&self) -> B {
        self.upper_bound
    }

    /// Index of the segment containing `position`.
    fn segment_index(&self, position: B) -> usize {
        debug_assert!(position >= self.lower_bound() && position < self.upper_bound);
        self.breakpoints.partition_point(|&b| b <= position) - 1
    }

    /// The value applying to `position`.
    pub fn value_at(&self, position: B) -> &V {
        &self.values[self.segment_index(position)]
    }

    /// Ensure a breakpoint exists exactly at `position`, splitting the
    /// segment containing it if needed. Returns the segment index whose
    /// breakpoint is `position`.
    fn split_at(&mut self, position: B) -> usize {
        let idx = self.segment_index(position);
        if self.breakpoints[idx] == position {
            return idx;
        }
        self.breakpoints.insert(idx + 1, position);
        let carried = self.values[idx].clone();
        self.values.insert(idx + 1, carried);
        idx + 1
    }

    /// Apply `body` to every value within `range`, splitting boundary
    /// segments so the edit is exact.
    pub fn modify(&mut self, range: Range<B>, mut body: impl FnMut(&mut V)) {
        debug_assert!(range.start >= self.lower_bound());
        debug_assert!(range.end <= self.upper_bound);
        if range.start >= range.end {
            return;
        }

        let first = self.split_at(range.start);
        let end = if range.end < self.upper_bound {
            self.split_at(range.end)
        } else {
            self.values.len()
        };

        for value in &mut self.values[first..end] {
            body(value);
        }
    }

    /// Overwrite every position in `range` with `value`.
    pub fn set(&mut self, range: Range<B>, value: V) {
        self.modify(range, |v| *v = value.clone());
    }

    /// Transform every segment value, keeping the segmentation.
    pub fn map_values<U>(self, f: impl FnMut(V) -> U) -> SegmentedLine<B, U> {
        SegmentedLine {
            breakpoints: self.breakpoints,
            values: self.values.into_iter().map(f).collect(),
            upper_bound: self.upper_bound,
        }
    }

    /// Run-length compaction: merge each segment into its predecessor
    /// when `can_merge(predecessor, segment)` holds. The predecessor's
    /// value is kept.
    pub fn combine_segments(&mut self, mut can_merge: impl FnMut(&V, &V) -> bool) {
        let mut kept = 0;
        for i in 1..self.values.len() {
            if can_merge(&self.values[kept], &self.values[i]) {
                continue;
            }
            kept += 1;
            self.breakpoints.swap(kept, i);
            self.values.swap(kept, i);
        }
        self.breakpoints.truncate(kept + 1);
        self.values.truncate(kept + 1);
    }

    /// Iterate `(range, value)` per segment.
    pub fn iter(&self) -> impl Iterator<Item = (Range<B>, &V)> + '_ {
        self.breakpoints.iter().enumerate().map(|(i, &start)| {
            let end = self
                .breakpoints
                .get(i + 1)
                .copied()
                .unwrap_or(self.upper_bound);
            (start..end, &self.values[i])
        })
    }

    pub fn segment_count(&self) -> usize {
        self.values.len()
    }
}
