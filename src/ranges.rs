// SPDX-License-Identifier: BSD-2-Clause
// Copyright (c) 2026, The quincy-core Authors

//! A set of disjoint, non-adjacent `u64` ranges, kept merged on insert.
//!
//! Used both for incoming ack ranges (`AckFrame::ranges`) and for the set of
//! received packet numbers an `AckTracker` collapses into outgoing ack
//! ranges.

use std::collections::BTreeMap;
use std::ops::Range;

/// A closed range `[start, end)` of packet numbers, kept half-open internally
/// (matching `std::ops::Range`) but exposed as inclusive `[low, high]` pairs,
/// the shape an outgoing ack frame's ranges take on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AckInterval {
    pub low: u64,
    pub high: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RangeSet {
    // Keyed by range start, mapping to the (exclusive) end.
    ranges: BTreeMap<u64, u64>,
}

impl RangeSet {
    pub fn new() -> Self {
        RangeSet::default()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Inserts `[range.start, range.end)`, merging with any overlapping or
    /// adjacent existing ranges.
    pub fn insert(&mut self, range: Range<u64>) {
        if range.start >= range.end {
            return;
        }

        let mut start = range.start;
        let mut end = range.end;

        // Merge with the range that starts before us, if it overlaps or
        // touches.
        if let Some((&prev_start, &prev_end)) = self.ranges.range(..start).next_back() {
            if prev_end >= start {
                start = prev_start;
                end = end.max(prev_end);
            }
        }

        // Merge with and remove every range now covered by [start, end].
        let to_remove: Vec<u64> = self
            .ranges
            .range(start..=end)
            .map(|(&s, _)| s)
            .collect();
        for key in to_remove {
            if let Some(e) = self.ranges.remove(&key) {
                end = end.max(e);
            }
        }

        self.ranges.insert(start, end);
    }

    pub fn remove_up_to(&mut self, threshold: u64) {
        let to_remove: Vec<u64> = self
            .ranges
            .range(..threshold)
            .map(|(&s, _)| s)
            .collect();

        for key in to_remove {
            let end = self.ranges.remove(&key).unwrap();
            if end > threshold {
                self.ranges.insert(threshold, end);
            }
        }
    }

    pub fn contains(&self, value: u64) -> bool {
        self.ranges
            .range(..=value)
            .next_back()
            .is_some_and(|(_, &end)| value < end)
    }

    /// The largest value contained in the set, if any.
    pub fn last(&self) -> Option<u64> {
        self.ranges.iter().next_back().map(|(_, &end)| end - 1)
    }

    /// Ranges in ascending order, as half-open `Range<u64>`.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Range<u64>> + '_ {
        self.ranges.iter().map(|(&s, &e)| s..e)
    }

    /// Ranges in descending order, as closed `[low, high]` intervals —
    /// the shape `AckTracker::generate_ack` emits.
    pub fn descending_intervals(&self) -> Vec<AckInterval> {
        self.iter()
            .rev()
            .map(|r| AckInterval {
                low: r.start,
                high: r.end - 1,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_overlapping_and_adjacent() {
        let mut rs = RangeSet::new();
        rs.insert(0..2);
        rs.insert(4..6);
        assert_eq!(rs.iter().collect::<Vec<_>>(), vec![0..2, 4..6]);

        // adjacent: 2..4 touches both neighbours and should merge them all.
        rs.insert(2..4);
        assert_eq!(rs.iter().collect::<Vec<_>>(), vec![0..6]);
    }

    #[test]
    fn last_is_largest_contained_value() {
        let mut rs = RangeSet::new();
        rs.insert(10..20);
        rs.insert(30..31);
        assert_eq!(rs.last(), Some(30));
    }

    #[test]
    fn remove_up_to_trims_prefix() {
        let mut rs = RangeSet::new();
        rs.insert(0..10);
        rs.remove_up_to(5);
        assert_eq!(rs.iter().collect::<Vec<_>>(), vec![5..10]);
        assert!(!rs.contains(4));
        assert!(rs.contains(5));
    }

    #[test]
    fn descending_intervals_cover_whole_set() {
        let mut rs = RangeSet::new();
        rs.insert(0..3);
        rs.insert(10..12);
        assert_eq!(
            rs.descending_intervals(),
            vec![
                AckInterval { low: 10, high: 11 },
                AckInterval { low: 0, high: 2 },
            ]
        );
    }

    /// Inserting an arbitrary sequence of small (start, len) ranges must
    /// agree, value by value, with a plain `BTreeSet` built from the same
    /// insertions, and the stored ranges must stay disjoint and merged.
    #[test]
    fn arbitrary_inserts_agree_with_a_reference_set() {
        use std::collections::BTreeSet;

        bolero::check!()
            .with_type::<Vec<(u8, u8)>>()
            .for_each(|inserts| {
                let mut rs = RangeSet::new();
                let mut reference = BTreeSet::new();

                for &(start, len) in inserts {
                    let start = start as u64;
                    let end = start + len as u64 + 1;
                    rs.insert(start..end);
                    for v in start..end {
                        reference.insert(v);
                    }
                }

                for v in 0..=u8::MAX as u64 + 1 {
                    assert_eq!(rs.contains(v), reference.contains(&v), "value {v}");
                }

                let merged: Vec<Range<u64>> = rs.iter().collect();
                for pair in merged.windows(2) {
                    assert!(pair[0].end < pair[1].start, "ranges must stay disjoint and non-adjacent");
                }
            });
    }
}
