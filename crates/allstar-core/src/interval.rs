//! Closed integer ranges.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed range `[a, b]`. Normalized intervals satisfy `a <= b`.
///
/// Serializes as `{"a": .., "b": ..}`, which is also the shape used by the
/// JSON ATN encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Interval {
    pub a: i32,
    pub b: i32,
}

impl Interval {
    /// Sentinel returned for "no interval" (e.g. source interval of an empty rule).
    pub const INVALID: Interval = Interval { a: -1, b: -2 };

    pub const fn new(a: i32, b: i32) -> Self {
        Self { a, b }
    }

    pub const fn single(v: i32) -> Self {
        Self { a: v, b: v }
    }

    /// Number of elements, 0 for inverted ranges.
    pub fn length(&self) -> usize {
        if self.b < self.a {
            0
        } else {
            (self.b as i64 - self.a as i64 + 1) as usize
        }
    }

    pub fn contains(&self, v: i32) -> bool {
        self.a <= v && v <= self.b
    }

    /// Does this start completely before `other`? Disjoint.
    pub fn starts_before_disjoint(&self, other: &Interval) -> bool {
        self.a < other.a && self.b < other.a
    }

    /// Does this start at or before `other`? Overlapping.
    pub fn starts_before_non_disjoint(&self, other: &Interval) -> bool {
        self.a <= other.a && self.b >= other.a
    }

    /// Does this start completely after `other`? Disjoint.
    pub fn starts_after_disjoint(&self, other: &Interval) -> bool {
        self.a > other.b
    }

    /// Does this start after `other`'s start but overlap it?
    pub fn starts_after_non_disjoint(&self, other: &Interval) -> bool {
        self.a > other.a && self.a <= other.b
    }

    pub fn disjoint(&self, other: &Interval) -> bool {
        self.starts_before_disjoint(other) || self.starts_after_disjoint(other)
    }

    /// Are both ranges next to each other with no gap and no overlap?
    pub fn adjacent(&self, other: &Interval) -> bool {
        self.a as i64 == other.b as i64 + 1 || self.b as i64 == other.a as i64 - 1
    }

    pub fn properly_contains(&self, other: &Interval) -> bool {
        other.a >= self.a && other.b <= self.b
    }

    /// Smallest interval covering both.
    pub fn union(&self, other: &Interval) -> Interval {
        Interval::new(self.a.min(other.a), self.b.max(other.b))
    }

    pub fn intersection(&self, other: &Interval) -> Interval {
        Interval::new(self.a.max(other.a), self.b.min(other.b))
    }

    /// `self - other`, assuming `other` does not split `self` in two.
    ///
    /// Returns `None` when nothing is left or when `other` is strictly inside.
    pub fn difference_not_properly_contained(&self, other: &Interval) -> Option<Interval> {
        if other.starts_before_non_disjoint(self) {
            // other.a to left of self.a (or same)
            Some(Interval::new(self.a.max(other.b + 1), self.b))
        } else if other.starts_after_non_disjoint(self) {
            // other.a to right of self.a
            Some(Interval::new(self.a, other.a - 1))
        } else {
            None
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.a, self.b)
    }
}
