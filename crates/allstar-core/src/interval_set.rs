//! Sets of integers stored as sorted, disjoint, non-adjacent ranges.
//!
//! Token types, character classes, and lookahead sets all use this
//! representation. Sets are small in practice (one to a handful of ranges),
//! so every operation is a linear scan.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::interval::Interval;
use crate::token;
use crate::utils::char_literal;
use crate::vocabulary::Vocabulary;

/// Errors raised by mutating a frozen set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntervalSetError {
    #[error("can't alter readonly IntervalSet")]
    ReadOnly,
}

/// Ordered list of disjoint, non-adjacent intervals.
///
/// Equality and hashing look only at the elements; the read-only flag is a
/// usage guard, not part of the value.
#[derive(Clone, Debug, Default)]
pub struct IntervalSet {
    intervals: Vec<Interval>,
    readonly: bool,
}

impl IntervalSet {
    pub const fn new() -> Self {
        Self {
            intervals: Vec::new(),
            readonly: false,
        }
    }

    pub fn of(el: i32) -> Self {
        Self::of_range(el, el)
    }

    pub fn of_range(a: i32, b: i32) -> Self {
        let mut set = Self::new();
        set.insert(Interval::new(a, b));
        set
    }

    /// Every Unicode code point, frozen.
    pub fn complete_char_set() -> Self {
        let mut set = Self::of_range(token::MIN_CHAR_VALUE, token::MAX_CHAR_VALUE);
        set.readonly = true;
        set
    }

    pub fn is_readonly(&self) -> bool {
        self.readonly
    }

    /// Freezes or thaws the set. A frozen set cannot be thawed.
    pub fn set_readonly(&mut self, readonly: bool) -> Result<(), IntervalSetError> {
        if self.readonly && !readonly {
            return Err(IntervalSetError::ReadOnly);
        }
        self.readonly = readonly;
        Ok(())
    }

    /// Freezes the set. Infallible form of `set_readonly(true)`.
    pub fn freeze(&mut self) {
        self.readonly = true;
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn add(&mut self, el: i32) -> Result<(), IntervalSetError> {
        self.add_range(el, el)
    }

    pub fn add_range(&mut self, a: i32, b: i32) -> Result<(), IntervalSetError> {
        self.add_interval(Interval::new(a, b))
    }

    pub fn add_interval(&mut self, interval: Interval) -> Result<(), IntervalSetError> {
        self.ensure_mutable()?;
        self.insert(interval);
        Ok(())
    }

    pub fn add_all(&mut self, other: &IntervalSet) -> Result<(), IntervalSetError> {
        self.ensure_mutable()?;
        for &interval in &other.intervals {
            self.insert(interval);
        }
        Ok(())
    }

    pub fn clear(&mut self) -> Result<(), IntervalSetError> {
        self.ensure_mutable()?;
        self.intervals.clear();
        Ok(())
    }

    pub fn remove(&mut self, el: i32) -> Result<(), IntervalSetError> {
        self.ensure_mutable()?;
        let Some(i) = self.intervals.iter().position(|r| r.b >= el) else {
            return Ok(());
        };
        let r = self.intervals[i];
        if el < r.a {
            return Ok(());
        }
        match (el == r.a, el == r.b) {
            (true, true) => {
                self.intervals.remove(i);
            }
            (true, false) => self.intervals[i].a += 1,
            (false, true) => self.intervals[i].b -= 1,
            (false, false) => {
                self.intervals[i].b = el - 1;
                self.intervals.insert(i + 1, Interval::new(el + 1, r.b));
            }
        }
        Ok(())
    }

    /// Union of both sets as a fresh, mutable set.
    pub fn or(&self, other: &IntervalSet) -> IntervalSet {
        let mut result = IntervalSet {
            intervals: self.intervals.clone(),
            readonly: false,
        };
        for &interval in &other.intervals {
            result.insert(interval);
        }
        result
    }

    /// Intersection of both sets.
    pub fn and(&self, other: &IntervalSet) -> IntervalSet {
        let mut result = IntervalSet::new();
        let (mut i, mut j) = (0, 0);
        while i < self.intervals.len() && j < other.intervals.len() {
            let mine = self.intervals[i];
            let theirs = other.intervals[j];
            let overlap = mine.intersection(&theirs);
            if overlap.a <= overlap.b {
                result.intervals.push(overlap);
            }
            // advance whichever range ends first; the other may still overlap
            if mine.b < theirs.b {
                i += 1;
            } else {
                j += 1;
            }
        }
        result
    }

    /// Elements of `self` not in `right`.
    pub fn subtract(&self, right: &IntervalSet) -> IntervalSet {
        let mut result = self.intervals.clone();
        let (mut ri, mut si) = (0, 0);
        while ri < result.len() && si < right.intervals.len() {
            let current = result[ri];
            let cut = right.intervals[si];

            if cut.b < current.a {
                si += 1;
                continue;
            }
            if cut.a > current.b {
                ri += 1;
                continue;
            }

            let before = (cut.a > current.a).then(|| Interval::new(current.a, cut.a - 1));
            let after = (cut.b < current.b).then(|| Interval::new(cut.b + 1, current.b));
            match (before, after) {
                (Some(before), Some(after)) => {
                    result[ri] = before;
                    result.insert(ri + 1, after);
                    ri += 1;
                    si += 1;
                }
                (Some(before), None) => {
                    result[ri] = before;
                    ri += 1;
                }
                (None, Some(after)) => {
                    result[ri] = after;
                    si += 1;
                }
                (None, None) => {
                    result.remove(ri);
                }
            }
        }
        IntervalSet {
            intervals: result,
            readonly: false,
        }
    }

    /// Elements of `vocabulary` not in `self`.
    pub fn complement(&self, vocabulary: &IntervalSet) -> IntervalSet {
        vocabulary.subtract(self)
    }

    pub fn complement_range(&self, min: i32, max: i32) -> IntervalSet {
        self.complement(&IntervalSet::of_range(min, max))
    }

    pub fn contains(&self, el: i32) -> bool {
        for r in &self.intervals {
            if el < r.a {
                break;
            }
            if el <= r.b {
                return true;
            }
        }
        false
    }

    /// Empty set (ANTLR calls this "nil").
    pub fn is_nil(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Number of elements, not intervals.
    pub fn len(&self) -> usize {
        self.intervals.iter().map(Interval::length).sum()
    }

    pub fn min_element(&self) -> Option<i32> {
        self.intervals.first().map(|r| r.a)
    }

    pub fn max_element(&self) -> Option<i32> {
        self.intervals.last().map(|r| r.b)
    }

    pub fn single_element(&self) -> Option<i32> {
        match self.intervals.as_slice() {
            [r] if r.a == r.b => Some(r.a),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        self.intervals.iter().flat_map(|r| r.a..=r.b)
    }

    pub fn to_list(&self) -> Vec<i32> {
        self.iter().collect()
    }

    /// Renders elements as quoted characters: `{'a'..'c', 'x'}`.
    pub fn to_char_string(&self) -> String {
        self.render(|r, out| {
            if r.a == r.b {
                out.push(if r.a == token::EOF {
                    "<EOF>".to_string()
                } else {
                    char_literal(r.a)
                });
            } else {
                out.push(format!("{}..{}", char_literal(r.a), char_literal(r.b)));
            }
        })
    }

    /// Renders elements by token display name, expanding ranges.
    pub fn to_string_with(&self, vocabulary: &Vocabulary) -> String {
        self.render(|r, out| {
            for t in r.a..=r.b {
                out.push(element_name(vocabulary, t));
            }
        })
    }

    fn render(&self, mut each: impl FnMut(&Interval, &mut Vec<String>)) -> String {
        if self.intervals.is_empty() {
            return "{}".to_string();
        }
        let mut parts = Vec::new();
        for r in &self.intervals {
            each(r, &mut parts);
        }
        let body = parts.join(", ");
        if self.len() > 1 {
            format!("{{{body}}}")
        } else {
            body
        }
    }

    fn ensure_mutable(&self) -> Result<(), IntervalSetError> {
        if self.readonly {
            return Err(IntervalSetError::ReadOnly);
        }
        Ok(())
    }

    /// Inserts keeping the list sorted, merging overlapping or adjacent ranges.
    fn insert(&mut self, addition: Interval) {
        if addition.b < addition.a {
            return;
        }
        let mut i = 0;
        while i < self.intervals.len() {
            let r = self.intervals[i];
            if addition == r {
                return;
            }
            if addition.adjacent(&r) || !addition.disjoint(&r) {
                let mut bigger = addition.union(&r);
                self.intervals[i] = bigger;
                while i + 1 < self.intervals.len() {
                    let next = self.intervals[i + 1];
                    if !bigger.adjacent(&next) && bigger.disjoint(&next) {
                        break;
                    }
                    bigger = bigger.union(&next);
                    self.intervals.remove(i + 1);
                    self.intervals[i] = bigger;
                }
                return;
            }
            if addition.starts_before_disjoint(&r) {
                self.intervals.insert(i, addition);
                return;
            }
            i += 1;
        }
        self.intervals.push(addition);
    }
}

fn element_name(vocabulary: &Vocabulary, t: i32) -> String {
    match t {
        token::EOF => "<EOF>".to_string(),
        token::EPSILON => "<EPSILON>".to_string(),
        _ => vocabulary.display_name(t),
    }
}

impl PartialEq for IntervalSet {
    fn eq(&self, other: &Self) -> bool {
        self.intervals == other.intervals
    }
}

impl Eq for IntervalSet {}

impl Hash for IntervalSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.intervals.hash(state);
    }
}

impl From<Interval> for IntervalSet {
    fn from(interval: Interval) -> Self {
        let mut set = IntervalSet::new();
        set.insert(interval);
        set
    }
}

impl FromIterator<i32> for IntervalSet {
    fn from_iter<T: IntoIterator<Item = i32>>(iter: T) -> Self {
        let mut set = IntervalSet::new();
        for el in iter {
            set.insert(Interval::single(el));
        }
        set
    }
}

impl FromIterator<Interval> for IntervalSet {
    fn from_iter<T: IntoIterator<Item = Interval>>(iter: T) -> Self {
        let mut set = IntervalSet::new();
        for interval in iter {
            set.insert(interval);
        }
        set
    }
}

impl fmt::Display for IntervalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.render(|r, out| {
            if r.a == r.b {
                out.push(if r.a == token::EOF {
                    "<EOF>".to_string()
                } else {
                    r.a.to_string()
                });
            } else {
                out.push(format!("{}..{}", r.a, r.b));
            }
        });
        f.write_str(&text)
    }
}
