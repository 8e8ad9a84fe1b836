use crate::interval::Interval;
use crate::interval_set::{IntervalSet, IntervalSetError};
use crate::token;
use crate::vocabulary::Vocabulary;

fn set(ranges: &[(i32, i32)]) -> IntervalSet {
    ranges.iter().map(|&(a, b)| Interval::new(a, b)).collect()
}

#[test]
fn add_merges_overlapping_and_adjacent() {
    let mut s = IntervalSet::new();
    s.add_range(10, 20).unwrap();
    s.add_range(1, 3).unwrap();
    s.add_range(4, 5).unwrap();
    s.add_range(30, 40).unwrap();

    assert_eq!(s.intervals(), &[Interval::new(1, 5), Interval::new(10, 20), Interval::new(30, 40)]);

    // bridges the two upper ranges
    s.add_range(15, 35).unwrap();
    assert_eq!(s.intervals(), &[Interval::new(1, 5), Interval::new(10, 40)]);
}

#[test]
fn add_spanning_many_collapses_to_one() {
    let mut s = set(&[(1, 2), (5, 6), (9, 10), (20, 21)]);
    s.add_range(0, 15).unwrap();
    assert_eq!(s.intervals(), &[Interval::new(0, 15), Interval::new(20, 21)]);
}

#[test]
fn add_ignores_inverted_interval() {
    let mut s = IntervalSet::new();
    s.add_range(5, 3).unwrap();
    assert!(s.is_nil());
}

#[test]
fn readonly_rejects_mutation() {
    let mut s = IntervalSet::of(3);
    s.set_readonly(true).unwrap();

    assert_eq!(s.add(4), Err(IntervalSetError::ReadOnly));
    assert_eq!(s.remove(3), Err(IntervalSetError::ReadOnly));
    assert_eq!(s.clear(), Err(IntervalSetError::ReadOnly));
    assert_eq!(s.set_readonly(false), Err(IntervalSetError::ReadOnly));
    assert_eq!(s.to_list(), vec![3]);
}

#[test]
fn readonly_does_not_affect_equality() {
    let mut frozen = IntervalSet::of_range(1, 4);
    frozen.set_readonly(true).unwrap();
    assert_eq!(frozen, IntervalSet::of_range(1, 4));
}

#[test]
fn remove_edges_and_middle() {
    let mut s = IntervalSet::of_range(1, 10);
    s.remove(1).unwrap();
    s.remove(10).unwrap();
    s.remove(5).unwrap();
    assert_eq!(s.intervals(), &[Interval::new(2, 4), Interval::new(6, 9)]);

    s.remove(42).unwrap();
    s.remove(0).unwrap();
    assert_eq!(s.len(), 7);

    let mut single = IntervalSet::of(7);
    single.remove(7).unwrap();
    assert!(single.is_nil());
}

#[test]
fn subtract_splits_and_trims() {
    let left = set(&[(1, 10), (20, 30)]);
    let right = set(&[(3, 4), (8, 22), (30, 30)]);

    let diff = left.subtract(&right);
    assert_eq!(
        diff.intervals(),
        &[Interval::new(1, 2), Interval::new(5, 7), Interval::new(23, 29)]
    );
}

#[test]
fn subtract_everything_is_empty() {
    let left = set(&[(1, 3), (5, 7)]);
    let right = IntervalSet::of_range(0, 100);
    assert!(left.subtract(&right).is_nil());
    assert_eq!(left.subtract(&IntervalSet::new()), left);
}

#[test]
fn and_intersects_overlaps() {
    let a = set(&[(0, 115), (200, 300)]);
    let b = set(&[(115, 200), (250, 260), (299, 400)]);

    let both = a.and(&b);
    assert_eq!(
        both.intervals(),
        &[
            Interval::new(115, 115),
            Interval::new(200, 200),
            Interval::new(250, 260),
            Interval::new(299, 300),
        ]
    );
    assert_eq!(both, b.and(&a));
}

#[test]
fn or_and_complement() {
    let a = set(&[(1, 2)]);
    let b = set(&[(3, 3), (8, 9)]);
    let union = a.or(&b);
    assert_eq!(union.intervals(), &[Interval::new(1, 3), Interval::new(8, 9)]);

    let rest = union.complement_range(0, 10);
    assert_eq!(
        rest.intervals(),
        &[Interval::new(0, 0), Interval::new(4, 7), Interval::new(10, 10)]
    );

    // x ∪ ¬x covers the universe, x ∩ ¬x is empty
    assert_eq!(union.or(&rest), IntervalSet::of_range(0, 10));
    assert!(union.and(&rest).is_nil());
}

#[test]
fn or_of_frozen_sets_is_mutable() {
    let mut frozen = IntervalSet::of(1);
    frozen.set_readonly(true).unwrap();
    let mut result = frozen.or(&IntervalSet::of(2));
    result.add(3).unwrap();
    assert_eq!(result.to_list(), vec![1, 2, 3]);
}

#[test]
fn element_queries() {
    let s = set(&[(-1, -1), (4, 6)]);
    assert!(s.contains(token::EOF));
    assert!(s.contains(5));
    assert!(!s.contains(3));
    assert!(!s.contains(7));
    assert_eq!(s.len(), 4);
    assert_eq!(s.min_element(), Some(-1));
    assert_eq!(s.max_element(), Some(6));
    assert_eq!(s.single_element(), None);
    assert_eq!(IntervalSet::of(9).single_element(), Some(9));
    assert_eq!(IntervalSet::new().min_element(), None);
}

#[test]
fn display_numeric() {
    assert_eq!(IntervalSet::new().to_string(), "{}");
    assert_eq!(IntervalSet::of(5).to_string(), "5");
    assert_eq!(set(&[(-1, -1), (1, 3), (5, 5)]).to_string(), "{<EOF>, 1..3, 5}");
}

#[test]
fn display_chars() {
    let s = set(&[(97, 99), (120, 120)]);
    assert_eq!(s.to_char_string(), "{'a'..'c', 'x'}");
}

#[test]
fn display_with_vocabulary() {
    let vocab = Vocabulary::new(
        vec![None, Some("'+'".to_string())],
        vec![None, None, Some("ID".to_string())],
    );
    let s = set(&[(-1, -1), (1, 2)]);
    assert_eq!(s.to_string_with(&vocab), "{<EOF>, '+', ID}");
}

#[test]
fn complete_char_set_is_frozen() {
    let all = IntervalSet::complete_char_set();
    assert!(all.is_readonly());
    assert!(all.contains(0x10FFFF));
    assert!(!all.contains(token::EOF));
}
