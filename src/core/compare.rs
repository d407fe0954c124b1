//! Comparison rules shared by predicates, sorting and structural equality
//!
//! Scalars are compared through their canonical rendering: numerically when
//! both sides parse as finite numbers, lexicographically otherwise.

use crate::core::value::{scalar_string, Container, Kind};
use serde_yaml::Value;
use std::cmp::Ordering;

/// Parse a rendered scalar as a finite number
pub fn as_number(text: &str) -> Option<f64> {
    if text.is_empty() {
        return None;
    }
    text.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Compare two rendered scalars: numeric if both parse, else by string
pub fn compare_scalars(left: &str, right: &str) -> Ordering {
    match (as_number(left), as_number(right)) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        _ => left.cmp(right),
    }
}

/// Structural equality using the scalar comparison rule at the leaves
///
/// Maps are equal when they hold the same keys with equal values, regardless
/// of order. Lists compare position by position. A map never equals a list.
pub fn loose_eq(left: &Value, right: &Value) -> bool {
    match (left.kind(), right.kind()) {
        (Kind::Scalar, Kind::Scalar) => match (scalar_string(left), scalar_string(right)) {
            (Some(a), Some(b)) => compare_scalars(&a, &b) == Ordering::Equal,
            _ => false,
        },
        (Kind::List, Kind::List) => {
            left.children().count() == right.children().count()
                && left
                    .children()
                    .zip(right.children())
                    .all(|((_, a), (_, b))| loose_eq(a, b))
        }
        (Kind::Map, Kind::Map) => {
            left.children().count() == right.children().count()
                && left.children().all(|(key, a)| {
                    right
                        .child(&key)
                        .map(|b| loose_eq(a, b))
                        .unwrap_or(false)
                })
        }
        _ => false,
    }
}

/// Natural ordering: digit runs compare by numeric value (`img2 < img10`)
pub fn natural_cmp(left: &str, right: &str) -> Ordering {
    let mut a = left.chars().peekable();
    let mut b = right.chars().peekable();

    loop {
        match (a.peek().copied(), b.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let run_a = take_digits(&mut a);
                let run_b = take_digits(&mut b);
                let ordering = compare_digit_runs(&run_a, &run_b);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            (Some(x), Some(y)) => {
                if x != y {
                    return x.cmp(&y);
                }
                a.next();
                b.next();
            }
        }
    }
}

fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.peek().copied() {
        if !c.is_ascii_digit() {
            break;
        }
        run.push(c);
        chars.next();
    }
    run
}

fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a_trim = a.trim_start_matches('0');
    let b_trim = b.trim_start_matches('0');
    a_trim
        .len()
        .cmp(&b_trim.len())
        .then_with(|| a_trim.cmp(b_trim))
        .then_with(|| a.len().cmp(&b.len()))
}
