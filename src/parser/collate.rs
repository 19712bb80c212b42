//! Human-friendly string ordering for paths and file names.
//!
//! Follows the root-locale collation order for ASCII: whitespace, then
//! punctuation and symbols, then digits, then letters. Letters compare
//! case-insensitively first, lowercase wins a case-only tie, and raw code
//! points settle anything left.

use std::cmp::Ordering;

/// Root collation order of ASCII punctuation and symbols.
const PUNCTUATION: &str = "_-,;:!?.'\"()[]{}@*/\\&#%`^+<=>|~$";

pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    folded_cmp(a, b)
        .then_with(|| case_cmp(a, b))
        .then_with(|| a.cmp(b))
}

/// Primary sort key of one character: (group, weight).
fn primary(c: char) -> (u8, u32) {
    if c.is_whitespace() {
        return (0, c as u32);
    }
    if let Some(index) = PUNCTUATION.find(c) {
        return (1, index as u32);
    }
    if c.is_ascii_digit() {
        return (2, c as u32);
    }
    if c.is_alphabetic() {
        return (3, c as u32);
    }
    if c.is_ascii() {
        return (1, PUNCTUATION.len() as u32 + c as u32);
    }
    (4, c as u32)
}

fn folded_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().flat_map(char::to_lowercase).map(primary);
    let mut right = b.chars().flat_map(char::to_lowercase).map(primary);
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l != r => return l.cmp(&r),
            _ => {}
        }
    }
}

// First position where the two differ only by case decides: lowercase first.
fn case_cmp(a: &str, b: &str) -> Ordering {
    for (l, r) in a.chars().zip(b.chars()) {
        if l == r {
            continue;
        }
        match (l.is_lowercase(), r.is_lowercase()) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => {}
        }
    }
    Ordering::Equal
}
