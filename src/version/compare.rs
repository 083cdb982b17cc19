//! Dotted numeric version comparison
//!
//! Versions are compared on their first three `.`-separated segments.
//! A segment that is missing or not a number counts as `0`, so `"1.2"`
//! equals `"1.2.0"` and `"1.x.3"` equals `"1.0.3"`.

use std::cmp::Ordering;

/// Compare two dotted versions segment by segment.
///
/// `Less`, `Equal` and `Greater` play the role of -1, 0 and 1.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    segments(a).cmp(&segments(b))
}

/// Returns true if `candidate` is strictly newer than `current`
pub fn is_older(current: &str, candidate: &str) -> bool {
    compare_versions(current, candidate) == Ordering::Less
}

fn segments(version: &str) -> [u64; 3] {
    let mut parts = version
        .split('.')
        .map(|part| part.trim().parse::<u64>().unwrap_or(0));
    [
        parts.next().unwrap_or(0),
        parts.next().unwrap_or(0),
        parts.next().unwrap_or(0),
    ]
}
