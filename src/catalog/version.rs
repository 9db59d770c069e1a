//! Version ordering
//!
//! Catalog versions are free-form strings ("1.0", "0.2.1-2", "2.4.0-rc1").
//! They are compared segment by segment on '.', '-' and '+': numeric
//! segments numerically, anything else lexically, and a version with more
//! segments wins over its own prefix.

use std::cmp::Ordering;

fn segments(version: &str) -> impl Iterator<Item = &str> {
    version.split(['.', '-', '+']).filter(|s| !s.is_empty())
}

fn compare_segment(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        // A release segment sorts after a pre-release tag like "rc1"
        (Ok(_), Err(_)) => Ordering::Greater,
        (Err(_), Ok(_)) => Ordering::Less,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Compare two version strings
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let mut left = segments(a);
    let mut right = segments(b);

    loop {
        match (left.next(), right.next()) {
            (Some(x), Some(y)) => match compare_segment(x, y) {
                Ordering::Equal => {}
                other => return other,
            },
            (Some(_), None) => return Ordering::Greater,
            (None, Some(_)) => return Ordering::Less,
            (None, None) => return a.cmp(b),
        }
    }
}

/// Greatest version in `versions`
pub fn latest<'a, I>(versions: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    versions.into_iter().max_by(|a, b| compare_versions(a, b))
}
