//! Semantic-version ordering for release tags.
//!
//! Release tags in the wild are looser than strict semver (`v1.2`,
//! `nightly-2024`), so comparison works on whatever is there: the
//! dot-separated core compares component-by-component, numerically when both
//! sides are numeric, and a pre-release suffix after `-` sorts below the
//! plain release.

use std::cmp::Ordering;

/// Compare two release tags by semantic-version precedence.
///
/// A leading `v` or `V` is ignored.
pub fn compare(a: &str, b: &str) -> Ordering {
    let (core_a, pre_a) = split_tag(a);
    let (core_b, pre_b) = split_tag(b);

    let core = compare_components(core_a, core_b);
    if core != Ordering::Equal {
        return core;
    }
    match (pre_a, pre_b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => compare_components(x, y),
    }
}

fn split_tag(tag: &str) -> (&str, Option<&str>) {
    let tag = tag
        .strip_prefix('v')
        .or_else(|| tag.strip_prefix('V'))
        .unwrap_or(tag);
    match tag.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (tag, None),
    }
}

fn compare_components(a: &str, b: &str) -> Ordering {
    let mut xs = a.split('.');
    let mut ys = b.split('.');
    loop {
        match (xs.next(), ys.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                // Numeric components compare numerically and sort below
                // alphanumeric ones, per semver precedence.
                let ord = match (x.parse::<u64>(), y.parse::<u64>()) {
                    (Ok(nx), Ok(ny)) => nx.cmp(&ny),
                    (Ok(_), Err(_)) => Ordering::Less,
                    (Err(_), Ok(_)) => Ordering::Greater,
                    (Err(_), Err(_)) => x.cmp(y),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}
