//! Specificity ordering of route patterns.
//!
//! Route tables are sorted once with [`compare`] so that a linear scan finds
//! the most specific matching route first. The rules, in order:
//!
//! 1. patterns without a catch-all come first: `/foo` before `/$$rest`
//! 2. fewer dynamic segments come first: `/foo/bar` before `/foo/$bar`
//! 3. fewer segments come first: `/foo` before `/foo/bar`
//! 4. earlier literal segments come first: `/foo/$bar` before `/$foo/bar`
//! 5. more captures within a segment come first: `/$a-$b` before `/$a`
use std::cmp::Ordering;

/// Compares two route patterns by specificity, most specific first.
///
/// ```rust
/// use filerouter::compare;
///
/// let mut patterns = vec!["/$$rest", "/posts/$id", "/posts/new"];
/// patterns.sort_by(|a, b| compare(a, b));
/// assert_eq!(patterns, ["/posts/new", "/posts/$id", "/$$rest"]);
/// ```
pub fn compare(a: &str, b: &str) -> Ordering {
    let ordering = has_catch_all(a).cmp(&has_catch_all(b));
    if ordering != Ordering::Equal {
        return ordering;
    }

    let a_segments: Vec<&str> = a.split('/').collect();
    let b_segments: Vec<&str> = b.split('/').collect();

    let ordering = dynamic_count(&a_segments).cmp(&dynamic_count(&b_segments));
    if ordering != Ordering::Equal {
        return ordering;
    }

    let ordering = a_segments.len().cmp(&b_segments.len());
    if ordering != Ordering::Equal {
        return ordering;
    }

    for (a, b) in a_segments.iter().zip(&b_segments) {
        let ordering = is_dynamic(a).cmp(&is_dynamic(b));
        if ordering != Ordering::Equal {
            return ordering;
        }

        // reversed: more captures in the segment wins
        let ordering = captures(b).cmp(&captures(a));
        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    Ordering::Equal
}

/// True if the pattern ends in a `$$name` catch-all.
pub(crate) fn has_catch_all(pattern: &str) -> bool {
    match pattern.rfind("$$") {
        Some(i) => {
            let name = &pattern[i + 2..];
            !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
        }
        None => false,
    }
}

fn is_dynamic(segment: &str) -> bool {
    segment.contains('$')
}

fn dynamic_count(segments: &[&str]) -> usize {
    segments.iter().filter(|s| is_dynamic(s)).count()
}

fn captures(segment: &str) -> usize {
    segment.split('$').count()
}
