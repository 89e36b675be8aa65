//! Ordering for release version strings.
//!
//! Release versions look like `go1.21.5`, `go1.22rc1`, or `go1.9`. Plain
//! string comparison sorts `go1.9` above `go1.10`, so versions are split
//! into alternating digit and non-digit runs: digit runs compare
//! numerically, everything else byte-wise.

use std::cmp::Ordering;

/// A single run of a version string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Number(&'a str),
    Text(&'a str),
}

impl Ord for Token<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => compare_digits(a, b),
            // A `.` separator outranks a pre-release marker at the same
            // position: `go1.21.0` > `go1.21rc2`.
            (Self::Text(a), Self::Text(b)) => match (*a == ".", *b == ".") {
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                _ => a.cmp(b),
            },
            (Self::Number(_), Self::Text(_)) => Ordering::Greater,
            (Self::Text(_), Self::Number(_)) => Ordering::Less,
        }
    }
}

impl Token<'_> {
    /// Whether this run marks a pre-release (`rc`, `beta`).
    fn is_prerelease(self) -> bool {
        matches!(self, Self::Text(text) if text != ".")
    }
}

impl PartialOrd for Token<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compare two ASCII digit strings by numeric value without parsing, so
/// arbitrarily long segments never overflow.
fn compare_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Split a version into digit and non-digit runs.
fn tokens(version: &str) -> impl Iterator<Item = Token<'_>> {
    let mut rest = version;
    std::iter::from_fn(move || {
        let first = rest.chars().next()?;
        let numeric = first.is_ascii_digit();
        let end = rest
            .find(|c: char| c.is_ascii_digit() != numeric)
            .unwrap_or(rest.len());
        let (run, tail) = rest.split_at(end);
        rest = tail;
        Some(if numeric {
            Token::Number(run)
        } else {
            Token::Text(run)
        })
    })
}

/// Compare two version strings segment by segment.
///
/// When one version is a prefix of the other, the shorter one sorts lower
/// (`go1.21` < `go1.21.1`) unless the longer one continues with a
/// pre-release marker (`go1.21` > `go1.21rc1`).
///
/// # Examples
///
/// ```
/// use std::cmp::Ordering;
/// use getgo::artefact::version::compare_versions;
///
/// assert_eq!(compare_versions("go1.10", "go1.9"), Ordering::Greater);
/// assert_eq!(compare_versions("go1.21.0", "go1.21.0"), Ordering::Equal);
/// ```
#[must_use]
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let mut left = tokens(a);
    let mut right = tokens(b);
    loop {
        let ordering = match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(tail)) if tail.is_prerelease() => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (Some(tail), None) if tail.is_prerelease() => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(x), Some(y)) => x.cmp(&y),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
}

/// Normalize a user-supplied version to the index's `go`-prefixed form.
///
/// # Examples
///
/// ```
/// use getgo::artefact::version::canonical_version;
///
/// assert_eq!(canonical_version("1.21.0"), "go1.21.0");
/// assert_eq!(canonical_version("go1.21.0"), "go1.21.0");
/// ```
#[must_use]
pub fn canonical_version(version: &str) -> String {
    let trimmed = version.trim();
    if trimmed.starts_with("go") {
        trimmed.to_owned()
    } else {
        format!("go{trimmed}")
    }
}
