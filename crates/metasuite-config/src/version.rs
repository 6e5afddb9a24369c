//! Release-aware version ordering.
//!
//! A version string is split into components at `.`, `-`, `_`, `+` and at
//! every digit/letter boundary. Numeric components compare as numbers of any
//! length, alphabetic ones compare case-insensitively. Zero components in
//! front of a letter run or at the end are insignificant, and a letter run
//! marks a pre-release: `1.0rc1 < 1.0 == 1.0.0 < 1.0.1`.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Component {
    /// Decimal digits with leading zeros removed (`"0"` for zero).
    Numeric(String),
    /// Lower-cased letter run.
    Alpha(String),
}

impl Component {
    fn numeric(digits: &str) -> Self {
        let trimmed = digits.trim_start_matches('0');
        Self::Numeric(if trimmed.is_empty() { "0" } else { trimmed }.to_owned())
    }

    fn is_zero(&self) -> bool {
        matches!(self, Self::Numeric(n) if n == "0")
    }

    /// Letters before the end of the version, numbers after it.
    const fn rank(this: Option<&Self>) -> u8 {
        match this {
            Some(Self::Alpha(_)) => 0,
            None => 1,
            Some(Self::Numeric(_)) => 2,
        }
    }
}

fn compare_components(a: Option<&Component>, b: Option<&Component>) -> Ordering {
    match (a, b) {
        (Some(Component::Numeric(x)), Some(Component::Numeric(y))) => {
            x.len().cmp(&y.len()).then_with(|| x.cmp(y))
        }
        (Some(Component::Alpha(x)), Some(Component::Alpha(y))) => x.cmp(y),
        _ => Component::rank(a).cmp(&Component::rank(b)),
    }
}

/// A parsed, totally ordered version.
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    components: Vec<Component>,
}

impl Version {
    /// Parses a version string. Every string is a valid version.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut components: Vec<Component> = Vec::new();
        let mut push = |run: &str, numeric: bool| {
            if run.is_empty() {
                return;
            }
            if numeric {
                components.push(Component::numeric(run));
            } else {
                while components.last().is_some_and(Component::is_zero) {
                    let _ = components.pop();
                }
                components.push(Component::Alpha(run.to_ascii_lowercase()));
            }
        };

        let mut start = 0;
        let mut run_numeric = false;
        for (idx, ch) in raw.char_indices() {
            if ch.is_ascii_digit() || ch.is_alphabetic() {
                let numeric = ch.is_ascii_digit();
                if idx > start && numeric != run_numeric {
                    push(&raw[start..idx], run_numeric);
                    start = idx;
                }
                run_numeric = numeric;
            } else {
                push(&raw[start..idx], run_numeric);
                start = idx + ch.len_utf8();
            }
        }
        push(&raw[start..], run_numeric);

        while components.last().is_some_and(Component::is_zero) {
            let _ = components.pop();
        }

        Self {
            raw: raw.to_owned(),
            components,
        }
    }

    /// Returns the text the version was parsed from.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        for idx in 0..len {
            let ord = compare_components(self.components.get(idx), other.components.get(idx));
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.components.hash(state);
    }
}

impl FromStr for Version {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s)
    }

    #[test]
    fn numeric_components_compare_as_numbers() {
        assert!(v("1.10") > v("1.9"));
        assert!(v("2.0") > v("1.99.99"));
        assert!(v("10") > v("9"));
    }

    #[test]
    fn trailing_zeros_are_insignificant() {
        assert_eq!(v("1.0"), v("1.0.0"));
        assert_eq!(v("1"), v("1.0"));
        assert!(v("1.0") < v("1.0.1"));
    }

    #[test]
    fn leading_zeros_are_insignificant() {
        assert_eq!(v("1.01"), v("1.1"));
    }

    #[test]
    fn prerelease_sorts_before_release() {
        assert!(v("1.0rc1") < v("1.0"));
        assert!(v("1.0a") < v("1.0b"));
        assert!(v("1.0rc1") < v("1.0rc2"));
        assert!(v("1.0.0rc1") < v("1.0.1"));
        assert_eq!(v("1.0rc1"), v("1.0.0rc1"));
    }

    #[test]
    fn separators_are_interchangeable() {
        assert_eq!(v("5.34-1"), v("5.34.1"));
        assert_eq!(v("2_6_1"), v("2.6.1"));
    }

    #[test]
    fn letters_compare_case_insensitively() {
        assert_eq!(v("1.0RC1"), v("1.0rc1"));
    }

    #[test]
    fn display_keeps_original_text() {
        assert_eq!(v("5.28.00a").to_string(), "5.28.00a");
        assert_eq!(v("5.28.00a").as_str(), "5.28.00a");
    }

    #[test]
    fn very_long_numbers_still_order() {
        assert!(v("1.123456789012345678901234567890") > v("1.99999999999999999999"));
    }

    #[test]
    fn sorting_is_total() {
        let mut versions = vec![v("1.0"), v("0.9"), v("1.0rc1"), v("1.0.1"), v("1.0b2")];
        versions.sort();
        let sorted: Vec<&str> = versions.iter().map(Version::as_str).collect();
        assert_eq!(sorted, vec!["0.9", "1.0b2", "1.0rc1", "1.0", "1.0.1"]);
    }
}
