//! Typed configuration sections.
//!
//! Section headers follow `<kind> <name> [<constraint>]`. They are parsed once,
//! when a section enters the store, into a [`SectionHeader`] so lookups never
//! re-split header text.

use std::fmt;
use std::str::FromStr;

use metasuite_common::error::{MetasuiteError, Result};

use crate::constraint::Constraint;

/// The role a section plays in a build description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    /// Build recipe for one package, optionally version-gated.
    Package,
    /// A named suite: tags plus references to defaults and a package list.
    Suite,
    /// Default values applied under every package of a suite.
    Defaults,
    /// Package name to version mapping.
    PackageList,
}

impl SectionKind {
    /// Keyword used in section headers.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Package => "package",
            Self::Suite => "suite",
            Self::Defaults => "defaults",
            Self::PackageList => "packagelist",
        }
    }
}

impl FromStr for SectionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "package" => Ok(Self::Package),
            "suite" => Ok(Self::Suite),
            "defaults" => Ok(Self::Defaults),
            "packagelist" => Ok(Self::PackageList),
            other => Err(format!(
                "unknown section kind \"{other}\" (expected package, suite, defaults, or packagelist)"
            )),
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed form of a section header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionHeader {
    /// Section kind.
    pub kind: SectionKind,
    /// Name used for lookup.
    pub name: String,
    /// Optional applicability gate.
    pub constraint: Option<Constraint>,
}

impl SectionHeader {
    /// Parses `<kind> <name> [<constraint>]`.
    ///
    /// # Errors
    ///
    /// Returns [`MetasuiteError::InvalidHeader`] for an unknown kind or a
    /// missing name, and [`MetasuiteError::Parse`] for a malformed constraint.
    pub fn parse(header: &str) -> Result<Self> {
        let invalid = |message: String| MetasuiteError::InvalidHeader {
            header: header.to_owned(),
            message,
        };

        let trimmed = header.trim();
        let (kind_text, rest) = trimmed
            .split_once(char::is_whitespace)
            .ok_or_else(|| invalid("expected \"<kind> <name> [<constraint>]\"".into()))?;
        let kind = kind_text.parse::<SectionKind>().map_err(invalid)?;

        let rest = rest.trim_start();
        let (name, constraint_text) = rest
            .split_once(char::is_whitespace)
            .map_or((rest, ""), |(name, tail)| (name, tail.trim()));

        let constraint = if constraint_text.is_empty() {
            None
        } else {
            Some(Constraint::parse(constraint_text)?)
        };

        Ok(Self {
            kind,
            name: name.to_owned(),
            constraint,
        })
    }
}

impl fmt::Display for SectionHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.name)?;
        if let Some(constraint) = &self.constraint {
            write!(f, " {constraint}")?;
        }
        Ok(())
    }
}

/// A section: typed header plus its entries in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Parsed header.
    pub header: SectionHeader,
    /// Raw `(key, value)` entries; keys are unique.
    pub entries: Vec<(String, String)>,
}

impl Section {
    /// Creates an empty section from header text.
    ///
    /// # Errors
    ///
    /// Returns an error if the header is malformed.
    pub fn new(header: &str) -> Result<Self> {
        Ok(Self {
            header: SectionHeader::parse(header)?,
            entries: Vec::new(),
        })
    }

    /// Creates a section from header text and entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the header is malformed.
    pub fn with_entries<K, V>(header: &str, entries: impl IntoIterator<Item = (K, V)>) -> Result<Self>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut section = Self::new(header)?;
        for (key, value) in entries {
            section.set(key, value);
        }
        Ok(section)
    }

    /// Sets `key`, replacing an earlier value in place.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Returns the raw value of `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the raw value of `key`, failing if absent.
    ///
    /// # Errors
    ///
    /// Returns [`MetasuiteError::MissingKey`] if the key is not present.
    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key).ok_or_else(|| MetasuiteError::MissingKey {
            section: self.header.to_string(),
            key: key.to_owned(),
        })
    }

    /// Iterates entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_header_without_constraint() {
        let header = SectionHeader::parse("suite nightly").expect("should parse");
        assert_eq!(header.kind, SectionKind::Suite);
        assert_eq!(header.name, "nightly");
        assert!(header.constraint.is_none());
    }

    #[test]
    fn parse_header_with_constraint() {
        let header =
            SectionHeader::parse("package root version >= 5.28 and version < 6").expect("parse");
        assert_eq!(header.kind, SectionKind::Package);
        assert_eq!(header.name, "root");
        assert_eq!(
            header.constraint.as_ref().map(Constraint::as_str),
            Some("version >= 5.28 and version < 6")
        );
        assert_eq!(
            header.to_string(),
            "package root version >= 5.28 and version < 6"
        );
    }

    #[test]
    fn parse_header_tolerates_extra_spaces() {
        let header = SectionHeader::parse("  package   gcc   version > 4 ").expect("parse");
        assert_eq!(header.name, "gcc");
        assert_eq!(header.to_string(), "package gcc version > 4");
    }

    #[test]
    fn reject_unknown_kind() {
        let err = SectionHeader::parse("recipe foo").expect_err("unknown kind");
        assert!(matches!(err, MetasuiteError::InvalidHeader { .. }));
    }

    #[test]
    fn reject_missing_name() {
        assert!(matches!(
            SectionHeader::parse("package"),
            Err(MetasuiteError::InvalidHeader { .. })
        ));
    }

    #[test]
    fn reject_malformed_constraint() {
        assert!(matches!(
            SectionHeader::parse("package foo version =< 1"),
            Err(MetasuiteError::Parse { .. })
        ));
    }

    #[test]
    fn set_replaces_in_place() {
        let mut section =
            Section::with_entries("defaults base", [("a", "1"), ("b", "2")]).expect("section");
        section.set("a", "3");
        let keys: Vec<&str> = section.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(section.get("a"), Some("3"));
    }

    #[test]
    fn require_names_section_and_key() {
        let section = Section::new("suite s").expect("section");
        let err = section.require("tags").expect_err("missing key");
        assert_eq!(err.to_string(), "section \"suite s\" has no \"tags\" entry");
    }
}
