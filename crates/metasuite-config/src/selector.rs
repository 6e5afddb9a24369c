//! Selection of the one `package` section that applies to a package.
//!
//! Each candidate is gated twice: by the constraint in its own header,
//! evaluated against the package's declared version, and by the constraints
//! in its `depends` entry, evaluated against the versions the suite declares
//! for those dependencies. Every rejection is logged; exactly one candidate
//! must survive.

use std::fmt;

use metasuite_common::constants::DEPENDS_KEY;
use metasuite_common::error::{MetasuiteError, Result};

use crate::constraint::Constraint;
use crate::section::Section;
use crate::version::Version;

/// Declared package versions of a suite, in package list order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageList {
    entries: Vec<(String, String)>,
}

impl PackageList {
    /// Builds a package list from `(name, version)` pairs.
    pub fn new<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Reads a `packagelist` section.
    #[must_use]
    pub fn from_section(section: &Section) -> Self {
        Self::new(section.iter())
    }

    /// Declared version of `package`.
    #[must_use]
    pub fn version_of(&self, package: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == package)
            .map(|(_, version)| version.as_str())
    }

    /// Iterates `(package, version)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of packages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One entry of a `depends` field: `<name> [<constraint>]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Name of the package depended upon.
    pub name: String,
    /// Optional gate on that package's declared version.
    pub constraint: Option<Constraint>,
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(constraint) = &self.constraint {
            write!(f, " {constraint}")?;
        }
        Ok(())
    }
}

/// Parses a comma-separated `depends` value. Empty entries are ignored.
///
/// # Errors
///
/// Returns [`MetasuiteError::Parse`] if a constraint is malformed.
pub fn parse_depends(text: &str) -> Result<Vec<Dependency>> {
    text.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (name, constraint) = entry
                .split_once(char::is_whitespace)
                .map_or((entry, ""), |(name, tail)| (name, tail.trim()));
            Ok(Dependency {
                name: name.to_owned(),
                constraint: if constraint.is_empty() {
                    None
                } else {
                    Some(Constraint::parse(constraint)?)
                },
            })
        })
        .collect()
}

enum Verdict {
    Accepted(&'static str),
    Rejected(String),
}

fn judge(section: &Section, subject: &Version, packages: &PackageList) -> Result<Verdict> {
    if let Some(constraint) = &section.header.constraint {
        if !constraint.matches(subject) {
            return Ok(Verdict::Rejected(format!(
                "version {subject} does not satisfy \"{constraint}\""
            )));
        }
    }

    let Some(depends) = section.get(DEPENDS_KEY) else {
        return Ok(Verdict::Accepted("no deps"));
    };

    for dep in parse_depends(depends)? {
        let version =
            packages
                .version_of(&dep.name)
                .ok_or_else(|| MetasuiteError::UnknownDependency {
                    section: section.header.to_string(),
                    dependency: dep.name.clone(),
                })?;
        if let Some(constraint) = &dep.constraint {
            if !constraint.matches(&Version::parse(version)) {
                return Ok(Verdict::Rejected(format!(
                    "dependency {} {version} does not satisfy \"{constraint}\"",
                    dep.name
                )));
            }
        }
    }

    Ok(Verdict::Accepted("consistent dependencies"))
}

/// Picks the single section among `candidates` that applies to `package`
/// at `version`, given the versions of the rest of the suite.
///
/// # Errors
///
/// - [`MetasuiteError::UnknownPackage`] if `candidates` is empty.
/// - [`MetasuiteError::UnknownDependency`] if a `depends` entry names a
///   package missing from `packages`.
/// - [`MetasuiteError::AmbiguousOrNoSection`] if zero or several candidates
///   survive, listing all survivors.
pub fn select_section<'a>(
    package: &str,
    version: &str,
    packages: &PackageList,
    candidates: impl IntoIterator<Item = &'a Section>,
) -> Result<&'a Section> {
    let subject = Version::parse(version);
    let mut seen = 0_usize;
    let mut matching: Vec<&'a Section> = Vec::new();

    for section in candidates {
        seen += 1;
        match judge(section, &subject, packages)? {
            Verdict::Accepted(why) => {
                tracing::debug!(
                    package,
                    version,
                    section = %section.header,
                    "accepting section ({why})"
                );
                matching.push(section);
            }
            Verdict::Rejected(why) => {
                tracing::debug!(
                    package,
                    version,
                    section = %section.header,
                    "rejecting section: {why}"
                );
            }
        }
    }

    if seen == 0 {
        return Err(MetasuiteError::UnknownPackage {
            package: package.to_owned(),
        });
    }

    match matching.as_slice() {
        [only] => Ok(*only),
        _ => Err(MetasuiteError::AmbiguousOrNoSection {
            package: package.to_owned(),
            version: version.to_owned(),
            count: matching.len(),
            candidates: matching.iter().map(|s| s.header.to_string()).collect(),
        }),
    }
}
