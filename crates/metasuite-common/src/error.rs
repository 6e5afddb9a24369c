//! Unified error type for the metasuite workspace.
//!
//! Every failure in the resolver and the environment composer is a hard
//! failure: nothing is retried and nothing falls back to a default. The
//! variants carry enough context (package, section header, cycle path) to
//! diagnose a broken configuration without re-running it.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum MetasuiteError {
    /// A version constraint expression could not be parsed.
    #[error("malformed constraint \"{expression}\": {message}")]
    Parse {
        /// The offending expression text.
        expression: String,
        /// What the parser expected or found.
        message: String,
    },

    /// No `package` section exists for the named package.
    #[error("no package sections for package \"{package}\"")]
    UnknownPackage {
        /// Package that was looked up.
        package: String,
    },

    /// A `depends` entry names a package that is not in the package list.
    #[error("section \"{section}\" depends on \"{dependency}\", which is not in the package list")]
    UnknownDependency {
        /// Header of the section that declared the dependency.
        section: String,
        /// The missing dependency name.
        dependency: String,
    },

    /// Section selection left zero or several candidates.
    #[error(
        "got {count} package sections matching {package} {version} ({})",
        .candidates.join(", ")
    )]
    AmbiguousOrNoSection {
        /// Package being selected for.
        package: String,
        /// Declared version of the package.
        version: String,
        /// Number of surviving candidates.
        count: usize,
        /// Headers of every surviving candidate.
        candidates: Vec<String>,
    },

    /// A template references a key that is not defined.
    #[error("value of \"{key}\" references undefined placeholder {{{placeholder}}}")]
    UndefinedPlaceholder {
        /// Key whose value holds the reference.
        key: String,
        /// The undefined placeholder name.
        placeholder: String,
    },

    /// Interpolation did not reach a fixed point within the pass budget.
    #[error("interpolation did not converge after {passes} passes (keys: {})", .keys.join(", "))]
    InterpolationOverflow {
        /// Number of passes attempted.
        passes: usize,
        /// Keys still changing or still holding unresolved placeholders.
        keys: Vec<String>,
    },

    /// A template string has unbalanced braces.
    #[error("malformed template \"{template}\": {message}")]
    MalformedTemplate {
        /// The offending template text.
        template: String,
        /// Description of the problem.
        message: String,
    },

    /// The dependency graph contains a cycle.
    #[error("cyclic dependency: {}", .cycle.join(" -> "))]
    CyclicDependency {
        /// Package names along the cycle, first name repeated at the end.
        cycle: Vec<String>,
    },

    /// The dependency graph was assembled inconsistently.
    #[error("invalid dependency graph: {message}")]
    Graph {
        /// Description of the inconsistency.
        message: String,
    },

    /// An environment entry has a value its key cannot hold.
    #[error("invalid environment entry \"{key}\": {message}")]
    InvalidEnvironment {
        /// The offending key.
        key: String,
        /// Description of the problem.
        message: String,
    },

    /// A section header does not follow `<kind> <name> [<constraint>]`.
    #[error("invalid section header \"{header}\": {message}")]
    InvalidHeader {
        /// The raw header text.
        header: String,
        /// Description of the problem.
        message: String,
    },

    /// A referenced section does not exist.
    #[error("section \"{kind} {name}\" not found")]
    MissingSection {
        /// Kind of the missing section.
        kind: String,
        /// Name of the missing section.
        name: String,
    },

    /// A required key is absent from a section.
    #[error("section \"{section}\" has no \"{key}\" entry")]
    MissingKey {
        /// Header of the section.
        section: String,
        /// The missing key.
        key: String,
    },

    /// The section text could not be read.
    #[error("syntax error on line {line}: {message}")]
    Syntax {
        /// One-based line number.
        line: usize,
        /// Description of the problem.
        message: String,
    },

    /// Resolution of one package failed; the whole suite is aborted.
    #[error("package {package} {version}: {source}")]
    Package {
        /// Package being resolved.
        package: String,
        /// Its declared version.
        version: String,
        /// The originating failure.
        source: Box<MetasuiteError>,
    },

    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

impl MetasuiteError {
    /// Wraps `self` with the package it was raised for.
    #[must_use]
    pub fn in_package(self, package: impl Into<String>, version: impl Into<String>) -> Self {
        Self::Package {
            package: package.into(),
            version: version.into(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, looking through [`MetasuiteError::Package`].
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::Package { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, MetasuiteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambiguous_message_lists_candidates() {
        let err = MetasuiteError::AmbiguousOrNoSection {
            package: "foo".into(),
            version: "1.0".into(),
            count: 2,
            candidates: vec!["package foo a".into(), "package foo b".into()],
        };
        assert_eq!(
            err.to_string(),
            "got 2 package sections matching foo 1.0 (package foo a, package foo b)"
        );
    }

    #[test]
    fn root_cause_unwraps_package_context() {
        let err = MetasuiteError::UnknownPackage {
            package: "bar".into(),
        }
        .in_package("bar", "2.0");
        assert!(err.to_string().starts_with("package bar 2.0: "));
        assert!(matches!(
            err.root_cause(),
            MetasuiteError::UnknownPackage { package } if package == "bar"
        ));
    }

    #[test]
    fn cycle_message_joins_path() {
        let err = MetasuiteError::CyclicDependency {
            cycle: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "cyclic dependency: a -> b -> a");
    }

    #[test]
    fn undefined_placeholder_shows_braces() {
        let err = MetasuiteError::UndefinedPlaceholder {
            key: "url".into(),
            placeholder: "mirror".into(),
        };
        assert_eq!(
            err.to_string(),
            "value of \"url\" references undefined placeholder {mirror}"
        );
    }
}
