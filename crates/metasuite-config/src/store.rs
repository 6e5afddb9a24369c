//! Ordered store of configuration sections.
//!
//! Sections keep the order in which they were first inserted. Inserting a
//! section whose header matches an existing one merges its entries into the
//! existing section, with later values winning; this is how several
//! configuration files layer over one another.

use metasuite_common::error::{MetasuiteError, Result};

use crate::reader;
use crate::section::{Section, SectionKind};

/// All sections of a build description.
#[derive(Debug, Clone, Default)]
pub struct SectionStore {
    sections: Vec<Section>,
}

impl SectionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads and layers several section texts, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if any text is malformed.
    pub fn from_sources<'a>(texts: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let mut store = Self::new();
        let mut sources = 0_usize;
        for text in texts {
            sources += 1;
            for section in reader::parse_sections(text)? {
                store.insert(section);
            }
        }
        tracing::info!(sources, sections = store.len(), "section store loaded");
        Ok(store)
    }

    /// Adds a section, merging into an existing one with the same header.
    pub fn insert(&mut self, section: Section) {
        match self.sections.iter_mut().find(|s| s.header == section.header) {
            Some(existing) => {
                for (key, value) in section.entries {
                    existing.set(key, value);
                }
            }
            None => self.sections.push(section),
        }
    }

    /// Iterates all sections in insertion order.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    /// Number of sections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Returns true if the store holds no sections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Finds the unconstrained section `<kind> <name>`.
    #[must_use]
    pub fn find(&self, kind: SectionKind, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| {
            s.header.kind == kind && s.header.name == name && s.header.constraint.is_none()
        })
    }

    /// Like [`find`](Self::find), but a missing section is an error.
    ///
    /// # Errors
    ///
    /// Returns [`MetasuiteError::MissingSection`] if no such section exists.
    pub fn require(&self, kind: SectionKind, name: &str) -> Result<&Section> {
        self.find(kind, name)
            .ok_or_else(|| MetasuiteError::MissingSection {
                kind: kind.to_string(),
                name: name.to_owned(),
            })
    }

    /// All `package` sections for `name`, constrained or not, in order.
    pub fn package_candidates<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Section> {
        self.sections
            .iter()
            .filter(move |s| s.header.kind == SectionKind::Package && s.header.name == name)
    }
}

impl FromIterator<Section> for SectionStore {
    fn from_iter<T: IntoIterator<Item = Section>>(iter: T) -> Self {
        let mut store = Self::new();
        for section in iter {
            store.insert(section);
        }
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(header: &str, entries: &[(&str, &str)]) -> Section {
        Section::with_entries(header, entries.iter().copied()).expect("valid section")
    }

    #[test]
    fn insert_merges_identical_headers() {
        let store: SectionStore = [
            section("defaults base", &[("a", "1"), ("b", "2")]),
            section("defaults base", &[("b", "3"), ("c", "4")]),
        ]
        .into_iter()
        .collect();
        assert_eq!(store.len(), 1);
        let merged = store.require(SectionKind::Defaults, "base").expect("present");
        assert_eq!(merged.get("a"), Some("1"));
        assert_eq!(merged.get("b"), Some("3"));
        assert_eq!(merged.get("c"), Some("4"));
    }

    #[test]
    fn constrained_sections_stay_distinct() {
        let store: SectionStore = [
            section("package foo version < 1", &[]),
            section("package foo version >= 1", &[]),
            section("package foobar", &[]),
        ]
        .into_iter()
        .collect();
        assert_eq!(store.package_candidates("foo").count(), 2);
        assert_eq!(store.package_candidates("foobar").count(), 1);
        assert!(store.find(SectionKind::Package, "foo").is_none());
    }

    #[test]
    fn require_reports_missing_section() {
        let store = SectionStore::new();
        let err = store
            .require(SectionKind::Suite, "nightly")
            .expect_err("missing");
        assert_eq!(err.to_string(), "section \"suite nightly\" not found");
    }

    #[test]
    fn from_sources_layers_in_order() {
        let base = "[defaults base]\nprefix = /usr\nmirror = a\n";
        let site = "[defaults base]\nmirror = b\n";
        let store = SectionStore::from_sources([base, site]).expect("should read");
        let defaults = store.require(SectionKind::Defaults, "base").expect("present");
        assert_eq!(defaults.get("prefix"), Some("/usr"));
        assert_eq!(defaults.get("mirror"), Some("b"));
    }
}
