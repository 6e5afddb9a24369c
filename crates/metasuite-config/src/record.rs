//! The resolved build record of one package.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Fully resolved parameters and actions of one package in a suite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    /// Package name.
    pub package: String,
    /// Declared version.
    pub version: String,
    /// Suite the package was resolved in.
    pub suite: String,
    /// Suite tags, in declaration order.
    pub tags: Vec<String>,
    /// Interpolated parameters, sorted by key.
    pub params: BTreeMap<String, String>,
    /// Resolved build actions, in order.
    pub actions: Vec<String>,
}

impl PackageRecord {
    /// Returns a resolved parameter.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}
