//! Build environments and the merge policy between them.
//!
//! An [`Environment`] maps variable names to [`EnvValue`]s. Keys ending in
//! `PATH` are path-like and always hold an ordered, duplicate-free sequence;
//! a scalar stored under such a key is split on `:` when inserted. The
//! reserved key `ENV` holds a nested environment of process-level variables.
//!
//! [`Environment::merge`] is asymmetric: the destination keeps
//! its scalars, while the source's path entries are placed in front of the
//! destination's.

use std::collections::BTreeMap;

use metasuite_common::constants::{
    DEFAULT_PATH_SEPARATOR, PATH_KEY_SUFFIX, PROCESS_ENV_KEY, PROXY_KINDS,
};
use metasuite_common::error::{MetasuiteError, Result};
use serde::{Deserialize, Serialize};

/// Value of one environment variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnvValue {
    /// A plain string.
    Scalar(String),
    /// An ordered sequence, joined with the path separator at the process boundary.
    Paths(Vec<String>),
    /// A nested environment; only used under `ENV`.
    Nested(Environment),
}

impl From<&str> for EnvValue {
    fn from(value: &str) -> Self {
        Self::Scalar(value.to_owned())
    }
}

impl From<String> for EnvValue {
    fn from(value: String) -> Self {
        Self::Scalar(value)
    }
}

impl From<Vec<String>> for EnvValue {
    fn from(value: Vec<String>) -> Self {
        Self::Paths(value)
    }
}

/// Returns true if `key` names a path-like variable.
#[must_use]
pub fn is_path_key(key: &str) -> bool {
    key.ends_with(PATH_KEY_SUFFIX)
}

/// Keeps the first occurrence of every entry.
fn dedup(entries: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for entry in entries {
        if !out.contains(&entry) {
            out.push(entry);
        }
    }
    out
}

/// `dedup(src) ++ (dst - src)`.
fn prepend_paths(dst: &mut Vec<String>, src: &[String]) {
    let mut merged = dedup(src.iter().cloned());
    merged.extend(dst.drain(..).filter(|entry| !src.contains(entry)));
    *dst = merged;
}

/// The variables visible to one package's build commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, EnvValue>",
    into = "BTreeMap<String, EnvValue>"
)]
pub struct Environment {
    vars: BTreeMap<String, EnvValue>,
}

impl Environment {
    /// Creates an empty environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an environment from its JSON form.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the text is not a JSON object of
    /// strings and string arrays, with a nested object allowed only under
    /// `ENV`.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Sets `key`, normalizing values of path-like keys into sequences.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<EnvValue>) {
        let key = key.into();
        let value = match value.into() {
            EnvValue::Scalar(text) if is_path_key(&key) => EnvValue::Paths(dedup(
                text.split(DEFAULT_PATH_SEPARATOR)
                    .filter(|entry| !entry.is_empty())
                    .map(str::to_owned),
            )),
            EnvValue::Paths(entries) if is_path_key(&key) => EnvValue::Paths(dedup(entries)),
            other => other,
        };
        let _ = self.vars.insert(key, value);
    }

    /// Returns the value of `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&EnvValue> {
        self.vars.get(key)
    }

    /// Returns the path entries of `key`, if it holds a sequence.
    #[must_use]
    pub fn paths(&self, key: &str) -> Option<&[String]> {
        match self.vars.get(key) {
            Some(EnvValue::Paths(entries)) => Some(entries),
            _ => None,
        }
    }

    /// Returns the scalar value of `key`, if it holds one.
    #[must_use]
    pub fn scalar(&self, key: &str) -> Option<&str> {
        match self.vars.get(key) {
            Some(EnvValue::Scalar(value)) => Some(value),
            _ => None,
        }
    }

    /// Returns the nested process-level environment, if any.
    #[must_use]
    pub fn process_env(&self) -> Option<&Self> {
        match self.vars.get(PROCESS_ENV_KEY) {
            Some(EnvValue::Nested(env)) => Some(env),
            _ => None,
        }
    }

    /// Applies `update` to the nested process-level environment, creating it
    /// if absent. A non-nested `ENV` value is replaced.
    pub fn update_process_env(&mut self, update: impl FnOnce(&mut Self)) {
        let mut process = match self.vars.remove(PROCESS_ENV_KEY) {
            Some(EnvValue::Nested(env)) => env,
            _ => Self::new(),
        };
        update(&mut process);
        let _ = self
            .vars
            .insert(PROCESS_ENV_KEY.to_owned(), EnvValue::Nested(process));
    }

    /// Iterates variables in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &EnvValue)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns true if `key` is set.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// Number of top-level variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Returns true if no variables are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Merges `src` into `self`.
    ///
    /// - A key absent from `self` is copied.
    /// - A scalar key present in `self` keeps its value.
    /// - A path-like key becomes `src`'s entries followed by the entries of
    ///   `self` that `src` does not already hold.
    /// - Nested `ENV` mappings are merged recursively under the same rules.
    pub fn merge(&mut self, src: &Self) {
        for (key, incoming) in &src.vars {
            if !self.vars.contains_key(key) {
                self.insert(key.clone(), incoming.clone());
                continue;
            }
            match (self.vars.get_mut(key), incoming) {
                (Some(EnvValue::Nested(dst_env)), EnvValue::Nested(src_env))
                    if key == PROCESS_ENV_KEY =>
                {
                    dst_env.merge(src_env);
                }
                (Some(EnvValue::Paths(dst_paths)), EnvValue::Paths(src_paths))
                    if is_path_key(key) =>
                {
                    prepend_paths(dst_paths, src_paths);
                }
                _ => {}
            }
        }
    }
}

impl TryFrom<BTreeMap<String, EnvValue>> for Environment {
    type Error = MetasuiteError;

    fn try_from(vars: BTreeMap<String, EnvValue>) -> Result<Self> {
        let mut env = Self::new();
        for (key, value) in vars {
            if matches!(value, EnvValue::Nested(_)) && key != PROCESS_ENV_KEY {
                return Err(MetasuiteError::InvalidEnvironment {
                    key,
                    message: format!("nested mappings are only allowed under {PROCESS_ENV_KEY}"),
                });
            }
            env.insert(key, value);
        }
        Ok(env)
    }
}

impl From<Environment> for BTreeMap<String, EnvValue> {
    fn from(env: Environment) -> Self {
        env.vars
    }
}

impl<K, V> FromIterator<(K, V)> for Environment
where
    K: Into<String>,
    V: Into<EnvValue>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut env = Self::new();
        for (key, value) in iter {
            env.insert(key, value);
        }
        env
    }
}

/// Copies proxy settings found through `lookup` into the nested `ENV`.
///
/// Both the lower-case (`http_proxy`) and upper-case (`HTTP_PROXY`) forms of
/// each proxy kind are consulted; unset or empty values are skipped.
pub fn passthrough_proxies(env: &mut Environment, lookup: impl Fn(&str) -> Option<String>) {
    let mut found: Vec<(String, String)> = Vec::new();
    for kind in PROXY_KINDS {
        let name = format!("{kind}_proxy");
        for var in [name.clone(), name.to_uppercase()] {
            if let Some(value) = lookup(&var).filter(|value| !value.is_empty()) {
                found.push((var, value));
            }
        }
    }
    if found.is_empty() {
        return;
    }
    tracing::debug!(count = found.len(), "passing proxy settings through");
    env.update_process_env(|process| {
        for (var, value) in found {
            process.insert(var, value);
        }
    });
}
