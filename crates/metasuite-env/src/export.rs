//! Rendering of environments for a shell.
//!
//! Environments are flattened into plain string variables (sequences joined
//! with the path separator) and printed as `export`/`setenv` lines.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use metasuite_common::constants::PROCESS_ENV_KEY;

use crate::environment::{EnvValue, Environment};

/// Flattens `env` into process variables.
///
/// Entries of the nested `ENV` mapping are included unless a top-level
/// variable of the same name exists.
#[must_use]
pub fn flatten(env: &Environment, separator: &str) -> BTreeMap<String, String> {
    let mut vars = BTreeMap::new();
    for (key, value) in env.iter() {
        match value {
            EnvValue::Scalar(text) => {
                let _ = vars.insert(key.to_owned(), text.clone());
            }
            EnvValue::Paths(entries) => {
                let _ = vars.insert(key.to_owned(), entries.join(separator));
            }
            EnvValue::Nested(_) => {}
        }
    }
    if let Some(process) = env.process_env() {
        for (key, value) in flatten(process, separator) {
            let _ = vars.entry(key).or_insert(value);
        }
    }
    vars
}

/// Lays `env` over the user's current values of the same variables.
///
/// `lookup` returns the user's current value of a variable. The user's
/// scalars are kept, while the path entries of `env` are placed in front of
/// the user's.
#[must_use]
pub fn overlay_user(
    env: &Environment,
    lookup: impl Fn(&str) -> Option<String>,
    separator: &str,
) -> BTreeMap<String, String> {
    let mut user: Environment = env
        .iter()
        .filter(|(key, _)| *key != PROCESS_ENV_KEY)
        .filter_map(|(key, _)| lookup(key).map(|value| (key.to_owned(), value)))
        .collect();
    user.merge(env);
    flatten(&user, separator)
}

/// Target shell syntax for export lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shell {
    /// Bourne-style: `export K="V"`.
    #[default]
    Sh,
    /// C shell: `setenv K "V"`.
    Csh,
}

impl FromStr for Shell {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sh" | "bash" => Ok(Self::Sh),
            "csh" | "tcsh" => Ok(Self::Csh),
            other => Err(format!("unknown shell \"{other}\" (expected sh, bash, csh, or tcsh)")),
        }
    }
}

impl fmt::Display for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sh => f.write_str("sh"),
            Self::Csh => f.write_str("csh"),
        }
    }
}

impl Shell {
    /// One line setting `key` to `value`.
    #[must_use]
    pub fn export_line(self, key: &str, value: &str) -> String {
        match self {
            Self::Sh => {
                let escaped = value
                    .replace('\\', "\\\\")
                    .replace('"', "\\\"")
                    .replace('`', "\\`");
                format!("export {key}=\"{escaped}\"")
            }
            Self::Csh => format!("setenv {key} \"{}\"", value.replace('"', "\"\\\"\"")),
        }
    }
}

/// Export lines for every variable, in key order.
#[must_use]
pub fn render_exports(shell: Shell, vars: &BTreeMap<String, String>) -> Vec<String> {
    vars.iter()
        .map(|(key, value)| shell.export_line(key, value))
        .collect()
}
