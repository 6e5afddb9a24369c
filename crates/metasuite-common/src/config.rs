//! Settings model shared by the resolver, the composer, and the CLI.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAX_INTERPOLATION_PASSES, DEFAULT_PATH_SEPARATOR};

/// Tunables for a resolution run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetasuiteConfig {
    /// Substitution passes allowed before interpolation reports an overflow.
    pub max_interpolation_passes: usize,
    /// Separator joining path-like sequences at the process boundary.
    pub path_separator: String,
    /// Whether proxy variables from the user's environment are passed through.
    pub proxy_passthrough: bool,
}

impl Default for MetasuiteConfig {
    fn default() -> Self {
        Self {
            max_interpolation_passes: DEFAULT_MAX_INTERPOLATION_PASSES,
            path_separator: DEFAULT_PATH_SEPARATOR.to_owned(),
            proxy_passthrough: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let config = MetasuiteConfig::default();
        assert_eq!(config.max_interpolation_passes, 10);
        assert_eq!(config.path_separator, ":");
        assert!(config.proxy_passthrough);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: MetasuiteConfig =
            serde_json::from_str(r#"{"path_separator": ";"}"#).expect("deserialize");
        assert_eq!(config.path_separator, ";");
        assert_eq!(config.max_interpolation_passes, 10);
    }
}
