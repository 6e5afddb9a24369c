//! System-wide constants and defaults.

/// Default number of substitution passes before interpolation gives up.
pub const DEFAULT_MAX_INTERPOLATION_PASSES: usize = 10;

/// Separator used when a path-like sequence crosses into a process environment.
pub const DEFAULT_PATH_SEPARATOR: &str = ":";

/// Environment keys ending in this suffix hold ordered path sequences.
pub const PATH_KEY_SUFFIX: &str = "PATH";

/// Key of the nested mapping holding process-level variables.
pub const PROCESS_ENV_KEY: &str = "ENV";

/// Section key whose values accumulate into the action list.
pub const ACTION_KEY: &str = "action";

/// Section key listing cross-package dependency constraints.
pub const DEPENDS_KEY: &str = "depends";

/// Proxy variables passed through from the invoking user's environment.
pub const PROXY_KINDS: [&str; 5] = ["http", "ftp", "https", "all", "no"];

