//! CLI command definitions and dispatch.

pub mod compose;
pub mod env;
pub mod resolve;

use std::path::Path;

use anyhow::Context;
use clap::{Parser, Subcommand};
use metasuite_common::config::MetasuiteConfig;
use metasuite_common::constants::{DEFAULT_MAX_INTERPOLATION_PASSES, DEFAULT_PATH_SEPARATOR};

/// metasuite: resolve multi-package build suites and compose their environments.
#[derive(Parser, Debug)]
#[command(name = "msuite", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Substitution passes allowed before interpolation gives up.
    #[arg(
        long,
        global = true,
        env = "MSUITE_MAX_PASSES",
        default_value_t = DEFAULT_MAX_INTERPOLATION_PASSES,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub max_passes: usize,

    /// Separator joining path-like variables in printed environments.
    #[arg(
        long,
        global = true,
        env = "MSUITE_PATH_SEPARATOR",
        default_value = DEFAULT_PATH_SEPARATOR
    )]
    pub path_separator: String,

    /// Do not copy proxy variables from the invoking environment.
    #[arg(long, global = true)]
    pub no_proxy_passthrough: bool,
}

impl Cli {
    /// Settings assembled from the global flags.
    #[must_use]
    pub fn config(&self) -> MetasuiteConfig {
        MetasuiteConfig {
            max_interpolation_passes: self.max_passes,
            path_separator: self.path_separator.clone(),
            proxy_passthrough: !self.no_proxy_passthrough,
        }
    }
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve every package of a suite into its build record.
    Resolve(resolve::ResolveArgs),
    /// Compose package environments across a dependency graph.
    Compose(compose::ComposeArgs),
    /// Print shell commands that apply merged environment files.
    Env(env::EnvArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let config = cli.config();
    tracing::debug!(?config, "settings");
    match cli.command {
        Command::Resolve(args) => resolve::execute(args, &config),
        Command::Compose(args) => compose::execute(args, &config),
        Command::Env(args) => env::execute(args, &config),
    }
}

/// Reads a whole input file, naming it in the error.
fn read_input(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// The invoking user's value of `key`.
fn process_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
