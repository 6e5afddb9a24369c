//! `msuite env`: Print shell commands applying merged environment files.

use std::path::PathBuf;

use clap::Args;
use metasuite_common::config::MetasuiteConfig;
use metasuite_env::environment::{Environment, passthrough_proxies};
use metasuite_env::export::{Shell, overlay_user, render_exports};

/// Arguments for the `env` command.
#[derive(Args, Debug)]
pub struct EnvArgs {
    /// Shell to generate for: sh, bash, csh, or tcsh.
    #[arg(short, long, default_value = "sh")]
    pub shell: Shell,

    /// Environment files (JSON), merged in order.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

/// Executes the `env` command.
///
/// Merges the files in order, lays the result over the invoking user's
/// environment, and prints one export line per variable.
///
/// # Errors
///
/// Returns an error if a file cannot be read or is not a valid environment.
pub fn execute(args: EnvArgs, config: &MetasuiteConfig) -> anyhow::Result<()> {
    let mut merged = Environment::new();
    for path in &args.files {
        let env = Environment::from_json(&super::read_input(path)?)?;
        merged.merge(&env);
    }
    if config.proxy_passthrough {
        passthrough_proxies(&mut merged, super::process_var);
    }
    tracing::info!(
        files = args.files.len(),
        variables = merged.len(),
        shell = %args.shell,
        "rendering environment"
    );

    let vars = overlay_user(&merged, super::process_var, &config.path_separator);
    for line in render_exports(args.shell, &vars) {
        println!("{line}");
    }
    Ok(())
}
