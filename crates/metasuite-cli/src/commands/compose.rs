//! `msuite compose`: Compose environments across a package graph.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Args;
use metasuite_common::config::MetasuiteConfig;
use metasuite_env::environment::passthrough_proxies;
use metasuite_env::export::flatten;
use metasuite_env::graph::{DependencyGraph, GraphSpec};
use serde::Serialize;

use crate::output;

/// Arguments for the `compose` command.
#[derive(Args, Debug)]
pub struct ComposeArgs {
    /// Graph file: `{"packages": [{"name", "env", "depends"}]}`.
    pub file: PathBuf,

    /// Print the composed environments as JSON.
    #[arg(long)]
    pub json: bool,
}

/// One composed package, as printed.
#[derive(Debug, Serialize)]
struct ComposedPackage {
    name: String,
    env: BTreeMap<String, String>,
}

/// Executes the `compose` command.
///
/// Builds the dependency graph, composes it bottom-up, and prints each
/// package's flattened environment in dependency order.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or the graph is
/// inconsistent or cyclic.
pub fn execute(args: ComposeArgs, config: &MetasuiteConfig) -> anyhow::Result<()> {
    let text = super::read_input(&args.file)?;
    let mut graph = DependencyGraph::from_spec(GraphSpec::from_json(&text)?)?;
    tracing::info!(packages = graph.len(), path = %args.file.display(), "composing graph");

    let order = graph.resolve_order()?;
    graph.compose()?;
    let mut environments = graph.into_environments();

    let composed: Vec<ComposedPackage> = order
        .into_iter()
        .filter_map(|name| {
            let mut env = environments.remove(&name)?;
            if config.proxy_passthrough {
                passthrough_proxies(&mut env, super::process_var);
            }
            Some(ComposedPackage {
                env: flatten(&env, &config.path_separator),
                name,
            })
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&composed)?);
        return Ok(());
    }

    for package in &composed {
        println!("{}", package.name);
        print!("{}", output::format_vars(&package.env, 4));
    }
    Ok(())
}
