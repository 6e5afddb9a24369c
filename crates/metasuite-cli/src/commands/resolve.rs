//! `msuite resolve`: Resolve a suite into per-package build records.

use std::path::PathBuf;

use clap::Args;
use metasuite_common::config::MetasuiteConfig;
use metasuite_common::host::HostInfo;
use metasuite_config::store::SectionStore;
use metasuite_config::suite::resolve_suite;

use crate::output;

/// Arguments for the `resolve` command.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Name of the suite to resolve.
    pub suite: String,

    /// Section files, layered in order (later files override earlier ones).
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Print the records as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Executes the `resolve` command.
///
/// Reads and layers the section files, captures the host identity, and
/// prints every package's resolved parameters and actions.
///
/// # Errors
///
/// Returns an error if a file cannot be read or the suite fails to resolve.
pub fn execute(args: ResolveArgs, config: &MetasuiteConfig) -> anyhow::Result<()> {
    let texts = args
        .files
        .iter()
        .map(|path| super::read_input(path))
        .collect::<anyhow::Result<Vec<_>>>()?;
    tracing::info!(files = texts.len(), suite = %args.suite, "reading section files");

    let store = SectionStore::from_sources(texts.iter().map(String::as_str))?;
    let host = HostInfo::capture()?;
    let records = resolve_suite(&store, &args.suite, &host, config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    println!("Build plan for suite: {}", args.suite);
    println!("{}", output::rule(40));
    for record in &records {
        println!();
        print!("{}", output::format_record(record));
    }
    println!();
    println!("  {} package(s) resolved.", records.len());
    Ok(())
}
