//! Resolution of a whole suite into per-package records.
//!
//! For every package of the suite's package list, in list order, the
//! applicable `package` section is selected and layered over the suite
//! identity, the host identity, and the suite's defaults. The layered
//! mapping is interpolated to a fixed point, and each action is substituted
//! once against the result.

use std::collections::BTreeMap;

use metasuite_common::config::MetasuiteConfig;
use metasuite_common::constants::ACTION_KEY;
use metasuite_common::error::Result;
use metasuite_common::host::HostInfo;

use crate::interpolate;
use crate::record::PackageRecord;
use crate::section::{Section, SectionKind};
use crate::selector::{self, PackageList};
use crate::store::SectionStore;

/// Suite-wide inputs shared by every package of the suite.
struct SuiteContext<'a> {
    name: &'a str,
    tags: Vec<String>,
    defaults: &'a Section,
    packages: PackageList,
}

impl<'a> SuiteContext<'a> {
    fn load(store: &'a SectionStore, name: &'a str) -> Result<Self> {
        let suite = store.require(SectionKind::Suite, name)?;
        let tags = suite
            .require("tags")?
            .split_whitespace()
            .map(str::to_owned)
            .collect();
        let defaults = store.require(SectionKind::Defaults, suite.require("defaults")?)?;
        let packages = PackageList::from_section(
            store.require(SectionKind::PackageList, suite.require("packages")?)?,
        );
        Ok(Self {
            name,
            tags,
            defaults,
            packages,
        })
    }
}

/// Working record under construction: parameters plus accumulated actions.
#[derive(Default)]
struct Layers {
    params: BTreeMap<String, String>,
    actions: Vec<String>,
}

impl Layers {
    fn apply<K, V>(&mut self, entries: impl IntoIterator<Item = (K, V)>)
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in entries {
            let (key, value) = (key.as_ref(), value.as_ref());
            if key == ACTION_KEY {
                self.actions.extend(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|action| !action.is_empty())
                        .map(str::to_owned),
                );
            } else {
                let _ = self.params.insert(key.to_owned(), value.to_owned());
            }
        }
    }
}

/// Resolves every package of suite `suite_name`.
///
/// # Errors
///
/// Returns [`MissingSection`](metasuite_common::error::MetasuiteError::MissingSection)
/// or [`MissingKey`](metasuite_common::error::MetasuiteError::MissingKey) if
/// the suite, its defaults, or its package list cannot be found. Any failure
/// while resolving a package aborts the suite and is wrapped as
/// [`Package`](metasuite_common::error::MetasuiteError::Package).
pub fn resolve_suite(
    store: &SectionStore,
    suite_name: &str,
    host: &HostInfo,
    config: &MetasuiteConfig,
) -> Result<Vec<PackageRecord>> {
    let suite = SuiteContext::load(store, suite_name)?;
    tracing::info!(
        suite = suite_name,
        packages = suite.packages.len(),
        "resolving suite"
    );

    suite
        .packages
        .iter()
        .map(|(package, version)| {
            resolve_package(store, &suite, host, config, package, version)
                .map_err(|err| err.in_package(package, version))
        })
        .collect()
}

fn resolve_package(
    store: &SectionStore,
    suite: &SuiteContext<'_>,
    host: &HostInfo,
    config: &MetasuiteConfig,
    package: &str,
    version: &str,
) -> Result<PackageRecord> {
    let section = selector::select_section(
        package,
        version,
        &suite.packages,
        store.package_candidates(package),
    )?;

    let tags_joined = suite.tags.join(" ");
    let tags_dashed = suite.tags.join("-");
    let mut layers = Layers::default();
    layers.apply([
        ("package", package),
        ("version", version),
        ("suite", suite.name),
        ("tags", tags_joined.as_str()),
        ("tagsdashed", tags_dashed.as_str()),
    ]);
    layers.apply(host.entries());
    layers.apply(suite.defaults.iter());
    layers.apply(section.iter());

    let resolved = interpolate::interpolate(&layers.params, config.max_interpolation_passes)?;
    let actions = layers
        .actions
        .iter()
        .map(|action| {
            interpolate::unescape(&interpolate::substitute(ACTION_KEY, action, &resolved)?)
        })
        .collect::<Result<Vec<_>>>()?;
    let params = resolved
        .iter()
        .map(|(key, value)| Ok((key.clone(), interpolate::unescape(value)?)))
        .collect::<Result<BTreeMap<_, _>>>()?;

    tracing::debug!(
        package,
        version,
        section = %section.header,
        actions = actions.len(),
        "package resolved"
    );

    Ok(PackageRecord {
        package: package.to_owned(),
        version: version.to_owned(),
        suite: suite.name.to_owned(),
        tags: suite.tags.clone(),
        params,
        actions,
    })
}
