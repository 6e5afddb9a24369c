//! Package dependency graph using `petgraph`.
//!
//! Each node owns one package's [`Environment`] and the ordered list of its
//! direct dependencies. Edges point from a dependency to its dependent so
//! that a topological sort yields dependencies first. Composition walks that
//! order and merges every dependency's composed environment into its
//! dependents, in the order the dependents declared them.

use std::collections::{BTreeMap, HashSet};

use metasuite_common::error::{MetasuiteError, Result};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Deserialize;

use crate::environment::Environment;

/// One package in the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageNode {
    /// Package name.
    pub name: String,
    /// The package's environment; composed in place by [`DependencyGraph::compose`].
    pub env: Environment,
    /// Direct dependencies, in declaration order.
    pub dependencies: Vec<String>,
}

/// Serialized form of one package: `{"name", "env", "depends"}`.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageSpec {
    /// Package name.
    pub name: String,
    /// Environment before composition.
    #[serde(default)]
    pub env: Environment,
    /// Direct dependencies, in declaration order.
    #[serde(default)]
    pub depends: Vec<String>,
}

/// Serialized form of a whole graph: `{"packages": [...]}`.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphSpec {
    /// Packages, in any order.
    pub packages: Vec<PackageSpec>,
}

impl GraphSpec {
    /// Parses a graph description from JSON.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the text does not match the format.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// A dependency graph of packages.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    graph: DiGraph<PackageNode, ()>,
    index: BTreeMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Creates an empty dependency graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from its serialized form.
    ///
    /// # Errors
    ///
    /// Returns [`MetasuiteError::Graph`] for duplicate package names or
    /// dependencies on packages that are not in the graph.
    pub fn from_spec(spec: GraphSpec) -> Result<Self> {
        let mut graph = Self::new();
        let mut edges = Vec::new();
        for package in spec.packages {
            let _ = graph.add_package(package.name.clone(), package.env)?;
            edges.extend(package.depends.into_iter().map(|dep| (package.name.clone(), dep)));
        }
        for (dependent, dependency) in edges {
            graph.add_dependency(&dependent, &dependency)?;
        }
        Ok(graph)
    }

    /// Adds a package node.
    ///
    /// # Errors
    ///
    /// Returns [`MetasuiteError::Graph`] if the name is already taken.
    pub fn add_package(&mut self, name: impl Into<String>, env: Environment) -> Result<NodeIndex> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(MetasuiteError::Graph {
                message: format!("package \"{name}\" declared twice"),
            });
        }
        let idx = self.graph.add_node(PackageNode {
            name: name.clone(),
            env,
            dependencies: Vec::new(),
        });
        let _ = self.index.insert(name, idx);
        Ok(idx)
    }

    /// Declares that `dependent` depends on `dependency`.
    ///
    /// # Errors
    ///
    /// Returns [`MetasuiteError::Graph`] if either package is unknown.
    pub fn add_dependency(&mut self, dependent: &str, dependency: &str) -> Result<()> {
        let from = self.node(dependency).ok_or_else(|| MetasuiteError::Graph {
            message: format!("\"{dependent}\" depends on unknown package \"{dependency}\""),
        })?;
        let to = self.node(dependent).ok_or_else(|| MetasuiteError::Graph {
            message: format!("unknown package \"{dependent}\""),
        })?;
        let _ = self.graph.add_edge(from, to, ());
        self.graph[to].dependencies.push(dependency.to_owned());
        Ok(())
    }

    /// Index of the package named `name`.
    #[must_use]
    pub fn node(&self, name: &str) -> Option<NodeIndex> {
        self.index.get(name).copied()
    }

    /// Returns the package named `name`.
    #[must_use]
    pub fn package(&self, name: &str) -> Option<&PackageNode> {
        self.node(name).map(|idx| &self.graph[idx])
    }

    /// Number of packages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns true if the graph holds no packages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Package names with every dependency before its dependents.
    ///
    /// # Errors
    ///
    /// Returns [`MetasuiteError::CyclicDependency`] with the cycle path if the
    /// graph is not acyclic.
    pub fn resolve_order(&self) -> Result<Vec<String>> {
        Ok(self
            .sorted()?
            .into_iter()
            .map(|idx| self.graph[idx].name.clone())
            .collect())
    }

    /// Composes every package's environment with those of its dependencies.
    ///
    /// # Errors
    ///
    /// Returns [`MetasuiteError::CyclicDependency`] if the graph has a cycle.
    pub fn compose(&mut self) -> Result<()> {
        let order = self.sorted()?;
        tracing::info!(packages = order.len(), "composing environments");

        for idx in order {
            let dependencies = self.graph[idx].dependencies.clone();
            for dependency in &dependencies {
                let Some(dep_idx) = self.node(dependency) else {
                    continue;
                };
                let dep_env = self.graph[dep_idx].env.clone();
                self.graph[idx].env.merge(&dep_env);
            }
            tracing::debug!(
                package = %self.graph[idx].name,
                dependencies = dependencies.len(),
                "environment composed"
            );
        }
        Ok(())
    }

    /// Consumes the graph, returning each package's environment by name.
    #[must_use]
    pub fn into_environments(self) -> BTreeMap<String, Environment> {
        let (nodes, _) = self.graph.into_nodes_edges();
        nodes
            .into_iter()
            .map(|node| (node.weight.name, node.weight.env))
            .collect()
    }

    fn sorted(&self) -> Result<Vec<NodeIndex>> {
        petgraph::algo::toposort(&self.graph, None).map_err(|_| MetasuiteError::CyclicDependency {
            cycle: self.find_cycle(),
        })
    }

    /// First cycle reachable through declared dependencies, as names with the
    /// starting package repeated at the end.
    fn find_cycle(&self) -> Vec<String> {
        for start in self.graph.node_indices() {
            let mut path = vec![start];
            let mut visited = HashSet::new();
            if self.walk_to(start, start, &mut path, &mut visited) {
                path.push(start);
                return path
                    .into_iter()
                    .map(|idx| self.graph[idx].name.clone())
                    .collect();
            }
        }
        Vec::new()
    }

    fn walk_to(
        &self,
        current: NodeIndex,
        target: NodeIndex,
        path: &mut Vec<NodeIndex>,
        visited: &mut HashSet<NodeIndex>,
    ) -> bool {
        for dependency in &self.graph[current].dependencies {
            let Some(next) = self.node(dependency) else {
                continue;
            };
            if next == target {
                return true;
            }
            if visited.insert(next) {
                path.push(next);
                if self.walk_to(next, target, path, visited) {
                    return true;
                }
                let _ = path.pop();
            }
        }
        false
    }
}
