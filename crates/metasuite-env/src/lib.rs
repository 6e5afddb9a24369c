//! # metasuite-env
//!
//! Build environments of packages and their composition.
//!
//! Handles:
//! - **Environment**: path-aware variable mappings and the asymmetric merge policy.
//! - **Graph**: package dependency graph, cycle reporting, and bottom-up composition.
//! - **Export**: flattening to process variables and `sh`/`csh` export lines.

pub mod environment;
pub mod export;
pub mod graph;
