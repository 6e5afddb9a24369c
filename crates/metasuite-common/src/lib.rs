//! # metasuite-common
//!
//! Shared error definitions, host identity, settings model, and constants
//! used across the entire metasuite workspace.
//!
//! This crate is the leaf of the dependency graph: it depends on no other
//! internal crate and provides the primitives that the resolver, the
//! environment composer, and the CLI build upon.

pub mod config;
pub mod constants;
pub mod error;
pub mod host;
