//! # metasuite-config
//!
//! Resolution of a declarative multi-package build description into
//! per-package build records.
//!
//! Handles:
//! - **Version**: release-aware ordering of version strings.
//! - **Constraint**: lexing, parsing, and evaluation of version constraint expressions.
//! - **Section / Store / Reader**: typed section headers, the ordered section store,
//!   and the INI-style text reader that fills it.
//! - **Selector**: picking the single section that applies to a package.
//! - **Interpolate**: fixed-point placeholder substitution.
//! - **Suite**: orchestration of all of the above into [`record::PackageRecord`]s.

pub mod constraint;
pub mod interpolate;
pub mod reader;
pub mod record;
pub mod section;
pub mod selector;
pub mod store;
pub mod suite;
pub mod version;
