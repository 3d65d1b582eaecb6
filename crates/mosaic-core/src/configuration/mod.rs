//! Resource/version predicate language.
//!
//! A [`Configuration`] describes a set of resources, either *provided*
//! (a plain enumeration of resources with optional exact versions) or
//! *required* (arbitrary boolean combinations of existence and version
//! relations). [`Configuration::satisfies`] checks a provided
//! configuration against a required one.
//!
//! Resources are identified by interned [`ResourceId`]s; versions are
//! opaque strings compared through a per-resource compare-function
//! registry with a dot-separated-numbers default.
//!
//! The plugin layer uses this to express host capability requirements,
//! but the language itself is domain-agnostic.

mod expr;
mod resource;
mod version;

pub use expr::{Configuration, Relation};
pub use resource::{Resource, ResourceId};
pub use version::{
    default_version_compare, register_version_compare, version_compare, Version,
    VersionCompareFn,
};
