use std::cmp::Ordering;
use std::sync::Arc;

use crate::configuration::resource::Resource;
use crate::configuration::version::{version_compare, Version};

/// Version relation in a [`Configuration`] term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Lt,
    Le,
    Eq,
    Ne,
    Ge,
    Gt,
}

impl Relation {
    fn holds(self, ordering: Ordering) -> bool {
        match self {
            Relation::Lt => ordering == Ordering::Less,
            Relation::Le => ordering != Ordering::Greater,
            Relation::Eq => ordering == Ordering::Equal,
            Relation::Ne => ordering != Ordering::Equal,
            Relation::Ge => ordering != Ordering::Less,
            Relation::Gt => ordering == Ordering::Greater,
        }
    }
}

/// Immutable expression over resources and their versions.
///
/// The grammar:
///
/// ```text
/// Configuration -> Configuration.comma(Configuration)
///               |  Configuration.and(Configuration)
///               |  Configuration.or(Configuration)
///               |  Configuration.not()
///               |  Resource.exists()
///               |  Resource.version_{lt,le,eq,ne,ge,gt}(Version)
/// ```
///
/// `comma` and `and` have the same meaning; `comma` is the conventional
/// combinator for enumerating a *provided* configuration.
///
/// A provided configuration is a plain enumeration of resources,
/// optionally with exact versions:
///
/// ```
/// use mosaic_core::configuration::Resource;
///
/// let qt = Resource::new("com.example.sw.qt");
/// let gui = Resource::new("com.example.sw.qt.gui");
///
/// let provided = qt.exists().comma(qt.version_eq("4.7")).comma(gui.exists());
/// let required = qt.version_ge("4.6.5").and(qt.version_lt("4.8")).and(gui.exists());
/// assert!(provided.satisfies(&required));
/// ```
///
/// Children are shared behind [`Arc`], so cloning a configuration is
/// cheap and equality is structural.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Configuration {
    /// Satisfied when the resource exists.
    Exists(Resource),
    /// Satisfied when the resource exists in a version standing in the
    /// given relation to the stated one.
    Rel(Resource, Relation, Version),
    /// Satisfied when the child is not satisfied.
    Not(Arc<Configuration>),
    /// Satisfied when both children are satisfied.
    And(Arc<Configuration>, Arc<Configuration>),
    /// Satisfied when either child is satisfied.
    Or(Arc<Configuration>, Arc<Configuration>),
    /// Satisfied when both children are satisfied.
    Comma(Arc<Configuration>, Arc<Configuration>),
}

impl Resource {
    /// Elementary term declaring the existence of this resource.
    pub fn exists(self) -> Configuration {
        Configuration::Exists(self)
    }

    pub fn version_lt(self, version: impl Into<Version>) -> Configuration {
        Configuration::Rel(self, Relation::Lt, version.into())
    }

    pub fn version_le(self, version: impl Into<Version>) -> Configuration {
        Configuration::Rel(self, Relation::Le, version.into())
    }

    pub fn version_eq(self, version: impl Into<Version>) -> Configuration {
        Configuration::Rel(self, Relation::Eq, version.into())
    }

    pub fn version_ne(self, version: impl Into<Version>) -> Configuration {
        Configuration::Rel(self, Relation::Ne, version.into())
    }

    pub fn version_ge(self, version: impl Into<Version>) -> Configuration {
        Configuration::Rel(self, Relation::Ge, version.into())
    }

    pub fn version_gt(self, version: impl Into<Version>) -> Configuration {
        Configuration::Rel(self, Relation::Gt, version.into())
    }
}

impl Configuration {
    pub fn and(self, other: Configuration) -> Configuration {
        Configuration::And(Arc::new(self), Arc::new(other))
    }

    pub fn or(self, other: Configuration) -> Configuration {
        Configuration::Or(Arc::new(self), Arc::new(other))
    }

    pub fn comma(self, other: Configuration) -> Configuration {
        Configuration::Comma(Arc::new(self), Arc::new(other))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Configuration {
        Configuration::Not(Arc::new(self))
    }

    /// Does this provided configuration meet the requirements of
    /// `required`?
    ///
    /// `self` must be a plain enumeration: `Exists` and exact-version
    /// (`Rel(_, Eq, _)`) terms joined by `Comma`. Any other shape on the
    /// provided side is a bug in the caller.
    ///
    /// A version requirement against a resource that is provided without
    /// a version is unsatisfied and logs a warning.
    pub fn satisfies(&self, required: &Configuration) -> bool {
        match required {
            Configuration::Not(inner) => !self.satisfies(inner),
            Configuration::And(left, right) | Configuration::Comma(left, right) => {
                self.satisfies(left) && self.satisfies(right)
            }
            Configuration::Or(left, right) => self.satisfies(left) || self.satisfies(right),
            Configuration::Exists(resource) => match self {
                Configuration::Comma(left, right) => {
                    left.satisfies(required) || right.satisfies(required)
                }
                Configuration::Exists(provided) => provided == resource,
                Configuration::Rel(provided, Relation::Eq, _) => provided == resource,
                _ => panic!(
                    "Configuration::satisfies: provided side may only enumerate \
                     resources with ',' and exact versions"
                ),
            },
            Configuration::Rel(resource, relation, version) => match self {
                Configuration::Comma(left, right) => {
                    left.satisfies(required) || right.satisfies(required)
                }
                Configuration::Exists(provided) => {
                    if provided == resource {
                        log::warn!(
                            "resource '{resource}' exists but its version is not \
                             specified - cannot satisfy"
                        );
                    }
                    false
                }
                Configuration::Rel(provided, Relation::Eq, provided_version) => {
                    provided == resource
                        && relation.holds(version_compare(
                            resource.id(),
                            provided_version,
                            version,
                        ))
                }
                _ => panic!(
                    "Configuration::satisfies: provided side may only enumerate \
                     resources with ',' and exact versions"
                ),
            },
        }
    }
}
