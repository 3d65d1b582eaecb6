use std::fmt;

/// A dependency on another plugin, as declared in a description file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginDependency {
    /// Name of the required plugin.
    pub name: String,

    /// The declared version. Empty means any version. Declared versions
    /// are informational; resolution matches by name only.
    pub version: String,
}

impl PluginDependency {
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
        }
    }

    /// A dependency satisfied by any version of the named plugin.
    pub fn any_version(name: &str) -> Self {
        Self::new(name, "")
    }
}

impl fmt::Display for PluginDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.version.is_empty() {
            write!(f, "{} (any version)", self.name)
        } else {
            write!(f, "{} (version {})", self.name, self.version)
        }
    }
}
