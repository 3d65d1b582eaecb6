use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use once_cell::sync::Lazy;

struct Interner {
    ids: HashMap<String, u32>,
    names: Vec<String>,
}

static INTERNER: Lazy<Mutex<Interner>> = Lazy::new(|| {
    Mutex::new(Interner {
        ids: HashMap::new(),
        names: Vec::new(),
    })
});

/// Interned identifier for fast manipulation of human-readable names.
///
/// Interning is global and monotonic: the first query for a string
/// assigns the next integer, later queries return the same one. Two ids
/// compare equal exactly when the strings they were interned from are
/// byte-equal. The default value is invalid and distinct from every
/// interned id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceId(u32);

const INVALID_ID: u32 = u32::MAX;

impl Default for ResourceId {
    fn default() -> Self {
        ResourceId(INVALID_ID)
    }
}

impl ResourceId {
    /// Interns `name` and returns its id.
    ///
    /// # Panics
    ///
    /// Panics on an empty name.
    pub fn new(name: &str) -> Self {
        assert!(!name.is_empty(), "ResourceId::new: empty name");
        if cfg!(debug_assertions) && name.chars().any(char::is_whitespace) {
            log::warn!("resource id contains whitespace: <{name}>");
        }

        let mut interner = INTERNER.lock().expect("resource interner poisoned");
        if let Some(&id) = interner.ids.get(name) {
            return ResourceId(id);
        }
        let id = interner.names.len() as u32;
        interner.ids.insert(name.to_string(), id);
        interner.names.push(name.to_string());
        ResourceId(id)
    }

    /// Whether any id has been interned for `name` yet. Does not intern.
    pub fn is_interned(name: &str) -> bool {
        INTERNER
            .lock()
            .expect("resource interner poisoned")
            .ids
            .contains_key(name)
    }

    pub fn is_valid(&self) -> bool {
        self.0 != INVALID_ID
    }

    /// The human-readable form this id was interned from, `None` for the
    /// invalid id.
    pub fn name(&self) -> Option<String> {
        INTERNER
            .lock()
            .expect("resource interner poisoned")
            .names
            .get(self.0 as usize)
            .cloned()
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name}"),
            None => write!(f, "<invalid>"),
        }
    }
}

impl From<&str> for ResourceId {
    fn from(name: &str) -> Self {
        ResourceId::new(name)
    }
}

/// An entity subject to configuration management, identified by a
/// [`ResourceId`]. There is no constraint on what the identifier looks
/// like; use whatever suits the domain.
///
/// `Resource` is the handle configuration expressions are built from,
/// see [`Resource::exists`](crate::configuration::Resource::exists) and
/// the `version_*` constructors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Resource {
    id: ResourceId,
}

impl Resource {
    pub fn new(name: &str) -> Self {
        Self {
            id: ResourceId::new(name),
        }
    }

    pub fn from_id(id: ResourceId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn is_valid(&self) -> bool {
        self.id.is_valid()
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.id.fmt(f)
    }
}

impl From<&str> for Resource {
    fn from(name: &str) -> Self {
        Resource::new(name)
    }
}
