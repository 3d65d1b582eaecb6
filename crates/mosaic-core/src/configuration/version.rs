use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::configuration::resource::ResourceId;

/// A resource version, specified as a non-empty string of printable
/// characters. No structure is imposed at construction time; structure
/// comes from the compare function used at comparison time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version(String);

impl Version {
    /// # Panics
    ///
    /// Panics on an empty specification string.
    pub fn new(spec: impl Into<String>) -> Self {
        let spec = spec.into();
        assert!(!spec.is_empty(), "Version::new: empty specification");
        Version(spec)
    }

    pub fn spec(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Version {
    fn from(spec: &str) -> Self {
        Version::new(spec)
    }
}

/// Compares two versions of one resource. Returns [`Ordering::Less`]
/// when the first version is older than the second.
pub type VersionCompareFn = fn(&Version, &Version) -> Ordering;

static COMPARE_FUNCTIONS: Lazy<Mutex<HashMap<ResourceId, VersionCompareFn>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Registers the compare function for a resource whose version strings
/// the default function cannot handle.
///
/// Registration is write-once per resource.
///
/// # Panics
///
/// Panics when a function is already registered for `resource` or when
/// `compare` is the default function.
pub fn register_version_compare(resource: ResourceId, compare: VersionCompareFn) {
    assert!(
        compare != default_version_compare as VersionCompareFn,
        "register_version_compare: do not register the default function"
    );
    let mut functions = COMPARE_FUNCTIONS
        .lock()
        .expect("version compare registry poisoned");
    if functions.contains_key(&resource) {
        // Release the registry before panicking; a poisoned lock would
        // take every later comparison down with it.
        drop(functions);
        panic!(
            "register_version_compare: compare function already registered for '{resource}'"
        );
    }
    functions.insert(resource, compare);
}

/// Compares two versions of `resource` with its registered compare
/// function, falling back to [`default_version_compare`].
pub fn version_compare(resource: ResourceId, v1: &Version, v2: &Version) -> Ordering {
    let compare = COMPARE_FUNCTIONS
        .lock()
        .expect("version compare registry poisoned")
        .get(&resource)
        .copied()
        .unwrap_or(default_version_compare as VersionCompareFn);
    compare(v1, v2)
}

/// Compares versions specified as series of dot-separated numbers.
///
/// Both specification strings must match `[0-9]+(\.[0-9]+)*`; this is
/// debug-asserted, callers validate upstream. Components are compared
/// numerically; on an equal shared prefix the shorter string is older.
pub fn default_version_compare(v1: &Version, v2: &Version) -> Ordering {
    static FORMAT: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)*$").expect("version format regex"));
    debug_assert!(
        FORMAT.is_match(v1.spec()),
        "default_version_compare: malformed version '{v1}'"
    );
    debug_assert!(
        FORMAT.is_match(v2.spec()),
        "default_version_compare: malformed version '{v2}'"
    );

    let components = |v: &Version| -> Vec<u64> {
        v.spec()
            .split('.')
            .map(|c| c.parse().unwrap_or(0))
            .collect()
    };
    let c1 = components(v1);
    let c2 = components(v2);

    for (a, b) in c1.iter().zip(&c2) {
        match a.cmp(b) {
            Ordering::Equal => continue,
            unequal => return unequal,
        }
    }
    c1.len().cmp(&c2.len())
}
