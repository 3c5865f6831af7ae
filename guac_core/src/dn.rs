//! Distinguished names and the comparison semantics used to diff them.
//!
//! Directory servers compare DNs case-insensitively and ignore
//! insignificant whitespace, so two differently-written strings can name
//! the same entry. Values read from or written to the directory keep
//! their exact authored form; only comparisons go through [`normalize`].

use std::fmt::Display;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A distinguished name, exactly as authored or as read from the directory.
///
/// The wrapped string is never rewritten.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dn(pub String);

impl Dn {
    /// Wrap a DN string.
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self(value.into())
    }

    /// The comparison key for this DN.
    pub fn comparison_key(&self) -> String {
        normalize(&self.0)
    }

    /// Whether two DNs name the same entry under directory comparison rules.
    pub fn matches(&self, other: &Dn) -> bool {
        self.comparison_key() == other.comparison_key()
    }
}

impl Display for Dn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Dn {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for Dn {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Canonicalize a DN string into a comparison key.
///
/// Each `,`-separated component is trimmed, the attribute type and value
/// around the first `=` are trimmed, runs of whitespace inside the value
/// collapse to a single space, and the result is lowercased. Malformed
/// input is not rejected; whatever comes out is still usable as an
/// opaque comparison value. Escaped separators are passed through as-is;
/// exact matching-rule canonicalization belongs to the server.
pub fn normalize(dn: &str) -> String {
    dn.split(',')
        .map(|component| {
            let component = component.trim();
            let rejoined = match component.split_once('=') {
                Some((attribute, value)) => {
                    format!("{}={}", attribute.trim(), collapse_whitespace(value.trim()))
                }
                None => collapse_whitespace(component),
            };
            rejoined.to_lowercase()
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A set of DNs keyed by their comparison keys.
///
/// Each key remembers the *first* authored form that produced it, so set
/// operations can hand back the exact strings that should be written.
/// Iteration follows insertion order.
#[derive(Debug, Clone, Default)]
pub struct DnSet {
    inner: IndexMap<String, Dn>,
}

impl DnSet {
    /// Build a set from authored values. Duplicates under normalization
    /// collapse; the earliest occurrence supplies the stored form.
    pub fn from_values(values: &[Dn]) -> Self {
        let mut set = Self::default();
        for dn in values {
            set.insert(dn.clone());
        }
        set
    }

    /// Insert one DN. Returns false when an equivalent DN was already
    /// present; the stored form is not replaced.
    pub fn insert(&mut self, dn: Dn) -> bool {
        let key = dn.comparison_key();
        if self.inner.contains_key(&key) {
            return false;
        }
        self.inner.insert(key, dn);
        true
    }

    /// Whether an equivalent DN is present.
    pub fn contains(&self, dn: &Dn) -> bool {
        self.inner.contains_key(&dn.comparison_key())
    }

    /// Number of distinct entries.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// True when the set holds nothing.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Whether both sets name exactly the same entries.
    pub fn same_members(&self, other: &DnSet) -> bool {
        self.inner.len() == other.inner.len()
            && self.inner.keys().all(|key| other.inner.contains_key(key))
    }

    /// The stored forms present in `self` but not in `other`, in
    /// insertion order.
    pub fn difference<'a>(&'a self, other: &'a DnSet) -> impl Iterator<Item = &'a Dn> {
        self.inner
            .iter()
            .filter(move |(key, _)| !other.inner.contains_key(*key))
            .map(|(_, dn)| dn)
    }

    /// Iterate over the stored forms in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Dn> {
        self.inner.values()
    }
}
