//! The boundary to the directory itself.
//!
//! Entries are carried as raw attribute values, the way a directory
//! client hands them over. The two ports below are what a deployment
//! must supply; connection handling, search, and transaction semantics
//! all live behind them.

use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::dn::Dn;
use crate::schema;
use crate::write::diff::ModListEntry;

/// One directory entry: a DN and its raw attribute values.
///
/// Attribute names are case-insensitive, as in the directory; values are
/// kept as the bytes the wire carries.
#[derive(Debug, Clone, Default)]
pub struct DirectoryEntry {
    /// The entry's distinguished name.
    pub dn: Dn,
    attributes: HashMap<String, Vec<Vec<u8>>>,
}

impl DirectoryEntry {
    /// New empty entry at `dn`.
    pub fn new(dn: Dn) -> Self {
        Self {
            dn,
            attributes: HashMap::new(),
        }
    }

    /// Replace the raw values of one attribute.
    pub fn set_values(&mut self, attribute: &str, values: Vec<Vec<u8>>) {
        self.attributes.insert(attribute.to_lowercase(), values);
    }

    /// Replace the values of one attribute from strings.
    pub fn set_text_values<I, S>(&mut self, attribute: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.set_values(
            attribute,
            values
                .into_iter()
                .map(|value| value.as_ref().as_bytes().to_vec())
                .collect(),
        );
    }

    /// Raw values of an attribute. An absent attribute reads as empty.
    pub fn raw_values(&self, attribute: &str) -> &[Vec<u8>] {
        self.attributes
            .get(&attribute.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Values of an attribute decoded as UTF-8. An absent attribute
    /// reads as empty.
    pub fn values(&self, attribute: &str) -> Result<Vec<String>> {
        self.raw_values(attribute)
            .iter()
            .map(|raw| {
                String::from_utf8(raw.clone()).with_context(|| {
                    format!(
                        "attribute `{attribute}` on `{}` holds non-UTF-8 data",
                        self.dn
                    )
                })
            })
            .collect()
    }

    /// The first value of an attribute, when one is present.
    pub fn first_value(&self, attribute: &str) -> Result<Option<String>> {
        Ok(self.values(attribute)?.into_iter().next())
    }

    /// Whether the entry carries `object_class`.
    pub fn has_object_class(&self, object_class: &str) -> bool {
        self.raw_values(schema::attr::OBJECT_CLASS).iter().any(|raw| {
            std::str::from_utf8(raw)
                .map(|value| value.eq_ignore_ascii_case(object_class))
                .unwrap_or(false)
        })
    }
}

/// Read side of the directory boundary.
#[async_trait]
pub trait DirectoryReader {
    /// Fetch the entry at `dn`, if one exists.
    async fn fetch(&self, dn: &Dn) -> Result<Option<DirectoryEntry>>;
}

/// Write side of the directory boundary.
///
/// Implementations own connection handling and whatever retry or
/// integrity discipline the backing server requires. A modlist passed to
/// [`DirectoryWriter::modify`] is expected to land as a single modify
/// operation.
#[async_trait]
pub trait DirectoryWriter {
    /// Create a new entry.
    async fn add(&mut self, entry: DirectoryEntry) -> Result<()>;

    /// Apply a modlist to the entry at `dn`.
    async fn modify(&mut self, dn: &Dn, changes: &[ModListEntry]) -> Result<()>;

    /// Delete the entry at `dn`.
    async fn delete(&mut self, dn: &Dn) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_names_are_case_insensitive() {
        let mut entry = DirectoryEntry::new(Dn::new("cn=x,dc=example,dc=net"));
        entry.set_text_values("guacConfigProtocol", ["ssh"]);
        assert_eq!(entry.values("GUACCONFIGPROTOCOL").unwrap(), vec!["ssh"]);
    }

    #[test]
    fn absent_attributes_read_as_empty() {
        let entry = DirectoryEntry::new(Dn::new("cn=x,dc=example,dc=net"));
        assert!(entry.values("description").unwrap().is_empty());
        assert_eq!(entry.first_value("description").unwrap(), None);
    }

    #[test]
    fn non_utf8_values_are_an_error() {
        let mut entry = DirectoryEntry::new(Dn::new("cn=x,dc=example,dc=net"));
        entry.set_values("description", vec![vec![0xff, 0xfe]]);
        assert!(entry.values("description").is_err());
    }
}
