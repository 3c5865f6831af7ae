//! In-memory directory
//!
//! Implements the `guac_core` directory ports over a process-local map,
//! for tests and dry runs. Modify semantics follow the server's:
//! removing a value that is not present, or adding one that already is,
//! fails the whole operation and leaves the entry untouched.

use std::collections::HashMap;

use anyhow::{bail, Result};
use async_trait::async_trait;

use guac_core::{Dn, DirectoryEntry, DirectoryReader, DirectoryWriter, ModListEntry};

/// A process-local directory, keyed by normalized DN.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    entries: HashMap<String, DirectoryEntry>,
}

impl MemoryDirectory {
    /// New empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the directory holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Direct entry lookup, for assertions in tests.
    pub fn entry(&self, dn: &Dn) -> Option<&DirectoryEntry> {
        self.entries.get(&dn.comparison_key())
    }
}

#[async_trait]
impl DirectoryReader for MemoryDirectory {
    async fn fetch(&self, dn: &Dn) -> Result<Option<DirectoryEntry>> {
        Ok(self.entries.get(&dn.comparison_key()).cloned())
    }
}

#[async_trait]
impl DirectoryWriter for MemoryDirectory {
    async fn add(&mut self, entry: DirectoryEntry) -> Result<()> {
        let key = entry.dn.comparison_key();
        if self.entries.contains_key(&key) {
            bail!("entry `{}` already exists", entry.dn);
        }
        self.entries.insert(key, entry);
        Ok(())
    }

    async fn modify(&mut self, dn: &Dn, changes: &[ModListEntry]) -> Result<()> {
        let key = dn.comparison_key();
        let current = match self.entries.get(&key) {
            Some(entry) => entry,
            None => bail!("no entry `{dn}` to modify"),
        };

        // stage the whole modify so a failed change leaves the entry as it was
        let mut staged = current.clone();
        for change in changes {
            let mut values = staged.values(&change.attribute)?;
            for removal in &change.removals {
                match values.iter().position(|value| value == removal) {
                    Some(idx) => {
                        values.remove(idx);
                    }
                    None => bail!(
                        "cannot remove `{removal}` from `{}` on `{dn}`: no such value",
                        change.attribute
                    ),
                }
            }
            for addition in &change.additions {
                if values.iter().any(|value| value == addition) {
                    bail!(
                        "cannot add `{addition}` to `{}` on `{dn}`: value already present",
                        change.attribute
                    );
                }
                values.push(addition.clone());
            }
            staged.set_text_values(&change.attribute, values);
        }

        self.entries.insert(key, staged);
        Ok(())
    }

    async fn delete(&mut self, dn: &Dn) -> Result<()> {
        match self.entries.remove(&dn.comparison_key()) {
            Some(_) => Ok(()),
            None => bail!("no entry `{dn}` to remove"),
        }
    }
}
