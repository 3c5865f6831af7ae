//! Diffing of desired profile state vs the persisted entry.

use std::fmt::Display;

use anyhow::{bail, Result};
use colored::Colorize;
use indexmap::IndexSet;

use crate::connection::ConnectionProfile;
use crate::directory::DirectoryEntry;
use crate::dn::{Dn, DnSet};
use crate::schema::{self, attr};

/// One attribute-level change: values to remove and values to add.
///
/// Removals and additions partition the difference between the persisted
/// and desired value sets; each value keeps the exact form of the side
/// that introduced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModListEntry {
    /// The attribute being changed.
    pub attribute: String,
    /// Values to remove, in their persisted form.
    pub removals: Vec<String>,
    /// Values to add, in their desired form.
    pub additions: Vec<String>,
}

impl Display for ModListEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut text = format!("{}{}\n", "~ ".yellow(), self.attribute.as_str().yellow());
        for addition in &self.additions {
            text += format!("{}", format!("    + {addition}\n").green()).as_str();
        }
        for removal in &self.removals {
            text += format!("{}", format!("    - {removal}\n").red()).as_str();
        }
        write!(f, "{text}")
    }
}

/// Compute the change needed to bring a DN-valued relationship attribute
/// in line with the desired member list.
///
/// Both sides may be empty or hold duplicates; duplicates collapse under
/// DN comparison, with the first occurrence supplying the written form.
/// Returns `None` when both sides name the same entries, so an unchanged
/// attribute never shows up in the modlist.
pub fn diff_relationship(
    attribute: &str,
    persisted: &[Dn],
    desired: &[Dn],
) -> Option<ModListEntry> {
    let persisted_set = DnSet::from_values(persisted);
    let desired_set = DnSet::from_values(desired);
    if persisted_set.same_members(&desired_set) {
        return None;
    }
    Some(ModListEntry {
        attribute: attribute.to_owned(),
        removals: persisted_set
            .difference(&desired_set)
            .map(|dn| dn.0.clone())
            .collect(),
        additions: desired_set
            .difference(&persisted_set)
            .map(|dn| dn.0.clone())
            .collect(),
    })
}

/// Compute the change for a plain attribute, compared value-for-value.
pub fn diff_values(
    attribute: &str,
    persisted: &[String],
    desired: &[String],
) -> Option<ModListEntry> {
    let persisted_set: IndexSet<&str> = persisted.iter().map(String::as_str).collect();
    let desired_set: IndexSet<&str> = desired.iter().map(String::as_str).collect();
    if persisted_set == desired_set {
        return None;
    }
    Some(ModListEntry {
        attribute: attribute.to_owned(),
        removals: persisted_set
            .difference(&desired_set)
            .map(|value| value.to_string())
            .collect(),
        additions: desired_set
            .difference(&persisted_set)
            .map(|value| value.to_string())
            .collect(),
    })
}

/// Generate the modlist bringing `persisted` in line with `desired`.
///
/// At most one entry per attribute; an unchanged profile yields an empty
/// list. Renaming a profile is an entry move, not an attribute change,
/// and is rejected here.
pub fn generate_diffs(
    desired: &ConnectionProfile,
    persisted: &DirectoryEntry,
) -> Result<Vec<ModListEntry>> {
    if !schema::identify(persisted) {
        bail!(
            "entry `{}` is not a connection profile (missing the {} object class)",
            persisted.dn,
            schema::STRUCTURAL_CLASS
        );
    }

    let persisted_name = persisted.first_value(attr::CN)?;
    let same_name = persisted_name
        .as_deref()
        .map(|name| name.eq_ignore_ascii_case(&desired.name))
        .unwrap_or(false);
    if !same_name {
        bail!(
            "cannot modify `{}` into `{}`: renames are entry moves, not attribute changes",
            persisted.dn,
            desired.rdn()
        );
    }

    let mut res = Vec::new();

    for (attribute, desired_values) in desired.attribute_values() {
        let persisted_values = persisted.values(attribute)?;
        if let Some(change) = diff_values(attribute, &persisted_values, &desired_values) {
            res.push(change);
        }
    }

    let persisted_users: Vec<Dn> = persisted
        .values(attr::UNIQUE_MEMBER)?
        .into_iter()
        .map(Dn)
        .collect();
    if let Some(change) = diff_relationship(attr::UNIQUE_MEMBER, &persisted_users, &desired.users) {
        res.push(change);
    }

    let persisted_groups: Vec<Dn> = persisted
        .values(attr::SEE_ALSO)?
        .into_iter()
        .map(Dn)
        .collect();
    if let Some(change) = diff_relationship(attr::SEE_ALSO, &persisted_groups, &desired.groups) {
        res.push(change);
    }

    Ok(res)
}
