//! Applying profile changes through the directory write port.

use anyhow::{Context, Result};
use tracing::{debug, info};

use super::diff::{generate_diffs, ModListEntry};
use crate::connection::ConnectionProfile;
use crate::directory::{DirectoryEntry, DirectoryReader, DirectoryWriter};
use crate::dn::Dn;

/// Create a directory entry for a new profile under `base`.
///
/// Returns the new entry's DN.
pub async fn create_profile<W: DirectoryWriter>(
    writer: &mut W,
    base: &Dn,
    profile: &ConnectionProfile,
) -> Result<Dn> {
    let dn = profile.dn_under(base);
    let mut entry = DirectoryEntry::new(dn.clone());
    for (attribute, values) in profile.add_attribute_values() {
        entry.set_text_values(&attribute, values);
    }
    writer
        .add(entry)
        .await
        .with_context(|| format!("creating `{dn}`"))?;
    info!("created connection profile `{dn}`");
    Ok(dn)
}

/// Bring the persisted entry in line with `desired`.
///
/// Returns the applied modlist; an empty list means the entry was
/// already in the desired state and no modify was submitted.
pub async fn update_profile<W: DirectoryWriter>(
    writer: &mut W,
    persisted: &DirectoryEntry,
    desired: &ConnectionProfile,
) -> Result<Vec<ModListEntry>> {
    let changes = generate_diffs(desired, persisted)?;
    if changes.is_empty() {
        debug!("`{}` is unchanged, skipping modify", persisted.dn);
        return Ok(changes);
    }
    writer
        .modify(&persisted.dn, &changes)
        .await
        .with_context(|| format!("updating `{}`", persisted.dn))?;
    info!(
        "updated `{}` ({} attribute(s) changed)",
        persisted.dn,
        changes.len()
    );
    Ok(changes)
}

/// Reconcile one profile: create its entry when missing, otherwise
/// bring the existing entry in line with the desired state.
pub async fn save_profile<D>(
    directory: &mut D,
    base: &Dn,
    desired: &ConnectionProfile,
) -> Result<Vec<ModListEntry>>
where
    D: DirectoryReader + DirectoryWriter,
{
    let dn = desired.dn_under(base);
    match directory.fetch(&dn).await? {
        Some(entry) => update_profile(directory, &entry, desired).await,
        None => {
            create_profile(directory, base, desired).await?;
            Ok(Vec::new())
        }
    }
}

/// Delete the profile entry at `dn`.
pub async fn remove_profile<W: DirectoryWriter>(writer: &mut W, dn: &Dn) -> Result<()> {
    writer
        .delete(dn)
        .await
        .with_context(|| format!("removing `{dn}`"))?;
    info!("removed connection profile `{dn}`");
    Ok(())
}
