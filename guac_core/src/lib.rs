//!
//! Guacamole connection profiles in an LDAP directory.
//!
//! Provides the typed profile model, the declarative property schema and
//! attribute mapping for `guacConfigGroup` entries, and the diff engine
//! that reconciles desired profile state with the persisted entry,
//! producing minimal modlists for the directory write layer to apply.
#![deny(missing_docs)]

pub use connection::ConnectionProfile;
pub use directory::{DirectoryEntry, DirectoryReader, DirectoryWriter};
pub use dn::Dn;
pub use write::ModListEntry;

pub mod connection;
pub mod directory;
pub mod dn;
pub mod logging;
pub mod schema;
pub mod write;
