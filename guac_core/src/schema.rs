//! The declarative schema for connection profile entries.
//!
//! Everything here is plain data: which object classes a profile entry
//! carries, which properties exist, and which LDAP attribute each one
//! maps to. The mapping and diff layers consume these tables; they hold
//! no behavior of their own.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::directory::DirectoryEntry;

/// LDAP attribute names used by connection profile entries.
pub mod attr {
    /// Entry name, also the RDN attribute.
    pub const CN: &str = "cn";
    /// Free-form description.
    pub const DESCRIPTION: &str = "description";
    /// The connection protocol.
    pub const PROTOCOL: &str = "guacConfigProtocol";
    /// Connection parameters, one `name=value` per value.
    pub const PARAMETER: &str = "guacConfigParameter";
    /// Host used to reach guacd.
    pub const PROXY_HOSTNAME: &str = "guacConfigProxyHostname";
    /// TCP port used to reach guacd.
    pub const PROXY_PORT: &str = "guacConfigProxyPort";
    /// Encryption method for the guacd connection.
    pub const PROXY_ENCRYPTION: &str = "guacConfigProxyEncryption";
    /// DNs of users granted access to the connection.
    pub const UNIQUE_MEMBER: &str = "uniqueMember";
    /// DNs of groups whose members are granted access.
    pub const SEE_ALSO: &str = "seeAlso";
    /// Object classes of the entry.
    pub const OBJECT_CLASS: &str = "objectClass";
}

/// Object classes carried by every connection profile entry.
pub const OBJECT_CLASSES: [&str; 2] = ["top", "guacConfigGroup"];

/// The structural class identifying connection profile entries.
pub const STRUCTURAL_CLASS: &str = "guacConfigGroup";

/// The search filter matching connection profile entries.
pub fn lookup_filter() -> String {
    format!("(objectClass={STRUCTURAL_CLASS})")
}

/// Whether an entry is a connection profile.
pub fn identify(entry: &DirectoryEntry) -> bool {
    entry.has_object_class(STRUCTURAL_CLASS)
}

/// The value syntax of a profile property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    /// Free-form text.
    Text,
    /// Base-10 integer.
    Integer,
    /// Host name or IP address.
    HostOrIp,
    /// One of the supported connection protocols.
    Protocol,
    /// One of the guacd encryption methods.
    Encryption,
    /// DN of a user entry.
    UserDn,
    /// DN of a group entry.
    GroupDn,
}

/// Description of one profile property and its directory mapping.
#[derive(Debug, Clone, Copy)]
pub struct PropertyDescription {
    /// Property name, as used in profile configuration.
    pub property: &'static str,
    /// The LDAP attribute the property maps to.
    pub ldap_attribute: &'static str,
    /// Value syntax.
    pub syntax: Syntax,
    /// Whether the property holds multiple values.
    pub multivalue: bool,
    /// Whether the property must be present.
    pub required: bool,
    /// Whether the property names the entry.
    pub identifies: bool,
    /// Whether the property participates in default search.
    pub default_search: bool,
}

/// All profile properties, in schema order.
pub static PROPERTY_DESCRIPTIONS: [PropertyDescription; 9] = [
    PropertyDescription {
        property: "name",
        ldap_attribute: attr::CN,
        syntax: Syntax::Text,
        multivalue: false,
        required: true,
        identifies: true,
        default_search: true,
    },
    PropertyDescription {
        property: "description",
        ldap_attribute: attr::DESCRIPTION,
        syntax: Syntax::Text,
        multivalue: false,
        required: false,
        identifies: false,
        default_search: true,
    },
    PropertyDescription {
        property: "protocol",
        ldap_attribute: attr::PROTOCOL,
        syntax: Syntax::Protocol,
        multivalue: false,
        required: true,
        identifies: false,
        default_search: true,
    },
    PropertyDescription {
        property: "parameter",
        ldap_attribute: attr::PARAMETER,
        syntax: Syntax::Text,
        multivalue: true,
        required: false,
        identifies: false,
        default_search: true,
    },
    PropertyDescription {
        property: "user",
        ldap_attribute: attr::UNIQUE_MEMBER,
        syntax: Syntax::UserDn,
        multivalue: true,
        required: false,
        identifies: false,
        default_search: false,
    },
    PropertyDescription {
        property: "group",
        ldap_attribute: attr::SEE_ALSO,
        syntax: Syntax::GroupDn,
        multivalue: true,
        required: false,
        identifies: false,
        default_search: false,
    },
    PropertyDescription {
        property: "proxyname",
        ldap_attribute: attr::PROXY_HOSTNAME,
        syntax: Syntax::HostOrIp,
        multivalue: false,
        required: false,
        identifies: false,
        default_search: true,
    },
    PropertyDescription {
        property: "proxyport",
        ldap_attribute: attr::PROXY_PORT,
        syntax: Syntax::Integer,
        multivalue: false,
        required: false,
        identifies: false,
        default_search: false,
    },
    PropertyDescription {
        property: "proxyencryption",
        ldap_attribute: attr::PROXY_ENCRYPTION,
        syntax: Syntax::Encryption,
        multivalue: false,
        required: false,
        identifies: false,
        default_search: false,
    },
];

/// DN-valued relationship properties and the attributes they synchronize.
pub const RELATIONSHIP_ATTRIBUTES: [(&str, &str); 2] =
    [("user", attr::UNIQUE_MEMBER), ("group", attr::SEE_ALSO)];

lazy_static! {
    static ref PROPERTIES_BY_NAME: HashMap<&'static str, &'static PropertyDescription> =
        PROPERTY_DESCRIPTIONS
            .iter()
            .map(|description| (description.property, description))
            .collect();
}

/// Look up a property description by its configuration name.
pub fn property(name: &str) -> Option<&'static PropertyDescription> {
    PROPERTIES_BY_NAME.get(name).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dn::Dn;

    #[test]
    fn identify_requires_the_structural_class() {
        let mut entry = DirectoryEntry::new(Dn::new("cn=x,dc=example,dc=net"));
        assert!(!identify(&entry));

        entry.set_text_values(attr::OBJECT_CLASS, ["top", "GUACCONFIGGROUP"]);
        assert!(identify(&entry));
    }

    #[test]
    fn lookup_filter_names_the_structural_class() {
        assert_eq!(lookup_filter(), "(objectClass=guacConfigGroup)");
    }

    #[test]
    fn property_lookup_covers_the_table() {
        for description in &PROPERTY_DESCRIPTIONS {
            let found = property(description.property).unwrap();
            assert_eq!(found.ldap_attribute, description.ldap_attribute);
        }
        assert!(property("nonsense").is_none());
    }

    #[test]
    fn relationship_properties_carry_dn_syntax() {
        for (name, attribute) in RELATIONSHIP_ATTRIBUTES {
            let description = property(name).unwrap();
            assert_eq!(description.ldap_attribute, attribute);
            assert!(description.multivalue);
            assert!(matches!(
                description.syntax,
                Syntax::UserDn | Syntax::GroupDn
            ));
        }
    }

    #[test]
    fn exactly_one_property_identifies_the_entry() {
        let identifying: Vec<_> = PROPERTY_DESCRIPTIONS
            .iter()
            .filter(|d| d.identifies)
            .collect();
        assert_eq!(identifying.len(), 1);
        assert_eq!(identifying[0].ldap_attribute, attr::CN);
    }
}
