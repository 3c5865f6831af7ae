//! The connection profile entity and its directory mapping.

pub mod parser;

use std::fmt::Display;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::directory::DirectoryEntry;
use crate::dn::Dn;
use crate::schema::{self, attr};

/// Protocols Guacamole can broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Kubernetes pod attach.
    Kubernetes,
    /// Remote Desktop Protocol.
    Rdp,
    /// Secure Shell.
    Ssh,
    /// Telnet.
    Telnet,
    /// Virtual Network Computing.
    Vnc,
}

impl Protocol {
    /// The value stored in the directory.
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Kubernetes => "kubernetes",
            Protocol::Rdp => "rdp",
            Protocol::Ssh => "ssh",
            Protocol::Telnet => "telnet",
            Protocol::Vnc => "vnc",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Protocol::Kubernetes => "Kubernetes",
            Protocol::Rdp => "RDP",
            Protocol::Ssh => "SSH",
            Protocol::Telnet => "Telnet",
            Protocol::Vnc => "VNC",
        }
    }
}

impl Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "kubernetes" => Protocol::Kubernetes,
            "rdp" => Protocol::Rdp,
            "ssh" => Protocol::Ssh,
            "telnet" => Protocol::Telnet,
            "vnc" => Protocol::Vnc,
            other => bail!("unsupported connection protocol `{other}`"),
        })
    }
}

/// Encryption methods guacd supports for the proxy connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Encryption {
    /// No encryption.
    None,
    /// SSL wrapping.
    Ssl,
}

impl Encryption {
    /// The value stored in the directory.
    pub fn as_str(&self) -> &'static str {
        match self {
            Encryption::None => "NONE",
            Encryption::Ssl => "SSL",
        }
    }
}

impl Display for Encryption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Encryption {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "NONE" => Encryption::None,
            "SSL" => Encryption::Ssl,
            other => bail!("unsupported encryption method `{other}`"),
        })
    }
}

/// guacd proxy overrides. Unset fields fall back to guacd defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxySettings {
    /// Host name or IP address used to reach guacd.
    #[serde(default)]
    pub hostname: Option<String>,
    /// TCP port used to reach guacd.
    #[serde(default)]
    pub port: Option<u16>,
    /// Encryption method for the guacd connection.
    #[serde(default)]
    pub encryption: Option<Encryption>,
}

/// One Guacamole connection profile.
///
/// This is the desired state of a `guacConfigGroup` entry, as authored
/// in configuration or read back from the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionProfile {
    /// Profile name; becomes the entry's `cn`.
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Protocol used to reach the remote host.
    pub protocol: Protocol,
    /// Connection parameters, one `name=value` per entry.
    #[serde(default)]
    pub parameters: Vec<String>,
    /// DNs of users that may use the connection.
    #[serde(default)]
    pub users: Vec<Dn>,
    /// DNs of groups whose members may use the connection.
    #[serde(default)]
    pub groups: Vec<Dn>,
    /// guacd proxy overrides.
    #[serde(default)]
    pub proxy: ProxySettings,
}

impl ConnectionProfile {
    /// Read a profile from a directory entry.
    ///
    /// Scalar attributes with several values keep the first; the two
    /// relationship attributes are read in full, preserving the stored
    /// DN strings.
    pub fn from_entry(entry: &DirectoryEntry) -> Result<Self> {
        if !schema::identify(entry) {
            bail!(
                "entry `{}` is not a connection profile (missing the {} object class)",
                entry.dn,
                schema::STRUCTURAL_CLASS
            );
        }

        let name = entry
            .first_value(attr::CN)?
            .ok_or_else(|| anyhow!("entry `{}` has no `{}`", entry.dn, attr::CN))?;
        let protocol = entry
            .first_value(attr::PROTOCOL)?
            .ok_or_else(|| anyhow!("entry `{}` has no connection protocol", entry.dn))?
            .parse()
            .with_context(|| format!("reading `{}`", entry.dn))?;
        let port = match entry.first_value(attr::PROXY_PORT)? {
            Some(raw) => Some(raw.parse::<u16>().with_context(|| {
                format!("`{raw}` on `{}` is not a valid TCP port", entry.dn)
            })?),
            None => None,
        };
        let encryption = match entry.first_value(attr::PROXY_ENCRYPTION)? {
            Some(raw) => Some(
                raw.parse()
                    .with_context(|| format!("reading `{}`", entry.dn))?,
            ),
            None => None,
        };

        Ok(Self {
            name,
            description: entry.first_value(attr::DESCRIPTION)?,
            protocol,
            parameters: entry.values(attr::PARAMETER)?,
            users: entry.values(attr::UNIQUE_MEMBER)?.into_iter().map(Dn).collect(),
            groups: entry.values(attr::SEE_ALSO)?.into_iter().map(Dn).collect(),
            proxy: ProxySettings {
                hostname: entry.first_value(attr::PROXY_HOSTNAME)?,
                port,
                encryption,
            },
        })
    }

    /// The entry's relative DN.
    pub fn rdn(&self) -> String {
        format!("{}={}", attr::CN, self.name)
    }

    /// The full DN of the entry under `base`.
    pub fn dn_under(&self, base: &Dn) -> Dn {
        Dn(format!("{},{base}", self.rdn()))
    }

    /// Desired scalar state as attribute/value pairs, in schema order.
    ///
    /// Unset properties appear with an empty value list, so the diff
    /// layer sees them as removals.
    pub fn attribute_values(&self) -> Vec<(&'static str, Vec<String>)> {
        vec![
            (attr::DESCRIPTION, self.description.iter().cloned().collect()),
            (attr::PROTOCOL, vec![self.protocol.to_string()]),
            (attr::PARAMETER, self.parameters.clone()),
            (
                attr::PROXY_HOSTNAME,
                self.proxy.hostname.iter().cloned().collect(),
            ),
            (
                attr::PROXY_PORT,
                self.proxy.port.iter().map(u16::to_string).collect(),
            ),
            (
                attr::PROXY_ENCRYPTION,
                self.proxy.encryption.iter().map(Encryption::to_string).collect(),
            ),
        ]
    }

    /// All attributes for creating a new entry, object classes included.
    /// Empty attributes are dropped.
    pub fn add_attribute_values(&self) -> Vec<(String, Vec<String>)> {
        let mut out = vec![
            (
                attr::OBJECT_CLASS.to_owned(),
                schema::OBJECT_CLASSES.iter().map(|class| class.to_string()).collect(),
            ),
            (attr::CN.to_owned(), vec![self.name.clone()]),
        ];
        for (attribute, values) in self.attribute_values() {
            if !values.is_empty() {
                out.push((attribute.to_owned(), values));
            }
        }
        if !self.users.is_empty() {
            out.push((
                attr::UNIQUE_MEMBER.to_owned(),
                self.users.iter().map(|dn| dn.0.clone()).collect(),
            ));
        }
        if !self.groups.is_empty() {
            out.push((
                attr::SEE_ALSO.to_owned(),
                self.groups.iter().map(|dn| dn.0.clone()).collect(),
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_entry() -> DirectoryEntry {
        let mut entry = DirectoryEntry::new(Dn::new("cn=ops-jump,ou=guacamole,dc=example,dc=net"));
        entry.set_text_values(attr::OBJECT_CLASS, ["top", "guacConfigGroup"]);
        entry.set_text_values(attr::CN, ["ops-jump"]);
        entry.set_text_values(attr::DESCRIPTION, ["Jump host for the ops team"]);
        entry.set_text_values(attr::PROTOCOL, ["ssh"]);
        entry.set_text_values(attr::PARAMETER, ["hostname=10.1.0.4", "port=22"]);
        entry.set_text_values(attr::UNIQUE_MEMBER, ["uid=alice,cn=users,dc=example,dc=net"]);
        entry.set_text_values(attr::SEE_ALSO, ["cn=Ops Team,cn=groups,dc=example,dc=net"]);
        entry.set_text_values(attr::PROXY_HOSTNAME, ["guacd.example.net"]);
        entry.set_text_values(attr::PROXY_PORT, ["4822"]);
        entry.set_text_values(attr::PROXY_ENCRYPTION, ["SSL"]);
        entry
    }

    #[test]
    fn protocol_round_trips_through_strings() {
        for protocol in [
            Protocol::Kubernetes,
            Protocol::Rdp,
            Protocol::Ssh,
            Protocol::Telnet,
            Protocol::Vnc,
        ] {
            assert_eq!(protocol.as_str().parse::<Protocol>().unwrap(), protocol);
        }
        assert!("spice".parse::<Protocol>().is_err());
    }

    #[test]
    fn encryption_round_trips_through_strings() {
        assert_eq!("NONE".parse::<Encryption>().unwrap(), Encryption::None);
        assert_eq!("SSL".parse::<Encryption>().unwrap(), Encryption::Ssl);
        assert!("tls".parse::<Encryption>().is_err());
    }

    #[test]
    fn from_entry_reads_all_mapped_attributes() {
        let profile = ConnectionProfile::from_entry(&profile_entry()).unwrap();
        assert_eq!(profile.name, "ops-jump");
        assert_eq!(profile.description.as_deref(), Some("Jump host for the ops team"));
        assert_eq!(profile.protocol, Protocol::Ssh);
        assert_eq!(profile.parameters, vec!["hostname=10.1.0.4", "port=22"]);
        assert_eq!(
            profile.users,
            vec![Dn::new("uid=alice,cn=users,dc=example,dc=net")]
        );
        assert_eq!(
            profile.groups,
            vec![Dn::new("cn=Ops Team,cn=groups,dc=example,dc=net")]
        );
        assert_eq!(profile.proxy.hostname.as_deref(), Some("guacd.example.net"));
        assert_eq!(profile.proxy.port, Some(4822));
        assert_eq!(profile.proxy.encryption, Some(Encryption::Ssl));
    }

    #[test]
    fn from_entry_rejects_other_object_classes() {
        let mut entry = DirectoryEntry::new(Dn::new("cn=people,dc=example,dc=net"));
        entry.set_text_values(attr::OBJECT_CLASS, ["top", "organizationalUnit"]);
        assert!(ConnectionProfile::from_entry(&entry).is_err());
    }

    #[test]
    fn from_entry_rejects_a_bad_port() {
        let mut entry = profile_entry();
        entry.set_text_values(attr::PROXY_PORT, ["guacd"]);
        assert!(ConnectionProfile::from_entry(&entry).is_err());
    }

    #[test]
    fn dn_under_builds_the_entry_name() {
        let profile = ConnectionProfile::from_entry(&profile_entry()).unwrap();
        assert_eq!(
            profile.dn_under(&Dn::new("ou=guacamole,dc=example,dc=net")),
            Dn::new("cn=ops-jump,ou=guacamole,dc=example,dc=net")
        );
    }

    #[test]
    fn add_attribute_values_drops_empty_attributes() {
        let mut profile = ConnectionProfile::from_entry(&profile_entry()).unwrap();
        profile.description = None;
        profile.groups.clear();
        let attributes = profile.add_attribute_values();
        assert!(attributes.iter().all(|(_, values)| !values.is_empty()));
        assert!(!attributes.iter().any(|(name, _)| name == attr::DESCRIPTION));
        assert!(!attributes.iter().any(|(name, _)| name == attr::SEE_ALSO));
        assert!(attributes.iter().any(|(name, _)| name == attr::OBJECT_CLASS));
    }
}
