//! Parsing and validating profile configuration files.
//!
//! A configuration file is a YAML list of profiles. Validation collects
//! every problem it finds so they can all be reported at once.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use super::ConnectionProfile;

/// Read profiles from a YAML string.
pub fn read_config_str(val: &str) -> Result<Vec<ConnectionProfile>> {
    let docs: Vec<Vec<ConnectionProfile>> =
        yaml_peg::serde::from_str(val).context("deserializing profile configuration")?;
    match docs.into_iter().next() {
        Some(profiles) => Ok(profiles),
        None => bail!("unable to parse profile configuration"),
    }
}

/// Read profiles from a YAML file.
pub fn read_config_file<P: AsRef<Path>>(path: P) -> Result<Vec<ConnectionProfile>> {
    let val = fs::read_to_string(&path)
        .with_context(|| format!("reading {}", path.as_ref().display()))?;
    read_config_str(&val)
}

fn validate_config(profiles: &[ConnectionProfile]) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen_names = HashSet::new();

    for profile in profiles {
        if profile.name.trim().is_empty() {
            errors.push("a profile has an empty name".to_owned());
        }
        if profile.name.contains(',') || profile.name.contains('=') {
            errors.push(format!(
                "profile name `{}` cannot contain `,` or `=` (it becomes the entry's rdn)",
                profile.name
            ));
        }
        if !seen_names.insert(profile.name.to_lowercase()) {
            errors.push(format!("more than one profile is named `{}`", profile.name));
        }

        for parameter in &profile.parameters {
            match parameter.split_once('=') {
                Some((key, _)) if !key.trim().is_empty() => (),
                _ => errors.push(format!(
                    "profile `{}` has a malformed parameter `{parameter}` (expected name=value)",
                    profile.name
                )),
            }
        }

        for dn in profile.users.iter().chain(profile.groups.iter()) {
            if dn.0.trim().is_empty() {
                errors.push(format!("profile `{}` lists an empty member dn", profile.name));
            } else if !dn.0.contains('=') {
                errors.push(format!(
                    "profile `{}` lists member `{dn}`, which is not a dn",
                    profile.name
                ));
            }
        }
    }

    errors
}

/// Parse and validate a profile configuration string.
pub fn parse_and_validate(val: &str) -> Result<Vec<ConnectionProfile>> {
    let profiles = read_config_str(val)?;
    let errors = validate_config(&profiles);
    if !errors.is_empty() {
        bail!(
            "configuration is invalid:\n{}",
            errors
                .iter()
                .map(|error| format!("- {error}"))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }
    Ok(profiles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{Encryption, Protocol};
    use crate::dn::Dn;

    const CONFIG: &str = r#"
- name: ops-jump
  description: Jump host for the ops team
  protocol: ssh
  parameters:
    - hostname=10.1.0.4
    - port=22
  users:
    - uid=alice,cn=users,dc=example,dc=net
  groups:
    - cn=Ops Team,cn=groups,dc=example,dc=net
  proxy:
    hostname: guacd.example.net
    port: 4822
    encryption: SSL
- name: lab-console
  protocol: vnc
"#;

    #[test]
    fn parses_a_list_of_profiles() {
        let profiles = parse_and_validate(CONFIG).unwrap();
        assert_eq!(profiles.len(), 2);

        let ops = &profiles[0];
        assert_eq!(ops.name, "ops-jump");
        assert_eq!(ops.protocol, Protocol::Ssh);
        assert_eq!(ops.users, vec![Dn::new("uid=alice,cn=users,dc=example,dc=net")]);
        assert_eq!(ops.proxy.port, Some(4822));
        assert_eq!(ops.proxy.encryption, Some(Encryption::Ssl));

        let lab = &profiles[1];
        assert_eq!(lab.protocol, Protocol::Vnc);
        assert!(lab.description.is_none());
        assert!(lab.parameters.is_empty());
        assert!(lab.users.is_empty());
        assert_eq!(lab.proxy, Default::default());
    }

    #[test]
    fn unknown_protocols_fail_to_parse() {
        let res = read_config_str("- name: x\n  protocol: spice\n");
        assert!(res.is_err());
    }

    #[test]
    fn validation_collects_every_error() {
        let config = r#"
- name: dup
  protocol: ssh
  parameters:
    - "=value"
  users:
    - alice
- name: dup
  protocol: vnc
"#;
        let err = parse_and_validate(config).unwrap_err().to_string();
        assert!(err.contains("malformed parameter"));
        assert!(err.contains("is not a dn"));
        assert!(err.contains("more than one profile is named `dup`"));
    }

    #[test]
    fn profile_names_clash_case_insensitively() {
        let config = "- name: Jump\n  protocol: ssh\n- name: jump\n  protocol: vnc\n";
        assert!(parse_and_validate(config).is_err());
    }
}
