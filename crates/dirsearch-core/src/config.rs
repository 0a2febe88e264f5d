//! Configuration for dirsearch
//!
//! Loaded from a TOML file or from `DIRSEARCH_*` environment variables.
//!
//! Example config:
//! ```toml
//! [ldap]
//! timeout_seconds = 30
//! connect_timeout_seconds = 30
//! bind_user = "svcacct@example.local"
//! bind_password = "secret"
//!
//! [domains]
//! example = "DC=example,DC=local"
//!
//! [logging]
//! level = "info"
//! format = "pretty"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirsearchConfig {
    #[serde(default)]
    pub ldap: LdapConfigSection,

    #[serde(default)]
    pub domains: DomainConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DirsearchConfig {
    pub fn from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::Error::Configuration(format!("Failed to read config {:?}: {}", path, e))
        })?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| crate::Error::Configuration(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn from_env() -> crate::Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Override values with `DIRSEARCH_*` environment variables
    pub fn apply_env(&mut self) -> crate::Result<()> {
        if let Ok(timeout) = std::env::var("DIRSEARCH_TIMEOUT") {
            self.ldap.timeout_seconds = parse_env("DIRSEARCH_TIMEOUT", &timeout)?;
        }
        if let Ok(timeout) = std::env::var("DIRSEARCH_CONNECT_TIMEOUT") {
            self.ldap.connect_timeout_seconds = parse_env("DIRSEARCH_CONNECT_TIMEOUT", &timeout)?;
        }
        if let Ok(start_tls) = std::env::var("DIRSEARCH_START_TLS") {
            self.ldap.start_tls = parse_bool("DIRSEARCH_START_TLS", &start_tls)?;
        }
        if let Ok(skip) = std::env::var("DIRSEARCH_SKIP_TLS_VERIFY") {
            self.ldap.skip_tls_verify = parse_bool("DIRSEARCH_SKIP_TLS_VERIFY", &skip)?;
        }
        if let Ok(user) = std::env::var("DIRSEARCH_BIND_USER") {
            self.ldap.bind_user = Some(user);
        }
        if let Ok(password) = std::env::var("DIRSEARCH_BIND_PASSWORD") {
            self.ldap.bind_password = Some(password);
        }
        if let Ok(domains) = std::env::var("DIRSEARCH_DOMAINS") {
            for (name, base_dn) in DomainConfig::parse_list(&domains)? {
                self.domains.insert(name, base_dn);
            }
        }
        if let Ok(level) = std::env::var("DIRSEARCH_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("DIRSEARCH_LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    pub fn validate(&self) -> crate::Result<()> {
        self.ldap.validate()?;
        self.domains.validate()?;
        self.logging.validate()
    }
}

fn parse_env(name: &str, value: &str) -> crate::Result<u64> {
    value
        .parse()
        .map_err(|_| crate::Error::Configuration(format!("{} must be a number: {}", name, value)))
}

fn parse_bool(name: &str, value: &str) -> crate::Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(crate::Error::Configuration(format!(
            "{} must be true or false: {}",
            name, value
        ))),
    }
}

// ============================================================================
// LDAP Connection Settings
// ============================================================================

/// Connection settings shared by every search
#[derive(Clone, Serialize, Deserialize)]
pub struct LdapConfigSection {
    /// Operation timeout in seconds (bind, search, each streamed entry)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// TCP connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,

    /// Use STARTTLS on plain ldap:// connections
    #[serde(default)]
    pub start_tls: bool,

    /// Skip TLS certificate verification (not recommended for production)
    #[serde(default)]
    pub skip_tls_verify: bool,

    /// Default bind user when none is given on the command line
    #[serde(default)]
    pub bind_user: Option<String>,

    /// Default bind password when none is given on the command line
    #[serde(default)]
    pub bind_password: Option<String>,
}

fn default_timeout() -> u64 {
    crate::DEFAULT_TIMEOUT_SECS
}

fn default_connect_timeout() -> u64 {
    crate::DEFAULT_CONNECT_TIMEOUT_SECS
}

impl Default for LdapConfigSection {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
            start_tls: false,
            skip_tls_verify: false,
            bind_user: None,
            bind_password: None,
        }
    }
}

impl LdapConfigSection {
    pub fn validate(&self) -> crate::Result<()> {
        if self.timeout_seconds == 0 {
            return Err(crate::Error::Configuration(
                "timeout_seconds must be greater than zero".into(),
            ));
        }
        if self.connect_timeout_seconds == 0 {
            return Err(crate::Error::Configuration(
                "connect_timeout_seconds must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for LdapConfigSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LdapConfigSection")
            .field("timeout_seconds", &self.timeout_seconds)
            .field("connect_timeout_seconds", &self.connect_timeout_seconds)
            .field("start_tls", &self.start_tls)
            .field("skip_tls_verify", &self.skip_tls_verify)
            .field("bind_user", &self.bind_user)
            .field("bind_password", &self.bind_password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

// ============================================================================
// Domains
// ============================================================================

/// Domain name to search base DN. Lookups ignore case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DomainConfig {
    domains: BTreeMap<String, String>,
}

impl DomainConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a domain. The name is stored lower-cased.
    pub fn insert(&mut self, name: impl AsRef<str>, base_dn: impl Into<String>) {
        let name = name.as_ref().to_lowercase();
        self.domains.retain(|existing, _| existing.to_lowercase() != name);
        self.domains.insert(name, base_dn.into());
    }

    pub fn with_domain(mut self, name: impl AsRef<str>, base_dn: impl Into<String>) -> Self {
        self.insert(name, base_dn);
        self
    }

    /// Base DN for `domain`, compared case-insensitively
    pub fn base_dn(&self, domain: &str) -> crate::Result<&str> {
        let wanted = domain.to_lowercase();
        self.domains
            .iter()
            .find(|(name, _)| name.to_lowercase() == wanted)
            .map(|(_, dn)| dn.as_str())
            .ok_or_else(|| crate::Error::UnknownDomain(domain.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.domains.iter().map(|(name, dn)| (name.as_str(), dn.as_str()))
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Parse `name=dn;name=dn`. DNs contain commas, so entries are split on `;`.
    pub fn parse_list(list: &str) -> crate::Result<Vec<(String, String)>> {
        list.split(';')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                let (name, dn) = entry.split_once('=').ok_or_else(|| {
                    crate::Error::Configuration(format!(
                        "Invalid domain entry (expected name=dn): {}",
                        entry
                    ))
                })?;
                Ok((name.trim().to_string(), dn.trim().to_string()))
            })
            .collect()
    }

    pub fn validate(&self) -> crate::Result<()> {
        let mut seen = std::collections::BTreeSet::new();
        for (name, dn) in &self.domains {
            if name.trim().is_empty() {
                return Err(crate::Error::Configuration("Domain name must not be empty".into()));
            }
            if !seen.insert(name.to_lowercase()) {
                return Err(crate::Error::Configuration(format!(
                    "Domain {} is configured more than once (names ignore case)",
                    name
                )));
            }
            if dn.trim().is_empty() {
                return Err(crate::Error::Configuration(format!(
                    "Base DN for domain {} must not be empty",
                    name
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Logging
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }

    pub fn validate(&self) -> crate::Result<()> {
        match self.format.to_lowercase().as_str() {
            "pretty" | "json" => Ok(()),
            other => Err(crate::Error::Configuration(format!(
                "Invalid log format: {} (expected pretty or json)",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = DirsearchConfig::default();
        assert_eq!(config.ldap.timeout_seconds, 30);
        assert_eq!(config.ldap.connect_timeout_seconds, 30);
        assert!(config.domains.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_domain_lookup_ignores_case() {
        let domains = DomainConfig::new().with_domain("Example", "DC=example,DC=local");

        assert_eq!(domains.base_dn("EXAMPLE").unwrap(), "DC=example,DC=local");
        assert_eq!(domains.base_dn("example").unwrap(), "DC=example,DC=local");

        let err = domains.base_dn("other").unwrap_err();
        assert!(matches!(err, crate::Error::UnknownDomain(ref d) if d == "other"));
    }

    #[test]
    fn test_domain_insert_replaces_other_case() {
        let mut domains = DomainConfig::new();
        domains.insert("EXAMPLE", "DC=old");
        domains.insert("example", "DC=new");

        assert_eq!(domains.len(), 1);
        assert_eq!(domains.base_dn("Example").unwrap(), "DC=new");
    }

    #[test]
    fn test_parse_domain_list() {
        let list = "example=DC=example,DC=local; corp = DC=corp,DC=net;";
        let parsed = DomainConfig::parse_list(list).unwrap();
        assert_eq!(
            parsed,
            vec![
                ("example".to_string(), "DC=example,DC=local".to_string()),
                ("corp".to_string(), "DC=corp,DC=net".to_string()),
            ]
        );

        assert!(DomainConfig::parse_list("no-separator").is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[ldap]
timeout_seconds = 10
bind_user = "svcacct"

[domains]
EXAMPLE = "DC=example,DC=local"

[logging]
level = "debug"
format = "json"
"#
        )
        .unwrap();

        let config = DirsearchConfig::from_file(file.path()).unwrap();
        assert_eq!(config.ldap.timeout_seconds, 10);
        assert_eq!(config.ldap.connect_timeout_seconds, 30);
        assert_eq!(config.ldap.bind_user.as_deref(), Some("svcacct"));
        assert_eq!(config.domains.base_dn("example").unwrap(), "DC=example,DC=local");
        assert!(config.logging.is_json());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = DirsearchConfig::default();
        config.ldap.timeout_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = DirsearchConfig::default();
        config.domains.insert("example", "  ");
        assert!(config.validate().is_err());

        let mut config = DirsearchConfig::default();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duplicate_domains_differing_in_case_rejected() {
        let config: DirsearchConfig =
            toml::from_str("[domains]\nEXAMPLE = \"DC=upper\"\nexample = \"DC=lower\"").unwrap();
        assert_eq!(config.domains.len(), 2);

        let err = config.validate().unwrap_err();
        assert_eq!(err.code(), "ConfigurationError");
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("X", "true").unwrap());
        assert!(parse_bool("X", "1").unwrap());
        assert!(!parse_bool("X", "false").unwrap());
        assert!(!parse_bool("X", "OFF").unwrap());
        assert!(parse_bool("X", "maybe").is_err());
    }

    #[test]
    fn test_env_can_disable_tls_flags() {
        let mut config = DirsearchConfig::default();
        config.ldap.start_tls = true;
        config.ldap.skip_tls_verify = true;

        std::env::set_var("DIRSEARCH_START_TLS", "false");
        std::env::set_var("DIRSEARCH_SKIP_TLS_VERIFY", "0");
        let result = config.apply_env();
        std::env::remove_var("DIRSEARCH_START_TLS");
        std::env::remove_var("DIRSEARCH_SKIP_TLS_VERIFY");

        result.unwrap();
        assert!(!config.ldap.start_tls);
        assert!(!config.ldap.skip_tls_verify);
    }

    #[test]
    fn test_debug_redacts_password() {
        let section = LdapConfigSection {
            bind_password: Some("hunter2".to_string()),
            ..Default::default()
        };
        assert!(!format!("{:?}", section).contains("hunter2"));
    }
}
