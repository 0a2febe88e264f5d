//! Directory session seam
//!
//! A session is one connection: bind, one streamed search, then close.
//! The ldap3-backed implementation lives in `client`.

use async_trait::async_trait;
use dirsearch_core::config::LdapConfigSection;
use ldap3::SearchEntry;
use std::time::Duration;

/// Attributes requested for every search
pub const SEARCH_ATTRIBUTES: [&str; 8] = [
    "cn",
    "sAMAccountName",
    "displayName",
    "mail",
    "thumbnailPhoto",
    "telephoneNumber",
    "mobile",
    "title",
];

/// Per-connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// `ldap://` or `ldaps://` URL
    pub url: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub start_tls: bool,
    pub skip_tls_verify: bool,
}

impl ConnectionSettings {
    pub fn new(url: impl Into<String>, config: &LdapConfigSection) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(config.timeout_seconds),
            connect_timeout: Duration::from_secs(config.connect_timeout_seconds),
            start_tls: config.start_tls,
            skip_tls_verify: config.skip_tls_verify,
        }
    }
}

/// Opens directory sessions
#[async_trait]
pub trait DirectoryConnector: Send + Sync {
    type Session: DirectorySession;

    async fn connect(&self, settings: &ConnectionSettings) -> anyhow::Result<Self::Session>;
}

/// One open directory connection
#[async_trait]
pub trait DirectorySession: Send {
    /// Simple bind. Fails on transport errors and on any non-success result code.
    async fn bind(&mut self, user: &str, password: &str) -> anyhow::Result<()>;

    /// Start a subtree search under `base_dn`
    async fn start_search(
        &mut self,
        base_dn: &str,
        filter: &str,
        attributes: &[&str],
    ) -> anyhow::Result<()>;

    /// Next entry of the running search, `None` once it completed successfully
    async fn next_entry(&mut self) -> anyhow::Result<Option<SearchEntry>>;

    /// Unbind and release the connection
    async fn close(&mut self) -> anyhow::Result<()>;
}
