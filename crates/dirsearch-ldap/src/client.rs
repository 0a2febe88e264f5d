//! LDAP Client implementation
//!
//! ldap3-backed directory sessions. Supports LDAP, LDAPS (SSL) and STARTTLS.

use crate::session::{ConnectionSettings, DirectoryConnector, DirectorySession};
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use ldap3::adapters::EntriesOnly;
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, LdapResult, Scope, SearchEntry, SearchStream};
use std::time::Duration;
use tracing::{debug, warn};

/// Checks the result that closes a search. Any code but success fails the
/// whole search, including sizeLimitExceeded after a partial page.
pub(crate) fn finish_result(result: LdapResult) -> anyhow::Result<()> {
    let rc = result.rc;
    result
        .success()
        .with_context(|| format!("search ended with result code {}", rc))?;
    Ok(())
}

/// Opens ldap3 connections
#[derive(Debug, Clone, Copy, Default)]
pub struct LdapConnector;

impl LdapConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DirectoryConnector for LdapConnector {
    type Session = LdapSession;

    async fn connect(&self, settings: &ConnectionSettings) -> anyhow::Result<LdapSession> {
        let conn_settings = LdapConnSettings::new()
            .set_conn_timeout(settings.connect_timeout)
            .set_starttls(settings.start_tls && settings.url.starts_with("ldap://"))
            .set_no_tls_verify(settings.skip_tls_verify);

        debug!("Connecting to LDAP server: {}", settings.url);

        let (conn, ldap) = LdapConnAsync::with_settings(conn_settings, &settings.url)
            .await
            .with_context(|| format!("cannot reach {}", settings.url))?;

        let url = settings.url.clone();
        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                warn!("LDAP connection to {} ended with error: {}", url, e);
            }
        });

        Ok(LdapSession::new(ldap, settings.timeout))
    }
}

/// One ldap3 connection with at most one running search
pub struct LdapSession {
    ldap: Ldap,
    timeout: Duration,
    stream: Option<SearchStream<'static, String, Vec<String>>>,
    closed: bool,
}

impl LdapSession {
    fn new(ldap: Ldap, timeout: Duration) -> Self {
        Self {
            ldap,
            timeout,
            stream: None,
            closed: false,
        }
    }
}

#[async_trait]
impl DirectorySession for LdapSession {
    async fn bind(&mut self, user: &str, password: &str) -> anyhow::Result<()> {
        self.ldap
            .with_timeout(self.timeout)
            .simple_bind(user, password)
            .await?
            .success()?;

        Ok(())
    }

    async fn start_search(
        &mut self,
        base_dn: &str,
        filter: &str,
        attributes: &[&str],
    ) -> anyhow::Result<()> {
        if self.stream.is_some() {
            return Err(anyhow!("a search is already running on this connection"));
        }

        let attrs: Vec<String> = attributes.iter().map(|a| a.to_string()).collect();
        let stream = self
            .ldap
            .with_timeout(self.timeout)
            .streaming_search_with(EntriesOnly::new(), base_dn, Scope::Subtree, filter, attrs)
            .await?;

        self.stream = Some(stream);
        Ok(())
    }

    async fn next_entry(&mut self) -> anyhow::Result<Option<SearchEntry>> {
        let next = match self.stream.as_mut() {
            Some(stream) => stream.next().await?,
            None => return Err(anyhow!("no search is running")),
        };

        match next {
            Some(entry) => Ok(Some(SearchEntry::construct(entry))),
            None => {
                // End of entries: the final result code decides success.
                if let Some(mut stream) = self.stream.take() {
                    finish_result(stream.finish().await)?;
                }
                Ok(None)
            }
        }
    }

    async fn close(&mut self) -> anyhow::Result<()> {
        self.stream = None;

        if self.closed {
            return Ok(());
        }
        self.closed = true;

        self.ldap.unbind().await.context("unbind failed")
    }
}
