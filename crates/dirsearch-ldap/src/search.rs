//! Directory search driver
//!
//! Each call owns one session: connect, bind, search, stream, close.
//! The session is closed on every path once it was opened.

use crate::client::LdapConnector;
use crate::filter::build_filter;
use crate::mapper::EntryMapper;
use crate::session::{ConnectionSettings, DirectoryConnector, DirectorySession, SEARCH_ATTRIBUTES};
use dirsearch_core::config::LdapConfigSection;
use dirsearch_core::{DirectoryRecord, DirsearchConfig, DomainConfig, Error, Result, SearchRequest};
use tracing::{debug, info, warn};

/// Runs user/group searches against a directory
pub struct DirectorySearcher<C> {
    connector: C,
    config: LdapConfigSection,
    domains: DomainConfig,
}

impl DirectorySearcher<LdapConnector> {
    /// Searcher backed by a real LDAP connection
    pub fn from_config(config: &DirsearchConfig) -> Self {
        Self::new(LdapConnector::new(), config.ldap.clone(), config.domains.clone())
    }
}

impl<C: DirectoryConnector> DirectorySearcher<C> {
    pub fn new(connector: C, config: LdapConfigSection, domains: DomainConfig) -> Self {
        Self {
            connector,
            config,
            domains,
        }
    }

    pub fn domains(&self) -> &DomainConfig {
        &self.domains
    }

    /// Find the users or groups matching `request`.
    ///
    /// Records come back in the order the server streamed them. Any failure
    /// discards the records collected so far.
    pub async fn search(&self, request: &SearchRequest) -> Result<Vec<DirectoryRecord>> {
        let base_dn = self.domains.base_dn(&request.domain)?;
        let settings = ConnectionSettings::new(request.server_url()?, &self.config);
        let filter = build_filter(&request.search_term, request.strict_match, request.mode);

        let mut session = self
            .connector
            .connect(&settings)
            .await
            .map_err(Error::Connection)?;

        let outcome = self.run(&mut session, request, base_dn, &filter).await;

        if let Err(e) = session.close().await {
            warn!("Failed to unbind from {}: {:#}", settings.url, e);
        }

        match &outcome {
            Ok(records) => info!(
                "Search for {:?} in {} returned {} records",
                request.search_term,
                request.domain,
                records.len()
            ),
            Err(e) => debug!("Search in {} failed: {}", request.domain, e),
        }

        outcome
    }

    async fn run(
        &self,
        session: &mut C::Session,
        request: &SearchRequest,
        base_dn: &str,
        filter: &str,
    ) -> Result<Vec<DirectoryRecord>> {
        session
            .bind(&request.bind_user, &request.bind_password)
            .await
            .map_err(Error::Authentication)?;

        debug!("Searching {} with filter: {}", base_dn, filter);

        session
            .start_search(base_dn, filter, &SEARCH_ATTRIBUTES)
            .await
            .map_err(Error::SearchInitiation)?;

        let mapper = EntryMapper::for_request(request);
        let mut records = Vec::new();

        while let Some(entry) = session.next_entry().await.map_err(Error::Stream)? {
            let record = mapper.map(&entry);
            debug!("Mapped {} as {}", entry.dn, record.name().unwrap_or("-"));
            records.push(record);
        }

        Ok(records)
    }
}

/// One-shot search with the ldap3 connector
pub async fn search(
    config: &DirsearchConfig,
    request: &SearchRequest,
) -> Result<Vec<DirectoryRecord>> {
    DirectorySearcher::from_config(config).search(request).await
}
