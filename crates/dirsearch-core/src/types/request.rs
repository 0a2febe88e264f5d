//! Search request types

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Search Mode
// ============================================================================

/// What to look for and which attributes the search term is matched against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SearchMode {
    /// Users by `cn`, `sAMAccountName` or `displayName`
    #[default]
    UserByNameOrLogin,
    /// Users by `cn` or `sAMAccountName`
    UserByLogin,
    /// Users by `cn` or `displayName`
    UserByName,
    /// Groups by `name`
    GroupByName,
}

impl SearchMode {
    pub const ALL: [SearchMode; 4] = [
        SearchMode::UserByNameOrLogin,
        SearchMode::UserByLogin,
        SearchMode::UserByName,
        SearchMode::GroupByName,
    ];

    /// Legacy numeric code (0..=3)
    pub fn code(&self) -> u8 {
        match self {
            SearchMode::UserByNameOrLogin => 0,
            SearchMode::UserByLogin => 1,
            SearchMode::UserByName => 2,
            SearchMode::GroupByName => 3,
        }
    }

    pub fn is_user_search(&self) -> bool {
        !self.is_group_search()
    }

    pub fn is_group_search(&self) -> bool {
        matches!(self, SearchMode::GroupByName)
    }
}

impl TryFrom<u8> for SearchMode {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0 => Ok(SearchMode::UserByNameOrLogin),
            1 => Ok(SearchMode::UserByLogin),
            2 => Ok(SearchMode::UserByName),
            3 => Ok(SearchMode::GroupByName),
            _ => Err(Error::Configuration(format!(
                "Invalid search mode: {} (expected 0-3)",
                code
            ))),
        }
    }
}

impl FromStr for SearchMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "name-or-login" | "0" => Ok(SearchMode::UserByNameOrLogin),
            "login" | "1" => Ok(SearchMode::UserByLogin),
            "name" | "2" => Ok(SearchMode::UserByName),
            "group" | "3" => Ok(SearchMode::GroupByName),
            _ => Err(Error::Configuration(format!("Invalid search mode: {}", s))),
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchMode::UserByNameOrLogin => write!(f, "name-or-login"),
            SearchMode::UserByLogin => write!(f, "login"),
            SearchMode::UserByName => write!(f, "name"),
            SearchMode::GroupByName => write!(f, "group"),
        }
    }
}

// ============================================================================
// Search Request
// ============================================================================

/// A single directory lookup. Immutable once built.
#[derive(Clone)]
pub struct SearchRequest {
    /// Directory host, either a bare host name or an `ldap://`/`ldaps://` URL
    pub host: String,
    /// Domain name, resolved against the configured domains
    pub domain: String,
    pub search_term: String,
    pub bind_user: String,
    pub bind_password: String,
    /// Match the term exactly instead of as a prefix
    pub strict_match: bool,
    pub mode: SearchMode,
    /// Return `thumbnailPhoto` as base64
    pub load_photo: bool,
}

impl SearchRequest {
    pub fn new(
        host: impl Into<String>,
        domain: impl Into<String>,
        search_term: impl Into<String>,
        mode: SearchMode,
    ) -> Self {
        Self {
            host: host.into(),
            domain: domain.into(),
            search_term: search_term.into(),
            bind_user: String::new(),
            bind_password: String::new(),
            strict_match: false,
            mode,
            load_photo: false,
        }
    }

    pub fn with_credentials(
        mut self,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.bind_user = user.into();
        self.bind_password = password.into();
        self
    }

    pub fn with_strict_match(mut self, strict: bool) -> Self {
        self.strict_match = strict;
        self
    }

    pub fn with_photo(mut self, load_photo: bool) -> Self {
        self.load_photo = load_photo;
        self
    }

    /// LDAP URL for `host`. Bare host names get the `ldap://` scheme.
    pub fn server_url(&self) -> Result<String> {
        let host = self.host.trim();
        if host.is_empty() {
            return Err(Error::Configuration("Host is required".into()));
        }

        let candidate = if host.contains("://") {
            host.to_string()
        } else {
            format!("ldap://{}", host)
        };

        let url = url::Url::parse(&candidate)
            .map_err(|e| Error::Configuration(format!("Invalid LDAP host {}: {}", host, e)))?;

        match url.scheme() {
            "ldap" | "ldaps" if url.host_str().is_some() => Ok(candidate),
            "ldap" | "ldaps" => Err(Error::Configuration(format!("Missing host in {}", host))),
            scheme => Err(Error::Configuration(format!(
                "Unsupported LDAP scheme: {} (expected ldap or ldaps)",
                scheme
            ))),
        }
    }
}

impl fmt::Debug for SearchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchRequest")
            .field("host", &self.host)
            .field("domain", &self.domain)
            .field("search_term", &self.search_term)
            .field("bind_user", &self.bind_user)
            .field("bind_password", &"<redacted>")
            .field("strict_match", &self.strict_match)
            .field("mode", &self.mode)
            .field("load_photo", &self.load_photo)
            .finish()
    }
}
