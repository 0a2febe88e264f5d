//! LDAP/Active Directory lookups for dirsearch
//!
//! Finds users or groups by partial or exact name:
//! - filter building per search mode
//! - one connection, bind and subtree search per call
//! - streaming entry mapping into user/group records

mod client;
mod filter;
mod mapper;
mod search;
mod session;

pub use client::{LdapConnector, LdapSession};
pub use filter::{build_filter, search_value, DISABLED_ACCOUNT_CLAUSE};
pub use mapper::EntryMapper;
pub use search::{search, DirectorySearcher};
pub use session::{ConnectionSettings, DirectoryConnector, DirectorySession, SEARCH_ATTRIBUTES};

pub use ldap3::SearchEntry;
