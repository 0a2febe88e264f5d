//! Dirsearch Core Library
//!
//! Core types, configuration and errors for the dirsearch directory lookup tool.

pub mod config;
pub mod error;
pub mod types;

pub use config::{DirsearchConfig, DomainConfig};
pub use error::{Error, Result};
pub use types::{DirectoryRecord, GroupRecord, SearchMode, SearchRequest, UserRecord};

/// Dirsearch version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default LDAP operation timeout (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default LDAP connect timeout (seconds)
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;
