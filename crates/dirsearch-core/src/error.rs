//! Error types for dirsearch

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // Request / configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unknown domain: {0}")]
    UnknownDomain(String),

    // Directory errors
    #[error("Failed to connect to LDAP server: {0}")]
    Connection(#[source] anyhow::Error),

    #[error("LDAP bind failed: {0}")]
    Authentication(#[source] anyhow::Error),

    #[error("LDAP search rejected: {0}")]
    SearchInitiation(#[source] anyhow::Error),

    #[error("LDAP search stream failed: {0}")]
    Stream(#[source] anyhow::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn code(&self) -> &'static str {
        match self {
            Error::Configuration(_) => "ConfigurationError",
            Error::UnknownDomain(_) => "UnknownDomain",
            Error::Connection(_) => "ConnectionError",
            Error::Authentication(_) => "AuthenticationError",
            Error::SearchInitiation(_) => "SearchInitiationError",
            Error::Stream(_) => "StreamError",
            Error::Io(_) => "InternalError",
            Error::Other(_) => "InternalError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = Error::Authentication(anyhow::anyhow!("rc=49"));
        assert_eq!(err.code(), "AuthenticationError");

        let err = Error::UnknownDomain("corp".to_string());
        assert_eq!(err.code(), "UnknownDomain");
    }

    #[test]
    fn test_error_carries_cause() {
        let err = Error::Stream(anyhow::anyhow!("connection reset"));
        assert_eq!(err.to_string(), "LDAP search stream failed: connection reset");
        assert!(std::error::Error::source(&err).is_some());
    }
}
