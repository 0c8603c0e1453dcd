//! Error types for hostmap
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for hostmap operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for hostmap
#[derive(Error, Debug)]
pub enum Error {
    /// The domain is already mapped
    #[error("Domain already exists: {0}")]
    DuplicateDomain(String),

    /// The IP address is already mapped to another domain
    #[error("IP address already exists: {0}")]
    DuplicateIp(String),

    /// The IP address is not a dotted-quad IPv4 literal
    #[error("Invalid IP address: {0}")]
    InvalidIpFormat(String),

    /// The domain is empty
    #[error("Domain must not be empty")]
    EmptyDomain,

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The known-hosts file could not be loaded
    #[error("Trust store error: {0}")]
    TrustStore(String),

    /// The server host key could not be verified
    #[error("Host key verification failed: {0}")]
    HostKey(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Document store-related errors
    #[error("Document store error: {0}")]
    Store(String),

    /// The stored document does not follow the address schema
    #[error("Malformed document: {0}")]
    Document(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a trust store error
    pub fn trust_store(msg: impl Into<String>) -> Self {
        Self::TrustStore(msg.into())
    }

    /// Create a host key error
    pub fn host_key(msg: impl Into<String>) -> Self {
        Self::HostKey(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a document store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create a malformed document error
    pub fn document(msg: impl Into<String>) -> Self {
        Self::Document(msg.into())
    }

    /// Whether the error belongs to a single registry operation.
    ///
    /// Recoverable errors are reported to the operator and the session goes
    /// on; everything else points at the store, the session or the setup.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::DuplicateDomain(_) | Self::DuplicateIp(_) | Self::InvalidIpFormat(_) | Self::EmptyDomain
        )
    }

    /// Whether the error must abort startup
    pub fn is_fatal_at_startup(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::TrustStore(_) | Self::HostKey(_) | Self::Authentication(_)
        )
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_errors_are_recoverable() {
        assert!(Error::DuplicateDomain("a.com".into()).is_recoverable());
        assert!(Error::DuplicateIp("1.2.3.4".into()).is_recoverable());
        assert!(Error::InvalidIpFormat("abc".into()).is_recoverable());
        assert!(Error::EmptyDomain.is_recoverable());

        assert!(!Error::store("connection reset").is_recoverable());
        assert!(!Error::document("not an object").is_recoverable());
    }

    #[test]
    fn test_startup_errors_are_fatal() {
        assert!(Error::config("missing").is_fatal_at_startup());
        assert!(Error::trust_store("unreadable").is_fatal_at_startup());
        assert!(Error::host_key("mismatch").is_fatal_at_startup());
        assert!(Error::auth("denied").is_fatal_at_startup());
        assert!(!Error::DuplicateIp("1.2.3.4".into()).is_fatal_at_startup());
    }

    #[test]
    fn test_display() {
        let err = Error::DuplicateDomain("a.com".into());
        assert_eq!(err.to_string(), "Domain already exists: a.com");

        let err: Error = anyhow::anyhow!("boom").into();
        assert_eq!(err.to_string(), "boom");
    }
}
