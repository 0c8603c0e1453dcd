//! Configuration types for hostmap
//!
//! This module defines the store configuration shared by the store
//! factories and the command-line front end.

use serde::{Deserialize, Serialize};

/// Default SSH port
pub const DEFAULT_SFTP_PORT: u16 = 22;

/// Document store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreConfig {
    /// Remote document reached over SFTP
    Sftp(SftpConfig),

    /// Local document file
    File {
        /// Path to the document
        path: String,
    },

    /// In-memory document (not persistent)
    #[default]
    Memory,
}

impl StoreConfig {
    /// Validate the store configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            StoreConfig::Sftp(sftp) => sftp.validate(),
            StoreConfig::File { path } => {
                if path.trim().is_empty() {
                    return Err(crate::Error::config("File store path cannot be empty"));
                }
                Ok(())
            }
            StoreConfig::Memory => Ok(()),
        }
    }

    /// Get the store type name
    pub fn type_name(&self) -> &'static str {
        match self {
            StoreConfig::Sftp(_) => "sftp",
            StoreConfig::File { .. } => "file",
            StoreConfig::Memory => "memory",
        }
    }
}

/// SFTP session configuration
///
/// The Debug implementation does NOT expose the password.
#[derive(Clone, Serialize, Deserialize)]
pub struct SftpConfig {
    /// Remote host name or address
    pub host: String,

    /// SSH port
    #[serde(default = "default_sftp_port")]
    pub port: u16,

    /// Login name
    pub username: String,

    /// Login password
    /// ⚠️ NEVER log this value
    #[serde(skip_serializing, default)]
    pub password: String,

    /// Path of the document on the remote host
    pub remote_path: String,

    /// Local known-hosts file used to verify the server key
    pub known_hosts_path: String,
}

impl SftpConfig {
    /// Validate the SFTP configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.host.trim().is_empty() {
            return Err(crate::Error::config("SFTP host cannot be empty"));
        }
        if self.port == 0 {
            return Err(crate::Error::config("SFTP port must be > 0"));
        }
        if self.username.is_empty() {
            return Err(crate::Error::config("SFTP username cannot be empty"));
        }
        if self.remote_path.trim().is_empty() {
            return Err(crate::Error::config("Remote document path cannot be empty"));
        }
        if self.known_hosts_path.trim().is_empty() {
            return Err(crate::Error::config("Known-hosts path cannot be empty"));
        }
        Ok(())
    }
}

// Custom Debug implementation that hides the password
impl std::fmt::Debug for SftpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SftpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .field("remote_path", &self.remote_path)
            .field("known_hosts_path", &self.known_hosts_path)
            .finish()
    }
}

fn default_sftp_port() -> u16 {
    DEFAULT_SFTP_PORT
}
