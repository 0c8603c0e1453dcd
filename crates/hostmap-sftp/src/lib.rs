// # SFTP Document Store
//
// This crate provides the SFTP-backed DocumentStore for hostmap.
//
// ## Session Setup
//
// 1. Read the local known-hosts file (fails before any network traffic)
// 2. TCP connect and SSH handshake
// 3. Verify the server host key against the known-hosts entries
// 4. Password authentication
// 5. Open the SFTP subsystem
//
// Any failure aborts `connect()`; there is no retry and no reconnect.
//
// A missing remote file reads as an empty document and is created by the
// first write.
//
// ## Blocking I/O
//
// libssh2 is blocking. Every call runs on `tokio::task::spawn_blocking`
// with the session behind a mutex, so the async runtime is never stalled.
//
// ## Security Requirements
//
// - The password NEVER appears in logs or Debug output
// - Unknown or changed host keys are rejected, never added

use async_trait::async_trait;
use hostmap_core::config::{SftpConfig, StoreConfig};
use hostmap_core::traits::{DocumentStore, DocumentStoreFactory};
use hostmap_core::{Error, Result, StoreRegistry};
use ssh2::{CheckResult, ErrorCode, KnownHostFileKind, OpenFlags, OpenType, Session, Sftp};
use std::io::{Read, Write};
use std::net::TcpStream;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

/// libssh2 status for a missing remote file (LIBSSH2_FX_NO_SUCH_FILE)
const SFTP_NO_SUCH_FILE: i32 = 2;

/// Open flags for writing the document: create it if missing, replace it otherwise
const WRITE_FLAGS: OpenFlags = OpenFlags::WRITE
    .union(OpenFlags::CREATE)
    .union(OpenFlags::TRUNCATE);

/// Permissions for a newly created remote document
const DOCUMENT_MODE: i32 = 0o644;

/// An open SSH session with its SFTP channel
struct SftpSession {
    session: Session,
    sftp: Sftp,
}

/// SFTP-backed document store
///
/// The session is released on `close()` and, at the latest, when the store
/// is dropped.
pub struct SftpDocumentStore {
    /// Document path on the remote host
    remote_path: PathBuf,

    /// `user@host:port` for logs
    target: String,

    /// `None` once closed
    session: Arc<Mutex<Option<SftpSession>>>,
}

impl std::fmt::Debug for SftpDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SftpDocumentStore")
            .field("target", &self.target)
            .field("remote_path", &self.remote_path)
            .finish()
    }
}

impl SftpDocumentStore {
    /// Open an authenticated SFTP session
    ///
    /// # Errors
    ///
    /// - `Error::Config`: invalid configuration
    /// - `Error::TrustStore`: the known-hosts file cannot be read
    /// - `Error::Store`: connection or SSH handshake failure
    /// - `Error::HostKey`: the server key is unknown or does not match
    /// - `Error::Authentication`: the credentials were rejected
    pub async fn connect(config: &SftpConfig) -> Result<Self> {
        config.validate()?;

        let known_hosts = load_known_hosts(Path::new(&config.known_hosts_path)).await?;
        let target = target_of(config);
        info!("Connecting to {}", target);

        let blocking_config = config.clone();
        let session = tokio::task::spawn_blocking(move || {
            open_session(&blocking_config, &known_hosts)
        })
        .await
        .map_err(|e| Error::store(format!("SFTP connect task failed: {}", e)))??;

        info!("SFTP session established with {}", target);

        Ok(Self {
            remote_path: PathBuf::from(&config.remote_path),
            target,
            session: Arc::new(Mutex::new(Some(session))),
        })
    }

    /// Run `op` against the open session on the blocking pool
    async fn with_session<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&SftpSession, &Path) -> Result<T> + Send + 'static,
    {
        let session = Arc::clone(&self.session);
        let remote_path = self.remote_path.clone();

        tokio::task::spawn_blocking(move || {
            let guard = session.lock().unwrap_or_else(PoisonError::into_inner);
            match guard.as_ref() {
                Some(open) => op(open, &remote_path),
                None => Err(Error::store("SFTP session is closed")),
            }
        })
        .await
        .map_err(|e| Error::store(format!("SFTP task failed: {}", e)))?
    }
}

#[async_trait]
impl DocumentStore for SftpDocumentStore {
    async fn read_document(&self) -> Result<String> {
        let text = self
            .with_session(|open, path| {
                let mut file = match open.sftp.open(path) {
                    Ok(file) => file,
                    Err(e) if is_missing_file(&e) => {
                        debug!("Remote document {} does not exist yet", path.display());
                        return Ok(String::new());
                    }
                    Err(e) => {
                        return Err(Error::store(format!(
                            "Failed to open {}: {}",
                            path.display(),
                            e
                        )));
                    }
                };

                let mut text = String::new();
                file.read_to_string(&mut text).map_err(|e| {
                    Error::store(format!("Failed to read {}: {}", path.display(), e))
                })?;
                Ok(text)
            })
            .await?;

        debug!("Read {} bytes from {}", text.len(), self.describe());
        Ok(text)
    }

    async fn write_document(&self, document: &str) -> Result<()> {
        let bytes = document.as_bytes().to_vec();
        let len = bytes.len();

        self.with_session(move |open, path| {
            let mut file = open
                .sftp
                .open_mode(path, WRITE_FLAGS, DOCUMENT_MODE, OpenType::File)
                .map_err(|e| {
                    Error::store(format!("Failed to create {}: {}", path.display(), e))
                })?;
            file.write_all(&bytes).map_err(|e| {
                Error::store(format!("Failed to write {}: {}", path.display(), e))
            })?;
            file.flush().map_err(|e| {
                Error::store(format!("Failed to flush {}: {}", path.display(), e))
            })?;
            Ok(())
        })
        .await?;

        debug!("Wrote {} bytes to {}", len, self.describe());
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        let session = Arc::clone(&self.session);
        let target = self.target.clone();

        tokio::task::spawn_blocking(move || {
            let taken = session
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();

            if let Some(open) = taken {
                // The SFTP channel must go before the session
                drop(open.sftp);
                if let Err(e) = open.session.disconnect(None, "hostmap session closed", None) {
                    warn!("Disconnect from {} failed: {}", target, e);
                }
                info!("SFTP session with {} closed", target);
            }
        })
        .await
        .map_err(|e| Error::store(format!("SFTP close task failed: {}", e)))
    }

    fn describe(&self) -> String {
        format!("sftp://{} {}", self.target, self.remote_path.display())
    }
}

/// Read the known-hosts file into memory
async fn load_known_hosts(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path).await.map_err(|e| {
        Error::trust_store(format!(
            "Failed to load known hosts from {}: {}",
            path.display(),
            e
        ))
    })
}

/// Non-comment, non-blank lines of a known-hosts file
fn known_host_entries(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

fn target_of(config: &SftpConfig) -> String {
    format!("{}@{}:{}", config.username, config.host, config.port)
}

fn open_session(config: &SftpConfig, known_hosts: &str) -> Result<SftpSession> {
    let tcp = TcpStream::connect((config.host.as_str(), config.port)).map_err(|e| {
        Error::store(format!(
            "Failed to connect to {}:{}: {}",
            config.host, config.port, e
        ))
    })?;

    let mut session =
        Session::new().map_err(|e| Error::store(format!("Failed to create SSH session: {}", e)))?;
    session.set_tcp_stream(tcp);
    session
        .handshake()
        .map_err(|e| Error::store(format!("SSH handshake with {} failed: {}", config.host, e)))?;

    verify_host_key(&session, &config.host, config.port, known_hosts)?;

    session
        .userauth_password(&config.username, &config.password)
        .map_err(|e| Error::auth(format!("{}@{}: {}", config.username, config.host, e)))?;
    if !session.authenticated() {
        return Err(Error::auth(format!(
            "{}@{}: server did not accept the credentials",
            config.username, config.host
        )));
    }

    let sftp = session
        .sftp()
        .map_err(|e| Error::store(format!("Failed to open SFTP subsystem: {}", e)))?;

    Ok(SftpSession { session, sftp })
}

fn verify_host_key(session: &Session, host: &str, port: u16, known_hosts: &str) -> Result<()> {
    let mut known = session
        .known_hosts()
        .map_err(|e| Error::trust_store(format!("Failed to initialise known hosts: {}", e)))?;

    let mut loaded = 0usize;
    for entry in known_host_entries(known_hosts) {
        match known.read_str(entry, KnownHostFileKind::OpenSSH) {
            Ok(()) => loaded += 1,
            Err(e) => warn!("Skipping unreadable known-hosts entry: {}", e),
        }
    }
    debug!("Loaded {} known-hosts entries", loaded);

    let (key, _) = session
        .host_key()
        .ok_or_else(|| Error::host_key(format!("{} presented no host key", host)))?;

    host_key_verdict(known.check_port(host, port, key), host)
}

/// Whether an SFTP error means the remote file does not exist
fn is_missing_file(err: &ssh2::Error) -> bool {
    matches!(err.code(), ErrorCode::SFTP(SFTP_NO_SUCH_FILE))
}

/// Only an exact known-hosts match is accepted
fn host_key_verdict(result: CheckResult, host: &str) -> Result<()> {
    match result {
        CheckResult::Match => Ok(()),
        CheckResult::NotFound => Err(Error::host_key(format!(
            "{} is not listed in the known-hosts file",
            host
        ))),
        CheckResult::Mismatch => Err(Error::host_key(format!(
            "host key for {} does not match the known-hosts entry",
            host
        ))),
        CheckResult::Failure => Err(Error::host_key(format!(
            "could not check the host key for {}",
            host
        ))),
    }
}

/// Factory for [`SftpDocumentStore`]
#[derive(Debug, Default)]
pub struct SftpStoreFactory;

#[async_trait]
impl DocumentStoreFactory for SftpStoreFactory {
    async fn create(&self, config: &StoreConfig) -> Result<Box<dyn DocumentStore>> {
        match config {
            StoreConfig::Sftp(sftp) => Ok(Box::new(SftpDocumentStore::connect(sftp).await?)),
            other => Err(Error::config(format!(
                "sftp store factory cannot build a `{}` store",
                other.type_name()
            ))),
        }
    }
}

/// Register the SFTP store under the `sftp` type name
pub fn register(registry: &StoreRegistry) {
    registry.register_store("sftp", Box::new(SftpStoreFactory));
}
