// # File Document Store
//
// File-based implementation of DocumentStore.
//
// ## Purpose
//
// Keeps the address document on a local path, so the tool can run
// against a mounted share or a scratch file instead of an SFTP host.
//
// ## Crash Safety
//
// - Atomic writes: Uses write-then-rename
// - Backup: The previous document is copied to `<path>.backup` before
//   every replacement
//
// ## Missing Files
//
// A path that does not exist yet reads as an empty document; the first
// write creates it.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::Error;
use crate::config::StoreConfig;
use crate::traits::document_store::{DocumentStore, DocumentStoreFactory};

/// File-based document store
///
/// # Example
///
/// ```rust,no_run
/// use hostmap_core::store::FileDocumentStore;
/// use hostmap_core::traits::DocumentStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileDocumentStore::new("/var/lib/hostmap/hosts.json").await?;
///
///     // Atomically written to disk
///     store.write_document("{\"addresses\": []}").await?;
///
///     let text = store.read_document().await?;
///     assert_eq!(text, "{\"addresses\": []}");
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct FileDocumentStore {
    path: PathBuf,
    closed: AtomicBool,
}

impl FileDocumentStore {
    /// Create a file document store
    ///
    /// Creates parent directories if needed. The document itself is not
    /// touched until the first write.
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::config(format!(
                    "Failed to create document directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        Ok(Self {
            path,
            closed: AtomicBool::new(false),
        })
    }

    /// Path of the document
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_open(&self) -> Result<(), Error> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::store(format!(
                "file store {} is closed",
                self.path.display()
            )));
        }
        Ok(())
    }

    /// Get path to temporary file for atomic writes
    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        PathBuf::from(temp)
    }

    /// Get path to backup file
    fn backup_path(path: &Path) -> PathBuf {
        let mut backup = path.to_path_buf().into_os_string();
        backup.push(".backup");
        PathBuf::from(backup)
    }
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    async fn read_document(&self) -> Result<String, Error> {
        self.ensure_open()?;

        if !self.path.exists() {
            tracing::debug!("Document does not exist yet: {}", self.path.display());
            return Ok(String::new());
        }

        let content = fs::read_to_string(&self.path).await.map_err(|e| {
            Error::store(format!(
                "Failed to read document {}: {}",
                self.path.display(),
                e
            ))
        })?;

        tracing::debug!("Read {} bytes from {}", content.len(), self.path.display());
        Ok(content)
    }

    async fn write_document(&self, document: &str) -> Result<(), Error> {
        self.ensure_open()?;

        // Write to temporary file first
        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::store(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(document.as_bytes()).await.map_err(|e| {
                Error::store(format!(
                    "Failed to write to temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.flush().await.map_err(|e| {
                Error::store(format!(
                    "Failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        // Keep the previous document around
        if self.path.exists() {
            let backup_path = Self::backup_path(&self.path);
            if let Err(e) = fs::copy(&self.path, &backup_path).await {
                tracing::warn!("Failed to create backup: {}", e);
            }
        }

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::store(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::trace!("Document written to file: {}", self.path.display());
        Ok(())
    }

    async fn close(&self) -> Result<(), Error> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        format!("file://{}", self.path.display())
    }
}

/// Factory for [`FileDocumentStore`]
#[derive(Debug, Default)]
pub struct FileDocumentStoreFactory;

#[async_trait]
impl DocumentStoreFactory for FileDocumentStoreFactory {
    async fn create(&self, config: &StoreConfig) -> Result<Box<dyn DocumentStore>, Error> {
        match config {
            StoreConfig::File { path } => Ok(Box::new(FileDocumentStore::new(path).await?)),
            other => Err(Error::config(format!(
                "file store factory cannot build a `{}` store",
                other.type_name()
            ))),
        }
    }
}
