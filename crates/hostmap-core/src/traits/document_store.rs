// # Document Store Trait
//
// Defines the interface to wherever the address document lives.
//
// ## Purpose
//
// The store moves the document text between its backing location and the
// engine. It knows nothing about the document's structure: decoding,
// validation and mutation belong to the codec and the registry.
//
// ## Implementations
//
// - In-memory: tests and dry runs
// - File-based: a local path, atomic writes
// - SFTP: `hostmap-sftp` crate
//
// ## Usage
//
// ```rust,ignore
// use hostmap_core::DocumentStore;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let store = /* DocumentStore implementation */;
//
//     let text = store.read_document().await?;
//     store.write_document(&text).await?;
//     store.close().await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::config::StoreConfig;

/// Trait for document store implementations
///
/// # Consistency
///
/// Stores provide no locking and no version check. Two clients writing the
/// same document overwrite each other; the last write wins.
///
/// # Lifecycle
///
/// `close()` releases the underlying resource (session, handle). It must be
/// idempotent, and reads or writes after `close()` must fail with
/// [`Error::Store`](crate::Error::Store) rather than panic.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read the whole document
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The document text; empty if the document does not exist yet
    /// - `Err(Error)`: Transport or storage error
    async fn read_document(&self) -> Result<String, crate::Error>;

    /// Replace the whole document
    ///
    /// # Parameters
    ///
    /// - `document`: The encoded document text
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The new text is stored
    /// - `Err(Error)`: Transport or storage error
    async fn write_document(&self, document: &str) -> Result<(), crate::Error>;

    /// Release the underlying resource
    async fn close(&self) -> Result<(), crate::Error>;

    /// Human-readable location, for logs and the menu header
    fn describe(&self) -> String;
}

/// Helper trait for constructing document stores from configuration
#[async_trait]
pub trait DocumentStoreFactory: Send + Sync {
    /// Create a DocumentStore instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Store configuration; factories reject variants they do not handle
    ///
    /// # Returns
    ///
    /// A boxed DocumentStore trait object
    async fn create(&self, config: &StoreConfig) -> Result<Box<dyn DocumentStore>, crate::Error>;
}
