// # Memory Document Store
//
// In-memory implementation of DocumentStore.
//
// ## Purpose
//
// Holds the document text in process memory. Useful for tests and for
// trying the tool without a remote host.
//
// ## Crash Behavior
//
// - All state is lost when the process exits
// - Clones share the same document, so a test can keep a handle and
//   inspect what the engine wrote

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::config::StoreConfig;
use crate::traits::document_store::{DocumentStore, DocumentStoreFactory};

/// In-memory document store implementation
///
/// # Example
///
/// ```rust,no_run
/// use hostmap_core::store::MemoryDocumentStore;
/// use hostmap_core::traits::DocumentStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryDocumentStore::new();
///
///     store.write_document("{\"addresses\": []}").await?;
///     assert_eq!(store.read_document().await?, "{\"addresses\": []}");
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    inner: Arc<RwLock<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    document: String,
    writes: usize,
    closed: bool,
}

impl MemoryDocumentStore {
    /// Create a store holding an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `document`
    pub fn with_document(document: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryState {
                document: document.into(),
                ..MemoryState::default()
            })),
        }
    }

    /// Current document text
    pub async fn document(&self) -> String {
        self.inner.read().await.document.clone()
    }

    /// Number of completed writes
    pub async fn write_count(&self) -> usize {
        self.inner.read().await.writes
    }

    /// Whether `close()` has been called
    pub async fn is_closed(&self) -> bool {
        self.inner.read().await.closed
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn read_document(&self) -> Result<String, Error> {
        let guard = self.inner.read().await;
        if guard.closed {
            return Err(Error::store("memory store is closed"));
        }
        Ok(guard.document.clone())
    }

    async fn write_document(&self, document: &str) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        if guard.closed {
            return Err(Error::store("memory store is closed"));
        }
        guard.document = document.to_string();
        guard.writes += 1;
        Ok(())
    }

    async fn close(&self) -> Result<(), Error> {
        self.inner.write().await.closed = true;
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// Factory for [`MemoryDocumentStore`]
#[derive(Debug, Default)]
pub struct MemoryDocumentStoreFactory;

#[async_trait]
impl DocumentStoreFactory for MemoryDocumentStoreFactory {
    async fn create(&self, config: &StoreConfig) -> Result<Box<dyn DocumentStore>, Error> {
        match config {
            StoreConfig::Memory => Ok(Box::new(MemoryDocumentStore::new())),
            other => Err(Error::config(format!(
                "memory store factory cannot build a `{}` store",
                other.type_name()
            ))),
        }
    }
}
