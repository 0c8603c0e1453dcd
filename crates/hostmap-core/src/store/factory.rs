//! Plugin-based store registry
//!
//! The registry lets document stores be registered by type name at
//! runtime, so the front end builds whatever the configuration names
//! without a hard-coded branch per backend.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hostmap_core::store::StoreRegistry;
//! use hostmap_core::config::StoreConfig;
//!
//! // Memory and file stores come pre-registered
//! let registry = StoreRegistry::with_builtin();
//!
//! // Backends living in other crates register themselves
//! hostmap_sftp::register(&registry);
//!
//! let store = registry.create_store(&config).await?;
//! ```

use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::store::{FileDocumentStoreFactory, MemoryDocumentStoreFactory};
use crate::traits::{DocumentStore, DocumentStoreFactory};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Registry of document store factories
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct StoreRegistry {
    factories: RwLock<HashMap<String, Arc<dyn DocumentStoreFactory>>>,
}

impl StoreRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the memory and file stores registered
    pub fn with_builtin() -> Self {
        let registry = Self::new();
        registry.register_store("memory", Box::new(MemoryDocumentStoreFactory));
        registry.register_store("file", Box::new(FileDocumentStoreFactory));
        registry
    }

    /// Register a document store factory
    ///
    /// # Parameters
    ///
    /// - `name`: Store type name (e.g., "file", "sftp")
    /// - `factory`: Factory object for creating store instances
    pub fn register_store(&self, name: impl Into<String>, factory: Box<dyn DocumentStoreFactory>) {
        let mut factories = self
            .factories
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        factories.insert(name.into(), Arc::from(factory));
    }

    /// Create a document store from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn DocumentStore>)`: Created store instance
    /// - `Err(Error)`: If the store type is not registered or creation fails
    pub async fn create_store(&self, config: &StoreConfig) -> Result<Box<dyn DocumentStore>> {
        config.validate()?;

        let store_type = config.type_name();
        let factory = {
            let factories = self.factories.read().unwrap_or_else(PoisonError::into_inner);
            factories
                .get(store_type)
                .cloned()
                .ok_or_else(|| Error::config(format!("Unknown store type: {}", store_type)))?
        };

        // Lock released before the async create
        factory.create(config).await
    }

    /// List all registered store types
    pub fn list_stores(&self) -> Vec<String> {
        let factories = self.factories.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = factories.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a store type is registered
    pub fn has_store(&self, name: &str) -> bool {
        let factories = self.factories.read().unwrap_or_else(PoisonError::into_inner);
        factories.contains_key(name)
    }
}
