//! Core hostmap engine
//!
//! The HostMapEngine is responsible for:
//! - Loading the registry from the document store
//! - Applying one lookup or mutation
//! - Writing the document back after a mutation
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐   text    ┌─────────┐  Registry  ┌────────────────┐
//! │ DocumentStore │ ────────▶ │  codec  │ ─────────▶ │ HostMapEngine  │
//! └───────────────┘           └─────────┘            └────────────────┘
//!         ▲                        │                          │
//!         └──────── text ──────────┴──────── mutated ─────────┘
//! ```
//!
//! ## Operation Flow
//!
//! 1. Read the document and decode it into a fresh Registry
//! 2. Run the lookup or mutation against the Registry
//! 3. On a successful mutation, encode and write the document back
//!
//! Nothing is cached between operations. There is no version check either:
//! if another client writes the same document between steps 1 and 3, its
//! changes are overwritten.

use crate::codec;
use crate::error::Result;
use crate::registry::{Registry, Removal};
use crate::traits::DocumentStore;
use tracing::{debug, info, warn};

/// Core hostmap engine
///
/// ## Lifecycle
///
/// 1. Create with [`HostMapEngine::new()`]
/// 2. Run operations; each one reloads the document
/// 3. Call [`HostMapEngine::close()`] to release the store
pub struct HostMapEngine {
    /// Where the document lives
    store: Box<dyn DocumentStore>,
}

impl HostMapEngine {
    /// Create a new engine on top of a document store
    pub fn new(store: Box<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Human-readable location of the document
    pub fn location(&self) -> String {
        self.store.describe()
    }

    /// Read and decode the current document
    pub async fn load(&self) -> Result<Registry> {
        let text = self.store.read_document().await?;
        let registry = codec::decode(&text)?;
        debug!(
            "Loaded {} entries from {}",
            registry.len(),
            self.store.describe()
        );
        Ok(registry)
    }

    /// Encode and write `registry` as the new document
    pub async fn save(&self, registry: &Registry) -> Result<()> {
        let text = codec::encode(registry)?;
        self.store.write_document(&text).await?;
        debug!(
            "Saved {} entries to {}",
            registry.len(),
            self.store.describe()
        );
        Ok(())
    }

    /// All pairs, sorted by domain
    pub async fn list(&self) -> Result<Vec<(String, String)>> {
        let registry = self.load().await?;
        Ok(registry
            .list()
            .map(|(domain, ip)| (domain.to_string(), ip.to_string()))
            .collect())
    }

    /// Address mapped to `domain`
    pub async fn resolve_domain(&self, domain: &str) -> Result<Option<String>> {
        let registry = self.load().await?;
        Ok(registry.lookup_by_domain(domain).map(str::to_string))
    }

    /// Domain mapped to `ip`
    pub async fn resolve_ip(&self, ip: &str) -> Result<Option<String>> {
        let registry = self.load().await?;
        Ok(registry.lookup_by_ip(ip).map(str::to_string))
    }

    /// Add a pair and persist it
    ///
    /// Rejected pairs leave the document untouched.
    pub async fn add(&self, domain: &str, ip: &str) -> Result<()> {
        let mut registry = self.load().await?;

        if let Err(e) = registry.add(domain, ip) {
            debug!("Rejected {} -> {}: {}", domain, ip, e);
            return Err(e);
        }

        self.save(&registry).await?;
        info!("Added {} -> {}", domain, ip);
        Ok(())
    }

    /// Remove a pair by domain or address and persist the result
    pub async fn remove(&self, key: &str) -> Result<Removal> {
        let mut registry = self.load().await?;

        let removal = registry.remove(key);
        match &removal {
            Removal::ByDomain { domain, ip } | Removal::ByIp { domain, ip } => {
                self.save(&registry).await?;
                info!("Removed {} -> {}", domain, ip);
            }
            Removal::NotFound => debug!("Nothing to remove for {}", key),
        }

        Ok(removal)
    }

    /// Release the store
    pub async fn close(&self) -> Result<()> {
        if let Err(e) = self.store.close().await {
            warn!("Failed to close {}: {}", self.store.describe(), e);
            return Err(e);
        }
        info!("Closed {}", self.store.describe());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::store::MemoryDocumentStore;

    const SEED: &str = r#"{"addresses": [
        {"domain": "a.com", "ip": "1.2.3.4"},
        {"domain": "b.com", "ip": "5.6.7.8"}
    ]}"#;

    fn engine() -> (HostMapEngine, MemoryDocumentStore) {
        let store = MemoryDocumentStore::with_document(SEED);
        (HostMapEngine::new(Box::new(store.clone())), store)
    }

    #[tokio::test]
    async fn test_lookups_do_not_write() {
        let (engine, store) = engine();

        assert_eq!(
            engine.resolve_domain("a.com").await.unwrap(),
            Some("1.2.3.4".to_string())
        );
        assert_eq!(
            engine.resolve_ip("5.6.7.8").await.unwrap(),
            Some("b.com".to_string())
        );
        assert_eq!(engine.resolve_ip("9.9.9.9").await.unwrap(), None);
        assert_eq!(engine.list().await.unwrap().len(), 2);

        assert_eq!(store.write_count().await, 0);
    }

    #[tokio::test]
    async fn test_add_persists() {
        let (engine, store) = engine();

        engine.add("c.com", "9.9.9.9").await.unwrap();

        assert_eq!(store.write_count().await, 1);
        let registry = codec::decode(&store.document().await).unwrap();
        assert_eq!(registry.lookup_by_domain("c.com"), Some("9.9.9.9"));
    }

    #[tokio::test]
    async fn test_rejected_add_does_not_write() {
        let (engine, store) = engine();

        let err = engine.add("a.com", "9.9.9.9").await.unwrap_err();
        assert!(matches!(err, Error::DuplicateDomain(_)));
        assert!(err.is_recoverable());

        assert_eq!(store.write_count().await, 0);
        assert_eq!(store.document().await, SEED);
    }

    #[tokio::test]
    async fn test_remove_not_found_does_not_write() {
        let (engine, store) = engine();

        assert_eq!(engine.remove("nope").await.unwrap(), Removal::NotFound);
        assert_eq!(store.write_count().await, 0);

        assert!(engine.remove("5.6.7.8").await.unwrap().is_removed());
        assert_eq!(store.write_count().await, 1);
    }

    #[tokio::test]
    async fn test_close_closes_store() {
        let (engine, store) = engine();

        engine.close().await.unwrap();
        assert!(store.is_closed().await);
        assert!(matches!(engine.list().await, Err(Error::Store(_))));
    }
}
