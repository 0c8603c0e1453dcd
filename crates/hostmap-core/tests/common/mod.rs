//! Test doubles and common utilities for contract tests
//!
//! This module provides minimal test doubles that record how the engine
//! talks to its store.

#![allow(dead_code)]

use hostmap_core::error::{Error, Result};
use hostmap_core::registry::Registry;
use hostmap_core::traits::DocumentStore;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// A DocumentStore that counts calls and can be told to fail
pub struct CountingStore {
    /// Shared document text
    document: Arc<std::sync::Mutex<String>>,
    /// Call counter for read_document()
    read_call_count: Arc<AtomicUsize>,
    /// Call counter for write_document()
    write_call_count: Arc<AtomicUsize>,
    /// Call counter for close()
    close_call_count: Arc<AtomicUsize>,
    /// When set, every write fails
    fail_writes: Arc<AtomicBool>,
}

impl CountingStore {
    pub fn new(document: &str) -> Self {
        Self {
            document: Arc::new(std::sync::Mutex::new(document.to_string())),
            read_call_count: Arc::new(AtomicUsize::new(0)),
            write_call_count: Arc::new(AtomicUsize::new(0)),
            close_call_count: Arc::new(AtomicUsize::new(0)),
            fail_writes: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create a new CountingStore that shares the document and counters with an existing one
    pub fn sharing_with(other: &Self) -> Self {
        Self {
            document: Arc::clone(&other.document),
            read_call_count: Arc::clone(&other.read_call_count),
            write_call_count: Arc::clone(&other.write_call_count),
            close_call_count: Arc::clone(&other.close_call_count),
            fail_writes: Arc::clone(&other.fail_writes),
        }
    }

    /// Get the number of times read_document() was called
    pub fn read_call_count(&self) -> usize {
        self.read_call_count.load(Ordering::SeqCst)
    }

    /// Get the number of times write_document() was called
    pub fn write_call_count(&self) -> usize {
        self.write_call_count.load(Ordering::SeqCst)
    }

    /// Get the number of times close() was called
    pub fn close_call_count(&self) -> usize {
        self.close_call_count.load(Ordering::SeqCst)
    }

    /// Make every following write fail
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    /// Current document text
    pub fn document(&self) -> String {
        self.document.lock().unwrap().clone()
    }

    /// Replace the document behind the engine's back
    pub fn overwrite(&self, document: &str) {
        *self.document.lock().unwrap() = document.to_string();
    }
}

#[async_trait::async_trait]
impl DocumentStore for CountingStore {
    async fn read_document(&self) -> Result<String> {
        self.read_call_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.document())
    }

    async fn write_document(&self, document: &str) -> Result<()> {
        self.write_call_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::store("connection reset by peer"));
        }
        self.overwrite(document);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.close_call_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "counting".to_string()
    }
}

/// Build a registry from pairs, panicking on invalid input
pub fn registry_of(pairs: &[(&str, &str)]) -> Registry {
    let mut registry = Registry::new();
    for (domain, ip) in pairs {
        registry
            .add(*domain, *ip)
            .expect("test pairs must be valid and unique");
    }
    registry
}

/// Sorted pairs of a registry, owned
pub fn pairs_of(registry: &Registry) -> Vec<(String, String)> {
    registry
        .list()
        .map(|(domain, ip)| (domain.to_string(), ip.to_string()))
        .collect()
}

/// Document text holding the two-entry example registry
pub const EXAMPLE_DOCUMENT: &str = r#"{
    "addresses": [
        { "domain": "a.com", "ip": "1.2.3.4" },
        { "domain": "b.com", "ip": "5.6.7.8" }
    ]
}"#;
