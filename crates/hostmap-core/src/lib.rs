// # hostmap-core
//
// Core library for the hostmap domain-to-address registry.
//
// ## Architecture Overview
//
// - **Registry**: In-memory domain → IPv4 map with uniqueness and format rules
// - **codec**: Converts a Registry to and from the address document
// - **DocumentStore**: Trait for wherever the document lives (memory, file, SFTP)
// - **StoreRegistry**: Plugin-based registry of store factories
// - **HostMapEngine**: Load → operate → save cycle on top of a store
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Registry and codec do no I/O; stores do no parsing
// 2. **Fresh State**: Every operation reloads the document
// 3. **Plugin-Based**: Backends are registered by name, no hard-coded if-else
// 4. **Library-First**: The front end is a thin layer over this crate

pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod registry;
pub mod store;
pub mod traits;

// Re-export core types for convenience
pub use config::{SftpConfig, StoreConfig};
pub use engine::HostMapEngine;
pub use error::{Error, Result};
pub use registry::{Registry, Removal};
pub use store::{FileDocumentStore, MemoryDocumentStore, StoreRegistry};
pub use traits::{DocumentStore, DocumentStoreFactory};
