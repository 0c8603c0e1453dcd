// # Document Store Implementations
//
// This module provides implementations of the DocumentStore trait for
// local backends, plus the registry that builds stores from configuration.

pub mod factory;
pub mod file;
pub mod memory;

pub use factory::StoreRegistry;
pub use file::{FileDocumentStore, FileDocumentStoreFactory};
pub use memory::{MemoryDocumentStore, MemoryDocumentStoreFactory};
