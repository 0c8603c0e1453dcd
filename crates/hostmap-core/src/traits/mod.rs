//! Core traits for hostmap
//!
//! - [`DocumentStore`]: Read and write the address document
//! - [`DocumentStoreFactory`]: Build a store from configuration

pub mod document_store;

pub use document_store::{DocumentStore, DocumentStoreFactory};
