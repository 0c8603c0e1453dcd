//! Contract Test: Engine persistence
//!
//! Constraints verified:
//! - Every operation reloads the document (nothing cached in memory)
//! - Only successful mutations write the document back
//! - Store failures surface as errors, never panics
//! - Concurrent writers overwrite each other (last write wins)
//!
//! If this test fails, the engine may be writing stale or unexpected documents.

mod common;

use common::*;
use hostmap_core::codec::decode;
use hostmap_core::registry::Removal;
use hostmap_core::{Error, HostMapEngine};

fn engine_over(store: &CountingStore) -> HostMapEngine {
    HostMapEngine::new(Box::new(CountingStore::sharing_with(store)))
}

#[tokio::test]
async fn every_operation_reloads_the_document() {
    let store = CountingStore::new(EXAMPLE_DOCUMENT);
    let engine = engine_over(&store);

    engine.list().await.unwrap();
    engine.resolve_domain("a.com").await.unwrap();
    engine.resolve_ip("5.6.7.8").await.unwrap();
    assert_eq!(store.read_call_count(), 3);

    // A change made elsewhere is visible to the next operation
    store.overwrite(r#"{"addresses": [{"domain": "c.com", "ip": "9.9.9.9"}]}"#);
    assert_eq!(
        engine.resolve_domain("c.com").await.unwrap(),
        Some("9.9.9.9".to_string())
    );
    assert_eq!(engine.resolve_domain("a.com").await.unwrap(), None);
}

#[tokio::test]
async fn only_successful_mutations_write() {
    let store = CountingStore::new(EXAMPLE_DOCUMENT);
    let engine = engine_over(&store);

    // Rejected adds
    assert!(matches!(
        engine.add("a.com", "9.9.9.9").await,
        Err(Error::DuplicateDomain(_))
    ));
    assert!(matches!(
        engine.add("c.com", "1.2.3.4").await,
        Err(Error::DuplicateIp(_))
    ));
    assert!(matches!(
        engine.add("c.com", "1.2.3").await,
        Err(Error::InvalidIpFormat(_))
    ));
    assert_eq!(engine.remove("missing").await.unwrap(), Removal::NotFound);
    assert_eq!(store.write_call_count(), 0);

    // Accepted mutations
    engine.add("c.com", "9.9.9.9").await.unwrap();
    assert!(engine.remove("a.com").await.unwrap().is_removed());
    assert_eq!(store.write_call_count(), 2);

    let registry = decode(&store.document()).unwrap();
    assert_eq!(
        pairs_of(&registry),
        vec![
            ("b.com".to_string(), "5.6.7.8".to_string()),
            ("c.com".to_string(), "9.9.9.9".to_string()),
        ]
    );
}

#[tokio::test]
async fn write_failure_is_reported() {
    let store = CountingStore::new(EXAMPLE_DOCUMENT);
    let engine = engine_over(&store);
    store.fail_writes();

    let err = engine.add("c.com", "9.9.9.9").await.unwrap_err();
    assert!(matches!(err, Error::Store(_)));
    assert!(!err.is_recoverable());

    // The stored document is unchanged
    assert_eq!(store.document(), EXAMPLE_DOCUMENT);
}

#[tokio::test]
async fn malformed_document_is_reported() {
    let store = CountingStore::new("addresses: a.com=1.2.3.4");
    let engine = engine_over(&store);

    assert!(matches!(engine.list().await, Err(Error::Document(_))));
    assert!(matches!(
        engine.add("c.com", "9.9.9.9").await,
        Err(Error::Document(_))
    ));
    assert_eq!(store.write_call_count(), 0);
}

#[tokio::test]
async fn fresh_document_is_created_on_first_add() {
    let store = CountingStore::new("");
    let engine = engine_over(&store);

    assert!(engine.list().await.unwrap().is_empty());
    engine.add("first.example", "10.0.0.1").await.unwrap();

    let registry = decode(&store.document()).unwrap();
    assert_eq!(registry.lookup_by_domain("first.example"), Some("10.0.0.1"));
}

#[tokio::test]
async fn last_writer_wins() {
    // Two clients on the same document
    let store = CountingStore::new(EXAMPLE_DOCUMENT);
    let first = engine_over(&store);
    let second = engine_over(&store);

    // Both load the same snapshot before either writes
    let mut first_view = first.load().await.unwrap();
    let mut second_view = second.load().await.unwrap();

    first_view.add("from-first.example", "10.0.0.1").unwrap();
    second_view.add("from-second.example", "10.0.0.2").unwrap();

    first.save(&first_view).await.unwrap();
    second.save(&second_view).await.unwrap();

    let registry = decode(&store.document()).unwrap();
    assert_eq!(registry.lookup_by_domain("from-second.example"), Some("10.0.0.2"));
    assert_eq!(registry.lookup_by_domain("from-first.example"), None);
}

#[tokio::test]
async fn close_releases_the_store() {
    let store = CountingStore::new(EXAMPLE_DOCUMENT);
    let engine = engine_over(&store);

    engine.close().await.unwrap();
    assert_eq!(store.close_call_count(), 1);
}
