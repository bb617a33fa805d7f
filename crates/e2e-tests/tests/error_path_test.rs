//! Error path tests for MindCanvas.
//!
//! Bad input is reported, never panics, and never corrupts stored items.

use std::fs;

use canvas_service::ServiceError;
use e2e_tests::{themed_collection, TestHarness};
use pretty_assertions::assert_eq;

/// A malformed import file is rejected without storing anything.
#[tokio::test]
async fn test_import_malformed_file() {
    let harness = TestHarness::new();
    let service = harness.service();
    let path = harness._temp_dir.path().join("broken.json");
    fs::write(&path, r#"[{"title": "Half a record""#).unwrap();

    let result = service.import_file(&path).await;
    assert!(matches!(result, Err(ServiceError::InvalidInput(_))));
    assert_eq!(service.stats().await.unwrap().total_items, 0);
}

/// A missing import file surfaces as an I/O error.
#[tokio::test]
async fn test_import_missing_file() {
    let harness = TestHarness::new();
    let path = harness._temp_dir.path().join("absent.json");

    let result = harness.service().import_file(&path).await;
    assert!(matches!(result, Err(ServiceError::Io(_))));
}

/// Records missing optional fields import with defaults.
#[tokio::test]
async fn test_import_minimal_records() {
    let harness = TestHarness::new();
    let service = harness.service();
    let path = harness._temp_dir.path().join("minimal.json");
    fs::write(&path, r#"[{"title": "Bare"}, {"title": "Tagged", "topics": ["Rust"]}]"#).unwrap();

    let report = service.import_file(&path).await.unwrap();
    assert_eq!(report.imported, 2);

    let item = harness.storage.get_item(1).unwrap().unwrap();
    assert_eq!(item.content_type, "Unknown");
    assert_eq!(item.quality_score, 5);
}

/// Related lookups on unknown or unembedded sources are empty.
#[tokio::test]
async fn test_related_without_source_embedding() {
    let harness = TestHarness::new();
    harness.seed(themed_collection());
    let service = harness.service();

    assert!(service.related(1, None).await.unwrap().is_empty());
    assert!(service.related(404, None).await.unwrap().is_empty());
}

/// Reset clears the collection and new imports continue the id sequence.
#[tokio::test]
async fn test_reset_then_import() {
    let harness = TestHarness::new();
    let service = harness.service();
    service.import_items(themed_collection()).await.unwrap();

    assert_eq!(service.reset().await.unwrap(), 7);
    assert_eq!(service.stats().await.unwrap().total_items, 0);

    let report = service.import_items(themed_collection()).await.unwrap();
    assert_eq!(report.first_id, Some(8));
}
