//! Session lifecycle tests against a temporary root.

use std::collections::HashSet;
use std::sync::Arc;

use mosaic_common::{FrameTime, MosaicError};
use storage::SessionManager;
use test_utils::{colors, temp_test_dir, write_test_frame};

// ============================================================================
// Create / resolve
// ============================================================================

#[tokio::test]
async fn test_create_makes_directory_under_root() {
    let root = temp_test_dir();
    let manager = SessionManager::new(root.path().join("temp_stitched"));

    let session = manager.create().await.unwrap();

    assert!(session.dir().is_dir());
    assert_eq!(session.dir(), root.path().join("temp_stitched").join(session.id.as_str()));
    assert!(session.id.as_str().starts_with("session_"));
    assert_eq!(manager.tracked_count().await, 1);
}

#[tokio::test]
async fn test_resolve_existing_session() {
    let root = temp_test_dir();
    let manager = SessionManager::new(root.path());
    let created = manager.create().await.unwrap();

    let resolved = manager.resolve(created.id.as_str()).await.unwrap();
    assert_eq!(resolved, created);
}

#[tokio::test]
async fn test_resolve_unknown_session() {
    let root = temp_test_dir();
    let manager = SessionManager::new(root.path());

    let err = manager.resolve("session_00000000").await.unwrap_err();
    assert!(matches!(err, MosaicError::SessionNotFound(_)));
}

#[tokio::test]
async fn test_resolve_rejects_path_escape() {
    let root = temp_test_dir();
    let manager = SessionManager::new(root.path().join("sessions"));
    std::fs::create_dir_all(root.path().join("sessions")).unwrap();

    let err = manager.resolve("../sessions").await.unwrap_err();
    assert!(matches!(err, MosaicError::SessionNotFound(_)));
}

#[tokio::test]
async fn test_concurrent_creates_are_distinct_and_tracked() {
    let root = temp_test_dir();
    let manager = Arc::new(SessionManager::new(root.path()));

    let handles: Vec<_> = (0..32)
        .map(|_| {
            let manager = manager.clone();
            tokio::spawn(async move { manager.create().await.unwrap() })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        let session = handle.await.unwrap();
        assert!(session.dir().is_dir());
        ids.insert(session.id);
    }

    assert_eq!(ids.len(), 32);
    assert_eq!(manager.tracked_count().await, 32);
}

// ============================================================================
// Cleanup
// ============================================================================

#[tokio::test]
async fn test_destroy_single_session() {
    let root = temp_test_dir();
    let manager = SessionManager::new(root.path());
    let keep = manager.create().await.unwrap();
    let gone = manager.create().await.unwrap();

    manager.destroy(gone.id.as_str()).await.unwrap();

    assert!(!gone.dir().exists());
    assert!(keep.dir().exists());
    assert_eq!(manager.tracked_count().await, 1);
    assert!(matches!(
        manager.destroy(gone.id.as_str()).await,
        Err(MosaicError::SessionNotFound(_))
    ));
}

#[tokio::test]
async fn test_destroy_all_removes_nested_content() {
    let root = temp_test_dir();
    let manager = SessionManager::new(root.path());
    let a = manager.create().await.unwrap();
    let b = manager.create().await.unwrap();

    std::fs::create_dir_all(a.layout.renamed_dir()).unwrap();
    write_test_frame(b.dir(), "0915", 2, colors::RED);

    // Already gone directories are not an error
    std::fs::remove_dir_all(b.dir()).unwrap();

    let removed = manager.destroy_all().await;

    assert_eq!(removed, 1);
    assert!(!a.dir().exists());
    assert_eq!(manager.tracked_count().await, 0);
    assert_eq!(manager.destroy_all().await, 0);
}

// ============================================================================
// Layout listing
// ============================================================================

#[tokio::test]
async fn test_list_frames_sorted_and_filtered() {
    let root = temp_test_dir();
    let manager = SessionManager::new(root.path());
    let session = manager.create().await.unwrap();

    for label in ["1015", "0915", "0945"] {
        write_test_frame(session.dir(), label, 2, colors::BLUE);
    }
    std::fs::write(session.dir().join("frame_0915.pgw"), "1\n0\n0\n-1\n0\n0\n").unwrap();
    std::fs::write(session.dir().join("notes.txt"), "x").unwrap();
    std::fs::create_dir_all(session.layout.interpolated_dir()).unwrap();

    let frames = session.layout.list_frames().await.unwrap();
    let labels: Vec<String> = frames.iter().map(|f| f.time.to_hhmm()).collect();

    assert_eq!(labels, vec!["0915", "0945", "1015"]);
    assert_eq!(frames[0].path, session.layout.frame_path(FrameTime::from_hm(9, 15)));
}
