//! Queue dispatcher behaviour against in-memory store and generator fakes.

mod common;

use std::sync::atomic::Ordering;

use assert_matches::assert_matches;
use booth_api::engine::dispatcher::DispatchError;
use booth_core::gallery::{GalleryItem, VideoStatus};
use booth_core::generation::{DEFAULT_VIDEO_PROMPT, MAX_CONCURRENT_JOBS};
use booth_seedance::TaskStatus;
use booth_store::StoreError;
use common::{dispatcher, idle, processing, queued, FakeGenerator, MemoryStore, TEST_MODEL};

// ---------------------------------------------------------------------------
// Test: processing rows without a task id are skipped without error
// ---------------------------------------------------------------------------

#[tokio::test]
async fn processing_without_task_id_is_skipped() {
    let store = MemoryStore::with_items(vec![processing("P", None)]);
    let generator = FakeGenerator::new();

    let report = dispatcher(&store, &generator).run_cycle().await.unwrap();

    assert_eq!(report.processed, 0);
    assert!(report.errors.is_empty());
    assert!(store.updates.lock().unwrap().is_empty());
    assert_eq!(store.status_of("P"), VideoStatus::Processing);
}

// ---------------------------------------------------------------------------
// Test: admissions never exceed the free slots
// ---------------------------------------------------------------------------

#[tokio::test]
async fn admission_respects_concurrency_cap() {
    let mut items: Vec<GalleryItem> = (0..3)
        .map(|n| processing(&format!("P{n}"), Some(&format!("running-{n}"))))
        .collect();
    items.extend((0..4).map(|n| queued(&format!("Q{n}"))));
    let store = MemoryStore::with_items(items);
    let generator = FakeGenerator::new();
    for n in 0..3 {
        generator.set_task(&format!("running-{n}"), TaskStatus::InFlight("running".into()), None);
    }

    let report = dispatcher(&store, &generator).run_cycle().await.unwrap();

    assert_eq!(report.started as usize, MAX_CONCURRENT_JOBS - 3);
    assert_eq!(generator.created_count(), 2);
    // Store order decides who goes first.
    assert_eq!(store.status_of("Q0"), VideoStatus::Processing);
    assert_eq!(store.status_of("Q1"), VideoStatus::Processing);
    assert_eq!(store.status_of("Q2"), VideoStatus::Queued);
    assert_eq!(store.status_of("Q3"), VideoStatus::Queued);
}

#[tokio::test]
async fn full_capacity_admits_nothing() {
    let mut items: Vec<GalleryItem> = (0..6)
        .map(|n| processing(&format!("P{n}"), None))
        .collect();
    items.push(queued("Q"));
    let store = MemoryStore::with_items(items);
    let generator = FakeGenerator::new();

    let report = dispatcher(&store, &generator).run_cycle().await.unwrap();

    assert_eq!(report.started, 0);
    assert_eq!(generator.created_count(), 0);
    assert_eq!(store.status_of("Q"), VideoStatus::Queued);
}

// ---------------------------------------------------------------------------
// Test: unknown or empty resolution falls back to 480p; defaults applied
// ---------------------------------------------------------------------------

#[tokio::test]
async fn job_parameters_fall_back_to_defaults() {
    let store = MemoryStore::with_items(vec![
        GalleryItem {
            video_resolution: Some("4k".into()),
            ..queued("A")
        },
        GalleryItem {
            video_resolution: Some("720p".into()),
            video_prompt: Some("Slow zoom".into()),
            video_model: Some("seedance-lite".into()),
            ..queued("B")
        },
    ]);
    let generator = FakeGenerator::new();

    dispatcher(&store, &generator).run_cycle().await.unwrap();

    let created = generator.created.lock().unwrap();
    assert_eq!(created[0]["parameters"]["resolution"], "480p");
    assert_eq!(created[0]["content"][0]["text"], DEFAULT_VIDEO_PROMPT);
    assert_eq!(created[0]["model"], TEST_MODEL);
    assert_eq!(created[1]["parameters"]["resolution"], "720p");
    assert_eq!(created[1]["content"][0]["text"], "Slow zoom");
    assert_eq!(created[1]["model"], "seedance-lite");
}

// ---------------------------------------------------------------------------
// Test: a succeeded task yields exactly one upload, counted once
// ---------------------------------------------------------------------------

#[tokio::test]
async fn succeeded_task_uploads_once() {
    let store = MemoryStore::with_items(vec![processing("S", Some("t-s"))]);
    let generator = FakeGenerator::new();
    generator.set_task("t-s", TaskStatus::Succeeded, Some("https://cdn/out.mp4"));
    let dispatcher = dispatcher(&store, &generator);

    let report = dispatcher.run_cycle().await.unwrap();

    assert_eq!(report.processed, 1);
    {
        let uploads = store.uploads.lock().unwrap();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].related_photo_id, "S");
        assert_eq!(uploads[0].folder_id.as_deref(), Some("folder-S"));
        assert!(!uploads[0].skip_gallery);
        // base64("MP4")
        assert_eq!(uploads[0].image, "data:video/mp4;base64,TVA0");
    }
    assert_eq!(
        *generator.downloads.lock().unwrap(),
        vec!["https://cdn/out.mp4".to_string()]
    );

    // The row left `processing`, so the next cycle does not upload again.
    let report = dispatcher.run_cycle().await.unwrap();
    assert_eq!(report.processed, 0);
    assert_eq!(store.uploads.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn failed_upload_keeps_row_processing_and_is_reported() {
    let store = MemoryStore::with_items(vec![processing("S", Some("t-s"))]);
    let generator = FakeGenerator::new();
    generator.set_task("t-s", TaskStatus::Succeeded, Some("https://cdn/out.mp4"));
    generator.fail_downloads.store(true, Ordering::SeqCst);

    let report = dispatcher(&store, &generator).run_cycle().await.unwrap();

    assert_eq!(report.processed, 0);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].starts_with("S: "));
    assert_eq!(store.status_of("S"), VideoStatus::Processing);
}

#[tokio::test]
async fn succeeded_without_video_url_waits() {
    let store = MemoryStore::with_items(vec![processing("S", Some("t-s"))]);
    let generator = FakeGenerator::new();
    generator.set_task("t-s", TaskStatus::Succeeded, None);

    let report = dispatcher(&store, &generator).run_cycle().await.unwrap();

    assert_eq!(report.processed, 0);
    assert!(report.errors.is_empty());
    assert!(store.uploads.lock().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Test: a failed task marks the row failed
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_task_marks_row_failed() {
    let store = MemoryStore::with_items(vec![processing("F", Some("t-f"))]);
    let generator = FakeGenerator::new();
    generator.set_task("t-f", TaskStatus::Failed, None);

    let report = dispatcher(&store, &generator).run_cycle().await.unwrap();

    assert!(report.errors.is_empty());
    assert_eq!(store.status_of("F"), VideoStatus::Failed);
    let updates = store.updates.lock().unwrap();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].task_id, None);
}

// ---------------------------------------------------------------------------
// Test: poll failures are skipped silently
// ---------------------------------------------------------------------------

#[tokio::test]
async fn poll_failure_is_not_an_error() {
    let store = MemoryStore::with_items(vec![
        processing("X", Some("t-x")),
        processing("Y", Some("t-y")),
    ]);
    let generator = FakeGenerator::new();
    generator.failing_polls.lock().unwrap().insert("t-x".into());
    generator.set_task("t-y", TaskStatus::Failed, None);

    let report = dispatcher(&store, &generator).run_cycle().await.unwrap();

    assert!(report.errors.is_empty());
    assert_eq!(store.status_of("X"), VideoStatus::Processing);
    // The pass continued past the failed poll.
    assert_eq!(store.status_of("Y"), VideoStatus::Failed);
}

// ---------------------------------------------------------------------------
// Test: a failed start is recorded and the pass continues
// ---------------------------------------------------------------------------

#[tokio::test]
async fn start_failure_is_recorded_and_pass_continues() {
    let store = MemoryStore::with_items(vec![queued("A"), queued("B")]);
    let generator = FakeGenerator::new();
    generator.failing_creates.lock().unwrap().insert("A".into());

    let report = dispatcher(&store, &generator).run_cycle().await.unwrap();

    assert_eq!(report.started, 1);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].starts_with("A: "));
    assert_eq!(store.status_of("A"), VideoStatus::Queued);
    assert_eq!(store.status_of("B"), VideoStatus::Processing);
    assert_eq!(store.item("B").video_task_id.as_deref(), Some("task-1"));
}

#[tokio::test]
async fn status_write_failure_counts_as_start_failure() {
    let store = MemoryStore::with_items(vec![queued("A")]);
    store.fail_writes.store(true, Ordering::SeqCst);
    let generator = FakeGenerator::new();

    let report = dispatcher(&store, &generator).run_cycle().await.unwrap();

    assert_eq!(report.started, 0);
    assert_eq!(report.errors.len(), 1);
}

// ---------------------------------------------------------------------------
// Test: two immediate cycles do not start the same item twice
// ---------------------------------------------------------------------------

#[tokio::test]
async fn repeated_cycles_are_idempotent() {
    let store = MemoryStore::with_items(vec![queued("A"), idle("I")]);
    let generator = FakeGenerator::new();
    generator.set_task("task-1", TaskStatus::InFlight("running".into()), None);
    let dispatcher = dispatcher(&store, &generator);

    let first = dispatcher.run_cycle().await.unwrap();
    let second = dispatcher.run_cycle().await.unwrap();

    assert_eq!(first.started, 1);
    assert_eq!(second.started, 0);
    assert_eq!(generator.created_count(), 1);
    assert_eq!(store.status_of("I"), VideoStatus::Idle);
}

#[tokio::test]
async fn concurrent_cycles_do_not_double_admit() {
    let store = MemoryStore::with_items(vec![queued("A")]);
    let generator = FakeGenerator::new();
    generator.set_task("task-1", TaskStatus::InFlight("queued".into()), None);
    let dispatcher = dispatcher(&store, &generator);

    let (a, b) = tokio::join!(dispatcher.run_cycle(), dispatcher.run_cycle());

    assert_eq!(a.unwrap().started + b.unwrap().started, 1);
    assert_eq!(generator.created_count(), 1);
}

// ---------------------------------------------------------------------------
// Test: a store read failure aborts the cycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn gallery_fetch_failure_aborts_cycle() {
    let store = MemoryStore::with_items(vec![queued("A")]);
    store.fail_list.store(true, Ordering::SeqCst);
    let generator = FakeGenerator::new();

    let err = dispatcher(&store, &generator).run_cycle().await.unwrap_err();

    assert_matches!(
        err,
        DispatchError::FetchGallery(StoreError::ApiError { status: 503, .. })
    );
    assert_eq!(generator.created_count(), 0);
}
