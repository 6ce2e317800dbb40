//! Integration tests for the queue module.
//!
//! These tests drive a shared [`Queue`] from several threads the way the API
//! handlers and the worker do in production.

use std::sync::{Arc, Barrier};
use std::thread;

use audio_downloader_core::{JobStatus, Queue, QueueError, SourceKind, TrackMetadata};

const SPOTIFY: &str = "https://open.spotify.com/track/abc";
const YOUTUBE: &str = "https://www.youtube.com/watch?v=xyz";

// ==================== Lifecycle ====================

#[test]
fn test_mixed_batch_is_classified_and_filtered() {
    let queue = Queue::new();

    let added = queue.enqueue_all([
        SPOTIFY,
        "",
        "ftp://open.spotify.com/track/abc",
        "https://example.com/song.mp3",
        YOUTUBE,
        SPOTIFY,
    ]);

    assert_eq!(added.len(), 2);
    assert_eq!(added[0].source_kind, SourceKind::Spotify);
    assert_eq!(added[1].source_kind, SourceKind::YouTube);
    assert!(added.iter().all(|job| job.status == JobStatus::Waiting));
    assert_eq!(queue.counts().waiting, 2);
    assert_eq!(queue.counts().total, 2);
}

#[test]
fn test_full_lifecycle_through_snapshot() {
    let queue = Queue::new();
    let job = queue.enqueue(YOUTUBE).unwrap();

    let claimed = queue.claim_next().unwrap();
    assert_eq!(claimed.id, job.id);
    assert_eq!(
        queue.snapshot().items[0].status,
        JobStatus::InProgress,
        "snapshot sees the claim"
    );

    queue
        .mark_completed(
            job.id,
            TrackMetadata::new(Some("Rick Astley".into()), Some("Never Gonna".into())),
        )
        .unwrap();

    let snapshot = queue.snapshot();
    let stored = &snapshot.items[0];
    assert_eq!(stored.status, JobStatus::Completed);
    assert_eq!(stored.artist_name, "Rick Astley");
    assert_eq!(stored.track_name, "Never Gonna");
    assert!(stored.error_message.is_empty());
    assert!(stored.started_at.unwrap() >= stored.created_at);
    assert!(stored.completed_at.unwrap() >= stored.started_at.unwrap());
    assert_eq!(snapshot.counts.completed, 1);
}

#[test]
fn test_removed_in_progress_job_cannot_be_recorded() {
    let queue = Queue::new();
    let job = queue.enqueue(SPOTIFY).unwrap();
    queue.claim_next().unwrap();

    queue.remove(job.id).unwrap();

    let err = queue.mark_failed(job.id, "too late").unwrap_err();
    assert!(err.is_not_found());
    assert!(queue.is_empty());
}

#[test]
fn test_remove_twice_reports_not_found() {
    let queue = Queue::new();
    let job = queue.enqueue(SPOTIFY).unwrap();

    queue.remove(job.id).unwrap();
    assert_eq!(queue.remove(job.id), Err(QueueError::ItemNotFound(job.id)));
}

#[test]
fn test_failed_url_can_be_requeued_and_cleared() {
    let queue = Queue::new();
    let first = queue.enqueue(SPOTIFY).unwrap();
    queue.claim_next().unwrap();
    queue.mark_failed(first.id, "SpotDL error: boom").unwrap();

    let retry = queue.enqueue(SPOTIFY).unwrap();
    assert_eq!(queue.counts().failed, 1);
    assert_eq!(queue.counts().waiting, 1);

    assert_eq!(queue.clear_terminal(), 1);
    let snapshot = queue.snapshot();
    assert_eq!(snapshot.items.len(), 1);
    assert_eq!(snapshot.items[0].id, retry.id);
}

#[test]
fn test_snapshot_serializes_wire_names() {
    let queue = Queue::new();
    queue.enqueue(SPOTIFY).unwrap();

    let json = serde_json::to_value(queue.snapshot()).unwrap();
    let item = &json["items"][0];
    assert_eq!(item["download_type"], "spotify");
    assert_eq!(item["status"], "waiting");
    assert_eq!(item["track_name"], "");
    assert!(item["started_at"].is_null());
    assert_eq!(json["counts"]["waiting"], 1);
    assert_eq!(json["counts"]["in_progress"], 0);
    assert_eq!(json["counts"]["total"], 1);
}

// ==================== Concurrency ====================

#[test]
fn test_concurrent_duplicate_submissions_add_one_job() {
    let queue = Queue::new();
    let threads = 16;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let queue = queue.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                queue.enqueue(SPOTIFY).is_some()
            })
        })
        .collect();

    let added = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .filter(|added| *added)
        .count();

    assert_eq!(added, 1);
    assert_eq!(queue.len(), 1);
}

#[test]
fn test_concurrent_claims_never_hand_out_a_job_twice() {
    let queue = Queue::new();
    let urls: Vec<String> = (0..50)
        .map(|i| format!("https://youtu.be/video{i}"))
        .collect();
    queue.enqueue_all(&urls);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let queue = queue.clone();
            thread::spawn(move || {
                let mut claimed = Vec::new();
                while let Some(job) = queue.claim_next() {
                    claimed.push(job.id);
                }
                claimed
            })
        })
        .collect();

    let mut all: Vec<_> = handles
        .into_iter()
        .flat_map(|handle| handle.join().unwrap())
        .collect();
    let claimed = all.len();
    all.sort();
    all.dedup();

    assert_eq!(claimed, 50);
    assert_eq!(all.len(), 50);
    assert_eq!(queue.counts().in_progress, 50);
}

#[test]
fn test_readers_never_observe_partial_completion() {
    let queue = Queue::new();
    let urls: Vec<String> = (0..200)
        .map(|i| format!("https://open.spotify.com/track/{i}"))
        .collect();
    queue.enqueue_all(&urls);

    let writer = {
        let queue = queue.clone();
        thread::spawn(move || {
            while let Some(job) = queue.claim_next() {
                queue
                    .mark_completed(
                        job.id,
                        TrackMetadata::new(Some("Artist".into()), Some("Title".into())),
                    )
                    .unwrap();
            }
        })
    };

    let reader = {
        let queue = queue.clone();
        thread::spawn(move || {
            for _ in 0..500 {
                let snapshot = queue.snapshot();
                assert_eq!(snapshot.counts.total, snapshot.items.len());
                for job in &snapshot.items {
                    match job.status {
                        JobStatus::Completed => {
                            assert_eq!(job.track_name, "Title");
                            assert_eq!(job.artist_name, "Artist");
                            assert!(job.completed_at.is_some());
                        }
                        JobStatus::InProgress => assert!(job.completed_at.is_none()),
                        JobStatus::Waiting => assert!(job.started_at.is_none()),
                        JobStatus::Failed => panic!("no job should fail"),
                    }
                }
            }
        })
    };

    writer.join().unwrap();
    reader.join().unwrap();
    assert_eq!(queue.counts().completed, 200);
}
