//! End-to-end queue lifecycle against the JSON file store.

use chrono::Duration;
use draftmill_queue::{JsonTopicStore, QueuePolicy, Topic, TopicQueue, TopicStatus};

fn queue_at(dir: &tempfile::TempDir) -> TopicQueue<JsonTopicStore> {
    let store = JsonTopicStore::new(dir.path().join("data").join("topics_queue.json"));
    TopicQueue::new(store, QueuePolicy::default())
}

#[test]
fn test_full_lifecycle_persists_across_instances() {
    let dir = tempfile::tempdir().unwrap();

    {
        let mut queue = queue_at(&dir);
        for i in 0..4 {
            queue
                .insert(Topic::new(
                    &format!("00{i}-en-tech-kw{i}"),
                    &format!("keyword {i}"),
                    "tech",
                    "en",
                ))
                .unwrap();
        }
    }

    // A fresh instance sees the inserted topics.
    let mut queue = queue_at(&dir);
    let batch = queue.reserve(3).unwrap();
    assert_eq!(batch.len(), 3);

    queue.complete(&batch[0].id).unwrap();
    queue.complete(&batch[1].id).unwrap();
    queue.fail(&batch[2].id, "model returned empty body").unwrap();

    let stats = queue_at(&dir).stats().unwrap();
    assert_eq!(stats.total, 4);
    assert_eq!(stats.completed, 2);
    assert_eq!(stats.in_progress, 0);
    assert_eq!(stats.pending, 2);
    assert_eq!(stats.abandoned, 0);
}

#[test]
fn test_crashed_worker_recovery() {
    let dir = tempfile::tempdir().unwrap();
    let mut queue = queue_at(&dir);
    queue
        .insert(Topic::new("001-en-tech-rust", "rust traits", "tech", "en"))
        .unwrap();
    queue.reserve(1).unwrap();
    // Worker crashes here; nothing completes the lease.

    let mut later = queue_at(&dir);
    assert_eq!(later.reclaim_stuck(Duration::zero()).unwrap(), 1);

    let batch = later.reserve(1).unwrap();
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].retry_count, 0);
}

#[test]
fn test_quality_rejection_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let mut queue = queue_at(&dir);
    queue
        .insert(Topic::new("001-ko-biz-fx", "환율 전망", "business", "ko"))
        .unwrap();

    let id = queue.reserve(1).unwrap()[0].id.clone();
    queue.complete(&id).unwrap();

    let found = queue.find_completed("환율 전망", "ko").unwrap().unwrap();
    assert_eq!(found.id, id);

    let reverted = queue.revert_to_pending(&id).unwrap();
    assert_eq!(reverted.status, TopicStatus::Pending);
    assert!(queue.find_completed("환율 전망", "ko").unwrap().is_none());
}
