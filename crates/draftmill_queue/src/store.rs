//! Topic store: the single shared document holding all topic records.
//!
//! The store has no business logic. It reads the document fully and
//! rewrites it fully, with optimistic concurrency on a document version
//! so two writers cannot silently clobber each other.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{QueueError, Result};
use crate::topic::Topic;

/// One full read of the shared document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueSnapshot {
    /// Document version, bumped on every save. Defaults to 0 so documents
    /// written before versioning still load.
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub topics: Vec<Topic>,
}

/// Abstraction over the backing document so the queue logic never touches
/// the filesystem directly.
pub trait TopicStore {
    /// Read the whole document. A missing document is an empty snapshot.
    fn load(&self) -> Result<QueueSnapshot>;

    /// Replace the whole document, compare-and-swap on `version`.
    ///
    /// Fails with [`QueueError::Conflict`] when the backing document's
    /// version no longer matches the snapshot's; persists `version + 1`
    /// on success.
    fn save(&mut self, snapshot: QueueSnapshot) -> Result<()>;
}

/// JSON file store: one document, read fully and rewritten fully.
///
/// Writes are atomic (temp file + rename) so a crashed writer never
/// leaves a half-written document behind.
pub struct JsonTopicStore {
    path: PathBuf,
}

impl JsonTopicStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TopicStore for JsonTopicStore {
    fn load(&self) -> Result<QueueSnapshot> {
        if !self.path.exists() {
            return Ok(QueueSnapshot::default());
        }
        let raw = fs::read_to_string(&self.path)?;
        let snapshot = serde_json::from_str(&raw)?;
        Ok(snapshot)
    }

    fn save(&mut self, snapshot: QueueSnapshot) -> Result<()> {
        let current = self.load()?.version;
        if current != snapshot.version {
            return Err(QueueError::Conflict {
                expected: snapshot.version,
                found: current,
            });
        }

        let next = QueueSnapshot {
            version: snapshot.version + 1,
            topics: snapshot.topics,
        };
        let json = serde_json::to_string_pretty(&next)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Write atomically (temp file + rename)
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

/// In-memory store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryTopicStore {
    snapshot: QueueSnapshot,
}

impl MemoryTopicStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with topics at version 0.
    pub fn with_topics(topics: Vec<Topic>) -> Self {
        Self {
            snapshot: QueueSnapshot { version: 0, topics },
        }
    }
}

impl TopicStore for MemoryTopicStore {
    fn load(&self) -> Result<QueueSnapshot> {
        Ok(self.snapshot.clone())
    }

    fn save(&mut self, snapshot: QueueSnapshot) -> Result<()> {
        if self.snapshot.version != snapshot.version {
            return Err(QueueError::Conflict {
                expected: snapshot.version,
                found: self.snapshot.version,
            });
        }
        self.snapshot = QueueSnapshot {
            version: snapshot.version + 1,
            topics: snapshot.topics,
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topic::Topic;

    fn store_in(dir: &tempfile::TempDir) -> JsonTopicStore {
        JsonTopicStore::new(dir.path().join("topics_queue.json"))
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let snapshot = store.load().unwrap();
        assert_eq!(snapshot.version, 0);
        assert!(snapshot.topics.is_empty());
    }

    #[test]
    fn test_roundtrip_preserves_records() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);

        let mut snapshot = store.load().unwrap();
        snapshot.topics.push(Topic::new("001-en-tech-rust", "rust", "tech", "en"));
        snapshot.topics.push(Topic::trend("002-ko-biz-fx", "fx rates", "business", "ko"));
        store.save(snapshot).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.version, 1);
        assert_eq!(loaded.topics.len(), 2);
        assert_eq!(loaded.topics[0].id, "001-en-tech-rust");
        assert_eq!(loaded.topics[1].keyword, "fx rates");
    }

    #[test]
    fn test_stale_snapshot_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);

        let first = store.load().unwrap();
        let second = store.load().unwrap();

        store.save(first).unwrap();
        let err = store.save(second).unwrap_err();
        assert!(matches!(err, QueueError::Conflict { expected: 0, found: 1 }));
    }

    #[test]
    fn test_unversioned_document_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("topics_queue.json");
        std::fs::write(
            &path,
            r#"{"topics": [{
                "id": "001-en-tech-rust",
                "keyword": "rust",
                "category": "tech",
                "lang": "en",
                "status": "pending",
                "created_at": "2026-01-10T00:00:00Z"
            }]}"#,
        )
        .unwrap();

        let store = JsonTopicStore::new(path);
        let snapshot = store.load().unwrap();
        assert_eq!(snapshot.version, 0);
        assert_eq!(snapshot.topics.len(), 1);
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store_in(&dir);
        store.save(store.load().unwrap()).unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["topics_queue.json".to_string()]);
    }

    #[test]
    fn test_memory_store_cas() {
        let mut store = MemoryTopicStore::new();
        let first = store.load().unwrap();
        let second = store.load().unwrap();
        store.save(first).unwrap();
        assert!(matches!(
            store.save(second),
            Err(QueueError::Conflict { .. })
        ));
    }
}
