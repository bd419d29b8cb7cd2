//! Topic queue: owns every state transition over the topic store.
//!
//! Each operation is one full read-modify-write cycle against the shared
//! document. The design assumes a single concurrent writer (one scheduled
//! job at a time); the store's version check turns an unexpected racing
//! writer into a hard [`QueueError::Conflict`] instead of silent data loss.

use chrono::{Duration, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::error::{QueueError, Result};
use crate::policy::QueuePolicy;
use crate::store::TopicStore;
use crate::topic::{Topic, TopicStatus};

/// Counts by status, category, and language, for observability only.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueueStats {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub abandoned: usize,
    pub by_category: BTreeMap<String, usize>,
    pub by_language: BTreeMap<String, usize>,
}

/// Lease-based work queue over a [`TopicStore`].
pub struct TopicQueue<S: TopicStore> {
    store: S,
    policy: QueuePolicy,
}

impl<S: TopicStore> TopicQueue<S> {
    pub fn new(store: S, policy: QueuePolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &QueuePolicy {
        &self.policy
    }

    /// Lease up to `count` pending topics, priority descending then
    /// `created_at` ascending. Expired trend topics are never leased.
    ///
    /// Returns fewer than `count` silently when the queue runs dry;
    /// never blocks.
    pub fn reserve(&mut self, count: usize) -> Result<Vec<Topic>> {
        let mut snapshot = self.store.load()?;
        let now = Utc::now();

        let mut eligible: Vec<usize> = snapshot
            .topics
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_leasable(now))
            .map(|(i, _)| i)
            .collect();
        eligible.sort_by(|&a, &b| {
            let (ta, tb) = (&snapshot.topics[a], &snapshot.topics[b]);
            tb.priority
                .cmp(&ta.priority)
                .then(ta.created_at.cmp(&tb.created_at))
        });
        eligible.truncate(count);

        let mut reserved = Vec::with_capacity(eligible.len());
        for idx in eligible {
            let topic = &mut snapshot.topics[idx];
            topic.status = TopicStatus::InProgress;
            topic.reserved_at = Some(now);
            reserved.push(topic.clone());
        }

        if !reserved.is_empty() {
            self.store.save(snapshot)?;
        }
        info!(requested = count, leased = reserved.len(), "reserved topics");
        Ok(reserved)
    }

    /// Mark a leased topic as completed. Only valid from `in_progress`.
    pub fn complete(&mut self, id: &str) -> Result<Topic> {
        let mut snapshot = self.store.load()?;
        let topic = find_topic_mut(&mut snapshot.topics, id)?;
        require_status(topic, TopicStatus::InProgress, "complete")?;

        topic.status = TopicStatus::Completed;
        topic.completed_at = Some(Utc::now());
        topic.reserved_at = None;
        let completed = topic.clone();

        self.store.save(snapshot)?;
        info!(topic = id, "topic completed");
        Ok(completed)
    }

    /// Record a generation failure. Only valid from `in_progress`.
    ///
    /// Below the retry ceiling the topic goes back to `pending`; at the
    /// ceiling it is abandoned so a permanently broken topic cannot loop
    /// forever.
    pub fn fail(&mut self, id: &str, error: &str) -> Result<Topic> {
        let mut snapshot = self.store.load()?;
        let max_retries = self.policy.max_retries;
        let topic = find_topic_mut(&mut snapshot.topics, id)?;
        require_status(topic, TopicStatus::InProgress, "fail")?;

        topic.retry_count += 1;
        topic.last_error = Some(error.to_string());
        topic.reserved_at = None;
        if topic.retry_count >= max_retries {
            topic.status = TopicStatus::Abandoned;
            warn!(
                topic = id,
                retries = topic.retry_count,
                "retry ceiling reached, abandoning topic"
            );
        } else {
            topic.status = TopicStatus::Pending;
            info!(
                topic = id,
                retries = topic.retry_count,
                error,
                "generation failed, topic returned to pending"
            );
        }
        let failed = topic.clone();

        self.store.save(snapshot)?;
        Ok(failed)
    }

    /// Return every `in_progress` topic whose lease is older than
    /// `lease_ttl` to `pending`, without touching `retry_count`: a crashed
    /// worker is not the topic's fault.
    pub fn reclaim_stuck(&mut self, lease_ttl: Duration) -> Result<usize> {
        let mut snapshot = self.store.load()?;
        let cutoff = Utc::now() - lease_ttl;

        let mut reclaimed = 0;
        for topic in &mut snapshot.topics {
            if topic.status != TopicStatus::InProgress {
                continue;
            }
            match topic.reserved_at {
                Some(reserved_at) if reserved_at < cutoff => {
                    topic.status = TopicStatus::Pending;
                    topic.reserved_at = None;
                    reclaimed += 1;
                    warn!(topic = %topic.id, "lease expired, topic reclaimed");
                }
                Some(_) => {}
                // An in_progress topic without a lease start violates the
                // store invariant; repair it rather than leaving it stuck.
                None => {
                    topic.status = TopicStatus::Pending;
                    reclaimed += 1;
                    warn!(topic = %topic.id, "in_progress topic had no lease start, reclaimed");
                }
            }
        }

        if reclaimed > 0 {
            self.store.save(snapshot)?;
        }
        Ok(reclaimed)
    }

    /// Return a completed topic to `pending` after a quality rejection.
    ///
    /// Only valid from `completed`, never from `in_progress`, to avoid
    /// racing a live worker. Spends the rejection budget rather than the
    /// retry budget.
    pub fn revert_to_pending(&mut self, id: &str) -> Result<Topic> {
        let mut snapshot = self.store.load()?;
        let max_rejections = self.policy.max_rejections;
        let topic = find_topic_mut(&mut snapshot.topics, id)?;
        require_status(topic, TopicStatus::Completed, "revert_to_pending")?;

        topic.rejection_count += 1;
        topic.completed_at = None;
        if topic.rejection_count >= max_rejections {
            topic.status = TopicStatus::Abandoned;
            warn!(
                topic = id,
                rejections = topic.rejection_count,
                "rejection budget exhausted, abandoning topic"
            );
        } else {
            topic.status = TopicStatus::Pending;
            info!(
                topic = id,
                rejections = topic.rejection_count,
                "quality rejection, topic returned to pending"
            );
        }
        let reverted = topic.clone();

        self.store.save(snapshot)?;
        Ok(reverted)
    }

    /// Find the completed topic an artifact was generated from, by
    /// keyword and language. Used by the quality gate to route rejections.
    pub fn find_completed(&self, keyword: &str, lang: &str) -> Result<Option<Topic>> {
        let snapshot = self.store.load()?;
        Ok(snapshot
            .topics
            .into_iter()
            .find(|t| {
                t.status == TopicStatus::Completed
                    && t.lang == lang
                    && t.keyword.eq_ignore_ascii_case(keyword)
            }))
    }

    /// Insert a curated topic. Rejects a duplicate id, and a duplicate
    /// keyword among non-abandoned topics of the same language.
    pub fn insert(&mut self, topic: Topic) -> Result<()> {
        let mut snapshot = self.store.load()?;

        if snapshot.topics.iter().any(|t| t.id == topic.id) {
            return Err(QueueError::DuplicateTopic(format!(
                "id '{}' already exists",
                topic.id
            )));
        }
        if snapshot.topics.iter().any(|t| {
            t.status != TopicStatus::Abandoned
                && t.lang == topic.lang
                && t.keyword.eq_ignore_ascii_case(&topic.keyword)
        }) {
            return Err(QueueError::DuplicateTopic(format!(
                "keyword '{}' ({}) already queued",
                topic.keyword, topic.lang
            )));
        }

        debug!(topic = %topic.id, keyword = %topic.keyword, "topic inserted");
        snapshot.topics.push(topic);
        self.store.save(snapshot)?;
        Ok(())
    }

    /// Drop abandoned topics and expired trend topics. The only place
    /// records are destroyed.
    pub fn prune(&mut self) -> Result<usize> {
        let mut snapshot = self.store.load()?;
        let now = Utc::now();

        let before = snapshot.topics.len();
        snapshot
            .topics
            .retain(|t| t.status != TopicStatus::Abandoned && !t.is_expired(now));
        let removed = before - snapshot.topics.len();

        if removed > 0 {
            self.store.save(snapshot)?;
            info!(removed, "pruned abandoned/expired topics");
        }
        Ok(removed)
    }

    /// Counts by status, category, and language.
    pub fn stats(&self) -> Result<QueueStats> {
        let snapshot = self.store.load()?;
        let mut stats = QueueStats {
            total: snapshot.topics.len(),
            ..Default::default()
        };
        for topic in &snapshot.topics {
            match topic.status {
                TopicStatus::Pending => stats.pending += 1,
                TopicStatus::InProgress => stats.in_progress += 1,
                TopicStatus::Completed => stats.completed += 1,
                TopicStatus::Abandoned => stats.abandoned += 1,
            }
            *stats.by_category.entry(topic.category.clone()).or_default() += 1;
            *stats.by_language.entry(topic.lang.clone()).or_default() += 1;
        }
        Ok(stats)
    }
}

fn find_topic_mut<'a>(topics: &'a mut [Topic], id: &str) -> Result<&'a mut Topic> {
    topics
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or_else(|| QueueError::NotFound(id.to_string()))
}

fn require_status(topic: &Topic, expected: TopicStatus, op: &'static str) -> Result<()> {
    if topic.status != expected {
        return Err(QueueError::InvalidTransition {
            id: topic.id.clone(),
            from: topic.status,
            op,
        });
    }
    Ok(())
}
