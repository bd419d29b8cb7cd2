//! Core types for the topic queue
//!
//! A Topic is the unit of work: one piece of content to generate.
//! Topics are created by the curator at `pending` and mutated exclusively
//! by [`TopicQueue`](crate::queue::TopicQueue) operations.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default expiry for trend topics, in days.
pub const DEFAULT_TREND_EXPIRY_DAYS: i64 = 3;

/// Lifecycle status of a topic
///
/// State transitions:
/// - Pending -> InProgress -> Completed
/// - Pending -> InProgress -> Pending (generation failure, below retry ceiling)
/// - Completed -> Pending (quality rejection, below rejection budget)
/// - InProgress/Completed -> Abandoned (respective ceiling reached)
///
/// Failure is never a resting state: it always routes to `pending` or
/// terminally to `abandoned`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicStatus {
    /// Eligible for reservation.
    Pending,
    /// Leased to a worker (`reserved_at` is set).
    InProgress,
    /// One artifact was produced and accepted by the generator.
    Completed,
    /// Retry or rejection budget exhausted; kept for manual triage.
    Abandoned,
}

impl TopicStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Abandoned => "abandoned",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "abandoned" => Some(Self::Abandoned),
            _ => None,
        }
    }

    /// Is this a terminal status (no further transitions)?
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Abandoned)
    }
}

impl fmt::Display for TopicStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a keyword was sourced, which controls its shelf life.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordType {
    /// Time-sensitive keyword; carries `expiry_days` past which it must
    /// never be leased.
    Trend,
    /// Long-lived keyword with no expiry.
    #[default]
    Evergreen,
}

impl KeywordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trend => "trend",
            Self::Evergreen => "evergreen",
        }
    }
}

/// A unit of work describing one piece of content to generate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    /// Stable, human-legible identifier, unique in the store.
    pub id: String,
    /// Target keyword; duplicate-detection key.
    pub keyword: String,
    /// Content category (tech, business, ...).
    pub category: String,
    /// Content language code (en, ko, ja).
    pub lang: String,
    /// Higher priority is served first.
    #[serde(default)]
    pub priority: i32,
    pub status: TopicStatus,
    #[serde(default)]
    pub keyword_type: KeywordType,
    /// Days until a trend topic expires, counted from `created_at`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_days: Option<i64>,
    /// Generation-failure count; only ever increases.
    #[serde(default)]
    pub retry_count: u32,
    /// Quality-rejection count; tracked separately from `retry_count`
    /// so a content rejection does not exhaust the generation budget.
    #[serde(default)]
    pub rejection_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Lease start; set if and only if `status == InProgress`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    // Curator metadata carried through to the generator, opaque to the queue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_intent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competition_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type_hint: Option<String>,
    /// Citation metadata for the artifact; never inspected by the queue.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<serde_json::Value>,
}

impl Topic {
    /// Create a new pending evergreen topic.
    pub fn new(id: &str, keyword: &str, category: &str, lang: &str) -> Self {
        Self {
            id: id.to_string(),
            keyword: keyword.to_string(),
            category: category.to_string(),
            lang: lang.to_string(),
            priority: 0,
            status: TopicStatus::Pending,
            keyword_type: KeywordType::Evergreen,
            expiry_days: None,
            retry_count: 0,
            rejection_count: 0,
            last_error: None,
            created_at: Utc::now(),
            reserved_at: None,
            completed_at: None,
            search_intent: None,
            angle: None,
            competition_level: None,
            content_type_hint: None,
            references: Vec::new(),
        }
    }

    /// Create a new pending trend topic with the default expiry.
    pub fn trend(id: &str, keyword: &str, category: &str, lang: &str) -> Self {
        let mut topic = Self::new(id, keyword, category, lang);
        topic.keyword_type = KeywordType::Trend;
        topic.expiry_days = Some(DEFAULT_TREND_EXPIRY_DAYS);
        topic
    }

    /// A trend topic past its expiry must never be leased, regardless of
    /// status. Evergreen topics never expire.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        if self.keyword_type != KeywordType::Trend {
            return false;
        }
        let days = self.expiry_days.unwrap_or(DEFAULT_TREND_EXPIRY_DAYS);
        now - self.created_at > Duration::days(days)
    }

    /// Eligible for `reserve`?
    pub fn is_leasable(&self, now: DateTime<Utc>) -> bool {
        self.status == TopicStatus::Pending && !self.is_expired(now)
    }
}
