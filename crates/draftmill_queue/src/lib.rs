//! Draftmill topic queue
//!
//! The queue is the **job-lifecycle core** of the content pipeline.
//! It hands out topics to the generator, tracks leases, and routes
//! failures back to `pending` (or terminally to `abandoned`).
//! Actual content generation happens elsewhere; this crate only
//! reasons about state transitions over one shared document.

pub mod error;
pub mod policy;
pub mod queue;
pub mod store;
pub mod topic;

pub use error::QueueError;
pub use policy::QueuePolicy;
pub use queue::{QueueStats, TopicQueue};
pub use store::{JsonTopicStore, MemoryTopicStore, QueueSnapshot, TopicStore};
pub use topic::{KeywordType, Topic, TopicStatus};
