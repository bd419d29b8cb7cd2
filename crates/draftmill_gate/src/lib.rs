//! Draftmill quality gate
//!
//! Validates the markdown artifacts a generation batch produced before
//! they reach the publisher. Failed artifacts are deleted together with
//! their side images, and their topics go back to `pending` through the
//! queue so the work is retried with a fresh draft.

pub mod article;
pub mod checks;
pub mod classify;
pub mod dedup;
pub mod error;
pub mod gate;
pub mod report;
pub mod similarity;

pub use article::{Artifact, Lang};
pub use classify::{classify, length_target, ContentType, LengthTarget};
pub use error::GateError;
pub use gate::{BatchOutcome, GateConfig, QualityGate};
pub use report::{ArtifactReport, BatchReport, BatchSummary};
pub use similarity::{levenshtein, title_similarity};
