//! Duplicate detection against recently published artifacts.
//!
//! A new artifact must not repeat a keyword or closely reuse a title
//! already published in the same language within the trailing window.
//! Either collision rejects the artifact.

use chrono::Duration;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

use crate::article::Artifact;
use crate::report::ArtifactReport;
use crate::similarity::title_similarity;

const WINDOW_DAYS: i64 = 7;
const TITLE_SIMILARITY_THRESHOLD: f64 = 0.7;

/// Scan the same-language content tree for duplicates of `artifact`
/// published within the last [`WINDOW_DAYS`] before its date.
pub fn check_duplicates(artifact: &Artifact, content_root: &Path, report: &mut ArtifactReport) {
    let Some(keyword) = artifact.keyword.as_deref() else {
        return;
    };
    let Some(date) = artifact.front_matter_date().or(artifact.stem_date) else {
        return;
    };

    let lang_dir = content_root.join(artifact.lang.code());
    if !lang_dir.is_dir() {
        return;
    }
    let cutoff = date - Duration::days(WINDOW_DAYS);
    let own_name = artifact.path.file_name();
    let title = artifact.title();

    let mut keyword_duplicates: Vec<String> = Vec::new();
    let mut title_duplicates: Vec<(String, f64)> = Vec::new();

    for entry in WalkDir::new(&lang_dir).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !entry.file_type().is_file()
            || path.extension().and_then(|e| e.to_str()) != Some("md")
            || path.file_name() == own_name
        {
            continue;
        }
        // Unreadable neighbors are not this artifact's problem.
        let Ok(other) = Artifact::load(path) else {
            debug!(path = %path.display(), "skipping unreadable artifact during dedup scan");
            continue;
        };
        let Some(other_date) = other.front_matter_date().or(other.stem_date) else {
            continue;
        };
        if other_date < cutoff {
            continue;
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if other.keyword.as_deref() == Some(keyword) {
            keyword_duplicates.push(name.clone());
        }

        let other_title = other.title();
        if !title.is_empty() && !other_title.is_empty() {
            let similarity = title_similarity(title, other_title);
            if similarity > TITLE_SIMILARITY_THRESHOLD {
                title_duplicates.push((name, similarity));
            }
        }
    }

    if !keyword_duplicates.is_empty() {
        report.critical(format!(
            "Duplicate keyword '{keyword}' found in recent posts (last {WINDOW_DAYS} days): {}",
            keyword_duplicates.join(", ")
        ));
    }
    if !title_duplicates.is_empty() {
        let details: Vec<String> = title_duplicates
            .iter()
            .map(|(name, sim)| format!("{name} ({:.0}% similar)", sim * 100.0))
            .collect();
        report.critical(format!("Similar title detected: {}", details.join(", ")));
    }
}
