//! Batch gate driver: evaluate a manifest of artifacts, quarantine the
//! failures, and feed rejections back into the topic queue.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use draftmill_queue::{TopicQueue, TopicStore};

use crate::article::{parse_stem, Artifact, Lang};
use crate::checks::run_checks;
use crate::classify::classify;
use crate::dedup::check_duplicates;
use crate::error::{GateError, Result};
use crate::report::{ArtifactReport, BatchReport};

/// Where the gate reads from and writes to.
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Batch manifest written by the generator: a JSON array of paths.
    pub manifest: PathBuf,
    /// Root of the published content tree (`<root>/<lang>/...`).
    pub content_dir: PathBuf,
    /// Directory holding each artifact's side image (`<stem>.jpg`).
    pub image_dir: PathBuf,
    pub report_path: PathBuf,
    pub passed_path: PathBuf,
}

impl GateConfig {
    pub fn new(manifest: impl Into<PathBuf>, content_dir: impl Into<PathBuf>) -> Self {
        Self {
            manifest: manifest.into(),
            content_dir: content_dir.into(),
            image_dir: PathBuf::from("static/images"),
            report_path: PathBuf::from("quality_report.json"),
            passed_path: PathBuf::from("passed_files.json"),
        }
    }
}

/// Verdict for the whole batch. One surviving artifact is enough to pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    Passed,
    AllFailed,
}

pub struct QualityGate {
    config: GateConfig,
}

impl QualityGate {
    pub fn new(config: GateConfig) -> Self {
        Self { config }
    }

    /// Evaluate one artifact in isolation. Never fails: an unreadable
    /// file becomes its own critical failure.
    pub fn evaluate(&self, path: &Path) -> ArtifactReport {
        let artifact = match Artifact::load(path) {
            Ok(artifact) => artifact,
            Err(err) => {
                let mut report =
                    ArtifactReport::new(path.display().to_string(), "unknown", "unknown");
                report.critical(format!("Cannot read file: {err}"));
                return report;
            }
        };

        let keyword = artifact
            .keyword
            .as_deref()
            .map(|k| k.replace('-', " "))
            .unwrap_or_default();
        let content_type = classify(artifact.title(), &[keyword.as_str()]);

        let mut report = ArtifactReport::new(
            path.display().to_string(),
            artifact.lang.code(),
            content_type.as_str(),
        );
        run_checks(&artifact, content_type, &mut report);
        check_duplicates(&artifact, &self.config.content_dir, &mut report);
        report
    }

    /// Run the gate over the whole manifest: evaluate, quarantine
    /// failures, route rejections back to the queue, write reports.
    pub fn run<S: TopicStore>(&self, queue: &mut TopicQueue<S>) -> Result<BatchOutcome> {
        let raw = fs::read_to_string(&self.config.manifest).map_err(|err| {
            GateError::Manifest(format!(
                "cannot read {}: {err}",
                self.config.manifest.display()
            ))
        })?;
        let files: Vec<String> = serde_json::from_str(&raw).map_err(|err| {
            GateError::Manifest(format!(
                "{} is not a JSON array of paths: {err}",
                self.config.manifest.display()
            ))
        })?;

        info!(files = files.len(), "quality gate starting");

        let mut results = Vec::with_capacity(files.len());
        for file in &files {
            let path = Path::new(file);
            if !path.exists() {
                warn!(%file, "manifest entry does not exist, skipping");
                continue;
            }
            let report = self.evaluate(path);
            if report.passed() {
                info!(%file, warnings = report.warnings.len(), "artifact passed");
            } else {
                warn!(
                    %file,
                    failures = report.critical_failures.len(),
                    "artifact failed"
                );
            }
            results.push(report);
        }

        for report in results.iter().filter(|r| !r.passed()) {
            self.quarantine(Path::new(&report.file), queue);
        }

        let batch = BatchReport::from_results(results);
        batch.write(&self.config.report_path, &self.config.passed_path)?;
        info!(
            passed = batch.summary.passed_files,
            failed = batch.summary.failed_files,
            "quality gate finished"
        );

        if batch.summary.total_files == 0 || batch.summary.passed_files > 0 {
            Ok(BatchOutcome::Passed)
        } else {
            Ok(BatchOutcome::AllFailed)
        }
    }

    /// Remove a failed artifact and its side image, then return its
    /// topic to pending. Each step logs and continues on error: one
    /// stubborn file must not block the rest of the batch.
    fn quarantine<S: TopicStore>(&self, path: &Path, queue: &mut TopicQueue<S>) {
        match fs::remove_file(path) {
            Ok(()) => info!(file = %path.display(), "deleted failed artifact"),
            Err(err) => warn!(file = %path.display(), %err, "failed to delete artifact"),
        }

        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            return;
        };
        let image = self.config.image_dir.join(format!("{stem}.jpg"));
        if image.exists() {
            match fs::remove_file(&image) {
                Ok(()) => info!(image = %image.display(), "deleted side image"),
                Err(err) => warn!(image = %image.display(), %err, "failed to delete side image"),
            }
        }

        let (_, Some(keyword)) = parse_stem(stem) else {
            debug!(file = %path.display(), "no keyword in file stem, topic not reverted");
            return;
        };
        let lang = Lang::from_path(path).code();
        self.revert_topic(queue, &keyword, lang);
    }

    /// Topics store their keyword as written by the curator while file
    /// stems are hyphen-slugged, so try both spellings.
    fn revert_topic<S: TopicStore>(&self, queue: &mut TopicQueue<S>, keyword: &str, lang: &str) {
        let spaced = keyword.replace('-', " ");
        let found = queue
            .find_completed(keyword, lang)
            .and_then(|hit| match hit {
                Some(topic) => Ok(Some(topic)),
                None => queue.find_completed(&spaced, lang),
            });

        match found {
            Ok(Some(topic)) => match queue.revert_to_pending(&topic.id) {
                Ok(reverted) => info!(
                    topic = %reverted.id,
                    status = %reverted.status,
                    "topic reverted after quality rejection"
                ),
                Err(err) => warn!(topic = %topic.id, %err, "failed to revert topic"),
            },
            Ok(None) => debug!(keyword, lang, "no completed topic matches failed artifact"),
            Err(err) => warn!(keyword, lang, %err, "queue lookup failed"),
        }
    }
}
