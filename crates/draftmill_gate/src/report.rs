//! Report types written for the publisher and for triage.

use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Verdict for one artifact. Critical failures reject the artifact;
/// warnings are advisory and never reject on their own.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactReport {
    pub file: String,
    pub language: String,
    pub content_type: String,
    pub critical_failures: Vec<String>,
    pub warnings: Vec<String>,
}

impl ArtifactReport {
    pub fn new(file: impl Into<String>, language: &str, content_type: &str) -> Self {
        Self {
            file: file.into(),
            language: language.to_string(),
            content_type: content_type.to_string(),
            critical_failures: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn critical(&mut self, message: impl Into<String>) {
        self.critical_failures.push(message.into());
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn passed(&self) -> bool {
        self.critical_failures.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub total_files: usize,
    pub passed_files: usize,
    pub failed_files: usize,
    pub total_failures: usize,
    pub total_warnings: usize,
}

/// Full batch report: `quality_report.json`.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub summary: BatchSummary,
    pub passed_files: Vec<String>,
    pub failed_files: Vec<String>,
    pub results: Vec<ArtifactReport>,
}

impl BatchReport {
    pub fn from_results(results: Vec<ArtifactReport>) -> Self {
        let passed_files: Vec<String> = results
            .iter()
            .filter(|r| r.passed())
            .map(|r| r.file.clone())
            .collect();
        let failed_files: Vec<String> = results
            .iter()
            .filter(|r| !r.passed())
            .map(|r| r.file.clone())
            .collect();

        let summary = BatchSummary {
            total_files: results.len(),
            passed_files: passed_files.len(),
            failed_files: failed_files.len(),
            total_failures: results.iter().map(|r| r.critical_failures.len()).sum(),
            total_warnings: results.iter().map(|r| r.warnings.len()).sum(),
        };

        Self {
            summary,
            passed_files,
            failed_files,
            results,
        }
    }

    /// Write `quality_report.json` and the `passed_files.json` list the
    /// publisher consumes.
    pub fn write(&self, report_path: &Path, passed_path: &Path) -> Result<()> {
        fs::write(report_path, serde_json::to_string_pretty(self)?)?;
        fs::write(passed_path, serde_json::to_string_pretty(&self.passed_files)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let mut good = ArtifactReport::new("a.md", "en", "analysis");
        good.warn("minor");
        let mut bad = ArtifactReport::new("b.md", "en", "news");
        bad.critical("too short");
        bad.critical("no title");

        let report = BatchReport::from_results(vec![good, bad]);
        assert_eq!(report.summary.total_files, 2);
        assert_eq!(report.summary.passed_files, 1);
        assert_eq!(report.summary.failed_files, 1);
        assert_eq!(report.summary.total_failures, 2);
        assert_eq!(report.summary.total_warnings, 1);
        assert_eq!(report.passed_files, vec!["a.md"]);
        assert_eq!(report.failed_files, vec!["b.md"]);
    }

    #[test]
    fn test_write_produces_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let report = BatchReport::from_results(vec![ArtifactReport::new("a.md", "en", "news")]);

        let report_path = dir.path().join("quality_report.json");
        let passed_path = dir.path().join("passed_files.json");
        report.write(&report_path, &passed_path).unwrap();

        let raw = std::fs::read_to_string(&report_path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["summary"]["total_files"], 1);

        let raw = std::fs::read_to_string(&passed_path).unwrap();
        let parsed: Vec<String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, vec!["a.md"]);
    }
}
