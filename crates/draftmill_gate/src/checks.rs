//! Per-artifact quality checks.
//!
//! Each check appends to the artifact's report: critical failures reject
//! the artifact, warnings only advise. Checks never abort; a broken
//! artifact produces a report describing everything wrong with it.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::article::{parse_date_prefix, Artifact, Lang};
use crate::classify::{length_target, ContentType};
use crate::report::ArtifactReport;

static MARKDOWN_SYNTAX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[#*`\[\]()_]").unwrap());
static CODE_FENCE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```\w*\n").unwrap());
static TABLE_ROW_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\|[^\n]+\|").unwrap());
static STEP_HEADING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^###? Step \d+").unwrap());
static MARKDOWN_LINK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[^\]]+\]\([^)]+\)").unwrap());
static YEAR_IN_TITLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"20[2-3][0-9]").unwrap());
static SENTENCE_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").unwrap());
static PROS_CONS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(Pro:|Con:|Advantage:|Disadvantage:|장점:|단점:|メリット:|デメリット:)").unwrap()
});
static DATE_REFERENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(\d{4}[-/]\d{1,2}[-/]\d{1,2}|January|February|March|April|May|June|July|August|September|October|November|December|\d{1,2}월|\d{1,2}日)",
    )
    .unwrap()
});

const FILLER_PHRASES_EN: &[&str] = &[
    "it's important to note",
    "it is important to",
    "certainly",
    "moreover",
    "furthermore",
    "in conclusion",
    "to summarize",
    "in summary",
    "revolutionary",
    "game-changer",
    "cutting-edge",
    "state-of-the-art",
    "leverage",
    "synergy",
];

const FILLER_PHRASES_KO: &[&str] = &[
    "물론",
    "~할 수 있습니다",
    "중요합니다",
    "혁신적",
    "게임체인저",
    "주목할만한",
    "~하는 것이 중요하다",
];

const STOP_WORDS_EN: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "up", "about", "into", "through", "during",
];

const STOP_CHARS_KO: &[char] = &[
    '의', '이', '가', '을', '를', '에', '와', '과', '도', '는', '은',
];

const REQUIRED_FRONT_MATTER: &[&str] = &["title", "date", "categories", "description"];

/// Run every check on one artifact.
pub fn run_checks(artifact: &Artifact, content_type: ContentType, report: &mut ArtifactReport) {
    check_length(artifact, content_type, report);
    check_front_matter(artifact, report);
    check_date_consistency(artifact, report);
    check_title_coverage(artifact, report);
    check_structure(artifact, content_type, report);
    check_filler_phrases(artifact, report);
    check_links(artifact, report);
    check_readability(artifact, report);
    check_image(artifact, report);
    check_key_takeaways(artifact, report);
}

/// Body length after stripping markdown syntax. Words for
/// space-delimited languages, non-whitespace characters otherwise.
pub fn measure_length(body: &str, lang: Lang) -> usize {
    let clean = MARKDOWN_SYNTAX_RE.replace_all(body, "");
    if lang.is_space_delimited() {
        clean.split_whitespace().count()
    } else {
        clean.chars().filter(|c| !c.is_whitespace()).count()
    }
}

fn count_label(count: usize, lang: Lang) -> String {
    if lang.is_space_delimited() {
        format!("{count} words")
    } else {
        format!("{count} chars")
    }
}

fn check_length(artifact: &Artifact, content_type: ContentType, report: &mut ArtifactReport) {
    let target = length_target(content_type, artifact.lang);
    let count = measure_length(&artifact.body, artifact.lang);
    let label = count_label(count, artifact.lang);

    // 30% below minimum rejects; anything else in the wrong band only warns.
    if count * 10 < target.min * 7 {
        report.critical(format!(
            "Content too short for {}: {label} (minimum: {})",
            content_type.as_str(),
            target.min
        ));
    } else if count < target.min {
        report.warn(format!(
            "Content below target for {}: {label} (target: {}-{})",
            content_type.as_str(),
            target.min,
            target.max
        ));
    } else if count * 10 > target.max * 13 {
        report.warn(format!(
            "Content too long for {}: {label} (target: {}-{})",
            content_type.as_str(),
            target.min,
            target.max
        ));
    }
}

fn check_front_matter(artifact: &Artifact, report: &mut ArtifactReport) {
    for field in REQUIRED_FRONT_MATTER {
        if artifact.field(field).is_none() {
            report.critical(format!("Missing required frontmatter field: {field}"));
        }
    }

    if let Some(description) = artifact.field("description") {
        let len = description.chars().count();
        if !(120..=160).contains(&len) {
            report.warn(format!(
                "Description length not optimal: {len} chars (ideal: 120-160)"
            ));
        }
    }
}

fn check_date_consistency(artifact: &Artifact, report: &mut ArtifactReport) {
    use chrono::Datelike;

    let Some(stem_date) = artifact.stem_date else {
        return;
    };
    let file_year = stem_date.year();

    let title_years: Vec<i32> = YEAR_IN_TITLE_RE
        .find_iter(artifact.title())
        .filter_map(|m| m.as_str().parse().ok())
        .collect();
    if let Some(&oldest) = title_years.iter().min() {
        if oldest < file_year {
            report.critical(format!(
                "Date mismatch: title contains outdated year {oldest} but filename is dated {file_year}"
            ));
        }
    }

    if let Some(fm_date) = artifact.field("date").and_then(parse_date_prefix) {
        if fm_date.year() != file_year {
            report.critical(format!(
                "Date mismatch: frontmatter date year {} doesn't match filename year {file_year}",
                fm_date.year()
            ));
        }
    }
}

/// The title must actually be about the body. Space-delimited languages
/// need 30% of significant title words in the body; other scripts need
/// 10% of 3-character title windows, which tolerates particle and
/// conjugation changes.
fn check_title_coverage(artifact: &Artifact, report: &mut ArtifactReport) {
    let title = artifact.title().to_lowercase();
    if title.is_empty() {
        return;
    }
    let body = artifact.body.to_lowercase();

    if artifact.lang.is_space_delimited() {
        let significant: Vec<&str> = title
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.len() > 2 && !STOP_WORDS_EN.contains(w))
            .collect();
        if significant.is_empty() {
            return;
        }
        let matches = significant.iter().filter(|w| body.contains(*w)).count();
        let ratio = matches as f64 / significant.len() as f64;
        if ratio < 0.3 {
            report.critical(format!(
                "Title-content mismatch: only {:.0}% of title keywords found in body (expected >30%)",
                ratio * 100.0
            ));
        }
    } else {
        let chars: Vec<char> = title
            .chars()
            .filter(|c| c.is_alphabetic() && !STOP_CHARS_KO.contains(c))
            .collect();
        if chars.len() < 3 {
            return;
        }
        let windows: Vec<String> = chars.windows(3).map(|w| w.iter().collect()).collect();
        let matches = windows.iter().filter(|seq| body.contains(seq.as_str())).count();
        let ratio = matches as f64 / windows.len() as f64;
        if ratio < 0.10 {
            report.critical(format!(
                "Title-content mismatch: only {:.0}% of title character sequences found in body (expected >10%)",
                ratio * 100.0
            ));
        }
    }
}

fn check_structure(artifact: &Artifact, content_type: ContentType, report: &mut ArtifactReport) {
    let body = &artifact.body;
    match content_type {
        ContentType::Tutorial => {
            let code_blocks = CODE_FENCE_RE.find_iter(body).count();
            if code_blocks < 2 {
                report.critical(format!(
                    "Tutorial missing code examples: found {code_blocks}, expected 2+ code blocks"
                ));
            }

            let tables = TABLE_ROW_RE.find_iter(body).count();
            if tables == 0 {
                report.critical(
                    "Tutorial missing comparison table: expected at least 1 markdown table",
                );
            }

            let steps = STEP_HEADING_RE.find_iter(body).count();
            if steps < 3 {
                report.warn(format!(
                    "Tutorial has few step headings: found {steps}, recommended 3-5"
                ));
            }
        }
        ContentType::Analysis => {
            let has_table = TABLE_ROW_RE.is_match(body);
            let has_pros_cons = PROS_CONS_RE.find_iter(body).count() >= 2;
            if !has_table && !has_pros_cons {
                report.warn(
                    "Analysis missing comparison element: expected table or pros/cons list",
                );
            }
        }
        ContentType::News => {
            if !DATE_REFERENCE_RE.is_match(body) {
                report.warn(
                    "News article missing specific date references: should include when events occurred",
                );
            }
        }
    }
}

fn filler_phrases(lang: Lang) -> &'static [&'static str] {
    match lang {
        Lang::Ko => FILLER_PHRASES_KO,
        _ => FILLER_PHRASES_EN,
    }
}

fn check_filler_phrases(artifact: &Artifact, report: &mut ArtifactReport) {
    let body = artifact.body.to_lowercase();
    let found: Vec<&str> = filler_phrases(artifact.lang)
        .iter()
        .filter(|p| body.contains(&p.to_lowercase()))
        .copied()
        .collect();

    if !found.is_empty() {
        let shown = found[..found.len().min(3)].join(", ");
        let ellipsis = if found.len() > 3 { "..." } else { "" };
        report.warn(format!("Filler phrases detected: {shown}{ellipsis}"));
    }
}

fn check_links(artifact: &Artifact, report: &mut ArtifactReport) {
    let links = MARKDOWN_LINK_RE.find_iter(&artifact.body).count();
    if links < 2 {
        report.warn(format!("Low link count: {links} (recommended: 2+)"));
    }
}

fn check_readability(artifact: &Artifact, report: &mut ArtifactReport) {
    let sentences = SENTENCE_SPLIT_RE
        .split(&artifact.body)
        .filter(|s| !s.trim().is_empty())
        .count();
    if sentences == 0 {
        return;
    }
    let words = artifact.body.split_whitespace().count();
    let avg = words as f64 / sentences as f64;
    if avg > 25.0 {
        report.warn(format!("Sentences may be too long (avg: {avg:.1} words)"));
    }
}

fn check_image(artifact: &Artifact, report: &mut ArtifactReport) {
    if artifact.field("image").is_none() {
        report.warn("No featured image (recommended for better engagement)");
    }
}

fn check_key_takeaways(artifact: &Artifact, report: &mut ArtifactReport) {
    let marker = match artifact.lang {
        Lang::Ko => "**핵심 요약**",
        _ => "**Key Takeaways**",
    };
    let position = artifact
        .body
        .find(marker)
        .or_else(|| artifact.body.find("**Key Takeaways**"));

    match position {
        None => {
            report.warn("Missing Key Takeaways block (expected before first ## heading)");
        }
        Some(pos) => {
            if let Some(first_h2) = artifact.body.find("\n## ") {
                if pos > first_h2 {
                    report.warn("Key Takeaways block is after first H2 heading (should be before)");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn artifact(path: &str, content: &str) -> Artifact {
        Artifact::parse(Path::new(path), content)
    }

    fn report_for(a: &Artifact, content_type: ContentType) -> ArtifactReport {
        let mut report =
            ArtifactReport::new(a.path.display().to_string(), a.lang.code(), content_type.as_str());
        run_checks(a, content_type, &mut report);
        report
    }

    fn news_body(words: usize) -> String {
        // Enough date references and links to keep news warnings quiet.
        let mut body = String::from(
            "**Key Takeaways**\n\nOn 2026-08-20 the vendor shipped it. \
             See [notes](https://example.com/a) and [docs](https://example.com/b).\n\n## Details\n\n",
        );
        for i in 0..words {
            body.push_str("word ");
            if i % 15 == 14 {
                body.push_str(". ");
            }
        }
        body
    }

    fn front_matter(title: &str) -> String {
        let description = "d".repeat(130);
        format!(
            "---\ntitle: {title}\ndate: 2026-08-20\ncategories: tech\ndescription: {description}\nimage: /images/x.jpg\n---\n"
        )
    }

    #[test]
    fn test_clean_news_article_passes() {
        let content = format!("{}{}", front_matter("Word Word Word"), news_body(900));
        let a = artifact("content/en/2026-08-20-word.md", &content);
        let report = report_for(&a, ContentType::News);
        assert!(report.passed(), "failures: {:?}", report.critical_failures);
        assert!(report.warnings.is_empty(), "warnings: {:?}", report.warnings);
    }

    #[test]
    fn test_length_bands() {
        // News minimum is 800 words; the reject line is 30% below that.
        let make = |words: usize| {
            let content = format!("{}{}", front_matter("Word Word Word"), news_body(words));
            let a = artifact("content/en/2026-08-20-word.md", &content);
            report_for(&a, ContentType::News)
        };

        let short = make(300);
        assert!(short
            .critical_failures
            .iter()
            .any(|f| f.contains("too short")));

        let low = make(700);
        assert!(low.passed());
        assert!(low.warnings.iter().any(|w| w.contains("below target")));

        let long = make(1700);
        assert!(long.passed());
        assert!(long.warnings.iter().any(|w| w.contains("too long")));
    }

    #[test]
    fn test_missing_front_matter_fields_are_critical() {
        let content = format!("---\ntitle: Word\n---\n{}", news_body(900));
        let a = artifact("content/en/2026-08-20-word.md", &content);
        let report = report_for(&a, ContentType::News);

        let missing: Vec<&String> = report
            .critical_failures
            .iter()
            .filter(|f| f.contains("Missing required frontmatter"))
            .collect();
        assert_eq!(missing.len(), 3); // date, categories, description
    }

    #[test]
    fn test_stale_title_year_is_critical() {
        let content = format!(
            "{}{}",
            front_matter("Word Trends 2025 Word Word"),
            news_body(900)
        );
        let a = artifact("content/en/2026-08-20-word.md", &content);
        let report = report_for(&a, ContentType::News);
        assert!(report
            .critical_failures
            .iter()
            .any(|f| f.contains("outdated year 2025")));
    }

    #[test]
    fn test_front_matter_year_mismatch_is_critical() {
        let description = "d".repeat(130);
        let content = format!(
            "---\ntitle: Word Word Word\ndate: 2025-08-20\ncategories: tech\ndescription: {description}\nimage: x.jpg\n---\n{}",
            news_body(900)
        );
        let a = artifact("content/en/2026-08-20-word.md", &content);
        let report = report_for(&a, ContentType::News);
        assert!(report
            .critical_failures
            .iter()
            .any(|f| f.contains("doesn't match filename year")));
    }

    #[test]
    fn test_title_coverage_mismatch_is_critical() {
        let content = format!(
            "{}{}",
            front_matter("Quantum Gardening Handbook Review"),
            news_body(900)
        );
        let a = artifact("content/en/2026-08-20-word.md", &content);
        let report = report_for(&a, ContentType::News);
        assert!(report
            .critical_failures
            .iter()
            .any(|f| f.contains("Title-content mismatch")));
    }

    #[test]
    fn test_korean_title_coverage_uses_windows() {
        let description = "d".repeat(130);
        let body = format!(
            "**핵심 요약**\n\n환율 전망을 정리했다. 2026년 8월 20日 기준. \
             [링크](https://a) [링크](https://b)\n\n## 본문\n\n{}",
            "환율전망 분석 자료. ".repeat(120)
        );
        let content = format!(
            "---\ntitle: 환율 전망 분석\ndate: 2026-08-20\ncategories: business\ndescription: {description}\nimage: x.jpg\n---\n{body}"
        );
        let a = artifact("content/ko/2026-08-20-fx-outlook.md", &content);
        let report = report_for(&a, ContentType::News);
        assert!(report.passed(), "failures: {:?}", report.critical_failures);

        // Unrelated title over the same body fails coverage.
        let content = content.replace("title: 환율 전망 분석", "title: 서울 맛집 추천 목록");
        let a = artifact("content/ko/2026-08-20-fx-outlook.md", &content);
        let report = report_for(&a, ContentType::News);
        assert!(report
            .critical_failures
            .iter()
            .any(|f| f.contains("Title-content mismatch")));
    }

    #[test]
    fn test_tutorial_structure_requirements() {
        let base = format!(
            "{}**Key Takeaways**\n\nGuide guide guide. [a](https://a) [b](https://b)\n\n## Guide\n\n{}",
            front_matter("Guide Guide Guide"),
            "guide content here. ".repeat(900)
        );
        let a = artifact("content/en/2026-08-20-guide.md", &base);
        let report = report_for(&a, ContentType::Tutorial);
        assert!(report
            .critical_failures
            .iter()
            .any(|f| f.contains("missing code examples")));
        assert!(report
            .critical_failures
            .iter()
            .any(|f| f.contains("missing comparison table")));

        let with_structure = format!(
            "{base}\n```rust\nfn a() {{}}\n```\n\n```rust\nfn b() {{}}\n```\n\n| a | b |\n|---|---|\n| 1 | 2 |\n"
        );
        let a = artifact("content/en/2026-08-20-guide.md", &with_structure);
        let report = report_for(&a, ContentType::Tutorial);
        assert!(report.passed(), "failures: {:?}", report.critical_failures);
        assert!(report.warnings.iter().any(|w| w.contains("few step headings")));
    }

    #[test]
    fn test_filler_phrases_warn() {
        let body = news_body(900).replace("the vendor shipped", "furthermore, the cutting-edge vendor shipped");
        let content = format!("{}{}", front_matter("Word Word Word"), body);
        let a = artifact("content/en/2026-08-20-word.md", &content);
        let report = report_for(&a, ContentType::News);
        assert!(report.passed());
        assert!(report
            .warnings
            .iter()
            .any(|w| w.contains("Filler phrases detected")));
    }

    #[test]
    fn test_soft_checks_warn_only() {
        let description = "short".to_string();
        let content = format!(
            "---\ntitle: Word Word Word\ndate: 2026-08-20\ncategories: tech\ndescription: {description}\n---\n## Heading\n\n{}",
            "word ".repeat(900)
        );
        let a = artifact("content/en/2026-08-20-word.md", &content);
        let report = report_for(&a, ContentType::News);

        assert!(report.passed(), "failures: {:?}", report.critical_failures);
        assert!(report.warnings.iter().any(|w| w.contains("Description length")));
        assert!(report.warnings.iter().any(|w| w.contains("Low link count")));
        assert!(report.warnings.iter().any(|w| w.contains("too long (avg")));
        assert!(report.warnings.iter().any(|w| w.contains("No featured image")));
        assert!(report.warnings.iter().any(|w| w.contains("Key Takeaways")));
    }

    #[test]
    fn test_takeaways_after_first_heading_warns() {
        let content = format!(
            "{}Intro. [a](https://a) [b](https://b) On 2026-08-20.\n\n## Details\n\n**Key Takeaways**\n\n{}",
            front_matter("Word Word Word"),
            news_body(850)
        );
        let a = artifact("content/en/2026-08-20-word.md", &content);
        let report = report_for(&a, ContentType::News);
        assert!(report
            .warnings
            .iter()
            .any(|w| w.contains("after first H2 heading")));
    }
}
