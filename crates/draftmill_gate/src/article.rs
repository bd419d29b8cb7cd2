//! Artifact model: one generated markdown file with front matter.
//!
//! Parsing is deliberately tolerant. A malformed artifact still loads
//! (empty front matter, whole content as body) so the checks can report
//! what is wrong with it instead of the gate aborting.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

static STEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})-(.+)$").unwrap());

/// Artifact language, derived from the content tree path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lang {
    En,
    Ko,
    Ja,
}

impl Lang {
    /// Detect language from a path segment (`/ko/`, `/ja/`), default `en`.
    pub fn from_path(path: &Path) -> Self {
        for component in path.components() {
            match component.as_os_str().to_str() {
                Some("ko") => return Self::Ko,
                Some("ja") => return Self::Ja,
                _ => {}
            }
        }
        Self::En
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ko => "ko",
            Self::Ja => "ja",
        }
    }

    /// Space-delimited languages are measured in words; the rest in
    /// characters, with a windowed title-coverage algorithm.
    pub fn is_space_delimited(&self) -> bool {
        matches!(self, Self::En)
    }
}

/// One generated markdown artifact, parsed.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub path: PathBuf,
    pub lang: Lang,
    /// Date from the `YYYY-MM-DD-keyword` file stem, if present.
    pub stem_date: Option<NaiveDate>,
    /// Keyword slug from the file stem (hyphen-joined).
    pub keyword: Option<String>,
    pub front_matter: BTreeMap<String, String>,
    pub body: String,
}

impl Artifact {
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self::parse(path, &content))
    }

    pub fn parse(path: &Path, content: &str) -> Self {
        let (front_matter, body) = parse_front_matter(content);
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
        let (stem_date, keyword) = parse_stem(stem);

        Self {
            path: path.to_path_buf(),
            lang: Lang::from_path(path),
            stem_date,
            keyword,
            front_matter,
            body,
        }
    }

    pub fn title(&self) -> &str {
        self.front_matter.get("title").map(String::as_str).unwrap_or("")
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.front_matter
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Front-matter date, tolerant of RFC 3339 timestamps and bare dates.
    pub fn front_matter_date(&self) -> Option<NaiveDate> {
        let raw = self.field("date")?;
        parse_date_prefix(raw)
    }
}

/// Split `---`-fenced front matter from the body. Front matter is simple
/// `key: value` lines; quotes around values are stripped.
pub fn parse_front_matter(content: &str) -> (BTreeMap<String, String>, String) {
    if !content.starts_with("---") {
        return (BTreeMap::new(), content.to_string());
    }
    let mut parts = content.splitn(3, "---");
    parts.next();
    let (Some(raw_fm), Some(body)) = (parts.next(), parts.next()) else {
        return (BTreeMap::new(), content.to_string());
    };

    let mut front_matter = BTreeMap::new();
    for line in raw_fm.lines() {
        if let Some((key, value)) = line.split_once(':') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            front_matter.insert(key.trim().to_string(), value.to_string());
        }
    }
    (front_matter, body.trim().to_string())
}

/// Parse a `YYYY-MM-DD-keyword` file stem into its date and keyword slug.
pub fn parse_stem(stem: &str) -> (Option<NaiveDate>, Option<String>) {
    let Some(caps) = STEM_RE.captures(stem) else {
        return (None, None);
    };
    let date = NaiveDate::parse_from_str(
        &format!("{}-{}-{}", &caps[1], &caps[2], &caps[3]),
        "%Y-%m-%d",
    )
    .ok();
    (date, Some(caps[4].to_string()))
}

/// Parse the leading `YYYY-MM-DD` of a date string, ignoring any time part.
pub fn parse_date_prefix(raw: &str) -> Option<NaiveDate> {
    let prefix = raw.get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lang_from_path() {
        assert_eq!(Lang::from_path(Path::new("content/en/a.md")), Lang::En);
        assert_eq!(Lang::from_path(Path::new("content/ko/tech/a.md")), Lang::Ko);
        assert_eq!(Lang::from_path(Path::new("content/ja/a.md")), Lang::Ja);
        assert_eq!(Lang::from_path(Path::new("a.md")), Lang::En);
    }

    #[test]
    fn test_parse_front_matter_strips_quotes() {
        let content = "---\ntitle: \"Rust Traits Explained\"\ndate: 2026-08-20\n---\n\nBody text.";
        let (fm, body) = parse_front_matter(content);
        assert_eq!(fm["title"], "Rust Traits Explained");
        assert_eq!(fm["date"], "2026-08-20");
        assert_eq!(body, "Body text.");
    }

    #[test]
    fn test_missing_front_matter_is_tolerated() {
        let (fm, body) = parse_front_matter("Just a body.");
        assert!(fm.is_empty());
        assert_eq!(body, "Just a body.");

        // Opening fence without closing fence.
        let (fm, body) = parse_front_matter("---\ntitle: broken");
        assert!(fm.is_empty());
        assert!(body.starts_with("---"));
    }

    #[test]
    fn test_parse_stem() {
        let (date, keyword) = parse_stem("2026-08-20-rust-traits");
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 8, 20));
        assert_eq!(keyword.as_deref(), Some("rust-traits"));

        let (date, keyword) = parse_stem("notes");
        assert!(date.is_none());
        assert!(keyword.is_none());
    }

    #[test]
    fn test_front_matter_date_tolerates_timestamps() {
        assert_eq!(
            parse_date_prefix("2026-08-20T10:00:00+09:00"),
            NaiveDate::from_ymd_opt(2026, 8, 20)
        );
        assert_eq!(
            parse_date_prefix("2026-08-20"),
            NaiveDate::from_ymd_opt(2026, 8, 20)
        );
        assert!(parse_date_prefix("soon").is_none());
    }

    #[test]
    fn test_artifact_parse() {
        let content = "---\ntitle: Guide\ndate: 2026-08-20\n---\nBody.";
        let artifact = Artifact::parse(Path::new("content/ko/2026-08-20-rust-traits.md"), content);
        assert_eq!(artifact.lang, Lang::Ko);
        assert_eq!(artifact.keyword.as_deref(), Some("rust-traits"));
        assert_eq!(artifact.title(), "Guide");
        assert_eq!(artifact.front_matter_date(), NaiveDate::from_ymd_opt(2026, 8, 20));
    }
}
