//! Content type classification and per-type length targets.
//!
//! The generator writes three shapes of article and each has its own
//! structural and length expectations. Classification is keyword driven:
//! tutorial indicators win over news indicators, everything else is
//! analysis.

use crate::article::Lang;

/// Article shape, which selects the length target and structure checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Tutorial,
    Analysis,
    News,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tutorial => "tutorial",
            Self::Analysis => "analysis",
            Self::News => "news",
        }
    }
}

const TUTORIAL_INDICATORS: &[&str] = &[
    "how to",
    "guide",
    "tutorial",
    "step by step",
    "walkthrough",
    "implementation",
    "setup",
    "install",
    "configure",
    "deployment",
    "complete guide",
    "getting started",
    "quick start",
    "가이드",
    "튜토리얼",
    "설치",
    "구성",
    "배포",
    "완전 가이드",
    "완벽 가이드",
    "ガイド",
    "チュートリアル",
    "インストール",
    "設定",
    "完全ガイド",
];

// Topics complex enough that a bare keyword already implies a tutorial.
const COMPLEX_TECH: &[&str] = &[
    "kubernetes",
    "docker",
    "terraform",
    "ansible",
    "jenkins",
    "aws",
    "azure",
    "gcp",
    "cloud",
    "microservices",
    "architecture",
    "rag",
    "fine-tuning",
    "fine tuning",
    "mlops",
    "ml ops",
    "devops",
    "ci/cd",
    "cicd",
    "deployment",
    "infrastructure",
    "database",
    "postgresql",
    "mongodb",
    "redis",
    "elasticsearch",
];

const NEWS_INDICATORS: &[&str] = &[
    "announces",
    "launches",
    "releases",
    "unveils",
    "introduces",
    "acquires",
    "acquisition",
    "funding",
    "investment",
    "raises",
    "breaking",
    "update",
    "news",
    "just released",
    "now available",
    "발표",
    "출시",
    "공개",
    "인수",
    "투자",
    "펀딩",
    "업데이트",
    "発表",
    "リリース",
    "公開",
    "買収",
    "投資",
    "アップデート",
];

/// Classify by title and keywords. Tutorial indicators (or a complex
/// tech keyword) win over news indicators; the default is analysis.
pub fn classify(title: &str, keywords: &[&str]) -> ContentType {
    let title_lower = title.to_lowercase();
    let keywords_lower = keywords.join(" ").to_lowercase();

    let is_tutorial = TUTORIAL_INDICATORS.iter().any(|i| title_lower.contains(i))
        || COMPLEX_TECH.iter().any(|t| keywords_lower.contains(t));
    if is_tutorial {
        return ContentType::Tutorial;
    }

    if NEWS_INDICATORS.iter().any(|i| title_lower.contains(i)) {
        return ContentType::News;
    }

    ContentType::Analysis
}

/// Target length band. Words for space-delimited languages, characters
/// otherwise.
#[derive(Debug, Clone, Copy)]
pub struct LengthTarget {
    pub min: usize,
    pub max: usize,
}

/// Japanese articles are measured in characters and need roughly three
/// times the en/ko budget to carry the same content.
pub fn length_target(content_type: ContentType, lang: Lang) -> LengthTarget {
    let (min, max) = match (content_type, lang) {
        (ContentType::Tutorial, Lang::Ja) => (7500, 10500),
        (ContentType::Tutorial, _) => (2500, 3500),
        (ContentType::Analysis, Lang::Ja) => (4500, 6000),
        (ContentType::Analysis, _) => (1500, 2000),
        (ContentType::News, Lang::Ja) => (2400, 3600),
        (ContentType::News, _) => (800, 1200),
    };
    LengthTarget { min, max }
}
