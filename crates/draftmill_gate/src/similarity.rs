//! Title similarity via Levenshtein distance. Pure and stateless.

/// Edit distance between two strings, counted in `char`s.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut matrix = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=b.len() {
        matrix[0][j] = j;
    }

    for i in 1..=a.len() {
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            matrix[i][j] = (matrix[i - 1][j] + 1)
                .min(matrix[i][j - 1] + 1)
                .min(matrix[i - 1][j - 1] + cost);
        }
    }
    matrix[a.len()][b.len()]
}

/// Similarity in `[0, 1]` after lowercasing and trimming. Equal titles
/// are 1.0; an empty title matches nothing.
pub fn title_similarity(a: &str, b: &str) -> f64 {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();

    if a == b {
        return 1.0;
    }
    let (len_a, len_b) = (a.chars().count(), b.chars().count());
    if len_a == 0 || len_b == 0 {
        return 0.0;
    }

    let distance = levenshtein(&a, &b);
    1.0 - distance as f64 / len_a.max(len_b) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_basics() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("flaw", "lawn"), 2);
    }

    #[test]
    fn test_levenshtein_counts_chars_not_bytes() {
        assert_eq!(levenshtein("환율", "환율"), 0);
        assert_eq!(levenshtein("환율 전망", "환율 동향"), 2);
    }

    #[test]
    fn test_similarity_is_case_insensitive() {
        assert_eq!(title_similarity("Rust Traits", "rust traits"), 1.0);
    }

    #[test]
    fn test_similarity_empty_matches_nothing() {
        assert_eq!(title_similarity("", "anything"), 0.0);
    }

    #[test]
    fn test_similarity_near_duplicate() {
        let sim = title_similarity(
            "Kubernetes Deployment Guide 2026",
            "Kubernetes Deployment Guide 2025",
        );
        assert!(sim > 0.9, "got {sim}");

        let sim = title_similarity("Rust Traits Explained", "Intro to Gardening");
        assert!(sim < 0.5, "got {sim}");
    }
}
