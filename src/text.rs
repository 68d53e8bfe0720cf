use std::collections::HashSet;
use std::sync::LazyLock;

/// NLTK English stopword list.
const STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan", "shan't",
    "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn",
    "wouldn't",
];

static STOPWORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOPWORDS.iter().copied().collect());

pub fn is_stopword(token: &str) -> bool {
    STOPWORD_SET.contains(token)
}

/// Prepare a job description for term matching: no newlines, no punctuation,
/// lowercase, stopwords removed, single-space separated.
pub fn normalize(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .map(|c| if c == '\n' { ' ' } else { c })
        .filter(|c| !c.is_ascii_punctuation())
        .collect::<String>()
        .to_lowercase();

    cleaned
        .split_whitespace()
        .filter(|token| !is_stopword(token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Surface cleanup for scraped fields: ASCII only, without `/`, `"` and `-`.
pub fn strip_non_ascii(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii() && !matches!(c, '/' | '"' | '-'))
        .collect::<String>()
        .trim()
        .to_string()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_drops_punctuation_and_stopwords() {
        let out = normalize("We are looking for a Senior Rust Engineer!\nYou will own the API.");
        assert_eq!(out, "looking senior rust engineer api");
    }

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize("  rust \n\n  tokio\t serde  "), "rust tokio serde");
    }

    #[test]
    fn normalize_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \n "), "");
    }

    #[test]
    fn normalize_is_idempotent() {
        let samples = [
            "Don't miss: C++/Rust, Python & SQL (5+ years).",
            "THE Quick-Brown fox's den\nIS here",
            "Tel-Aviv / Haifa; remote-friendly, on-call",
            "",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "input: {s:?}");
        }
    }

    #[test]
    fn apostrophes_removed_before_stopword_check() {
        // "don't" loses its apostrophe first, so "dont" survives
        assert_eq!(normalize("don't"), "dont");
        assert_eq!(normalize("don"), "");
    }

    #[test]
    fn strip_non_ascii_removes_marks() {
        assert_eq!(strip_non_ascii("  Full-Stack Developer / \"Backend\" מפתח "), "FullStack Developer  Backend");
        assert_eq!(strip_non_ascii("Café"), "Caf");
    }
}
