//! Text cleaning and tokenization shared by keyword extraction and skill matching.

/// English function words excluded from keyword analysis.
pub const STOPWORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "if", "while", "with", "without", "to", "from", "in",
    "on", "at", "for", "of", "by", "as", "is", "are", "was", "were", "be", "been", "being",
    "this", "that", "these", "those", "you", "your", "their", "our", "my", "i", "they", "he",
    "she", "it", "we", "them", "his", "her", "its",
];

/// Tokens this short or shorter never count as keywords.
const MIN_TOKEN_LEN: usize = 3;

/// Collapses newlines and whitespace runs into single spaces and trims the ends.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(&token)
}

/// Lowercases, strips ASCII punctuation, and splits on whitespace.
/// Stopwords and tokens under three characters are dropped; duplicates stay,
/// in source order.
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect();

    cleaned
        .split_whitespace()
        .filter(|t| t.chars().count() >= MIN_TOKEN_LEN && !is_stopword(t))
        .map(String::from)
        .collect()
}
