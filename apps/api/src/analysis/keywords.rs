//! Frequency-ranked keyword extraction.

use std::collections::HashMap;

use crate::analysis::text::tokenize;

/// Keywords returned for a generic document.
#[cfg(test)]
pub const DEFAULT_TOP_K: usize = 25;
/// Keywords pulled from a job description for skill matching.
pub const JD_TOP_K: usize = 30;

/// Returns up to `top_k` distinct tokens ranked by descending frequency.
/// Equal counts keep the order in which the tokens first appeared.
pub fn extract_keywords(text: &str, top_k: usize) -> Vec<String> {
    rank_tokens(tokenize(text))
        .into_iter()
        .take(top_k)
        .map(|(token, _)| token)
        .collect()
}

/// Counts tokens, preserving first-seen order, then stable-sorts by count.
fn rank_tokens(tokens: Vec<String>) -> Vec<(String, usize)> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();

    for token in tokens {
        match index.get(&token) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(token.clone(), counts.len());
                counts.push((token, 1));
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}
