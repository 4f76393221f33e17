use std::collections::HashMap;

/// Split text into lowercase ASCII alphanumeric runs.
/// Punctuation and whitespace are separators; everything else is dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Raw term counts for a piece of text.
pub fn term_counts(text: &str) -> HashMap<String, usize> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for token in tokenize(text) {
        *counts.entry(token).or_insert(0) += 1;
    }
    counts
}

/// Count whitespace separated words, as used for mock usage figures.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
