use crate::{CardCandidate, SearchRule};
use std::collections::HashMap;

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|ch: char| !(ch.is_alphanumeric() || ch == '\''))
        .map(|word| word.trim_matches('\'').to_lowercase())
        .filter(|word| !word.is_empty())
}

/// Search terms derived from the request: lowercased words longer than three
/// characters, stop words removed, first occurrence order, capped.
pub fn extract_search_terms(request: &str, rule: &SearchRule) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for word in words(request) {
        if word.chars().count() <= 3 || rule.stop_words.iter().any(|stop| *stop == word) {
            continue;
        }
        if !terms.contains(&word) {
            terms.push(word);
        }
        if terms.len() >= rule.max_search_terms {
            break;
        }
    }
    terms
}

/// Subtype tags for the second retrieval wave. Tags named in the request come
/// first, otherwise the most frequent tags of the pool. Frequency ties break
/// by name so the result does not depend on hash order.
pub fn harvest_subtypes(pool: &[CardCandidate], request: &str, limit: usize) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for card in pool {
        for subtype in &card.subtypes {
            *counts.entry(subtype.as_str()).or_insert(0) += 1;
        }
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    let request_words: Vec<String> = words(request).collect();
    let named: Vec<String> = ranked
        .iter()
        .filter(|(tag, _)| {
            let tag = tag.to_lowercase();
            request_words
                .iter()
                .any(|word| *word == tag || word.trim_end_matches('s') == tag)
        })
        .map(|(tag, _)| tag.to_string())
        .take(limit)
        .collect();
    if !named.is_empty() {
        return named;
    }
    ranked
        .into_iter()
        .take(limit)
        .map(|(tag, _)| tag.to_string())
        .collect()
}
