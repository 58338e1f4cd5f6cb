//! In-process embedder and index for offline builds over a card file.
//!
//! Terms are hashed into fixed buckets (FNV-1a) and weighted by term
//! frequency, so the vectors are deterministic and need no model server.

use crate::{Embedder, SearchFilter, SearchHit, ServiceError, VectorSearch};
use async_trait::async_trait;
use chrono::NaiveDate;
use inkdeck_core::CardCandidate;
use std::collections::HashMap;

pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn bucket(&self, term: &str) -> usize {
        let mut hash: u64 = 0xcbf29ce484222325;
        for byte in term.as_bytes() {
            hash ^= *byte as u64;
            hash = hash.wrapping_mul(0x100000001b3);
        }
        (hash % self.dimensions as u64) as usize
    }

    pub fn vector(&self, text: &str) -> Vec<f32> {
        let mut counts: HashMap<String, f32> = HashMap::new();
        for term in text
            .split(|ch: char| !ch.is_alphanumeric())
            .filter(|term| term.len() >= 2)
        {
            *counts.entry(term.to_lowercase()).or_default() += 1.0;
        }
        let mut vector = vec![0.0f32; self.dimensions];
        for (term, count) in &counts {
            vector[self.bucket(term)] += count * (1.0 + (term.len() as f32).ln());
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for value in &mut vector {
                *value /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ServiceError> {
        Ok(self.vector(text))
    }
}

fn card_document(card: &CardCandidate) -> String {
    let subtypes: Vec<&str> = card.subtypes.iter().map(String::as_str).collect();
    format!("{} {} {}", card.name, subtypes.join(" "), card.text)
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Brute-force cosine index over candidates. Format filtering uses the
/// cards' legality windows on a fixed date.
pub struct MemoryIndex {
    entries: Vec<(CardCandidate, Vec<f32>)>,
    on: NaiveDate,
}

impl MemoryIndex {
    pub fn new(cards: Vec<CardCandidate>, embedder: &HashingEmbedder, on: NaiveDate) -> Self {
        let entries = cards
            .into_iter()
            .map(|card| {
                let vector = embedder.vector(&card_document(&card));
                (card, vector)
            })
            .collect();
        Self { entries, on }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl VectorSearch for MemoryIndex {
    async fn search(
        &self,
        _collection: &str,
        vector: &[f32],
        filter: &SearchFilter,
        limit: usize,
    ) -> Result<Vec<SearchHit>, ServiceError> {
        let mut scored: Vec<(&CardCandidate, f32)> = self
            .entries
            .iter()
            .filter(|(card, _)| card.is_legal_in(filter.format, self.on))
            .map(|(card, card_vector)| (card, cosine(vector, card_vector)))
            .filter(|(_, score)| *score > 0.0)
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.name.cmp(&b.0.name)));
        scored
            .into_iter()
            .take(limit)
            .map(|(card, score)| {
                serde_json::to_value(card)
                    .map(|payload| SearchHit { payload, score })
                    .map_err(|err| ServiceError::Decode(err.to_string()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkdeck_core::{Format, FormatWindow, Ink};
    use inkdeck_data::candidate_from_payload;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).expect("date")
    }

    #[tokio::test]
    async fn finds_lexically_close_cards() {
        let embedder = HashingEmbedder::new(256);
        let cards = vec![
            CardCandidate::new("Captain Hook", Some(4), &[Ink::Ruby]).with_text("pirate captain"),
            CardCandidate::new("Quiet Meadow", Some(1), &[Ink::Emerald]).with_text("location"),
        ];
        let index = MemoryIndex::new(cards, &embedder, date());
        let query = embedder.embed("pirate captain").await.expect("embed");
        let hits = index
            .search("cards", &query, &SearchFilter { format: Format::Core }, 10)
            .await
            .expect("search");
        assert_eq!(hits.len(), 1);
        let card = candidate_from_payload(&hits[0].payload).expect("payload round trip");
        assert_eq!(card.name, "Captain Hook");
    }

    #[tokio::test]
    async fn respects_format_windows() {
        let embedder = HashingEmbedder::new(64);
        let mut card =
            CardCandidate::new("Infinity Only", Some(2), &[Ink::Amber]).with_text("song");
        card.legality = Some(vec![FormatWindow::unbounded(Format::Infinity)]);
        let index = MemoryIndex::new(vec![card], &embedder, date());
        let query = embedder.embed("song").await.expect("embed");
        let core = index
            .search("cards", &query, &SearchFilter { format: Format::Core }, 10)
            .await
            .expect("search");
        assert!(core.is_empty());
    }
}
