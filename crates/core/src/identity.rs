use crate::{CardCandidate, Identity, Ink};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IdentitySource {
    Explicit,
    Generated,
    Frequency,
}

/// Occurrences of every ink across the pool, in canonical order. Dual-ink
/// cards count once for each of their inks.
pub fn ink_distribution(pool: &[CardCandidate]) -> Vec<(Ink, usize)> {
    Ink::ALL
        .into_iter()
        .map(|ink| (ink, pool.iter().filter(|card| card.inks.contains(&ink)).count()))
        .collect()
}

/// The two most frequent inks, ties broken by canonical order. A pool that
/// only ever shows one ink yields a single-ink identity.
pub fn frequency_identity(pool: &[CardCandidate]) -> Option<Identity> {
    let mut ranked: Vec<(Ink, usize)> = ink_distribution(pool)
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .collect();
    // Stable sort keeps canonical order among equal counts.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    Identity::new(ranked.into_iter().take(2).map(|(ink, _)| ink))
}

/// Up to `per_ink` mono-ink examples for each ink, in pool order.
pub fn samples_by_ink(pool: &[CardCandidate], per_ink: usize) -> Vec<(Ink, Vec<&CardCandidate>)> {
    Ink::ALL
        .into_iter()
        .map(|ink| {
            let cards = pool
                .iter()
                .filter(|card| card.inks.len() == 1 && card.inks.contains(&ink))
                .take(per_ink)
                .collect();
            (ink, cards)
        })
        .filter(|(_, cards): &(Ink, Vec<&CardCandidate>)| !cards.is_empty())
        .collect()
}
