use crate::{Allocation, BuildError, CardCandidate, CurveBucket, Identity};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckEntry {
    pub card: CardCandidate,
    pub count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalDeck {
    pub entries: Vec<DeckEntry>,
}

impl FinalDeck {
    /// Resolves allocated names against the legal pool, ordered by cost then
    /// name.
    pub fn from_allocation(
        allocation: &Allocation,
        pool: &[CardCandidate],
    ) -> Result<Self, BuildError> {
        let mut entries = Vec::with_capacity(allocation.len());
        for (name, count) in allocation.iter() {
            let card = pool
                .iter()
                .find(|card| card.name == name)
                .ok_or_else(|| BuildError::UnknownCard(name.to_string()))?;
            entries.push(DeckEntry {
                card: card.clone(),
                count,
            });
        }
        entries.sort_by(|a, b| {
            a.card
                .effective_cost()
                .cmp(&b.card.effective_cost())
                .then_with(|| a.card.name.cmp(&b.card.name))
        });
        Ok(Self { entries })
    }

    pub fn total(&self) -> u32 {
        self.entries.iter().map(|entry| entry.count).sum()
    }

    pub fn inkable_copies(&self) -> u32 {
        self.entries
            .iter()
            .filter(|entry| entry.card.inkable)
            .map(|entry| entry.count)
            .sum()
    }

    pub fn full_playsets(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.count >= entry.card.max_copies)
            .count()
    }

    pub fn curve(&self) -> [u32; 5] {
        let mut histogram = [0u32; 5];
        for entry in &self.entries {
            histogram[CurveBucket::for_cost(entry.card.effective_cost()).index()] += entry.count;
        }
        histogram
    }

    /// Re-checks size, copy limits and identity before the deck leaves the
    /// engine.
    pub fn validate(&self, identity: &Identity, target: u32) -> Result<(), BuildError> {
        for entry in &self.entries {
            if !identity.allows(&entry.card) {
                return Err(BuildError::ColorViolation {
                    name: entry.card.name.clone(),
                    identity: identity.label(),
                });
            }
            if entry.count == 0 || entry.count > entry.card.max_copies {
                return Err(BuildError::CopyLimit {
                    name: entry.card.name.clone(),
                    count: entry.count,
                    max: entry.card.max_copies,
                });
            }
        }
        let total = self.total();
        if total != target {
            return Err(BuildError::SizeMismatch {
                expected: target,
                actual: total,
            });
        }
        Ok(())
    }
}
