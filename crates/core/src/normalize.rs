use crate::{Allocation, PlaysetRule, RankedCard};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MoveReason {
    Promote,
    Demote,
}

/// One copy moved between two deck entries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlaysetMove {
    pub from: String,
    pub to: String,
    pub reason: MoveReason,
}

fn is_full(allocation: &Allocation, entry: &RankedCard<'_>) -> bool {
    let count = allocation.get(&entry.card.name);
    count > 0 && count >= entry.card.max_copies
}

pub fn full_playsets(allocation: &Allocation, ranked: &[RankedCard<'_>]) -> usize {
    ranked
        .iter()
        .filter(|entry| is_full(allocation, entry))
        .count()
}

/// Non-full entry closest to a playset, best ranked on ties.
fn promotion_target<'a>(
    allocation: &Allocation,
    ranked: &'a [RankedCard<'a>],
) -> Option<&'a RankedCard<'a>> {
    let mut best: Option<(&RankedCard<'a>, u32)> = None;
    for entry in ranked {
        let count = allocation.get(&entry.card.name);
        if count == 0 || is_full(allocation, entry) {
            continue;
        }
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((entry, count));
        }
    }
    best.map(|(entry, _)| entry)
}

/// Lowest-ranked non-full entry other than `target`, multi-copy entries
/// before singletons.
fn promotion_donor<'a>(
    allocation: &Allocation,
    ranked: &'a [RankedCard<'a>],
    target: &str,
) -> Option<&'a RankedCard<'a>> {
    let candidates = || {
        ranked.iter().rev().filter(move |entry| {
            entry.card.name != target
                && allocation.get(&entry.card.name) > 0
                && !is_full(allocation, entry)
        })
    };
    candidates()
        .find(|entry| allocation.get(&entry.card.name) > 1)
        .or_else(|| candidates().next())
}

/// Best-ranked entry that stays below its limit after one more copy,
/// preferring cards already in the deck.
fn demotion_recipient<'a>(
    allocation: &Allocation,
    ranked: &'a [RankedCard<'a>],
    victim: &str,
) -> Option<&'a RankedCard<'a>> {
    let fits = |entry: &&RankedCard<'a>| {
        entry.card.name != victim && allocation.get(&entry.card.name) + 1 < entry.card.max_copies
    };
    ranked
        .iter()
        .filter(fits)
        .find(|entry| allocation.get(&entry.card.name) > 0)
        .or_else(|| ranked.iter().find(fits))
}

/// Moves single copies between entries until the number of full playsets is
/// within `rule.min..=rule.max` or no move helps. The deck size never
/// changes and every count stays within `0..=max_copies`.
pub fn normalize_playsets(
    allocation: &mut Allocation,
    ranked: &[RankedCard<'_>],
    rule: PlaysetRule,
) -> Vec<PlaysetMove> {
    let mut moves = Vec::new();

    while full_playsets(allocation, ranked) < rule.min {
        let Some(target) = promotion_target(allocation, ranked) else {
            break;
        };
        let Some(donor) = promotion_donor(allocation, ranked, &target.card.name) else {
            break;
        };
        allocation.take_one(&donor.card.name);
        allocation.add(&target.card.name, 1);
        moves.push(PlaysetMove {
            from: donor.card.name.clone(),
            to: target.card.name.clone(),
            reason: MoveReason::Promote,
        });
    }

    while full_playsets(allocation, ranked) > rule.max {
        let Some(victim) = ranked.iter().rev().find(|entry| is_full(allocation, entry)) else {
            break;
        };
        let Some(recipient) = demotion_recipient(allocation, ranked, &victim.card.name) else {
            break;
        };
        allocation.take_one(&victim.card.name);
        allocation.add(&recipient.card.name, 1);
        moves.push(PlaysetMove {
            from: victim.card.name.clone(),
            to: recipient.card.name.clone(),
            reason: MoveReason::Demote,
        });
    }

    moves
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CardCandidate, Ink};

    fn cards(count: usize) -> Vec<CardCandidate> {
        (0..count)
            .map(|idx| CardCandidate::new(format!("Card {idx:02}"), Some(2), &[Ink::Amber]))
            .collect()
    }

    fn ranked(pool: &[CardCandidate]) -> Vec<RankedCard<'_>> {
        pool.iter()
            .map(|card| RankedCard {
                card,
                score: 0,
                preferred: false,
            })
            .collect()
    }

    #[test]
    fn promotes_almost_full_entries_first() {
        let pool = cards(4);
        let ranked = ranked(&pool);
        let mut allocation = Allocation::new();
        allocation.add("Card 00", 2);
        allocation.add("Card 01", 3);
        allocation.add("Card 02", 2);
        allocation.add("Card 03", 1);
        let moves = normalize_playsets(&mut allocation, &ranked, PlaysetRule { min: 1, max: 12 });
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].to, "Card 01");
        assert_eq!(moves[0].from, "Card 02");
        assert_eq!(allocation.get("Card 01"), 4);
        assert_eq!(allocation.total(), 8);
    }

    #[test]
    fn demotes_lowest_ranked_playsets() {
        let pool = cards(6);
        let ranked = ranked(&pool);
        let mut allocation = Allocation::new();
        for card in &pool[..4] {
            allocation.add(&card.name, 4);
        }
        let moves = normalize_playsets(&mut allocation, &ranked, PlaysetRule { min: 0, max: 2 });
        assert_eq!(full_playsets(&allocation, &ranked), 2);
        assert_eq!(allocation.total(), 16);
        assert_eq!(moves[0].from, "Card 03");
        assert!(moves.iter().all(|mv| mv.reason == MoveReason::Demote));
    }

    #[test]
    fn stops_when_no_donor_exists() {
        let pool = cards(1);
        let ranked = ranked(&pool);
        let mut allocation = Allocation::new();
        allocation.add("Card 00", 2);
        let moves = normalize_playsets(&mut allocation, &ranked, PlaysetRule::default());
        assert!(moves.is_empty());
        assert_eq!(allocation.get("Card 00"), 2);
    }
}
