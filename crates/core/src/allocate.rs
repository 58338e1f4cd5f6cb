use crate::{AllocationRule, BuildError, CardCandidate, ScoreContext, SynergySet};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CurveBucket {
    One,
    Two,
    Three,
    Four,
    FivePlus,
}

impl CurveBucket {
    pub const ALL: [CurveBucket; 5] = [
        CurveBucket::One,
        CurveBucket::Two,
        CurveBucket::Three,
        CurveBucket::Four,
        CurveBucket::FivePlus,
    ];

    pub fn for_cost(cost: u32) -> Self {
        match cost {
            0 | 1 => Self::One,
            2 => Self::Two,
            3 => Self::Three,
            4 => Self::Four,
            _ => Self::FivePlus,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::One => "1",
            Self::Two => "2",
            Self::Three => "3",
            Self::Four => "4",
            Self::FivePlus => "5+",
        }
    }
}

/// Desired and running copy counts per cost bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Curve {
    desired: [u32; 5],
    actual: [u32; 5],
}

impl Curve {
    pub fn new(desired: [u32; 5]) -> Self {
        Self {
            desired,
            actual: [0; 5],
        }
    }

    pub fn deficit(&self, bucket: CurveBucket) -> u32 {
        let idx = bucket.index();
        self.desired[idx].saturating_sub(self.actual[idx])
    }

    pub fn desired(&self) -> [u32; 5] {
        self.desired
    }

    pub fn actual(&self) -> [u32; 5] {
        self.actual
    }

    fn record(&mut self, bucket: CurveBucket, copies: u32) {
        self.actual[bucket.index()] += copies;
    }
}

/// Copy counts per card name, in the order cards were first added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    counts: IndexMap<String, u32>,
}

impl Allocation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> u32 {
        self.counts.get(name).copied().unwrap_or(0)
    }

    pub fn add(&mut self, name: &str, copies: u32) {
        if copies == 0 {
            return;
        }
        *self.counts.entry(name.to_string()).or_insert(0) += copies;
    }

    /// Removes one copy, dropping the entry when it reaches zero.
    pub fn take_one(&mut self, name: &str) -> bool {
        let Some(count) = self.counts.get_mut(name) else {
            return false;
        };
        *count -= 1;
        if *count == 0 {
            self.counts.shift_remove(name);
        }
        true
    }

    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(name, count)| (name.as_str(), *count))
    }
}

/// A legal candidate with its score and synergy flag.
#[derive(Debug, Clone, Copy)]
pub struct RankedCard<'a> {
    pub card: &'a CardCandidate,
    pub score: i64,
    pub preferred: bool,
}

/// Orders candidates by `(score + synergy bonus, inkable, cheaper)`, best
/// first, with name as the final tie-break.
pub fn rank_candidates<'a>(
    pool: &'a [CardCandidate],
    ctx: &ScoreContext,
    synergy: &SynergySet,
    rule: &AllocationRule,
) -> Vec<RankedCard<'a>> {
    let mut ranked: Vec<RankedCard<'a>> = pool
        .iter()
        .map(|card| RankedCard {
            card,
            score: ctx.score(card),
            preferred: synergy.contains(&card.name),
        })
        .collect();
    ranked.sort_by_key(|entry| {
        let bonus = if entry.preferred { rule.synergy_bonus } else { 0 };
        (
            Reverse(entry.score + bonus),
            Reverse(entry.card.inkable),
            entry.card.effective_cost(),
            entry.card.name.clone(),
        )
    });
    ranked
}

#[derive(Debug, Clone)]
pub struct AllocationOutcome {
    pub allocation: Allocation,
    pub curve: Curve,
    /// Copies added after the curve-shaped pass.
    pub topped_up: u32,
}

struct Allocator<'r> {
    rule: &'r AllocationRule,
    target: u32,
    allocation: Allocation,
    curve: Curve,
    inkable: u32,
}

impl<'r> Allocator<'r> {
    fn remaining(&self) -> u32 {
        self.target.saturating_sub(self.allocation.total())
    }

    fn inkable_percent(&self) -> Option<u32> {
        let total = self.allocation.total();
        (total > 0).then(|| self.inkable * 100 / total)
    }

    fn pass_cap(&self, entry: &RankedCard<'_>) -> u32 {
        let card = entry.card;
        let cost = card.effective_cost();
        let cap = if entry.preferred {
            card.max_copies
        } else if cost <= self.rule.cheap_cost {
            self.rule.cheap_cap
        } else if cost >= self.rule.expensive_cost {
            self.rule.expensive_cap
        } else {
            self.rule.default_cap
        };
        cap.min(card.max_copies)
    }

    fn place(&mut self, card: &CardCandidate, copies: u32) {
        self.allocation.add(&card.name, copies);
        self.curve
            .record(CurveBucket::for_cost(card.effective_cost()), copies);
        if card.inkable {
            self.inkable += copies;
        }
    }

    fn curve_pass(&mut self, ranked: &[RankedCard<'_>]) {
        for entry in ranked {
            if self.remaining() == 0 {
                break;
            }
            let current = self.allocation.get(&entry.card.name);
            let room = self.pass_cap(entry).saturating_sub(current);
            let bucket = CurveBucket::for_cost(entry.card.effective_cost());
            let curve_room = match self.curve.deficit(bucket) {
                0 if entry.preferred => 1,
                deficit => deficit,
            };
            let mut copies = room.min(self.remaining()).min(curve_room);
            if copies == 0 {
                continue;
            }
            if let Some(percent) = self.inkable_percent() {
                let starved =
                    percent < self.rule.inkable_low && !entry.card.inkable && !entry.preferred;
                let flooded = percent > self.rule.inkable_high && entry.card.inkable;
                if starved || flooded {
                    copies = copies.min(1);
                }
            }
            self.place(entry.card, copies);
        }
    }

    fn top_up(&mut self, ranked: &[RankedCard<'_>]) -> u32 {
        let before = self.allocation.total();
        for entry in ranked {
            let remaining = self.remaining();
            if remaining == 0 {
                break;
            }
            let room = entry
                .card
                .max_copies
                .saturating_sub(self.allocation.get(&entry.card.name));
            self.place(entry.card, room.min(remaining));
        }
        self.allocation.total() - before
    }
}

/// Greedy single-pass allocation shaped by the curve and inkable band,
/// followed by a top-up pass over the same ranking. Counts only grow.
/// Fails with the exact shortfall when the pool cannot fill `target`.
pub fn allocate(
    ranked: &[RankedCard<'_>],
    target: u32,
    desired_curve: [u32; 5],
    rule: &AllocationRule,
) -> Result<AllocationOutcome, BuildError> {
    let mut allocator = Allocator {
        rule,
        target,
        allocation: Allocation::new(),
        curve: Curve::new(desired_curve),
        inkable: 0,
    };
    allocator.curve_pass(ranked);
    let topped_up = allocator.top_up(ranked);

    let total = allocator.allocation.total();
    if total < target {
        return Err(BuildError::shortfall(target, total));
    }
    Ok(AllocationOutcome {
        allocation: allocator.allocation,
        curve: allocator.curve,
        topped_up,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BuildConfig, Ink, Style};

    fn ranked_plain(pool: &[CardCandidate]) -> Vec<RankedCard<'_>> {
        pool.iter()
            .map(|card| RankedCard {
                card,
                score: 0,
                preferred: false,
            })
            .collect()
    }

    #[test]
    fn buckets_cover_costs() {
        assert_eq!(CurveBucket::for_cost(0), CurveBucket::One);
        assert_eq!(CurveBucket::for_cost(4), CurveBucket::Four);
        assert_eq!(CurveBucket::for_cost(9), CurveBucket::FivePlus);
    }

    #[test]
    fn caps_spread_before_depth() {
        let pool = vec![
            CardCandidate::new("Cheap", Some(1), &[Ink::Ruby]).with_inkable(true),
            CardCandidate::new("Mid", Some(3), &[Ink::Ruby]).with_inkable(true),
            CardCandidate::new("Big", Some(7), &[Ink::Ruby]).with_inkable(true),
        ];
        let ranked = ranked_plain(&pool);
        let unsteered = AllocationRule {
            inkable_low: 0,
            inkable_high: 100,
            ..AllocationRule::default()
        };
        let mut allocator = Allocator {
            rule: &unsteered,
            target: 60,
            allocation: Allocation::new(),
            curve: Curve::new([20; 5]),
            inkable: 0,
        };
        allocator.curve_pass(&ranked);
        assert_eq!(allocator.allocation.get("Cheap"), 3);
        assert_eq!(allocator.allocation.get("Mid"), 2);
        assert_eq!(allocator.allocation.get("Big"), 1);
    }

    #[test]
    fn preferred_cards_go_deep_and_ignore_full_buckets() {
        let pool = vec![CardCandidate::new("Star", Some(3), &[Ink::Ruby]).with_inkable(true)];
        let ranked = vec![RankedCard {
            card: &pool[0],
            score: 0,
            preferred: true,
        }];
        let mut allocator = Allocator {
            rule: &AllocationRule::default(),
            target: 60,
            allocation: Allocation::new(),
            curve: Curve::new([10, 10, 0, 10, 10]),
            inkable: 0,
        };
        allocator.curve_pass(&ranked);
        assert_eq!(allocator.allocation.get("Star"), 1);
    }

    #[test]
    fn low_inkable_ratio_throttles_uninkable_cards() {
        let pool = vec![
            CardCandidate::new("Uninkable A", Some(1), &[Ink::Ruby]),
            CardCandidate::new("Uninkable B", Some(1), &[Ink::Ruby]),
        ];
        let ranked = ranked_plain(&pool);
        let mut allocator = Allocator {
            rule: &AllocationRule::default(),
            target: 60,
            allocation: Allocation::new(),
            curve: Curve::new([20; 5]),
            inkable: 0,
        };
        allocator.curve_pass(&ranked);
        // The first card is placed on an empty deck, the second is throttled.
        assert_eq!(allocator.allocation.get("Uninkable A"), 3);
        assert_eq!(allocator.allocation.get("Uninkable B"), 1);
    }

    #[test]
    fn top_up_fills_when_curve_cannot() {
        let pool: Vec<CardCandidate> = (0..20)
            .map(|idx| {
                CardCandidate::new(format!("Two {idx}"), Some(2), &[Ink::Ruby]).with_inkable(true)
            })
            .collect();
        let ranked = ranked_plain(&pool);
        let desired = BuildConfig::default().curve_for(Style::Balanced, 60);
        let outcome =
            allocate(&ranked, 60, desired, &AllocationRule::default()).expect("allocation");
        assert_eq!(outcome.allocation.total(), 60);
        assert!(outcome.topped_up > 0);
        assert!(outcome.allocation.iter().all(|(_, count)| count <= 4));
    }

    #[test]
    fn top_up_never_lowers_curve_pass_counts() {
        let pool: Vec<CardCandidate> = (0..30)
            .map(|idx| {
                CardCandidate::new(format!("Card {idx:02}"), Some(idx % 8), &[Ink::Steel])
                    .with_inkable(idx % 3 != 0)
            })
            .collect();
        let ranked: Vec<RankedCard<'_>> = pool
            .iter()
            .enumerate()
            .map(|(idx, card)| RankedCard {
                card,
                score: 100 - idx as i64,
                preferred: idx % 7 == 0,
            })
            .collect();
        let rule = AllocationRule::default();
        let mut allocator = Allocator {
            rule: &rule,
            target: 60,
            allocation: Allocation::new(),
            curve: Curve::new(BuildConfig::default().curve_for(Style::Aggressive, 60)),
            inkable: 0,
        };
        allocator.curve_pass(&ranked);
        let after_curve = allocator.allocation.clone();
        let topped_up = allocator.top_up(&ranked);

        assert_eq!(allocator.allocation.total(), 60);
        assert_eq!(after_curve.total() + topped_up, 60);
        for (name, count) in after_curve.iter() {
            assert!(count <= allocator.allocation.get(name), "{name} shrank");
        }
    }

    #[test]
    fn reports_exact_shortfall() {
        let pool: Vec<CardCandidate> = (0..10)
            .map(|idx| CardCandidate::new(format!("C{idx}"), Some(2), &[Ink::Ruby]))
            .collect();
        let ranked = ranked_plain(&pool);
        let err = allocate(&ranked, 60, [12; 5], &AllocationRule::default()).expect_err("short");
        assert_eq!(err, BuildError::shortfall(60, 40));
    }

    #[test]
    fn take_one_drops_empty_entries() {
        let mut allocation = Allocation::new();
        allocation.add("A", 1);
        assert!(allocation.take_one("A"));
        assert!(allocation.is_empty());
        assert!(!allocation.take_one("A"));
    }
}
