use crate::{CurveBucket, Style};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeywordWeight {
    pub keyword: String,
    pub weight: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StyleRule {
    pub style: Style,
    /// Percent of the deck per cost bucket, in `CurveBucket::ALL` order.
    pub curve: [u32; 5],
    pub keywords: Vec<KeywordWeight>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScoringRule {
    pub phrase_bonus: i64,
    pub name_term_weight: i64,
    pub text_term_weight: i64,
    pub subtype_weight: i64,
}

impl Default for ScoringRule {
    fn default() -> Self {
        Self {
            phrase_bonus: 100,
            name_term_weight: 5,
            text_term_weight: 1,
            subtype_weight: 8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AllocationRule {
    pub synergy_bonus: i64,
    pub cheap_cost: u32,
    pub cheap_cap: u32,
    pub expensive_cost: u32,
    pub expensive_cap: u32,
    pub default_cap: u32,
    /// Inkable percentage bounds steering the greedy pass.
    pub inkable_low: u32,
    pub inkable_high: u32,
}

impl Default for AllocationRule {
    fn default() -> Self {
        Self {
            synergy_bonus: 25,
            cheap_cost: 2,
            cheap_cap: 3,
            expensive_cost: 5,
            expensive_cap: 1,
            default_cap: 2,
            inkable_low: 70,
            inkable_high: 85,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PlaysetRule {
    pub min: usize,
    pub max: usize,
}

impl Default for PlaysetRule {
    fn default() -> Self {
        Self { min: 5, max: 12 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SearchRule {
    pub max_search_terms: usize,
    pub max_subtype_queries: usize,
    pub search_limit: usize,
    pub stop_words: Vec<String>,
}

impl Default for SearchRule {
    fn default() -> Self {
        Self {
            max_search_terms: 5,
            max_subtype_queries: 3,
            search_limit: 100,
            stop_words: [
                "deck", "decks", "build", "card", "cards", "make", "want", "with", "that", "this",
                "some", "using", "around", "please", "based",
            ]
            .iter()
            .map(|word| word.to_string())
            .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SynergyRule {
    pub size: usize,
    pub prompt_candidates: usize,
    pub text_chars: usize,
}

impl Default for SynergyRule {
    fn default() -> Self {
        Self {
            size: 15,
            prompt_candidates: 60,
            text_chars: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BuildConfig {
    pub scoring: ScoringRule,
    pub allocation: AllocationRule,
    pub playsets: PlaysetRule,
    pub search: SearchRule,
    pub synergy: SynergyRule,
    pub styles: Vec<StyleRule>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringRule::default(),
            allocation: AllocationRule::default(),
            playsets: PlaysetRule::default(),
            search: SearchRule::default(),
            synergy: SynergyRule::default(),
            styles: default_styles(),
        }
    }
}

fn keywords(pairs: &[(&str, i64)]) -> Vec<KeywordWeight> {
    pairs
        .iter()
        .map(|(keyword, weight)| KeywordWeight {
            keyword: keyword.to_string(),
            weight: *weight,
        })
        .collect()
}

fn default_styles() -> Vec<StyleRule> {
    vec![
        StyleRule {
            style: Style::Aggressive,
            curve: [20, 30, 25, 15, 10],
            keywords: keywords(&[
                ("rush", 3),
                ("challenge", 3),
                ("evasive", 2),
                ("banish", 2),
                ("damage", 1),
                ("reckless", 1),
            ]),
        },
        StyleRule {
            style: Style::Defensive,
            curve: [10, 20, 25, 20, 25],
            keywords: keywords(&[
                ("bodyguard", 3),
                ("resist", 3),
                ("ward", 2),
                ("remove", 2),
                ("banish", 2),
                ("exert", 1),
            ]),
        },
        StyleRule {
            style: Style::Combo,
            curve: [12, 25, 25, 20, 18],
            keywords: keywords(&[
                ("draw", 3),
                ("whenever", 2),
                ("song", 2),
                ("sing", 2),
                ("shift", 2),
                ("return", 1),
            ]),
        },
        StyleRule {
            style: Style::LoreRace,
            curve: [15, 27, 27, 18, 13],
            keywords: keywords(&[
                ("lore", 3),
                ("quest", 3),
                ("support", 2),
                ("location", 2),
                ("gain", 1),
            ]),
        },
        StyleRule {
            style: Style::Balanced,
            curve: [13, 25, 25, 20, 17],
            keywords: keywords(&[
                ("draw", 1),
                ("lore", 1),
                ("challenge", 1),
                ("bodyguard", 1),
            ]),
        },
    ]
}

impl BuildConfig {
    pub fn style_rule(&self, style: Style) -> Option<&StyleRule> {
        self.styles.iter().find(|rule| rule.style == style)
    }

    pub fn keyword_weights(&self, style: Style) -> &[KeywordWeight] {
        self.style_rule(style)
            .map(|rule| rule.keywords.as_slice())
            .unwrap_or(&[])
    }

    /// Desired copies per bucket for the style, scaled to `target`. The
    /// rounding remainder goes to the largest bucket so the shape always
    /// sums to `target`.
    pub fn curve_for(&self, style: Style, target: u32) -> [u32; 5] {
        let shape = self
            .style_rule(style)
            .or_else(|| self.style_rule(Style::Balanced))
            .map(|rule| rule.curve)
            .unwrap_or([20; 5]);
        let total: u64 = shape.iter().map(|pct| u64::from(*pct)).sum::<u64>().max(1);
        let mut desired = [0u32; CurveBucket::ALL.len()];
        for (slot, pct) in desired.iter_mut().zip(shape) {
            // pct <= total, so the quotient never exceeds target
            *slot = (u64::from(pct) * u64::from(target) / total) as u32;
        }
        let assigned: u32 = desired.iter().sum();
        let largest = shape
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(&a.0)))
            .map(|(idx, _)| idx)
            .unwrap_or(0);
        desired[largest] += target.saturating_sub(assigned);
        desired
    }
}
