use crate::{rank_by_score, CardCandidate, ScoreContext};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SynergySource {
    Generated,
    Scored,
}

/// Names flagged as thematically preferred. Built once per build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynergySet {
    names: BTreeSet<String>,
    source: SynergySource,
}

impl SynergySet {
    pub fn new(names: impl IntoIterator<Item = String>, source: SynergySource) -> Self {
        Self {
            names: names.into_iter().collect(),
            source,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), SynergySource::Scored)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn source(&self) -> SynergySource {
        self.source
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

/// Maps generated names onto pool names (case-insensitive), dropping
/// unknown names and repeats, keeping at most `limit`.
pub fn resolve_names(names: &[String], pool: &[CardCandidate], limit: usize) -> Vec<String> {
    let mut resolved: Vec<String> = Vec::new();
    for name in names {
        let Some(card) = pool
            .iter()
            .find(|card| card.name.eq_ignore_ascii_case(name.trim()))
        else {
            continue;
        };
        if !resolved.contains(&card.name) {
            resolved.push(card.name.clone());
        }
        if resolved.len() >= limit {
            break;
        }
    }
    resolved
}

/// Top `limit` candidates by score. Never empty for a non-empty pool.
pub fn scored_synergy(pool: &[CardCandidate], ctx: &ScoreContext, limit: usize) -> SynergySet {
    let names = rank_by_score(pool, ctx)
        .into_iter()
        .take(limit.max(1))
        .map(|(card, _)| card.name.clone());
    SynergySet::new(names, SynergySource::Scored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BuildConfig, Ink, Style};

    fn pool() -> Vec<CardCandidate> {
        vec![
            CardCandidate::new("Hook", Some(4), &[Ink::Ruby]).with_text("pirate captain"),
            CardCandidate::new("Smee", Some(2), &[Ink::Ruby]).with_text("pirate"),
            CardCandidate::new("Meadow", Some(1), &[Ink::Ruby]),
        ]
    }

    #[test]
    fn resolves_known_names_only() {
        let names = vec![
            "hook".to_string(),
            "Unknown".to_string(),
            "HOOK".to_string(),
            "smee".to_string(),
        ];
        assert_eq!(resolve_names(&names, &pool(), 5), vec!["Hook", "Smee"]);
        assert_eq!(resolve_names(&names, &pool(), 1), vec!["Hook"]);
    }

    #[test]
    fn scored_fallback_takes_top_candidates() {
        let terms = vec!["pirate".to_string(), "captain".to_string()];
        let config = BuildConfig::default();
        let ctx = ScoreContext::new("pirates", &terms, &[], Style::Balanced, &config);
        let set = scored_synergy(&pool(), &ctx, 2);
        assert_eq!(set.source(), SynergySource::Scored);
        assert!(set.contains("Hook"));
        assert!(set.contains("Smee"));
        assert!(!set.contains("Meadow"));
    }
}
