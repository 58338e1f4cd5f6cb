use crate::{CurveBucket, FinalDeck, Format, Identity, IdentitySource, Style, SynergySource};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckCard {
    pub name: String,
    pub count: u32,
    pub usable_as_resource: bool,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<u32>,
    pub subtypes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckResponse {
    pub cards: Vec<DeckCard>,
    pub explanation: String,
}

/// Phase outcomes collected while building, rendered into the explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    pub format: Format,
    pub style: Style,
    pub queries: usize,
    pub failed_queries: usize,
    pub candidates_found: usize,
    pub identity: Identity,
    pub identity_source: IdentitySource,
    pub legal_candidates: usize,
    pub synergy_count: usize,
    pub synergy_source: SynergySource,
    pub topped_up: u32,
    pub playset_moves: usize,
    /// Turns taken by the iterative builder, if it was used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<u32>,
}

impl BuildReport {
    pub fn explanation(&self, deck: &FinalDeck) -> String {
        let total = deck.total();
        let inkable = deck.inkable_copies();
        let inkable_pct = if total > 0 { inkable * 100 / total } else { 0 };
        let identity_how = match self.identity_source {
            IdentitySource::Explicit => "as requested",
            IdentitySource::Generated => "suggested from the candidate pool",
            IdentitySource::Frequency => "by ink frequency in the candidate pool",
        };
        let synergy_how = match self.synergy_source {
            SynergySource::Generated => "recommended",
            SynergySource::Scored => "picked by relevance score",
        };
        let curve = deck
            .curve()
            .iter()
            .zip(CurveBucket::ALL)
            .map(|(count, bucket)| format!("{}: {count}", bucket.label()))
            .collect::<Vec<_>>()
            .join(", ");

        let mut lines = vec![
            format!(
                "Search & Discovery: {} unique candidates from {} queries ({} failed).",
                self.candidates_found, self.queries, self.failed_queries
            ),
            format!(
                "Identity: {} ({identity_how}).",
                self.identity.label()
            ),
            format!(
                "Filtering & Validation: {} candidates legal in {} for the {} format.",
                self.legal_candidates,
                self.identity.label(),
                self.format.as_str()
            ),
            format!(
                "Synergy: {} preferred cards {synergy_how} for a {} style.",
                self.synergy_count,
                self.style.as_str()
            ),
            format!(
                "Deck Assembly: {total} cards across {} entries, \
                 {inkable} inkable ({inkable_pct}%).",
                deck.entries.len()
            ),
            format!("Curve: {curve}."),
            format!(
                "Playsets: {} full playsets after {} adjustments.",
                deck.full_playsets(),
                self.playset_moves
            ),
        ];
        if let Some(turns) = self.iterations {
            lines.push(format!("The deck was assembled iteratively in {turns} turns."));
        }
        if self.topped_up > 0 {
            lines.push(format!(
                "{} copies were added beyond the target curve to reach the deck size.",
                self.topped_up
            ));
        }
        lines.join("\n")
    }
}

pub fn build_response(deck: &FinalDeck, report: &BuildReport) -> DeckResponse {
    let cards = deck
        .entries
        .iter()
        .map(|entry| DeckCard {
            name: entry.card.name.clone(),
            count: entry.count,
            usable_as_resource: entry.card.inkable,
            color: entry.card.ink_label(),
            cost: entry.card.cost,
            subtypes: entry.card.subtypes.iter().cloned().collect(),
            link: entry.card.link.clone(),
        })
        .collect();
    DeckResponse {
        cards,
        explanation: report.explanation(deck),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Allocation, CardCandidate, Ink};

    #[test]
    fn renders_cards_and_narrative() {
        let pool = vec![CardCandidate::new("Hook", Some(4), &[Ink::Ruby, Ink::Steel])
            .with_inkable(true)
            .with_subtypes(&["Pirate"])];
        let mut allocation = Allocation::new();
        allocation.add("Hook", 4);
        let deck = FinalDeck::from_allocation(&allocation, &pool).expect("deck");
        let report = BuildReport {
            format: Format::Core,
            style: Style::Balanced,
            queries: 3,
            failed_queries: 1,
            candidates_found: 1,
            identity: Identity::new([Ink::Ruby, Ink::Steel]).expect("identity"),
            identity_source: IdentitySource::Explicit,
            legal_candidates: 1,
            synergy_count: 1,
            synergy_source: SynergySource::Scored,
            topped_up: 0,
            playset_moves: 0,
            iterations: None,
        };
        let response = build_response(&deck, &report);
        assert_eq!(response.cards[0].color, "Ruby/Steel");
        assert!(response.explanation.contains("Ruby/Steel (as requested)"));
        assert!(response.explanation.contains("Curve: 1: 0, 2: 0, 3: 0, 4: 4, 5+: 0."));

        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(json["cards"][0]["usableAsResource"], true);
        assert!(json["cards"][0].get("link").is_none());
    }
}
