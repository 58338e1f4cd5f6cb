use crate::{BuildConfig, CardCandidate, KeywordWeight, ScoringRule, Style};

/// Everything the scoring function reads, lowercased once per build.
#[derive(Debug, Clone)]
pub struct ScoreContext {
    phrase: String,
    terms: Vec<String>,
    preferred_subtypes: Vec<String>,
    keywords: Vec<KeywordWeight>,
    rule: ScoringRule,
}

impl ScoreContext {
    pub fn new(
        request: &str,
        terms: &[String],
        preferred_subtypes: &[String],
        style: Style,
        config: &BuildConfig,
    ) -> Self {
        Self {
            phrase: request.trim().to_lowercase(),
            terms: terms.iter().map(|term| term.to_lowercase()).collect(),
            preferred_subtypes: preferred_subtypes
                .iter()
                .map(|subtype| subtype.to_lowercase())
                .collect(),
            keywords: config
                .keyword_weights(style)
                .iter()
                .map(|entry| KeywordWeight {
                    keyword: entry.keyword.to_lowercase(),
                    weight: entry.weight,
                })
                .collect(),
            rule: config.scoring.clone(),
        }
    }

    pub fn score(&self, card: &CardCandidate) -> i64 {
        let name = card.name.to_lowercase();
        let text = card.text.to_lowercase();
        let mut score = 0i64;

        if !self.phrase.is_empty() && name.contains(&self.phrase) {
            score += self.rule.phrase_bonus;
        }
        for term in &self.terms {
            if name.contains(term.as_str()) {
                score += self.rule.name_term_weight;
            }
            if text.contains(term.as_str()) {
                score += self.rule.text_term_weight;
            }
        }
        let overlap = card
            .subtypes
            .iter()
            .filter(|subtype| self.preferred_subtypes.contains(&subtype.to_lowercase()))
            .count() as i64;
        score += overlap * self.rule.subtype_weight;
        for entry in &self.keywords {
            if name.contains(entry.keyword.as_str()) || text.contains(entry.keyword.as_str()) {
                score += entry.weight;
            }
        }
        score
    }
}

/// Candidates paired with their scores, best first; ties break by name.
pub fn rank_by_score<'a>(
    pool: &'a [CardCandidate],
    ctx: &ScoreContext,
) -> Vec<(&'a CardCandidate, i64)> {
    let mut ranked: Vec<_> = pool.iter().map(|card| (card, ctx.score(card))).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.name.cmp(&b.0.name)));
    ranked
}
