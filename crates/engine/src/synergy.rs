use crate::prompts::synergy_prompt;
use crate::{bounded, TextGenerator};
use inkdeck_core::{
    parse_name_list, rank_by_score, resolve_names, scored_synergy, CardCandidate, ScoreContext,
    Style, SynergyRule, SynergySet, SynergySource,
};
use tracing::{info, warn};

async fn generated_names(
    request: &str,
    style: Style,
    pool: &[CardCandidate],
    ctx: &ScoreContext,
    generator: &dyn TextGenerator,
    rule: &SynergyRule,
    timeout_ms: u64,
) -> Vec<String> {
    let shortlist: Vec<&CardCandidate> = rank_by_score(pool, ctx)
        .into_iter()
        .take(rule.prompt_candidates)
        .map(|(card, _)| card)
        .collect();
    let prompt = synergy_prompt(request, style, &shortlist, rule.size, rule.text_chars);
    let reply = match bounded(timeout_ms, generator.generate(&prompt)).await {
        Ok(reply) => reply,
        Err(err) => {
            warn!(error = %err, "synergy generation failed");
            return Vec::new();
        }
    };
    match parse_name_list(&reply) {
        Ok(names) => resolve_names(&names, pool, rule.size),
        Err(err) => {
            warn!(error = %err, "synergy reply rejected");
            Vec::new()
        }
    }
}

/// Preferred cards for the build. `pool` is the ink-filtered pool; the
/// result is only empty when the pool is.
pub async fn recommend(
    request: &str,
    style: Style,
    pool: &[CardCandidate],
    ctx: &ScoreContext,
    generator: Option<&dyn TextGenerator>,
    rule: &SynergyRule,
    timeout_ms: u64,
) -> SynergySet {
    if let Some(generator) = generator {
        let names = generated_names(request, style, pool, ctx, generator, rule, timeout_ms).await;
        if !names.is_empty() {
            info!(count = names.len(), "synergy set recommended by generator");
            return SynergySet::new(names, SynergySource::Generated);
        }
    }
    let set = scored_synergy(pool, ctx, rule.size);
    info!(count = set.len(), "synergy set picked by score");
    set
}
