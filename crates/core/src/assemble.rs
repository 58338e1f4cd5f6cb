use crate::{
    allocate, normalize_playsets, rank_candidates, BuildConfig, BuildError, CardCandidate,
    FinalDeck, Identity, PlaysetMove, ScoreContext, Style, SynergySet,
};

#[derive(Debug, Clone)]
pub struct Assembly {
    pub deck: FinalDeck,
    pub topped_up: u32,
    pub moves: Vec<PlaysetMove>,
}

/// Deck assembly phase: rank, allocate, normalize playsets, then validate.
/// `legal` must already be filtered to the identity and format.
pub fn assemble_deck(
    legal: &[CardCandidate],
    identity: &Identity,
    ctx: &ScoreContext,
    synergy: &SynergySet,
    style: Style,
    target: u32,
    config: &BuildConfig,
) -> Result<Assembly, BuildError> {
    let ranked = rank_candidates(legal, ctx, synergy, &config.allocation);
    let desired = config.curve_for(style, target);
    let mut outcome = allocate(&ranked, target, desired, &config.allocation)?;
    let moves = normalize_playsets(&mut outcome.allocation, &ranked, config.playsets);
    let deck = FinalDeck::from_allocation(&outcome.allocation, legal)?;
    deck.validate(identity, target)?;
    Ok(Assembly {
        deck,
        topped_up: outcome.topped_up,
        moves,
    })
}
