//! Iterative deck building driven by the generation service.
//!
//! Each turn the generator picks one action. The loop holds the running
//! allocation and stops on a successful finalize, a malformed reply, a
//! failed generation call, or the iteration ceiling.

use crate::identity::select_identity;
use crate::prompts::{agent_prompt, AgentView};
use crate::{bounded, AgentError, DeckBuild, DeckBuilder, EngineError};
use chrono::NaiveDate;
use inkdeck_core::{
    build_response, dedupe_by_name, filter_legal, rank_by_score, AgentAction, Allocation,
    BuildError, BuildReport, CardCandidate, DeckRequest, FinalDeck, Format, Identity,
    IdentitySource, ScoreContext, Style, SynergySource,
};
use tracing::{debug, info, info_span, warn, Instrument};

/// What a turn did to the loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Transition {
    Continue { feedback: String },
    Finished,
}

/// Query counters carried from retrieval into the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct SearchTally {
    pub(crate) queries: usize,
    pub(crate) failed: usize,
    pub(crate) found: usize,
}

/// Loop state: the running allocation over the legal cards seen so far.
#[derive(Debug, Clone)]
pub(crate) struct AgentState {
    identity: Identity,
    format: Format,
    on: NaiveDate,
    target: u32,
    pub(crate) known: Vec<CardCandidate>,
    pub(crate) allocation: Allocation,
}

impl AgentState {
    pub(crate) fn new(
        identity: Identity,
        format: Format,
        on: NaiveDate,
        target: u32,
        pool: &[CardCandidate],
    ) -> Self {
        let known = filter_legal(pool, &identity, format, on);
        Self {
            identity,
            format,
            on,
            target,
            known,
            allocation: Allocation::new(),
        }
    }

    /// Adds the legal cards among `found`; returns how many were new.
    pub(crate) fn merge(&mut self, found: Vec<CardCandidate>) -> usize {
        let before = self.known.len();
        let legal = filter_legal(&found, &self.identity, self.format, self.on);
        let merged = std::mem::take(&mut self.known).into_iter().chain(legal);
        self.known = dedupe_by_name(merged);
        self.known.len() - before
    }

    /// Applies requested copies, clamped to the copy limit and the space
    /// left in the deck. Unknown or off-identity names are skipped.
    pub(crate) fn add_cards(&mut self, cards: &[(String, u32)]) -> Transition {
        let mut notes = Vec::new();
        for (name, requested) in cards {
            let Some(card) = self
                .known
                .iter()
                .find(|card| card.name.eq_ignore_ascii_case(name.trim()))
            else {
                notes.push(format!("{name} is not a known legal card"));
                continue;
            };
            let current = self.allocation.get(&card.name);
            let room = self.target.saturating_sub(self.allocation.total());
            let copies = (*requested)
                .min(card.max_copies.saturating_sub(current))
                .min(room);
            if copies < *requested {
                notes.push(format!("{} limited to {copies} more copies", card.name));
            }
            self.allocation.add(&card.name, copies);
        }
        let mut feedback = format!(
            "Deck now has {} of {} cards.",
            self.allocation.total(),
            self.target
        );
        if !notes.is_empty() {
            feedback.push(' ');
            feedback.push_str(&notes.join("; "));
            feedback.push('.');
        }
        Transition::Continue { feedback }
    }

    pub(crate) fn finalize(&self) -> Transition {
        let total = self.allocation.total();
        if total >= self.target {
            return Transition::Finished;
        }
        let short = self.target - total;
        Transition::Continue {
            feedback: format!(
                "Cannot finalize: the deck has {total} of {} cards, {short} short. \
                 Add more cards first.",
                self.target
            ),
        }
    }
}

impl DeckBuilder {
    pub async fn build_iterative(&self, request: &DeckRequest) -> Result<DeckBuild, EngineError> {
        self.build_iterative_on(request, chrono::Local::now().date_naive())
            .await
    }

    pub async fn build_iterative_on(
        &self,
        request: &DeckRequest,
        on: NaiveDate,
    ) -> Result<DeckBuild, EngineError> {
        let span = info_span!(
            "agent",
            format = request.format.as_str(),
            target = request.target_size
        );
        self.run_agent(request, on).instrument(span).await
    }

    async fn run_agent(
        &self,
        request: &DeckRequest,
        on: NaiveDate,
    ) -> Result<DeckBuild, EngineError> {
        let generator = self.generator().ok_or(EngineError::GeneratorRequired)?;
        request.validate()?;
        let style = Style::detect(&request.request);
        let retriever = self.retriever();
        let retrieval = retriever.retrieve(&request.request, request.format).await?;

        let (identity, identity_source) = match request.explicit_identity()? {
            Some(identity) => (identity, IdentitySource::Explicit),
            None => select_identity(
                &request.request,
                &retrieval.pool,
                Some(generator),
                self.config.identity_samples_per_ink,
                self.config.generation_timeout_ms,
            )
            .await
            .ok_or(BuildError::NoCandidates)?,
        };
        let ctx = ScoreContext::new(
            &request.request,
            &retrieval.terms,
            &retrieval.subtypes,
            style,
            &self.build,
        );
        let mut state = AgentState::new(
            identity.clone(),
            request.format,
            on,
            request.target_size,
            &retrieval.pool,
        );
        let mut tally = SearchTally {
            queries: retrieval.queries,
            failed: retrieval.failed,
            found: retrieval.pool.len(),
        };
        let label = identity.label();
        let max_turns = self.config.agent_max_iterations;
        let mut feedback: Option<String> = None;

        for turn in 1..=max_turns {
            let prompt = {
                let shortlist: Vec<&CardCandidate> = rank_by_score(&state.known, &ctx)
                    .into_iter()
                    .take(self.config.agent_prompt_candidates)
                    .map(|(card, _)| card)
                    .collect();
                agent_prompt(&AgentView {
                    request: &request.request,
                    identity: &label,
                    target: request.target_size,
                    total: state.allocation.total(),
                    deck: state.allocation.iter().collect(),
                    candidates: shortlist,
                    feedback: feedback.as_deref(),
                    turn,
                    max_turns,
                })
            };
            let reply = bounded(self.config.generation_timeout_ms, generator.generate(&prompt))
                .await
                .map_err(|error| AgentError::Generation { turn, error })?;
            let action = AgentAction::parse(&reply)
                .map_err(|error| AgentError::MalformedReply { turn, error })?;
            debug!(turn, ?action, "agent action");

            let transition = match action {
                AgentAction::Search { query } => {
                    tally.queries += 1;
                    let note = match retriever.search_one(&query, request.format).await {
                        Some(found) => {
                            let added = state.merge(found);
                            tally.found += added;
                            format!("Search for {query:?} found {added} new legal cards.")
                        }
                        None => {
                            tally.failed += 1;
                            format!("Search for {query:?} failed. Try another query.")
                        }
                    };
                    Transition::Continue { feedback: note }
                }
                AgentAction::AddCards { cards } => state.add_cards(&cards),
                AgentAction::Finalize => state.finalize(),
            };
            match transition {
                Transition::Finished => {
                    info!(turn, "agent finalized");
                    return finish(state, request, style, identity, identity_source, tally, turn);
                }
                Transition::Continue { feedback: note } => {
                    debug!(turn, feedback = %note, "agent continues");
                    feedback = Some(note);
                }
            }
        }

        warn!(
            turns = max_turns,
            total = state.allocation.total(),
            "agent hit the iteration limit"
        );
        Err(AgentError::IterationLimit {
            turns: max_turns,
            total: state.allocation.total(),
            target: request.target_size,
        }
        .into())
    }
}

fn finish(
    state: AgentState,
    request: &DeckRequest,
    style: Style,
    identity: Identity,
    identity_source: IdentitySource,
    tally: SearchTally,
    turns: u32,
) -> Result<DeckBuild, EngineError> {
    let deck = FinalDeck::from_allocation(&state.allocation, &state.known)?;
    deck.validate(&identity, request.target_size)?;
    let report = BuildReport {
        format: request.format,
        style,
        queries: tally.queries,
        failed_queries: tally.failed,
        candidates_found: tally.found,
        identity,
        identity_source,
        legal_candidates: state.known.len(),
        synergy_count: 0,
        synergy_source: SynergySource::Generated,
        topped_up: 0,
        playset_moves: 0,
        iterations: Some(turns),
    };
    let response = build_response(&deck, &report);
    Ok(DeckBuild {
        deck,
        report,
        response,
    })
}
