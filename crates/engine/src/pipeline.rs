use crate::identity::select_identity;
use crate::synergy::recommend;
use crate::{Embedder, EngineConfig, EngineError, Retriever, TextGenerator, VectorSearch};
use chrono::NaiveDate;
use inkdeck_core::{
    assemble_deck, build_response, filter_legal, BuildConfig, BuildError, BuildReport,
    DeckRequest, DeckResponse, FinalDeck, IdentitySource, ScoreContext, Style,
};
use std::sync::Arc;
use tracing::{info, info_span, Instrument};

/// Result of one successful build.
#[derive(Debug, Clone)]
pub struct DeckBuild {
    pub deck: FinalDeck,
    pub report: BuildReport,
    pub response: DeckResponse,
}

/// Runs deck builds against a set of collaborators. Holds no per-build
/// state, so one builder can serve concurrent requests.
#[derive(Clone)]
pub struct DeckBuilder {
    pub(crate) embedder: Arc<dyn Embedder>,
    pub(crate) search: Arc<dyn VectorSearch>,
    pub(crate) generator: Option<Arc<dyn TextGenerator>>,
    pub(crate) config: EngineConfig,
    pub(crate) build: BuildConfig,
}

impl DeckBuilder {
    pub fn new(embedder: Arc<dyn Embedder>, search: Arc<dyn VectorSearch>) -> Self {
        Self {
            embedder,
            search,
            generator: None,
            config: EngineConfig::default(),
            build: BuildConfig::default(),
        }
    }

    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_build_config(mut self, build: BuildConfig) -> Self {
        self.build = build;
        self
    }

    pub fn build_config(&self) -> &BuildConfig {
        &self.build
    }

    pub(crate) fn retriever(&self) -> Retriever<'_> {
        Retriever::new(
            self.embedder.as_ref(),
            self.search.as_ref(),
            &self.config,
            &self.build.search,
        )
    }

    pub(crate) fn generator(&self) -> Option<&dyn TextGenerator> {
        self.generator.as_deref()
    }

    /// Builds with legality checked against today's date.
    pub async fn build(&self, request: &DeckRequest) -> Result<DeckBuild, EngineError> {
        self.build_on(request, chrono::Local::now().date_naive()).await
    }

    pub async fn build_on(
        &self,
        request: &DeckRequest,
        on: NaiveDate,
    ) -> Result<DeckBuild, EngineError> {
        let span = info_span!(
            "build",
            format = request.format.as_str(),
            target = request.target_size
        );
        self.run(request, on).instrument(span).await
    }

    async fn run(&self, request: &DeckRequest, on: NaiveDate) -> Result<DeckBuild, EngineError> {
        request.validate()?;
        let style = Style::detect(&request.request);
        info!(style = style.as_str(), "starting build");

        // Search & Discovery
        let retrieval = self
            .retriever()
            .retrieve(&request.request, request.format)
            .await?;

        // Filtering & Validation
        let (identity, identity_source) = match request.explicit_identity()? {
            Some(identity) => (identity, IdentitySource::Explicit),
            None => select_identity(
                &request.request,
                &retrieval.pool,
                self.generator(),
                self.config.identity_samples_per_ink,
                self.config.generation_timeout_ms,
            )
            .await
            .ok_or(BuildError::NoCandidates)?,
        };
        let legal = filter_legal(&retrieval.pool, &identity, request.format, on);
        info!(
            identity = %identity.label(),
            legal = legal.len(),
            dropped = retrieval.pool.len() - legal.len(),
            "pool filtered"
        );

        // Deck Assembly
        let ctx = ScoreContext::new(
            &request.request,
            &retrieval.terms,
            &retrieval.subtypes,
            style,
            &self.build,
        );
        let synergy = recommend(
            &request.request,
            style,
            &legal,
            &ctx,
            self.generator(),
            &self.build.synergy,
            self.config.generation_timeout_ms,
        )
        .await;
        let assembly = assemble_deck(
            &legal,
            &identity,
            &ctx,
            &synergy,
            style,
            request.target_size,
            &self.build,
        )?;

        let report = BuildReport {
            format: request.format,
            style,
            queries: retrieval.queries,
            failed_queries: retrieval.failed,
            candidates_found: retrieval.pool.len(),
            identity,
            identity_source,
            legal_candidates: legal.len(),
            synergy_count: synergy.len(),
            synergy_source: synergy.source(),
            topped_up: assembly.topped_up,
            playset_moves: assembly.moves.len(),
            iterations: None,
        };
        let response = build_response(&assembly.deck, &report);
        info!(
            cards = assembly.deck.total(),
            entries = assembly.deck.entries.len(),
            "deck assembled"
        );
        Ok(DeckBuild {
            deck: assembly.deck,
            report,
            response,
        })
    }
}
