use crate::{
    bounded, Embedder, EngineConfig, EngineError, SearchFilter, ServiceError, VectorSearch,
};
use futures::future::join_all;
use inkdeck_core::{
    dedupe_by_name, extract_search_terms, harvest_subtypes, BuildError, CardCandidate, Format,
    SearchRule,
};
use inkdeck_data::candidate_from_payload;
use tracing::{debug, info, warn};

#[derive(Debug)]
enum QueryError {
    Embed(ServiceError),
    Search(ServiceError),
}

#[derive(Debug, Clone, Default)]
pub struct RetrievalOutcome {
    pub pool: Vec<CardCandidate>,
    pub terms: Vec<String>,
    /// Subtypes queried in the second wave; scoring treats them as preferred.
    pub subtypes: Vec<String>,
    pub queries: usize,
    pub failed: usize,
}

/// Issues the semantic queries for one build and merges their results.
pub struct Retriever<'a> {
    embedder: &'a dyn Embedder,
    search: &'a dyn VectorSearch,
    config: &'a EngineConfig,
    rule: &'a SearchRule,
}

impl<'a> Retriever<'a> {
    pub fn new(
        embedder: &'a dyn Embedder,
        search: &'a dyn VectorSearch,
        config: &'a EngineConfig,
        rule: &'a SearchRule,
    ) -> Self {
        Self {
            embedder,
            search,
            config,
            rule,
        }
    }

    async fn query(
        &self,
        text: &str,
        filter: SearchFilter,
    ) -> Result<Vec<CardCandidate>, QueryError> {
        let timeout = self.config.search_timeout_ms;
        let vector = bounded(timeout, self.embedder.embed(text))
            .await
            .map_err(QueryError::Embed)?;
        let hits = bounded(
            timeout,
            self.search.search(
                &self.config.collection,
                &vector,
                &filter,
                self.rule.search_limit,
            ),
        )
        .await
        .map_err(QueryError::Search)?;

        let mut cards = Vec::with_capacity(hits.len());
        for hit in hits {
            match candidate_from_payload(&hit.payload) {
                Ok(card) => cards.push(card),
                Err(err) => {
                    debug!(query = text, error = %format!("{err:#}"), "skipping payload")
                }
            }
        }
        Ok(cards)
    }

    /// Runs `queries` concurrently. Results come back in issue order so the
    /// merge does not depend on arrival order.
    async fn wave(
        &self,
        queries: &[String],
        filter: SearchFilter,
    ) -> Vec<Result<Vec<CardCandidate>, QueryError>> {
        join_all(queries.iter().map(|text| self.query(text, filter))).await
    }

    /// One ad-hoc query. `None` means it failed; the error is logged.
    pub async fn search_one(&self, text: &str, format: Format) -> Option<Vec<CardCandidate>> {
        match self.query(text, SearchFilter { format }).await {
            Ok(cards) => Some(cards),
            Err(err) => {
                warn!(query = text, error = ?err, "query failed");
                None
            }
        }
    }

    pub async fn retrieve(
        &self,
        request: &str,
        format: Format,
    ) -> Result<RetrievalOutcome, EngineError> {
        let filter = SearchFilter { format };
        let terms = extract_search_terms(request, self.rule);
        let mut first_wave = vec![request.trim().to_string()];
        let whole = request.trim().to_lowercase();
        first_wave.extend(terms.iter().filter(|term| **term != whole).cloned());

        let mut outcome = RetrievalOutcome {
            terms,
            ..RetrievalOutcome::default()
        };
        let mut merged: Vec<CardCandidate> = Vec::new();

        let results = self.wave(&first_wave, filter).await;
        for (idx, (text, result)) in first_wave.iter().zip(results).enumerate() {
            outcome.queries += 1;
            match result {
                Ok(cards) => merged.extend(cards),
                Err(QueryError::Embed(err)) if idx == 0 => {
                    return Err(EngineError::Embedding(err));
                }
                Err(err) => {
                    outcome.failed += 1;
                    warn!(query = %text, error = ?err, "query failed, treating as empty");
                }
            }
        }
        let first = dedupe_by_name(merged);
        info!(
            queries = first_wave.len(),
            candidates = first.len(),
            "first retrieval wave done"
        );

        outcome.subtypes = harvest_subtypes(&first, request, self.rule.max_subtype_queries);
        let mut merged = first;
        if !outcome.subtypes.is_empty() {
            let results = self.wave(&outcome.subtypes, filter).await;
            for (text, result) in outcome.subtypes.iter().zip(results) {
                outcome.queries += 1;
                match result {
                    Ok(cards) => merged.extend(cards),
                    Err(err) => {
                        outcome.failed += 1;
                        warn!(
                            query = %text,
                            error = ?err,
                            "subtype query failed, treating as empty"
                        );
                    }
                }
            }
        }
        outcome.pool = dedupe_by_name(merged);
        info!(
            subtypes = ?outcome.subtypes,
            candidates = outcome.pool.len(),
            failed = outcome.failed,
            "retrieval done"
        );

        if outcome.pool.is_empty() {
            return Err(BuildError::NoCandidates.into());
        }
        Ok(outcome)
    }
}
