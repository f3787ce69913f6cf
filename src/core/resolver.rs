use crate::adapters::discogs::{DiscogsApi, SERVICE_NAME};
use crate::core::assembler::assemble;
use crate::core::refine::RefineStage;
use crate::core::search::SearchStage;
use crate::core::similarity::FieldSimilarity;
use crate::domain::model::{Candidate, Provenance, ResolutionQuery, SuggestionSet};
use crate::domain::ports::{CatalogGateway, Similarity};
use crate::utils::error::{ResolverError, Result, Stage};
use std::time::Duration;
use tokio::time::Instant;

/// Thresholds and bounds of the two pruning steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolverSettings {
    pub min_search_short_result: f64,
    pub min_search_full_result: f64,
    pub max_pre_suggestions: usize,
    pub max_suggestions: usize,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            min_search_short_result: 0.5,
            min_search_full_result: 0.75,
            max_pre_suggestions: 7,
            max_suggestions: 3,
        }
    }
}

/// Turns a query into a ranked suggestion set.
///
/// Holds no per-request state; one instance serves any number of
/// concurrent resolutions.
pub struct Resolver<G, S = FieldSimilarity> {
    gateway: G,
    similarity: S,
    api: DiscogsApi,
    settings: ResolverSettings,
    service_name: String,
}

impl<G, S> Resolver<G, S>
where
    G: CatalogGateway,
    S: Similarity,
{
    pub fn new(gateway: G, similarity: S, api: DiscogsApi, settings: ResolverSettings) -> Self {
        Self {
            gateway,
            similarity,
            api,
            settings,
            service_name: SERVICE_NAME.to_string(),
        }
    }

    /// Name every suggestion is tagged with; defaults to the catalog's name.
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Resolves within `deadline`. On expiry every in-flight wait and fetch
    /// is dropped and `DeadlineExceeded` is returned.
    pub async fn resolve(&self, query: &ResolutionQuery, deadline: Duration) -> Result<SuggestionSet> {
        let started = Instant::now();
        match tokio::time::timeout(deadline, self.run(query)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(deadline_ms = deadline.as_millis() as u64, "Resolution abandoned");
                Err(ResolverError::DeadlineExceeded {
                    after_ms: started.elapsed().as_millis(),
                })
            }
        }
    }

    /// Resolves without a deadline; cancel by dropping the future.
    pub async fn run(&self, query: &ResolutionQuery) -> Result<SuggestionSet> {
        if let Some(id) = query.release_id() {
            return self.lookup(id).await;
        }
        if !query.has_search_fields() {
            return Err(ResolverError::InvalidQuery {
                message: "query has neither a release id nor any searchable field".to_string(),
            });
        }

        let preliminary = self.search_stage().run(query).await?;
        if preliminary.is_empty() {
            tracing::info!("No candidate passed the preliminary search");
            return Ok(SuggestionSet::empty());
        }

        let refined = self.refine_stage().run(query, preliminary).await?;
        tracing::info!(suggestions = refined.len(), "Resolution finished");
        Ok(assemble(
            refined,
            Provenance::FuzzyMatch,
            &self.service_name,
            self.settings.max_suggestions,
        ))
    }

    async fn lookup(&self, id: &str) -> Result<SuggestionSet> {
        tracing::info!(id, "Resolving by release id");
        let release = self.refine_stage().detail(id, Stage::Lookup).await?;
        let candidate = Candidate::new(id, release, 1.0);
        Ok(assemble(
            vec![candidate],
            Provenance::IdentifierLookup,
            &self.service_name,
            1,
        ))
    }

    fn search_stage(&self) -> SearchStage<'_, G, S> {
        SearchStage {
            gateway: &self.gateway,
            api: &self.api,
            similarity: &self.similarity,
            min_score: self.settings.min_search_short_result,
            max_candidates: self.settings.max_pre_suggestions,
        }
    }

    fn refine_stage(&self) -> RefineStage<'_, G, S> {
        RefineStage {
            gateway: &self.gateway,
            api: &self.api,
            similarity: &self.similarity,
            min_score: self.settings.min_search_full_result,
            max_candidates: self.settings.max_suggestions,
        }
    }
}
