use crate::adapters::discogs::{DiscogsApi, SearchResponse};
use crate::core::ranking::{above_threshold, best_n};
use crate::domain::model::{Candidate, ResolutionQuery};
use crate::domain::ports::{CatalogGateway, Similarity};
use crate::utils::error::{ResolverError, Result, Stage};

/// Broad search: one catalog query, coarse scoring on summary data, top-K.
pub struct SearchStage<'a, G: ?Sized, S: ?Sized> {
    pub gateway: &'a G,
    pub api: &'a DiscogsApi,
    pub similarity: &'a S,
    pub min_score: f64,
    pub max_candidates: usize,
}

impl<'a, G, S> SearchStage<'a, G, S>
where
    G: CatalogGateway + ?Sized,
    S: Similarity + ?Sized,
{
    pub async fn run(&self, query: &ResolutionQuery) -> Result<Vec<Candidate>> {
        let locator = self.api.search_locator(query);
        let response: SearchResponse = self
            .gateway
            .fetch(&locator)
            .await
            .and_then(|payload| payload.decode())
            .map_err(|e| ResolverError::fetch(Stage::Search, e))?;

        let found = response.releases();
        let discovered = found.len();

        // Everything is scored before pruning.
        let scored: Vec<Candidate> = found
            .into_iter()
            .filter_map(|release| {
                let id = release.id.clone()?;
                let score = self.similarity.compare(query, &release);
                Some(Candidate::new(id, release, score))
            })
            .collect();

        let candidates = best_n(above_threshold(scored, self.min_score), self.max_candidates);
        tracing::debug!(
            discovered,
            results = candidates.len(),
            "Preliminary search"
        );
        Ok(candidates)
    }
}
