use crate::adapters::discogs::{DiscogsApi, MasterInfo, ReleaseInfo};
use crate::core::ranking::{above_threshold, best_n};
use crate::domain::model::{Candidate, ReleaseMetadata, ResolutionQuery};
use crate::domain::ports::{CatalogGateway, Similarity};
use crate::utils::error::{ResolverError, Result, Stage};

/// Detail pass: full record per candidate, fine scoring, top-N.
pub struct RefineStage<'a, G: ?Sized, S: ?Sized> {
    pub gateway: &'a G,
    pub api: &'a DiscogsApi,
    pub similarity: &'a S,
    pub min_score: f64,
    pub max_candidates: usize,
}

impl<'a, G, S> RefineStage<'a, G, S>
where
    G: CatalogGateway + ?Sized,
    S: Similarity + ?Sized,
{
    /// Any failed detail fetch aborts the whole refinement.
    pub async fn run(
        &self,
        query: &ResolutionQuery,
        candidates: Vec<Candidate>,
    ) -> Result<Vec<Candidate>> {
        let mut refined = Vec::with_capacity(candidates.len());
        for mut candidate in candidates {
            let detail = self.detail(&candidate.id, Stage::Refine).await?;
            let score = self.similarity.compare(query, &detail);
            tracing::debug!(
                id = %candidate.id,
                coarse = candidate.score(),
                fine = score,
                "Candidate refined"
            );
            candidate.metadata = detail;
            candidate.rescore(score);
            refined.push(candidate);
        }

        let suggestions = best_n(above_threshold(refined, self.min_score), self.max_candidates);
        tracing::debug!(results = suggestions.len(), "Suggestions");
        Ok(suggestions)
    }

    /// Full release record, merged with its master record when one is linked.
    pub async fn detail(&self, id: &str, stage: Stage) -> Result<ReleaseMetadata> {
        let locator = self.api.release_locator(id);
        let info: ReleaseInfo = self
            .gateway
            .fetch(&locator)
            .await
            .and_then(|payload| payload.decode())
            .map_err(|e| ResolverError::fetch(stage, e))?;

        let mut release = info.into_metadata();
        if let Some(master_locator) = release.master_locator.clone() {
            let master: MasterInfo = self
                .gateway
                .fetch(&master_locator)
                .await
                .and_then(|payload| payload.decode())
                .map_err(|e| ResolverError::fetch(stage, e))?;
            master.merge_into(&mut release);
        }
        Ok(release)
    }
}
