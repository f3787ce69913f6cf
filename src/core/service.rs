use crate::adapters::discogs::DiscogsApi;
use crate::config::toml_config::ResolverConfig;
use crate::core::gateway::HttpGateway;
use crate::core::rate::{Calibration, RateController};
use crate::core::resolver::Resolver;
use crate::core::similarity::FieldSimilarity;
use crate::domain::model::{ResolutionQuery, SuggestionSet};
use crate::domain::request::SearchRequest;
use crate::utils::error::Result;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

pub const SERVICE_SUBSYSTEM: &str = "audio";
pub const SERVICE_DESCRIPTION: &str = "Discogs client";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceInfo {
    pub subsystem: String,
    pub name: String,
    pub description: String,
    pub version: String,
}

/// Owns the shared rate controller and everything that fetches through it.
pub struct ResolverService {
    rate: Arc<RateController>,
    resolver: Resolver<HttpGateway, FieldSimilarity>,
}

impl ResolverService {
    pub fn from_config(config: &ResolverConfig) -> Result<Self> {
        let rate = Arc::new(RateController::new(config.rate_settings()));
        let gateway_settings = config.gateway_settings();
        let api = DiscogsApi::new(&gateway_settings.base_url)?;
        let gateway = HttpGateway::new(gateway_settings, Arc::clone(&rate))?;
        let resolver = Resolver::new(gateway, FieldSimilarity, api, config.resolver_settings())
            .with_service_name(config.service_name());

        Ok(Self {
            rate,
            resolver,
        })
    }

    pub fn rate(&self) -> &Arc<RateController> {
        &self.rate
    }

    /// Probes the catalog for its quota. A failed probe is logged and the
    /// controller keeps its current interval.
    pub async fn calibrate(&self) -> Calibration {
        match self.resolver.gateway().probe_quota().await {
            Ok(quota) => self.rate.calibrate(Some(quota)),
            Err(e) => {
                tracing::info!(reason = %e, "Quota probe failed");
                self.rate.calibrate(None)
            }
        }
    }

    pub async fn resolve(&self, query: &ResolutionQuery, deadline: Duration) -> Result<SuggestionSet> {
        self.resolver.resolve(query, deadline).await
    }

    pub async fn handle(&self, request: SearchRequest, deadline: Duration) -> Result<SuggestionSet> {
        let query = request.into_query()?;
        self.resolve(&query, deadline).await
    }

    pub fn info(&self) -> ServiceInfo {
        ServiceInfo {
            subsystem: SERVICE_SUBSYSTEM.to_string(),
            name: self.resolver.service_name().to_string(),
            description: SERVICE_DESCRIPTION.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
