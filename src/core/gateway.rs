use crate::core::rate::RateController;
use crate::domain::ports::{CatalogGateway, Payload};
use crate::utils::error::{FetchError, ResolverError, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub base_url: String,
    pub user_agent: String,
    pub personal_token: Option<String>,
    pub timeout: Duration,
    pub rate_header: String,
    /// Recalibrate whenever a response carries the quota header.
    pub observe_quota: bool,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.discogs.com/".to_string(),
            user_agent: concat!("release-resolver/", env!("CARGO_PKG_VERSION")).to_string(),
            personal_token: None,
            timeout: Duration::from_secs(30),
            rate_header: "X-Discogs-Ratelimit".to_string(),
            observe_quota: true,
        }
    }
}

/// HTTP access to the catalog. Holds no per-request state, so one instance
/// is shared by every concurrent resolution.
pub struct HttpGateway {
    client: Client,
    rate: Arc<RateController>,
    settings: GatewaySettings,
}

impl HttpGateway {
    pub fn new(settings: GatewaySettings, rate: Arc<RateController>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &settings.personal_token {
            let value = HeaderValue::from_str(&format!("Discogs token={}", token)).map_err(|e| {
                ResolverError::InvalidConfigValueError {
                    field: "catalog.personal_token".to_string(),
                    value: "<redacted>".to_string(),
                    reason: e.to_string(),
                }
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .default_headers(headers)
            .timeout(settings.timeout)
            .build()
            .map_err(|e| ResolverError::ConfigError {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            rate,
            settings,
        })
    }

    pub fn settings(&self) -> &GatewaySettings {
        &self.settings
    }

    pub fn rate(&self) -> &Arc<RateController> {
        &self.rate
    }

    /// Issues one paced request against the base URL and reads the quota header.
    pub async fn probe_quota(&self) -> Result<u32> {
        let locator = self.settings.base_url.as_str();
        self.rate.acquire().await;

        tracing::debug!("Probing request quota at {}", locator);
        let response = self
            .client
            .get(locator)
            .send()
            .await
            .map_err(|e| ResolverError::RateProbeFailure {
                reason: format!("request to {} failed: {}", locator, e),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolverError::RateProbeFailure {
                reason: format!("unexpected status {} from {}", status, locator),
            });
        }

        read_quota(response.headers(), &self.settings.rate_header)
            .map_err(|reason| ResolverError::RateProbeFailure { reason })
    }

    fn observe_quota(&self, headers: &HeaderMap) {
        if !self.settings.observe_quota {
            return;
        }
        // Responses without the header say nothing about the quota.
        if let Ok(quota) = read_quota(headers, &self.settings.rate_header) {
            self.rate.calibrate(Some(quota));
        }
    }
}

#[async_trait::async_trait]
impl CatalogGateway for HttpGateway {
    async fn fetch(&self, locator: &str) -> std::result::Result<Payload, FetchError> {
        self.rate.acquire().await;

        tracing::debug!("Fetching {}", locator);
        let response = self
            .client
            .get(locator)
            .send()
            .await
            .map_err(|e| FetchError::transport(locator, e))?;

        let status = response.status();
        tracing::debug!("Catalog response status: {}", status);
        if !status.is_success() {
            return Err(FetchError::transport(
                locator,
                format!("unexpected status {}", status),
            ));
        }

        self.observe_quota(response.headers());

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::transport(locator, e))?;
        Ok(Payload::new(locator, body.to_vec()))
    }
}

fn read_quota(headers: &HeaderMap, name: &str) -> std::result::Result<u32, String> {
    let value = headers
        .get(name)
        .ok_or_else(|| format!("header '{}' does not exist", name))?;
    let text = value
        .to_str()
        .map_err(|e| format!("header '{}' is not text: {}", name, e))?;
    let quota: u32 = text
        .trim()
        .parse()
        .map_err(|e| format!("header '{}' value '{}' is not a number: {}", name, text, e))?;
    if quota == 0 {
        return Err(format!("header '{}' reports a zero quota", name));
    }
    Ok(quota)
}
