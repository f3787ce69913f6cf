use crate::core::gateway::GatewaySettings;
use crate::core::rate::RateSettings;
use crate::core::resolver::ResolverSettings;
use crate::utils::error::{ResolverError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_ordering, validate_positive_number, validate_range,
    validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolverConfig {
    pub service: Option<ServiceConfig>,
    pub catalog: Option<CatalogConfig>,
    pub rate: Option<RateConfig>,
    pub resolver: Option<ThresholdConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub name: Option<String>,
    pub production: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub base_url: Option<String>,
    pub user_agent: Option<String>,
    pub personal_token: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub rate_header: Option<String>,
    pub observe_quota: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RateConfig {
    pub default_interval_ms: Option<u64>,
    pub floor_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThresholdConfig {
    pub min_search_short_result: Option<f64>,
    pub min_search_full_result: Option<f64>,
    pub max_pre_suggestions: Option<usize>,
    pub max_suggestions: Option<usize>,
}

impl ResolverConfig {
    /// Loads the configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ResolverError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ResolverError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` tokens (e.g. `${DISCOGS_TOKEN}`) with environment values.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ResolverError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn service_name(&self) -> &str {
        self.service
            .as_ref()
            .and_then(|s| s.name.as_deref())
            .unwrap_or("discogs")
    }

    pub fn is_production(&self) -> bool {
        self.service
            .as_ref()
            .and_then(|s| s.production)
            .unwrap_or(false)
    }

    pub fn gateway_settings(&self) -> GatewaySettings {
        let defaults = GatewaySettings::default();
        let catalog = self.catalog.clone().unwrap_or_default();
        GatewaySettings {
            base_url: catalog.base_url.unwrap_or(defaults.base_url),
            user_agent: catalog.user_agent.unwrap_or(defaults.user_agent),
            // An unresolved ${VAR} means no token was provided.
            personal_token: catalog
                .personal_token
                .filter(|t| !t.trim().is_empty() && !t.starts_with("${")),
            timeout: catalog
                .timeout_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            rate_header: catalog.rate_header.unwrap_or(defaults.rate_header),
            observe_quota: catalog.observe_quota.unwrap_or(defaults.observe_quota),
        }
    }

    pub fn rate_settings(&self) -> RateSettings {
        let defaults = RateSettings::default();
        let rate = self.rate.clone().unwrap_or_default();
        RateSettings {
            default_interval: rate
                .default_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.default_interval),
            floor: rate
                .floor_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.floor),
        }
    }

    pub fn resolver_settings(&self) -> ResolverSettings {
        let defaults = ResolverSettings::default();
        let thresholds = self.resolver.clone().unwrap_or_default();
        ResolverSettings {
            min_search_short_result: thresholds
                .min_search_short_result
                .unwrap_or(defaults.min_search_short_result),
            min_search_full_result: thresholds
                .min_search_full_result
                .unwrap_or(defaults.min_search_full_result),
            max_pre_suggestions: thresholds
                .max_pre_suggestions
                .unwrap_or(defaults.max_pre_suggestions),
            max_suggestions: thresholds.max_suggestions.unwrap_or(defaults.max_suggestions),
        }
    }

    pub fn validate_config(&self) -> Result<()> {
        let gateway = self.gateway_settings();
        validate_url("catalog.base_url", &gateway.base_url)?;
        validate_non_empty_string("catalog.user_agent", &gateway.user_agent)?;
        validate_non_empty_string("catalog.rate_header", &gateway.rate_header)?;
        validate_positive_number("catalog.timeout_seconds", gateway.timeout.as_secs(), 1)?;

        let rate = self.rate_settings();
        validate_positive_number("rate.floor_ms", rate.floor.as_millis() as u64, 1)?;
        validate_ordering(
            "rate.default_interval_ms",
            rate.floor.as_millis() as u64,
            rate.default_interval.as_millis() as u64,
            "Default interval must not be below rate.floor_ms",
        )?;

        let resolver = self.resolver_settings();
        validate_range(
            "resolver.min_search_short_result",
            resolver.min_search_short_result,
            0.0,
            1.0,
        )?;
        validate_range(
            "resolver.min_search_full_result",
            resolver.min_search_full_result,
            0.0,
            1.0,
        )?;
        validate_ordering(
            "resolver.min_search_short_result",
            resolver.min_search_short_result,
            resolver.min_search_full_result,
            "Search threshold must not exceed the refinement threshold",
        )?;
        validate_positive_number(
            "resolver.max_pre_suggestions",
            resolver.max_pre_suggestions as u64,
            1,
        )?;
        validate_positive_number("resolver.max_suggestions", resolver.max_suggestions as u64, 1)?;
        validate_ordering(
            "resolver.max_suggestions",
            resolver.max_suggestions,
            resolver.max_pre_suggestions,
            "Cannot keep more suggestions than preliminary candidates",
        )?;

        Ok(())
    }
}

impl Validate for ResolverConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
