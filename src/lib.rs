pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use config::toml_config::ResolverConfig;
pub use core::{
    gateway::{GatewaySettings, HttpGateway},
    rate::{Calibration, RateController, RateSettings},
    resolver::{Resolver, ResolverSettings},
    service::{ResolverService, ServiceInfo},
    similarity::FieldSimilarity,
};
pub use domain::model::{Candidate, Provenance, ResolutionQuery, Suggestion, SuggestionSet};
pub use utils::error::{ResolverError, Result};
