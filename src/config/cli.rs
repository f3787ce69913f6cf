use crate::domain::model::ResolutionQuery;
use crate::domain::request::SearchRequest;
use crate::utils::error::{ResolverError, Result};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "release-resolver")]
#[command(about = "Resolve partial release metadata into ranked catalog matches")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Exact catalog release id; skips the fuzzy search
    #[arg(long)]
    pub release_id: Option<String>,

    #[arg(long)]
    pub title: Option<String>,

    /// Performer name, repeatable
    #[arg(long = "artist")]
    pub artists: Vec<String>,

    #[arg(long)]
    pub year: Option<i32>,

    #[arg(long)]
    pub label: Option<String>,

    #[arg(long)]
    pub catno: Option<String>,

    /// JSON search request file ({"release_id": ..} or {"release": {..}})
    #[arg(long)]
    pub request: Option<String>,

    /// Give up on the resolution after this many seconds
    #[arg(long, default_value = "120")]
    pub timeout_seconds: u64,

    /// Do not probe the catalog quota; stay on the default interval
    #[arg(long)]
    pub skip_probe: bool,

    /// Print service information and exit
    #[arg(long)]
    pub info: bool,
}

impl CliConfig {
    /// Query from the request file if given, otherwise from the field flags.
    pub fn query(&self) -> Result<ResolutionQuery> {
        if let Some(path) = &self.request {
            let data = std::fs::read(path)?;
            return SearchRequest::from_json(&data)?.into_query();
        }

        if let Some(id) = &self.release_id {
            return Ok(ResolutionQuery::by_release_id(id.clone()));
        }

        let mut query = ResolutionQuery::new();
        if let Some(title) = &self.title {
            query = query.with_title(title.clone());
        }
        for artist in &self.artists {
            query = query.with_performer(artist.clone());
        }
        if let Some(year) = self.year {
            query = query.with_year(year);
        }
        if let Some(label) = &self.label {
            query = query.with_label(label.clone());
        }
        if let Some(catno) = &self.catno {
            query = query.with_catno(catno.clone());
        }

        if !query.has_search_fields() {
            return Err(ResolverError::InvalidQuery {
                message: "pass --release-id, --request or at least one metadata flag".to_string(),
            });
        }
        Ok(query)
    }
}
