use std::fmt;
use thiserror::Error;

/// Pipeline stage a fetch failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Probe,
    Search,
    Refine,
    Lookup,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Probe => "quota probe",
            Stage::Search => "candidate search",
            Stage::Refine => "refinement",
            Stage::Lookup => "identifier lookup",
        };
        f.write_str(name)
    }
}

/// Failure surfaced by the catalog gateway. Never retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("transport failure for {locator}: {cause}")]
    Transport { locator: String, cause: String },

    // Payload length only, the body itself can be arbitrarily large.
    #[error("could not decode {payload_len} byte payload from {locator}: {cause}")]
    Decode {
        locator: String,
        payload_len: usize,
        cause: String,
    },
}

impl FetchError {
    pub fn transport(locator: impl Into<String>, cause: impl fmt::Display) -> Self {
        FetchError::Transport {
            locator: locator.into(),
            cause: cause.to_string(),
        }
    }

    pub fn decode(locator: impl Into<String>, payload_len: usize, cause: impl fmt::Display) -> Self {
        FetchError::Decode {
            locator: locator.into(),
            payload_len,
            cause: cause.to_string(),
        }
    }

    pub fn locator(&self) -> &str {
        match self {
            FetchError::Transport { locator, .. } | FetchError::Decode { locator, .. } => locator,
        }
    }
}

#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("{stage} failed: {source}")]
    Fetch {
        stage: Stage,
        #[source]
        source: FetchError,
    },

    #[error("Rate quota probe failed: {reason}")]
    RateProbeFailure { reason: String },

    #[error("Resolution deadline exceeded after {after_ms}ms")]
    DeadlineExceeded { after_ms: u128 },

    #[error("Invalid query: {message}")]
    InvalidQuery { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },
}

/// Error taxonomy exposed to callers of `resolve`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Decode,
    RateProbe,
    Deadline,
    Query,
    Config,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ResolverError {
    pub fn fetch(stage: Stage, source: FetchError) -> Self {
        ResolverError::Fetch { stage, source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolverError::Fetch {
                source: FetchError::Transport { .. },
                ..
            } => ErrorKind::Transport,
            ResolverError::Fetch {
                source: FetchError::Decode { .. },
                ..
            } => ErrorKind::Decode,
            ResolverError::RateProbeFailure { .. } => ErrorKind::RateProbe,
            ResolverError::DeadlineExceeded { .. } => ErrorKind::Deadline,
            ResolverError::InvalidQuery { .. } => ErrorKind::Query,
            ResolverError::ConfigError { .. }
            | ResolverError::InvalidConfigValueError { .. }
            | ResolverError::MissingConfigError { .. } => ErrorKind::Config,
            ResolverError::IoError(_) | ResolverError::SerializationError(_) => ErrorKind::System,
        }
    }

    pub fn stage(&self) -> Option<Stage> {
        match self {
            ResolverError::Fetch { stage, .. } => Some(*stage),
            ResolverError::RateProbeFailure { .. } => Some(Stage::Probe),
            _ => None,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.kind() {
            ErrorKind::RateProbe => ErrorSeverity::Low,
            ErrorKind::Transport | ErrorKind::Deadline => ErrorSeverity::Medium,
            ErrorKind::Decode | ErrorKind::Query | ErrorKind::Config => ErrorSeverity::High,
            ErrorKind::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Transport => "Check network access to the catalog service and retry later",
            ErrorKind::Decode => "The catalog returned an unexpected payload; check the base_url setting",
            ErrorKind::RateProbe => "Requests continue at the conservative default pace",
            ErrorKind::Deadline => "Raise the deadline or narrow the query",
            ErrorKind::Query => "Provide a release id or at least one of title, artist, label, catno, year",
            ErrorKind::Config => "Fix the configuration file and run again",
            ErrorKind::System => "Check file permissions and available resources",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ResolverError::Fetch { stage, source } => match source {
                FetchError::Transport { locator, .. } => {
                    format!("Catalog request failed during {} ({})", stage, locator)
                }
                FetchError::Decode { locator, .. } => {
                    format!("Catalog answer unreadable during {} ({})", stage, locator)
                }
            },
            ResolverError::DeadlineExceeded { after_ms } => {
                format!("Gave up after {}ms without a result", after_ms)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ResolverError>;
