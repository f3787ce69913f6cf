pub mod assembler;
pub mod gateway;
pub mod ranking;
pub mod rate;
pub mod refine;
pub mod resolver;
pub mod search;
pub mod service;
pub mod similarity;

pub use crate::domain::model::{Candidate, ResolutionQuery, SuggestionSet};
pub use crate::domain::ports::{CatalogGateway, Payload, Similarity};
pub use crate::utils::error::Result;
