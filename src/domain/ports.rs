use crate::domain::model::{ReleaseMetadata, ResolutionQuery};
use crate::utils::error::FetchError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// Raw body returned by the catalog for one locator.
#[derive(Debug, Clone)]
pub struct Payload {
    pub locator: String,
    pub body: Vec<u8>,
}

impl Payload {
    pub fn new(locator: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            locator: locator.into(),
            body: body.into(),
        }
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, FetchError> {
        serde_json::from_slice(&self.body)
            .map_err(|e| FetchError::decode(self.locator.clone(), self.body.len(), e))
    }
}

/// Paced access to the remote catalog. Implementations must pass every
/// request through the shared rate controller before sending it.
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    async fn fetch(&self, locator: &str) -> Result<Payload, FetchError>;
}

/// Scores how well a candidate's metadata matches the query, in [0, 1].
pub trait Similarity: Send + Sync {
    fn compare(&self, query: &ResolutionQuery, candidate: &ReleaseMetadata) -> f64;
}

impl<F> Similarity for F
where
    F: Fn(&ResolutionQuery, &ReleaseMetadata) -> f64 + Send + Sync,
{
    fn compare(&self, query: &ResolutionQuery, candidate: &ReleaseMetadata) -> f64 {
        self(query, candidate)
    }
}

#[async_trait]
impl<T: CatalogGateway + ?Sized> CatalogGateway for std::sync::Arc<T> {
    async fn fetch(&self, locator: &str) -> Result<Payload, FetchError> {
        (**self).fetch(locator).await
    }
}
