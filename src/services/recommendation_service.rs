use async_trait::async_trait;
use reqwest::Client;
use std::error::Error;
use std::fmt;
use std::time::Duration;
use url::Url;

use crate::models::recommendation::{
    RecommendationItem, RecommendationRequest, RecommendationResponse,
};

#[derive(Debug)]
pub enum RecommendationError {
    HttpError(reqwest::Error),
    /// Logical error reported by the service in its `error` field.
    ServiceError(String),
}

impl fmt::Display for RecommendationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecommendationError::HttpError(err) => write!(f, "HTTP error: {}", err),
            RecommendationError::ServiceError(msg) => write!(f, "Service error: {}", msg),
        }
    }
}

impl Error for RecommendationError {}

impl From<reqwest::Error> for RecommendationError {
    fn from(err: reqwest::Error) -> Self {
        RecommendationError::HttpError(err)
    }
}

/// Boundary to the recommendation query service.
#[async_trait]
pub trait RecommendationService: Send + Sync {
    async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Vec<RecommendationItem>, RecommendationError>;
}

#[derive(Clone)]
pub struct HttpRecommendationService {
    client: Client,
    endpoint: Url,
}

impl HttpRecommendationService {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl RecommendationService for HttpRecommendationService {
    async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Vec<RecommendationItem>, RecommendationError> {
        log::debug!(
            "Requesting recommendations for mood '{}' ({}, budget {})",
            request.mood,
            request.group,
            request.budget
        );

        let response: RecommendationResponse = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?
            .json()
            .await?;

        match response {
            RecommendationResponse::Items(items) => Ok(items),
            RecommendationResponse::Failure { error } => {
                Err(RecommendationError::ServiceError(error))
            }
        }
    }
}
