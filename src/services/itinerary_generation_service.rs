use async_trait::async_trait;
use reqwest::Client;
use std::error::Error;
use std::fmt;
use std::time::Duration;
use url::Url;

use crate::models::itinerary::{ItineraryRequest, ItineraryResponse};

#[derive(Debug)]
pub enum ItineraryGenerationError {
    HttpError(reqwest::Error),
    /// The service answered but without a usable itinerary.
    MissingItinerary(Option<String>),
}

impl fmt::Display for ItineraryGenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItineraryGenerationError::HttpError(err) => write!(f, "HTTP error: {}", err),
            ItineraryGenerationError::MissingItinerary(Some(reason)) => {
                write!(f, "No itinerary returned: {}", reason)
            }
            ItineraryGenerationError::MissingItinerary(None) => {
                write!(f, "No itinerary returned")
            }
        }
    }
}

impl Error for ItineraryGenerationError {}

impl From<reqwest::Error> for ItineraryGenerationError {
    fn from(err: reqwest::Error) -> Self {
        ItineraryGenerationError::HttpError(err)
    }
}

/// Boundary to the itinerary generation service.
#[async_trait]
pub trait ItineraryGenerator: Send + Sync {
    async fn generate(&self, request: &ItineraryRequest)
        -> Result<String, ItineraryGenerationError>;
}

#[derive(Clone)]
pub struct HttpItineraryGenerator {
    client: Client,
    endpoint: Url,
}

impl HttpItineraryGenerator {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl ItineraryGenerator for HttpItineraryGenerator {
    async fn generate(
        &self,
        request: &ItineraryRequest,
    ) -> Result<String, ItineraryGenerationError> {
        log::debug!(
            "Requesting {}-day itinerary for {:?}",
            request.duration,
            request.places
        );

        // Error replies still carry a JSON body, so the status is not checked here.
        let response: ItineraryResponse = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?
            .json()
            .await?;

        let reason = response.error.clone();
        response
            .into_text()
            .ok_or(ItineraryGenerationError::MissingItinerary(reason))
    }
}
