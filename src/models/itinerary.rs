use serde::{Deserialize, Serialize};

use crate::models::recommendation::{PlannerForm, RecommendationItem, TravelGroup};

/// Trip parameters sent along with every itinerary request, taken from the
/// current form.
#[derive(Debug, Clone, PartialEq)]
pub struct TripParameters {
    pub duration: u8,
    pub mood: String,
    pub group: TravelGroup,
}

impl From<&PlannerForm> for TripParameters {
    fn from(form: &PlannerForm) -> Self {
        Self {
            duration: form.duration,
            mood: form.mood.trim().to_string(),
            group: form.group,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ItineraryRequest {
    pub places: Vec<String>,
    pub duration: u8,
    pub mood: String,
    pub group: String,
}

impl ItineraryRequest {
    pub fn for_item(item: &RecommendationItem, trip: &TripParameters) -> Self {
        Self {
            places: vec![item.title.clone()],
            duration: trip.duration,
            mood: trip.mood.clone(),
            group: trip.group.as_str().to_string(),
        }
    }
}

/// Generation service reply. A reply without a usable `itinerary` is a failure.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ItineraryResponse {
    #[serde(default)]
    pub itinerary: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ItineraryResponse {
    pub fn into_text(self) -> Option<String> {
        self.itinerary.filter(|text| !text.trim().is_empty())
    }
}

/// Per-item itinerary state, keyed by item id inside the controller.
#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct ItineraryCacheEntry {
    pub visible: bool,
    pub raw_text: Option<String>,
    pub is_loading: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CacheEvent {
    FetchStarted,
    FetchSucceeded(String),
    FetchFailed,
    VisibilityToggled,
}

impl ItineraryCacheEntry {
    /// Pure transition: old entry + event -> new entry.
    ///
    /// Fetched text is never replaced once present.
    pub fn apply(self, event: CacheEvent) -> Self {
        match event {
            CacheEvent::FetchStarted => Self {
                is_loading: true,
                ..self
            },
            CacheEvent::FetchSucceeded(text) => Self {
                visible: true,
                raw_text: self.raw_text.or(Some(text)),
                is_loading: false,
            },
            CacheEvent::FetchFailed => Self {
                is_loading: false,
                ..self
            },
            CacheEvent::VisibilityToggled => Self {
                visible: !self.visible,
                ..self
            },
        }
    }

    pub fn has_text(&self) -> bool {
        self.raw_text.is_some()
    }
}
