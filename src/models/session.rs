use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::itinerary::ItineraryCacheEntry;
use crate::models::recommendation::RecommendationItem;
use crate::services::itinerary_controller::ToggleOutcome;
use crate::services::itinerary_formatter::{self, FormattedBlock};
use crate::services::result_filter::ResultFilter;

#[derive(Debug, Serialize, Clone)]
pub struct SessionCreated {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// What the rendering layer needs to show one itinerary panel.
#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct ItineraryView {
    pub visible: bool,
    pub is_loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

impl ItineraryView {
    /// Markup is only rendered for visible, fetched itineraries.
    pub fn from_entry(entry: Option<&ItineraryCacheEntry>) -> Self {
        let Some(entry) = entry else {
            return Self::default();
        };
        let html = match (&entry.raw_text, entry.visible) {
            (Some(text), true) => Some(itinerary_formatter::format_html(text)),
            _ => None,
        };
        Self {
            visible: entry.visible,
            is_loading: entry.is_loading,
            html,
        }
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct ItemView {
    pub item_id: String,
    #[serde(flatten)]
    pub item: RecommendationItem,
    pub itinerary_panel: ItineraryView,
}

#[derive(Debug, Serialize, Clone)]
pub struct RecommendationsView {
    pub session_id: Uuid,
    pub filter: ResultFilter,
    pub available_states: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub total: usize,
    pub results: Vec<ItemView>,
}

#[derive(Debug, Serialize, Clone)]
pub struct ToggleView {
    pub item_id: String,
    pub outcome: ToggleOutcome,
    pub itinerary_panel: ItineraryView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocks: Option<Vec<FormattedBlock>>,
}
