use chrono::{DateTime, Duration, Utc};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use crate::models::itinerary::TripParameters;
use crate::models::recommendation::{
    FormError, PlannerForm, RecommendationItem, RecommendationRequest, ALL_STATES,
};
use crate::models::session::{ItemView, ItineraryView, RecommendationsView, ToggleView};
use crate::services::itinerary_controller::ItineraryController;
use crate::services::itinerary_formatter;
use crate::services::itinerary_generation_service::ItineraryGenerator;
use crate::services::recommendation_service::{RecommendationError, RecommendationService};
use crate::services::result_filter::{available_states, ResultFilter};

pub const SERVER_ERROR_MESSAGE: &str = "Server error. Try again later.";

#[derive(Debug, PartialEq)]
pub enum SessionError {
    InvalidForm(FormError),
    ItemNotFound(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::InvalidForm(err) => write!(f, "{}", err),
            SessionError::ItemNotFound(id) => write!(f, "No recommendation with id '{}'", id),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<FormError> for SessionError {
    fn from(err: FormError) -> Self {
        SessionError::InvalidForm(err)
    }
}

#[derive(Default)]
struct SessionState {
    form: Option<PlannerForm>,
    results: Vec<RecommendationItem>,
    available_states: Vec<String>,
    error: Option<String>,
    // Bumped on every submit; stale replies are dropped.
    submission: u64,
}

/// One user's explore page: the form, the latest results and the itinerary cache.
pub struct ExploreSession {
    id: Uuid,
    created_at: DateTime<Utc>,
    last_seen: Mutex<DateTime<Utc>>,
    recommender: Arc<dyn RecommendationService>,
    itineraries: ItineraryController,
    state: Mutex<SessionState>,
}

impl ExploreSession {
    pub fn new(
        recommender: Arc<dyn RecommendationService>,
        generator: Arc<dyn ItineraryGenerator>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            last_seen: Mutex::new(now),
            recommender,
            itineraries: ItineraryController::new(generator),
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn touch(&self) {
        *self
            .last_seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Utc::now();
    }

    pub fn last_seen(&self) -> DateTime<Utc> {
        *self
            .last_seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.last_seen() > ttl
    }

    pub fn form(&self) -> Option<PlannerForm> {
        self.state().form.clone()
    }

    /// Runs a recommendation query for the given form.
    ///
    /// Service-reported errors are kept verbatim; transport failures become a
    /// generic message. Either way they end up in the view, not in the `Err`
    /// branch, which is reserved for invalid input.
    pub async fn submit(&self, form: PlannerForm) -> Result<RecommendationsView, SessionError> {
        form.validate()?;
        let request = RecommendationRequest::from(&form);

        let submission = {
            let mut state = self.state();
            state.submission += 1;
            state.form = Some(form);
            state.results.clear();
            state.available_states.clear();
            state.error = None;
            state.submission
        };

        let reply = self.recommender.recommend(&request).await;

        {
            let mut state = self.state();
            if state.submission != submission {
                log::debug!("Dropping stale recommendation reply for session {}", self.id);
            } else {
                match reply {
                    Ok(items) => {
                        log::info!("Session {} received {} recommendations", self.id, items.len());
                        state.available_states = available_states(&items);
                        state.results = items;
                    }
                    Err(RecommendationError::ServiceError(msg)) => {
                        log::warn!("Recommendation service reported: {}", msg);
                        state.error = Some(msg);
                    }
                    Err(err) => {
                        log::error!("Failed to fetch recommendations: {}", err);
                        state.error = Some(SERVER_ERROR_MESSAGE.to_string());
                    }
                }
            }
        }

        Ok(self.view(None))
    }

    /// Filtered results. Without an explicit filter the state is "all" and the
    /// type is the one chosen on the form.
    pub fn view(&self, filter: Option<ResultFilter>) -> RecommendationsView {
        let state = self.state();
        let filter = filter.unwrap_or_else(|| {
            let kind = state
                .form
                .as_ref()
                .map(|form| form.type_filter())
                .unwrap_or("");
            ResultFilter::new(ALL_STATES, kind)
        });

        let results: Vec<ItemView> = filter
            .apply(&state.results)
            .into_iter()
            .map(|item| {
                let item_id = item.item_id();
                let itinerary_panel =
                    ItineraryView::from_entry(self.itineraries.entry(&item_id).as_ref());
                ItemView {
                    item_id,
                    item: item.clone(),
                    itinerary_panel,
                }
            })
            .collect();

        RecommendationsView {
            session_id: self.id,
            filter,
            available_states: state.available_states.clone(),
            error: state.error.clone(),
            total: state.results.len(),
            results,
        }
    }

    /// Shows or hides the itinerary of one item, fetching it on first use.
    pub async fn toggle_itinerary(&self, item_id: &str) -> Result<ToggleView, SessionError> {
        let (item, trip) = {
            let state = self.state();
            // Ids derived from titles may collide; the first match wins.
            let item = state
                .results
                .iter()
                .find(|item| item.item_id() == item_id)
                .cloned();
            match (item, state.form.as_ref()) {
                (Some(item), Some(form)) => (item, TripParameters::from(form)),
                _ => return Err(SessionError::ItemNotFound(item_id.to_string())),
            }
        };

        let result = self.itineraries.toggle(&item, &trip).await;

        let blocks = match (&result.entry.raw_text, result.entry.visible) {
            (Some(text), true) => Some(itinerary_formatter::format(text)),
            _ => None,
        };

        Ok(ToggleView {
            item_id: result.item_id,
            outcome: result.outcome,
            itinerary_panel: ItineraryView::from_entry(Some(&result.entry)),
            blocks,
        })
    }
}
