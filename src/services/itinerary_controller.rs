use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::models::itinerary::{CacheEvent, ItineraryCacheEntry, ItineraryRequest, TripParameters};
use crate::models::recommendation::RecommendationItem;
use crate::services::itinerary_generation_service::ItineraryGenerator;

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ToggleOutcome {
    /// Cached itinerary made visible again.
    Shown,
    /// Cached itinerary hidden.
    Hidden,
    /// First successful fetch; now visible.
    Fetched,
    /// Fetch failed; nothing cached, the user may retry.
    FetchFailed,
    /// A fetch for this item is already outstanding; nothing was done.
    InFlight,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToggleResult {
    pub item_id: String,
    pub outcome: ToggleOutcome,
    pub entry: ItineraryCacheEntry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ToggleAction {
    Flip,
    Fetch,
    Wait,
}

fn plan(entry: &ItineraryCacheEntry) -> ToggleAction {
    if entry.has_text() {
        ToggleAction::Flip
    } else if entry.is_loading {
        ToggleAction::Wait
    } else {
        ToggleAction::Fetch
    }
}

/// Clears the loading flag if a fetch is abandoned before it records a result,
/// e.g. when the client disconnects and actix drops the handler future.
struct PendingFetch<'a> {
    controller: &'a ItineraryController,
    item_id: &'a str,
    armed: bool,
}

impl PendingFetch<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingFetch<'_> {
    fn drop(&mut self) {
        if self.armed {
            log::warn!("Itinerary fetch for '{}' was abandoned", self.item_id);
            self.controller.transition(self.item_id, CacheEvent::FetchFailed);
        }
    }
}

/// Per-item itinerary cache.
///
/// Each item id is fetched at most once per controller, and only one fetch
/// per id can be outstanding at a time. Different ids fetch independently.
pub struct ItineraryController {
    generator: Arc<dyn ItineraryGenerator>,
    entries: Mutex<HashMap<String, ItineraryCacheEntry>>,
}

impl ItineraryController {
    pub fn new(generator: Arc<dyn ItineraryGenerator>) -> Self {
        Self {
            generator,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, ItineraryCacheEntry>> {
        // Entries are replaced whole, so a poisoned map is still consistent.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn transition(&self, item_id: &str, event: CacheEvent) -> ItineraryCacheEntry {
        let mut entries = self.lock();
        let entry = entries.entry(item_id.to_string()).or_default();
        *entry = std::mem::take(entry).apply(event);
        entry.clone()
    }

    pub async fn toggle(&self, item: &RecommendationItem, trip: &TripParameters) -> ToggleResult {
        let item_id = item.item_id();

        // Check and mark loading under a single lock so two toggles can't both fetch.
        let action = {
            let mut entries = self.lock();
            let entry = entries.entry(item_id.clone()).or_default();
            let action = plan(entry);
            match action {
                ToggleAction::Flip => {
                    *entry = std::mem::take(entry).apply(CacheEvent::VisibilityToggled)
                }
                ToggleAction::Fetch => {
                    *entry = std::mem::take(entry).apply(CacheEvent::FetchStarted)
                }
                ToggleAction::Wait => {}
            }
            if action != ToggleAction::Fetch {
                let outcome = match action {
                    ToggleAction::Wait => ToggleOutcome::InFlight,
                    _ if entry.visible => ToggleOutcome::Shown,
                    _ => ToggleOutcome::Hidden,
                };
                return ToggleResult {
                    item_id,
                    outcome,
                    entry: entry.clone(),
                };
            }
            action
        };
        debug_assert_eq!(action, ToggleAction::Fetch);

        let pending = PendingFetch {
            controller: self,
            item_id: &item_id,
            armed: true,
        };
        let request = ItineraryRequest::for_item(item, trip);
        log::info!("Fetching itinerary for '{}'", item_id);

        let (event, outcome) = match self.generator.generate(&request).await {
            Ok(text) => (CacheEvent::FetchSucceeded(text), ToggleOutcome::Fetched),
            Err(err) => {
                log::warn!("Itinerary fetch for '{}' failed: {}", item_id, err);
                (CacheEvent::FetchFailed, ToggleOutcome::FetchFailed)
            }
        };

        let entry = self.transition(&item_id, event);
        pending.disarm();
        ToggleResult {
            item_id,
            outcome,
            entry,
        }
    }

    pub fn entry(&self, item_id: &str) -> Option<ItineraryCacheEntry> {
        self.lock().get(item_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::recommendation::TravelGroup;
    use crate::services::itinerary_generation_service::ItineraryGenerationError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeGenerator {
        calls: AtomicUsize,
        requests: Mutex<Vec<ItineraryRequest>>,
        fail_first: usize,
    }

    impl FakeGenerator {
        fn new(fail_first: usize) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
                fail_first,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ItineraryGenerator for FakeGenerator {
        async fn generate(
            &self,
            request: &ItineraryRequest,
        ) -> Result<String, ItineraryGenerationError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request.clone());
            tokio::task::yield_now().await;
            if call < self.fail_first {
                Err(ItineraryGenerationError::MissingItinerary(None))
            } else {
                Ok(format!("Day 1: {}\n- Explore", request.places[0]))
            }
        }
    }

    /// Never answers its first request.
    struct StalledGenerator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ItineraryGenerator for StalledGenerator {
        async fn generate(
            &self,
            request: &ItineraryRequest,
        ) -> Result<String, ItineraryGenerationError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                std::future::pending::<()>().await;
            }
            Ok(format!("Day 1: {}", request.places[0]))
        }
    }

    fn item(title: &str) -> RecommendationItem {
        RecommendationItem {
            id: None,
            title: title.to_string(),
            state: "Goa".to_string(),
            kind: "Trek".to_string(),
            groups: vec!["friends".to_string()],
            mood_tags: vec!["wildlife".to_string()],
            avg_budget_per_day_inr: 1800,
            itinerary: vec![],
            best_months: "Oct-Feb".to_string(),
            images: None,
        }
    }

    fn trip() -> TripParameters {
        TripParameters {
            duration: 2,
            mood: "wildlife".to_string(),
            group: TravelGroup::Friends,
        }
    }

    #[test]
    fn test_plan() {
        assert_eq!(plan(&ItineraryCacheEntry::default()), ToggleAction::Fetch);
        let loading = ItineraryCacheEntry::default().apply(CacheEvent::FetchStarted);
        assert_eq!(plan(&loading), ToggleAction::Wait);
        let fetched = loading.apply(CacheEvent::FetchSucceeded("x".to_string()));
        assert_eq!(plan(&fetched), ToggleAction::Flip);
    }

    #[tokio::test]
    async fn test_first_toggle_fetches_and_shows() {
        let generator = FakeGenerator::new(0);
        let controller = ItineraryController::new(generator.clone());

        let result = controller.toggle(&item("Dudhsagar Falls"), &trip()).await;
        assert_eq!(result.item_id, "dudhsagar-falls");
        assert_eq!(result.outcome, ToggleOutcome::Fetched);
        assert!(result.entry.visible);
        assert!(!result.entry.is_loading);
        assert_eq!(
            result.entry.raw_text.as_deref(),
            Some("Day 1: Dudhsagar Falls\n- Explore")
        );

        let requests = generator.requests.lock().unwrap();
        assert_eq!(
            requests[0],
            ItineraryRequest {
                places: vec!["Dudhsagar Falls".to_string()],
                duration: 2,
                mood: "wildlife".to_string(),
                group: "friends".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_cached_itinerary_toggles_without_refetch() {
        let generator = FakeGenerator::new(0);
        let controller = ItineraryController::new(generator.clone());
        let falls = item("Dudhsagar Falls");

        assert_eq!(controller.toggle(&falls, &trip()).await.outcome, ToggleOutcome::Fetched);
        let hidden = controller.toggle(&falls, &trip()).await;
        assert_eq!(hidden.outcome, ToggleOutcome::Hidden);
        assert!(!hidden.entry.visible);
        let shown = controller.toggle(&falls, &trip()).await;
        assert_eq!(shown.outcome, ToggleOutcome::Shown);
        assert!(shown.entry.visible);

        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_toggles_issue_one_request() {
        let generator = FakeGenerator::new(0);
        let controller = ItineraryController::new(generator.clone());
        let falls = item("Dudhsagar Falls");
        let params = trip();

        let (first, second) = futures::join!(
            controller.toggle(&falls, &params),
            controller.toggle(&falls, &params)
        );

        assert_eq!(first.outcome, ToggleOutcome::Fetched);
        assert_eq!(second.outcome, ToggleOutcome::InFlight);
        assert!(second.entry.is_loading);
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_can_be_retried() {
        let generator = FakeGenerator::new(1);
        let controller = ItineraryController::new(generator.clone());
        let falls = item("Dudhsagar Falls");

        let failed = controller.toggle(&falls, &trip()).await;
        assert_eq!(failed.outcome, ToggleOutcome::FetchFailed);
        assert_eq!(failed.entry, ItineraryCacheEntry::default());

        let retried = controller.toggle(&falls, &trip()).await;
        assert_eq!(retried.outcome, ToggleOutcome::Fetched);
        assert!(retried.entry.visible);
        assert_eq!(generator.calls(), 2);
    }

    #[tokio::test]
    async fn test_items_are_cached_independently() {
        let generator = FakeGenerator::new(0);
        let controller = ItineraryController::new(generator.clone());
        let falls = item("Dudhsagar Falls");
        let chopta = item("Chopta Tungnath");

        let params = trip();

        let (a, b) = futures::join!(
            controller.toggle(&falls, &params),
            controller.toggle(&chopta, &params)
        );
        assert_eq!(a.outcome, ToggleOutcome::Fetched);
        assert_eq!(b.outcome, ToggleOutcome::Fetched);
        assert_eq!(generator.calls(), 2);
        assert_eq!(controller.len(), 2);

        controller.toggle(&falls, &trip()).await;
        assert!(!controller.entry("dudhsagar-falls").unwrap().visible);
        assert!(controller.entry("chopta-tungnath").unwrap().visible);
    }

    #[tokio::test]
    async fn test_abandoned_fetch_can_be_retried() {
        let generator = Arc::new(StalledGenerator {
            calls: AtomicUsize::new(0),
        });
        let controller = ItineraryController::new(generator.clone());
        let falls = item("Dudhsagar Falls");
        let params = trip();

        let abandoned = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            controller.toggle(&falls, &params),
        )
        .await;
        assert!(abandoned.is_err());
        assert_eq!(
            controller.entry("dudhsagar-falls"),
            Some(ItineraryCacheEntry::default())
        );

        let retried = controller.toggle(&falls, &params).await;
        assert_eq!(retried.outcome, ToggleOutcome::Fetched);
        assert!(retried.entry.visible);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 2);
    }
}
