use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use crate::services::explore_session::ExploreSession;
use crate::services::itinerary_generation_service::ItineraryGenerator;
use crate::services::recommendation_service::RecommendationService;

pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 120;

/// In-memory explore sessions. Nothing outlives the process.
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, Arc<ExploreSession>>>,
    recommender: Arc<dyn RecommendationService>,
    generator: Arc<dyn ItineraryGenerator>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(
        recommender: Arc<dyn RecommendationService>,
        generator: Arc<dyn ItineraryGenerator>,
        ttl: Duration,
    ) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            recommender,
            generator,
            ttl,
        }
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<Uuid, Arc<ExploreSession>>> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn create(&self) -> Arc<ExploreSession> {
        self.prune_expired_at(Utc::now());

        let session = Arc::new(ExploreSession::new(
            self.recommender.clone(),
            self.generator.clone(),
        ));
        self.sessions().insert(session.id(), session.clone());
        log::info!("Created explore session {}", session.id());
        session
    }

    /// Looks a session up and marks it as active.
    pub fn get(&self, id: &Uuid) -> Option<Arc<ExploreSession>> {
        let session = self.sessions().get(id).cloned()?;
        session.touch();
        Some(session)
    }

    pub fn remove(&self, id: &Uuid) -> bool {
        self.sessions().remove(id).is_some()
    }

    pub fn prune_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions();
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now, self.ttl));
        let pruned = before - sessions.len();
        if pruned > 0 {
            log::info!("Pruned {} idle explore sessions", pruned);
        }
        pruned
    }

    pub fn len(&self) -> usize {
        self.sessions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions().is_empty()
    }
}
