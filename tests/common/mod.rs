#![allow(dead_code)]

use actix_web::{web, App, HttpResponse};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

use driftline::config::AppConfig;
use driftline::models::itinerary::ItineraryRequest;
use driftline::models::recommendation::{RecommendationItem, RecommendationRequest};
use driftline::routes;
use driftline::services::itinerary_generation_service::{
    ItineraryGenerationError, ItineraryGenerator,
};
use driftline::services::recommendation_service::{RecommendationError, RecommendationService};
use driftline::services::session_store::SessionStore;

pub const SAMPLE_ITINERARY: &str =
    "# Netravali Escape\n**Day 1**: Arrive\n- Check in\n- Explore\nFree evening";

pub enum Reply {
    Items(Vec<RecommendationItem>),
    ServiceError(String),
}

pub struct FakeRecommender {
    pub reply: Mutex<Reply>,
    pub requests: Mutex<Vec<RecommendationRequest>>,
}

#[async_trait]
impl RecommendationService for FakeRecommender {
    async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Vec<RecommendationItem>, RecommendationError> {
        self.requests.lock().unwrap().push(request.clone());
        match &*self.reply.lock().unwrap() {
            Reply::Items(items) => Ok(items.clone()),
            Reply::ServiceError(msg) => Err(RecommendationError::ServiceError(msg.clone())),
        }
    }
}

pub struct FakeGenerator {
    pub calls: AtomicUsize,
    pub fail_first: usize,
    pub requests: Mutex<Vec<ItineraryRequest>>,
}

impl FakeGenerator {
    pub fn calls(&self) -> usize {
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
        if call < self.fail_first {
            return Err(ItineraryGenerationError::MissingItinerary(Some(
                "quota exceeded".to_string(),
            )));
        }
        Ok(SAMPLE_ITINERARY.to_string())
    }
}

pub struct TestApp {
    pub recommender: Arc<FakeRecommender>,
    pub generator: Arc<FakeGenerator>,
    pub store: web::Data<SessionStore>,
    pub config: web::Data<AppConfig>,
}

impl TestApp {
    pub fn new(reply: Reply) -> Self {
        Self::with_failures(reply, 0)
    }

    pub fn with_failures(reply: Reply, fail_first: usize) -> Self {
        let recommender = Arc::new(FakeRecommender {
            reply: Mutex::new(reply),
            requests: Mutex::new(Vec::new()),
        });
        let generator = Arc::new(FakeGenerator {
            calls: AtomicUsize::new(0),
            fail_first,
            requests: Mutex::new(Vec::new()),
        });
        let store = web::Data::new(SessionStore::new(
            recommender.clone(),
            generator.clone(),
            chrono::Duration::minutes(120),
        ));

        Self {
            recommender,
            generator,
            store,
            config: web::Data::new(test_config()),
        }
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(self.config.clone())
            .app_data(self.store.clone())
            .configure(routes::configure)
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".to_string(),
        port: 8080,
        recommendation_url: Url::parse("http://localhost:5000/api/recommend").unwrap(),
        itinerary_url: Url::parse("http://localhost:5000/api/generate-itinerary").unwrap(),
        upstream_timeout: Duration::from_secs(5),
        session_ttl: chrono::Duration::minutes(120),
        allowed_origins: vec!["http://localhost:3000".to_string()],
    }
}

pub fn adventure(title: &str, state: &str, kind: &str) -> RecommendationItem {
    RecommendationItem {
        id: None,
        title: title.to_string(),
        state: state.to_string(),
        kind: kind.to_string(),
        groups: vec!["friends".to_string(), "solo".to_string()],
        mood_tags: vec!["wildlife".to_string(), "nature".to_string()],
        avg_budget_per_day_inr: 1600,
        itinerary: vec!["Arrival".to_string(), "Explore Nature".to_string()],
        best_months: "Oct-Mar".to_string(),
        images: Some(vec!["https://upload.wikimedia.org/netravali.jpg".to_string()]),
    }
}

pub fn catalogue() -> Vec<RecommendationItem> {
    vec![
        adventure("Netravali Camp", "Goa", "Camp"),
        adventure("Dudhsagar Trek", "Goa", "Trek"),
        adventure("Vagamon Camp", "Kerala", "Camp"),
        adventure("Chembra Peak", "Kerala", "Trek"),
    ]
}

pub fn form_json(kind: &str) -> serde_json::Value {
    serde_json::json!({
        "mood": "wildlife",
        "budget": 2000,
        "group": "friends",
        "type": kind,
        "duration": 3
    })
}

/// Canned upstream standing in for the recommendation/itinerary services.
pub async fn recommend_ok() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!([
        {
            "title": "Netravali Camp",
            "state": "Goa",
            "type": "Camp",
            "groups": ["friends"],
            "mood_tags": ["wildlife"],
            "avg_budget_per_day_inr": 1400,
            "best_months": "Oct-Mar",
            "sample_itinerary": ["Arrival", "Explore Nature"],
            "images": []
        }
    ]))
}

pub async fn recommend_error() -> HttpResponse {
    HttpResponse::InternalServerError().json(serde_json::json!({ "error": "model not loaded" }))
}

pub async fn itinerary_ok(body: web::Json<ItineraryRequest>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "itinerary": format!("Day 1: {}\n- Arrive", body.places.join(", "))
    }))
}

pub async fn itinerary_missing() -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "error": "No destinations provided" }))
}
