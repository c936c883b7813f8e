use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use std::collections::HashMap;
use std::env;
use url::Url;

use crate::config::AppConfig;
use crate::services::session_store::SessionStore;

#[derive(Serialize)]
struct HealthStatus {
    status: String,
    services: HashMap<String, ServiceStatus>,
    active_sessions: usize,
    environment: String,
    version: String,
}

#[derive(Serialize, Clone)]
struct ServiceStatus {
    status: String,
    details: Option<String>,
}

pub async fn health_check(
    config: web::Data<AppConfig>,
    store: web::Data<SessionStore>,
) -> impl Responder {
    let mut health = HealthStatus {
        status: "ok".to_string(),
        services: HashMap::new(),
        active_sessions: store.len(),
        environment: env::var("RUST_ENV").unwrap_or("development".to_string()),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let recommendation = check_upstream(&config.recommendation_url);
    let itinerary = check_upstream(&config.itinerary_url);

    if recommendation.status != "ok" || itinerary.status != "ok" {
        health.status = "degraded".to_string();
    }

    health
        .services
        .insert("recommendation".to_string(), recommendation);
    health
        .services
        .insert("itinerary_generation".to_string(), itinerary);

    HttpResponse::Ok().json(health)
}

// Configuration check only; upstreams are not called from here.
fn check_upstream(url: &Url) -> ServiceStatus {
    match url.host_str() {
        Some(host) if !host.is_empty() => ServiceStatus {
            status: "ok".to_string(),
            details: Some(format!("Configured: {}://{}{}", url.scheme(), host, url.path())),
        },
        _ => ServiceStatus {
            status: "error".to_string(),
            details: Some(format!("Upstream URL has no host: {}", url)),
        },
    }
}
