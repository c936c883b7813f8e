use actix_web::{error::InternalError, web, HttpResponse};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::services::explore_session::ExploreSession;
use crate::services::session_store::SessionStore;

pub mod health;
pub mod itinerary;
pub mod recommendation;
pub mod session;

/// Route table shared by the binary and the integration tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        let response = error_response(HttpResponse::BadRequest(), &err.to_string());
        InternalError::from_response(err, response).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        let response = error_response(HttpResponse::BadRequest(), &err.to_string());
        InternalError::from_response(err, response).into()
    }))
    .route("/health", web::get().to(health::health_check))
    .service(
        web::scope("/api/sessions")
            .route("", web::post().to(session::create))
            .route("/{session_id}", web::delete().to(session::delete))
            .route(
                "/{session_id}/recommendations",
                web::post().to(recommendation::submit),
            )
            .route(
                "/{session_id}/recommendations",
                web::get().to(recommendation::list),
            )
            .route(
                "/{session_id}/itineraries/{item_id}/toggle",
                web::post().to(itinerary::toggle),
            ),
    );
}

pub(crate) fn error_response(mut builder: actix_web::HttpResponseBuilder, message: &str) -> HttpResponse {
    builder.json(json!({ "error": message }))
}

/// Resolves the `{session_id}` path segment against the store.
pub(crate) fn find_session(
    store: &SessionStore,
    raw_id: &str,
) -> Result<Arc<ExploreSession>, HttpResponse> {
    let id = Uuid::parse_str(raw_id)
        .map_err(|_| error_response(HttpResponse::BadRequest(), "Invalid session ID"))?;
    store
        .get(&id)
        .ok_or_else(|| error_response(HttpResponse::NotFound(), "Session not found"))
}
