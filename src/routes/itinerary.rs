use actix_web::{web, HttpResponse, Responder};

use crate::routes::{error_response, find_session};
use crate::services::explore_session::SessionError;
use crate::services::session_store::SessionStore;

/*
    POST /api/sessions/{session_id}/itineraries/{item_id}/toggle
*/
pub async fn toggle(
    path: web::Path<(String, String)>,
    store: web::Data<SessionStore>,
) -> impl Responder {
    let (session_id, item_id) = path.into_inner();
    let session = match find_session(&store, &session_id) {
        Ok(session) => session,
        Err(response) => return response,
    };

    // Fetch failures are not errors here: the panel just stays closed.
    match session.toggle_itinerary(&item_id).await {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(err @ SessionError::ItemNotFound(_)) => {
            error_response(HttpResponse::NotFound(), &err.to_string())
        }
        Err(err) => error_response(HttpResponse::BadRequest(), &err.to_string()),
    }
}
