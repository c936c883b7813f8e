use actix_web::{web, HttpResponse, Responder};

use crate::models::session::SessionCreated;
use crate::routes::{error_response, find_session};
use crate::services::session_store::SessionStore;

/*
    POST /api/sessions
*/
pub async fn create(store: web::Data<SessionStore>) -> impl Responder {
    let session = store.create();
    HttpResponse::Created().json(SessionCreated {
        session_id: session.id(),
        created_at: session.created_at(),
    })
}

/*
    DELETE /api/sessions/{session_id}
*/
pub async fn delete(path: web::Path<String>, store: web::Data<SessionStore>) -> impl Responder {
    let session = match find_session(&store, &path.into_inner()) {
        Ok(session) => session,
        Err(response) => return response,
    };

    if store.remove(&session.id()) {
        HttpResponse::NoContent().finish()
    } else {
        error_response(HttpResponse::NotFound(), "Session not found")
    }
}
