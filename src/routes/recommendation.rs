use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;

use crate::models::recommendation::{PlannerForm, ALL_STATES};
use crate::routes::{error_response, find_session};
use crate::services::explore_session::SessionError;
use crate::services::result_filter::ResultFilter;
use crate::services::session_store::SessionStore;

#[derive(Deserialize)]
pub struct FilterParams {
    state: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

/*
    POST /api/sessions/{session_id}/recommendations
*/
pub async fn submit(
    path: web::Path<String>,
    store: web::Data<SessionStore>,
    input: web::Json<PlannerForm>,
) -> impl Responder {
    let session = match find_session(&store, &path.into_inner()) {
        Ok(session) => session,
        Err(response) => return response,
    };

    match session.submit(input.into_inner()).await {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(SessionError::InvalidForm(err)) => {
            error_response(HttpResponse::BadRequest(), &err.to_string())
        }
        Err(err) => {
            log::error!("Failed to submit recommendations: {}", err);
            error_response(HttpResponse::InternalServerError(), &err.to_string())
        }
    }
}

/*
    GET /api/sessions/{session_id}/recommendations?state=&type=
*/
pub async fn list(
    path: web::Path<String>,
    store: web::Data<SessionStore>,
    params: web::Query<FilterParams>,
) -> impl Responder {
    let session = match find_session(&store, &path.into_inner()) {
        Ok(session) => session,
        Err(response) => return response,
    };

    let params = params.into_inner();
    let filter = match (params.state, params.kind) {
        (None, None) => None,
        (state, kind) => {
            let kind = kind.unwrap_or_else(|| {
                session
                    .form()
                    .map(|form| form.type_filter().to_string())
                    .unwrap_or_default()
            });
            Some(ResultFilter::new(
                state.unwrap_or_else(|| ALL_STATES.to_string()),
                kind,
            ))
        }
    };

    HttpResponse::Ok().json(session.view(filter))
}
