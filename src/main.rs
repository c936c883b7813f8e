use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use driftline::config::AppConfig;
use driftline::routes;
use driftline::services::itinerary_generation_service::HttpItineraryGenerator;
use driftline::services::recommendation_service::HttpRecommendationService;
use driftline::services::session_store::SessionStore;

fn to_io_error(err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    println!("Application starting...");

    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    } else {
        println!("Release mode");
    }

    env_logger::init_from_env(Env::default().default_filter_or("info"));
    println!("Logger initialized");

    let config = AppConfig::from_env().map_err(to_io_error)?;
    println!(
        "Upstreams: recommendations at {}, itineraries at {}",
        config.recommendation_url, config.itinerary_url
    );

    let recommender =
        HttpRecommendationService::new(config.recommendation_url.clone(), config.upstream_timeout)
            .map_err(to_io_error)?;
    let generator =
        HttpItineraryGenerator::new(config.itinerary_url.clone(), config.upstream_timeout)
            .map_err(to_io_error)?;

    let store = web::Data::new(SessionStore::new(
        Arc::new(recommender),
        Arc::new(generator),
        config.session_ttl,
    ));

    let host = config.host.clone();
    let port = config.port;
    let config = web::Data::new(config);
    println!("Attempting to bind to {}:{}", host, port);

    HttpServer::new(move || {
        let cors = config
            .allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::CONTENT_TYPE])
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(config.clone())
            .app_data(store.clone())
            .route("/", web::get().to(|| async { "Driftline API is running" }))
            .configure(routes::configure)
    })
    .bind((host, port))?
    .run()
    .await
}
