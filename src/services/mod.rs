pub mod explore_session;
pub mod itinerary_controller;
pub mod itinerary_formatter;
pub mod itinerary_generation_service;
pub mod recommendation_service;
pub mod result_filter;
pub mod session_store;
