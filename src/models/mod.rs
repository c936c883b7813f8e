pub mod itinerary;
pub mod recommendation;
pub mod session;
