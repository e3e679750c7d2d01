pub mod itinerary;
pub mod rating;
pub mod suggestion;
pub mod timestamp;
pub mod trip;
pub mod user;
