pub mod debounce;
pub mod export;
pub mod gemini;
pub mod itinerary_generation_service;
pub mod suggestion_service;
