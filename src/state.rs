use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::store::ItineraryStore;
use crate::services::gemini::TextGenerator;
use crate::services::itinerary_generation_service::ItineraryGenerator;
use crate::services::suggestion_service::SuggestionService;

/// Shared handler state, registered once as `web::Data<AppState>`.
pub struct AppState {
    pub store: Arc<dyn ItineraryStore>,
    pub generator: ItineraryGenerator,
    pub suggestions: SuggestionService,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ItineraryStore>,
        text_generator: Arc<dyn TextGenerator>,
        config: &AppConfig,
    ) -> Self {
        Self {
            store,
            generator: ItineraryGenerator::new(text_generator.clone()),
            suggestions: SuggestionService::new(
                text_generator,
                config.suggestion_fallback,
                config.suggestion_debounce,
            ),
        }
    }
}
