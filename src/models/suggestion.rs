use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationType {
    City,
    Country,
    Landmark,
    Region,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSuggestion {
    pub id: String,
    pub name: String,
    pub full_name: String,
    pub country: String,
    #[serde(rename = "type")]
    pub location_type: LocationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SuggestionResponse {
    pub suggestions: Vec<LocationSuggestion>,
    /// False when autocomplete is disabled for lack of a generation key.
    pub enabled: bool,
    /// True when a newer query from the same client replaced this one.
    pub superseded: bool,
}

#[derive(Debug, Deserialize)]
pub struct SuggestionQuery {
    #[serde(default)]
    pub q: String,
    /// Browser-generated id that scopes debouncing for anonymous callers.
    #[serde(default)]
    pub client_id: Option<String>,
}
