use std::fmt;
use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::GeminiConfig;

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Debug)]
pub enum GenerationError {
    MissingApiKey,
    Config(String),
    HttpError(reqwest::Error),
    ApiError(String),
    EmptyResponse,
    InvalidFormat(String),
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationError::MissingApiKey => {
                write!(f, "API key not found. Please set GEMINI_API_KEY.")
            }
            GenerationError::Config(msg) => write!(f, "Generation client misconfigured: {}", msg),
            GenerationError::HttpError(err) => write!(f, "Failed to reach AI service: {}", err),
            GenerationError::ApiError(msg) => write!(f, "{}", msg),
            GenerationError::EmptyResponse => write!(f, "No response received from AI service."),
            GenerationError::InvalidFormat(_) => {
                write!(f, "AI returned invalid format. Please try again.")
            }
        }
    }
}

impl std::error::Error for GenerationError {}

impl From<reqwest::Error> for GenerationError {
    // The request URL carries the API key.
    fn from(err: reqwest::Error) -> Self {
        GenerationError::HttpError(err.without_url())
    }
}

/// A remote text-generation backend: one prompt in, free-form text out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn is_configured(&self) -> bool;

    async fn generate_text(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    endpoint: Url,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self, GenerationError> {
        let endpoint = format!(
            "{}/models/{}:generateContent",
            config.api_base.trim_end_matches('/'),
            config.model
        );
        let endpoint = Url::parse(&endpoint)
            .map_err(|e| GenerationError::Config(format!("invalid endpoint {}: {}", endpoint, e)))?;
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            endpoint,
        })
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate_text(&self, prompt: &str) -> Result<String, GenerationError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(GenerationError::MissingApiKey)?;

        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("key", api_key);

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorEnvelope>()
                .await
                .ok()
                .and_then(|envelope| envelope.error)
                .and_then(|error| error.message)
                .unwrap_or_else(|| "Failed to get a response from the AI service.".to_string());
            log::warn!("Gemini request failed with status {}: {}", status, message);
            return Err(GenerationError::ApiError(message));
        }

        let data: GenerateContentResponse = response.json().await?;
        data.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().next())
            .and_then(|part| part.text)
            .filter(|text| !text.trim().is_empty())
            .ok_or(GenerationError::EmptyResponse)
    }
}

fn fence_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"```json\n?|\n?```").expect("fence pattern is valid"))
}

/// Removes markdown code-fence markers the model tends to wrap JSON in.
pub fn strip_code_fences(text: &str) -> String {
    fence_pattern().replace_all(text, "").trim().to_string()
}
