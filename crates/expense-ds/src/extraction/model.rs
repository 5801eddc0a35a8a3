use std::future::Future;
use std::sync::OnceLock;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::schema::response_schema;
use crate::config::{ConfigError, ModelConfig};

pub const SYSTEM_INSTRUCTION: &str = "You are an expert extraction algorithm. \
Only extract relevant information from the text. \
If you do not know the value of an attribute asked to extract, \
return null for the attribute's value.";

/// Boundary to the generative model that performs the extraction.
///
/// Implementations return the raw text of the model's structured response;
/// validation happens in the caller.
pub trait ExpenseExtractor: Send + Sync {
    fn extract(&self, message: &str) -> impl Future<Output = Result<String, ModelError>> + Send;
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("model endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("model returned no candidate text")]
    EmptyResponse,
    /// The extractor cannot be used at all, e.g. it is missing credentials.
    #[error("model unavailable: {0}")]
    Unavailable(String),
}

/// Prompt sent for a single message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionPrompt {
    pub system: &'static str,
    pub user: String,
}

pub fn build_prompt(message: &str) -> ExtractionPrompt {
    ExtractionPrompt {
        system: SYSTEM_INSTRUCTION,
        user: message.trim().to_string(),
    }
}

/// Client for the Gemini `generateContent` endpoint with structured output.
#[derive(Debug, Clone)]
pub struct GeminiExtractor {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiExtractor {
    pub fn from_config(config: &ModelConfig) -> Result<Self, ConfigError> {
        let api_key = config.api_key()?.to_string();
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| ConfigError::HttpClient(err.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

impl ExpenseExtractor for GeminiExtractor {
    async fn extract(&self, message: &str) -> Result<String, ModelError> {
        let body = request_body(&build_prompt(message));
        debug!(model = %self.model, "requesting structured extraction");

        let response = self
            .client
            .post(self.url())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: GenerateContentResponse = response.json().await?;
        candidate_text(payload)
    }
}

/// Builds a [`GeminiExtractor`] on first use, so missing credentials only
/// matter once a message actually reaches the model.
#[derive(Debug)]
pub struct LazyGeminiExtractor {
    config: ModelConfig,
    client: OnceLock<GeminiExtractor>,
}

impl LazyGeminiExtractor {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            client: OnceLock::new(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.client.get().is_some()
    }

    fn client(&self) -> Result<&GeminiExtractor, ModelError> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }
        let client = GeminiExtractor::from_config(&self.config)
            .map_err(|err| ModelError::Unavailable(err.to_string()))?;
        Ok(self.client.get_or_init(|| client))
    }
}

impl ExpenseExtractor for LazyGeminiExtractor {
    async fn extract(&self, message: &str) -> Result<String, ModelError> {
        self.client()?.extract(message).await
    }
}

pub(crate) fn request_body(prompt: &ExtractionPrompt) -> Value {
    json!({
        "systemInstruction": { "parts": [{ "text": prompt.system }] },
        "contents": [{ "role": "user", "parts": [{ "text": prompt.user }] }],
        "generationConfig": {
            "temperature": 0,
            "responseMimeType": "application/json",
            "responseSchema": response_schema(),
        },
    })
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

pub(crate) fn candidate_text(response: GenerateContentResponse) -> Result<String, ModelError> {
    response
        .candidates
        .into_iter()
        .filter_map(|candidate| candidate.content)
        .flat_map(|content| content.parts)
        .filter_map(|part| part.text)
        .find(|text| !text.trim().is_empty())
        .ok_or(ModelError::EmptyResponse)
}
