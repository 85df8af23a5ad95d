//! Google Gemini API client.
//!
//! Implements the `Completion` trait over the `generateContent` endpoint.
//! See: <https://ai.google.dev/api/rest>

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::client::{ClientError, Completion};
use crate::http::{add_extra_headers, build_http_client, RequestBuilderExt, ResponseExt};
use crate::options::{ModelOptions, TransportOptions};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Gemini client using HTTP transport.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    model_options: ModelOptions,
    transport_options: TransportOptions,
}

impl GeminiClient {
    /// Create a new Gemini client against the public API endpoint.
    pub fn new(
        api_key: String,
        model_options: ModelOptions,
        transport_options: TransportOptions,
    ) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model_options,
            transport_options,
        }
    }

    /// Override the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Decode a non-2xx body into a provider error.
    fn handle_error_response(status: reqwest::StatusCode, body: &str) -> ClientError {
        if let Ok(error_resp) = serde_json::from_str::<GeminiErrorResponse>(body) {
            ClientError::Provider(format!(
                "Gemini error ({}): {}",
                error_resp.error.code, error_resp.error.message
            ))
        } else {
            ClientError::Provider(format!("HTTP {}: {}", status, body))
        }
    }
}

#[async_trait]
impl Completion for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String, ClientError> {
        let url = format!(
            "{}/v1/models/{}:generateContent?key={}",
            self.base_url, self.model_options.model, self.api_key
        );

        let request_body = GenerateContentRequest::user_text(prompt, &self.model_options);

        let http_client = build_http_client(&self.transport_options)?;

        let mut req = http_client.post(&url).header(CONTENT_TYPE, "application/json");
        req = add_extra_headers(req, &self.transport_options);

        let response = req.json_logged(&request_body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text_logged().await.unwrap_or_default();
            return Err(Self::handle_error_response(status, &body));
        }

        let gemini_response: GenerateContentResponse = response.json_logged().await?;
        Ok(gemini_response.into_text())
    }
}

// --- Gemini API request/response types ---

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<GeminiContent>,
    generation_config: Option<GeminiGenerationConfig>,
}

impl GenerateContentRequest {
    fn user_text(text: &str, options: &ModelOptions) -> Self {
        let generation_config = if options.temperature.is_some()
            || options.top_p.is_some()
            || options.max_tokens.is_some()
        {
            Some(GeminiGenerationConfig {
                temperature: options.temperature,
                top_p: options.top_p,
                max_output_tokens: options.max_tokens,
            })
        } else {
            None
        };

        Self {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart {
                    text: text.to_string(),
                }],
            }],
            generation_config,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Serialize)]
struct GeminiPart {
    text: String,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: Option<f32>,
    top_p: Option<f32>,
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

impl GenerateContentResponse {
    /// First text part of the first candidate, with a fixed placeholder when
    /// the response carries no text.
    fn into_text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|content| content.parts.into_iter().next())
            .and_then(|part| part.text)
            .unwrap_or_else(|| "No response from Gemini.".to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Debug, Clone, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Debug, Clone, Deserialize)]
struct GeminiCandidatePart {
    text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Debug, Clone, Deserialize)]
struct GeminiError {
    code: u32,
    message: String,
}
