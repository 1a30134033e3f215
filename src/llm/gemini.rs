//! Google Gemini provider implementation

use super::types::{GroundingSource, LlmRequest, LlmResponse, MessageRole, Usage};
use super::{LlmError, LlmService};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default public endpoint for the Generative Language API
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model for chat
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Gemini service implementation
pub struct GeminiService {
    client: Client,
    api_key: String,
    endpoint: String,
    model_id: String,
}

impl GeminiService {
    pub fn new(
        api_key: String,
        model: &str,
        api_base: &str,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let endpoint = format!(
            "{}/models/{}:generateContent",
            api_base.trim_end_matches('/'),
            model
        );

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            endpoint,
            model_id: model.to_string(),
        })
    }

    fn translate_request(request: &LlmRequest) -> GeminiRequest {
        let contents = request
            .messages
            .iter()
            .map(|msg| GeminiContent {
                role: Some(
                    match msg.role {
                        MessageRole::User => "user",
                        MessageRole::Model => "model",
                    }
                    .to_string(),
                ),
                parts: vec![GeminiPart {
                    text: Some(msg.text.clone()),
                }],
            })
            .collect();

        let system_instruction = if request.system.trim().is_empty() {
            None
        } else {
            Some(GeminiContent {
                role: None,
                parts: vec![GeminiPart {
                    text: Some(request.system.clone()),
                }],
            })
        };

        let tools = request.web_search.then(|| {
            vec![GeminiTool {
                google_search: GoogleSearch {},
            }]
        });

        GeminiRequest {
            contents,
            system_instruction,
            tools,
        }
    }
}

/// Convert a successful wire response into the common response type.
///
/// Text parts of the first candidate are concatenated; an empty result is
/// reported as `None`. Grounding chunks without both a URI and a title are
/// dropped.
pub(super) fn normalize_response(resp: GeminiResponse) -> LlmResponse {
    let usage = resp
        .usage_metadata
        .map(|u| Usage {
            input_tokens: u64::from(u.prompt_token_count),
            output_tokens: u64::from(u.candidates_token_count),
        })
        .unwrap_or_default();

    let Some(candidate) = resp.candidates.into_iter().next() else {
        return LlmResponse {
            text: None,
            sources: vec![],
            usage,
        };
    };

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    let sources = candidate
        .grounding_metadata
        .map(|meta| extract_sources(meta.grounding_chunks))
        .unwrap_or_default();

    LlmResponse {
        text: (!text.is_empty()).then_some(text),
        sources,
        usage,
    }
}

pub(super) fn extract_sources(chunks: Vec<GeminiGroundingChunk>) -> Vec<GroundingSource> {
    chunks
        .into_iter()
        .filter_map(|chunk| {
            let web = chunk.web?;
            let uri = web.uri.filter(|u| !u.is_empty())?;
            let title = web.title.filter(|t| !t.is_empty())?;
            Some(GroundingSource { uri, title })
        })
        .collect()
}

/// Classify a non-success HTTP response.
///
/// A 5xx status or an `INTERNAL` status marker in the error body means the
/// backend was overloaded; everything else is terminal.
pub(super) fn classify_failure(status: StatusCode, body: &str) -> LlmError {
    let parsed = serde_json::from_str::<GeminiErrorResponse>(body).ok();
    let marker = parsed
        .as_ref()
        .and_then(|e| e.error.status.as_deref())
        .unwrap_or_default();
    let message = parsed
        .as_ref()
        .map_or_else(|| body.to_string(), |e| e.error.message.clone());

    if status.is_server_error() || marker == "INTERNAL" {
        return LlmError::server_error(format!("Server error ({status}): {message}"));
    }

    match status.as_u16() {
        400 => LlmError::invalid_request(format!("Invalid request: {message}")),
        401 | 403 => LlmError::auth(format!("Authentication failed: {message}")),
        429 => LlmError::rate_limit(format!("Rate limit exceeded: {message}")),
        _ => LlmError::unknown(format!("HTTP {status}: {message}")),
    }
}

#[async_trait]
impl LlmService for GeminiService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let gemini_request = Self::translate_request(request);

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&gemini_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    LlmError::network(format!("Connection failed: {e}"))
                } else {
                    LlmError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(classify_failure(status, &body));
        }

        let gemini_response: GeminiResponse = serde_json::from_str(&body)
            .map_err(|e| LlmError::unknown(format!("Failed to parse response: {e}")))?;

        Ok(normalize_response(gemini_response))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// Gemini API types

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<GeminiTool>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub(super) struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) role: Option<String>,
    #[serde(default)]
    pub(super) parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub(super) struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) text: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiTool {
    google_search: GoogleSearch,
}

#[derive(Debug, Clone, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub(super) struct GeminiResponse {
    #[serde(default)]
    pub(super) candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    pub(super) usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub(super) struct GeminiCandidate {
    #[serde(default)]
    pub(super) content: Option<GeminiContent>,
    #[serde(default)]
    pub(super) grounding_metadata: Option<GeminiGroundingMetadata>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub(super) struct GeminiGroundingMetadata {
    #[serde(default)]
    pub(super) grounding_chunks: Vec<GeminiGroundingChunk>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub(super) struct GeminiGroundingChunk {
    #[serde(default)]
    pub(super) web: Option<GeminiWebSource>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub(super) struct GeminiWebSource {
    #[serde(default)]
    pub(super) uri: Option<String>,
    #[serde(default)]
    pub(super) title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GeminiUsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Debug, Clone, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Debug, Clone, Deserialize)]
struct GeminiError {
    #[serde(default)]
    message: String,
    #[allow(dead_code)]
    code: Option<i32>,
    status: Option<String>,
}
