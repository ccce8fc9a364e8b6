//! # Vision Extraction Client
//!
//! Sends a label image plus an extraction prompt to a vision-capable chat
//! model and turns the reply into an [`AnalysisResult`].
//!
//! [`extract`] makes exactly one model call. It never retries and never
//! returns an error: transport failures, HTTP errors, timeouts and unusable
//! replies all come back as `success: false` results. Retry policy belongs to
//! the caller (see [`crate::recovery`]).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::label_image::LabelImage;
use crate::nutrient_model::{AnalysisResult, ExtractedIngredient};
use crate::response_parser::parse_model_response;
use crate::scan_config::VisionConfig;
use crate::scan_errors::ScanError;

/// A vision-capable model that answers a prompt about an image with text
///
/// Implementations hold no per-call state, so one instance can serve several
/// concurrent extractions.
#[async_trait]
pub trait VisionModel: Send + Sync + fmt::Debug {
    /// Send the prompt and image, return the model's text reply
    async fn complete(&self, prompt: &str, image: &LabelImage) -> Result<String, ScanError>;

    /// Model identifier, for logging
    fn model_name(&self) -> &str;
}

/// Run one extraction call with a per-call timeout
///
/// A timeout is an ordinary failure of this call, reported as
/// `"request timed out after 30s"` (or `"...after 250ms"` below one second).
/// Clients may enforce their own shorter request timeout as well.
pub async fn extract(
    model: &dyn VisionModel,
    image: &LabelImage,
    prompt: &str,
    timeout: Duration,
) -> AnalysisResult {
    debug!(
        model = model.model_name(),
        image_bytes = image.len(),
        timeout_secs = timeout.as_secs(),
        "Starting label extraction"
    );

    match try_extract(model, image, prompt, timeout).await {
        Ok(result) => {
            info!(
                model = model.model_name(),
                ingredients_count = result.ingredients.len(),
                complete_count = result.complete_count(),
                "Label extraction succeeded"
            );
            result
        }
        Err(e) => {
            warn!(model = model.model_name(), error = %e, "Label extraction failed");
            AnalysisResult::failed(&e)
        }
    }
}

async fn try_extract(
    model: &dyn VisionModel,
    image: &LabelImage,
    prompt: &str,
    timeout: Duration,
) -> Result<AnalysisResult, ScanError> {
    let reply = tokio::time::timeout(timeout, model.complete(prompt, image))
        .await
        .map_err(|_| ScanError::Timeout(timeout))??;

    parse_model_response(&reply)
}

/// Chat-completions client for OpenAI-compatible vision endpoints
#[derive(Debug)]
pub struct OpenAiVisionClient {
    config: VisionConfig,
    client: reqwest::Client,
}

impl OpenAiVisionClient {
    /// Create a client; credentials come only from `config`
    pub fn new(config: VisionConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &VisionConfig {
        &self.config
    }

    // The configured timeout covers the whole exchange, body included
    fn request_error(&self, err: reqwest::Error) -> ScanError {
        if err.is_timeout() {
            ScanError::Timeout(self.config.timeout)
        } else {
            err.into()
        }
    }
}

/// Chat-completions request format
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
    detail: &'static str,
}

/// Chat-completions response format
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Error response from the endpoint
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[async_trait]
impl VisionModel for OpenAiVisionClient {
    async fn complete(&self, prompt: &str, image: &LabelImage) -> Result<String, ScanError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text { text: prompt },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: image.to_data_url(),
                            detail: "auto",
                        },
                    },
                ],
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .timeout(self.config.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.request_error(e))?;

        if !(200..300).contains(&status) {
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|error_response| error_response.error.message)
                .unwrap_or_else(|_| {
                    if body.trim().is_empty() {
                        "Unknown error".to_string()
                    } else {
                        body
                    }
                });
            return Err(ScanError::HttpStatus { status, message });
        }

        let response: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| ScanError::MalformedResponse(format!("unexpected completion body: {e}")))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(ScanError::EmptyResponse)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

/// Canned reply describing a typical prenatal multivitamin label
pub const MOCK_PRENATAL_RESPONSE: &str = r#"{
  "productName": "Prenatal Multivitamin",
  "servingSize": "1 tablet",
  "ingredients": [
    {"name": "Vitamin A", "amount": "770", "unit": "mcg", "percentDailyValue": "85%"},
    {"name": "Vitamin C", "amount": "85", "unit": "mg", "percentDailyValue": "94%"},
    {"name": "Vitamin D3", "amount": "15", "unit": "mcg", "percentDailyValue": "75%"},
    {"name": "Folic Acid", "amount": "600", "unit": "mcg", "percentDailyValue": "150%"},
    {"name": "Iron", "amount": "27", "unit": "mg", "percentDailyValue": "150%"},
    {"name": "Calcium", "amount": "200", "unit": "mg", "percentDailyValue": "15%"}
  ],
  "warnings": ["Contains iron", "Keep out of reach of children"]
}"#;

/// Offline model for demos and tests; always answers with the same label
#[derive(Debug, Clone)]
pub struct MockVisionModel {
    reply: String,
    delay: Duration,
}

impl Default for MockVisionModel {
    fn default() -> Self {
        Self {
            reply: MOCK_PRENATAL_RESPONSE.to_string(),
            delay: Duration::ZERO,
        }
    }
}

impl MockVisionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer with the given text instead of the canned label
    pub fn with_reply(mut self, reply: &str) -> Self {
        self.reply = reply.to_string();
        self
    }

    /// Simulate network latency
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// The ingredients the canned label parses to
    pub fn expected_ingredients() -> Vec<ExtractedIngredient> {
        parse_model_response(MOCK_PRENATAL_RESPONSE)
            .map(|result| result.ingredients)
            .unwrap_or_default()
    }
}

#[async_trait]
impl VisionModel for MockVisionModel {
    async fn complete(&self, _prompt: &str, _image: &LabelImage) -> Result<String, ScanError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.reply.clone())
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
