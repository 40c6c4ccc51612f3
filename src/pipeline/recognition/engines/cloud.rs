//! Cloud vision-language OCR over an OpenAI-compatible chat endpoint.
//!
//! The card variant is sent as a base64 data URI; the model is asked for a
//! JSON payload of card lines. A malformed reply is recovered locally
//! (fences stripped, raw lines kept) before the attempt is given up.
//! Transport failures (network, timeout, auth) degrade to zero confidence
//! for this attempt; the adapter never retries on its own.

use std::io::Cursor;
use std::time::Duration;

use base64::Engine as _;
use serde::{Deserialize, Serialize};

use super::heuristic_confidence;
use crate::pipeline::recognition::types::{EngineKind, EngineResult, ImageVariant, OcrEngine};
use crate::pipeline::recognition::RecognitionError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const API_KEY_ENV: &str = "OPENAI_API_KEY";

const TRANSCRIBE_PROMPT: &str = "\
This is a photograph of a business card. Transcribe every piece of text on \
the card, one entry per line, top to bottom. Keep emails, phone numbers and \
URLs exactly as printed. Respond with JSON only, in the form \
{\"lines\": [\"...\"]}. Do not add commentary.";

pub struct CloudVisionEngine {
    client: reqwest::blocking::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct LinesPayload {
    lines: Vec<String>,
}

impl CloudVisionEngine {
    /// Build from the environment: API key from `OPENAI_API_KEY`, default
    /// endpoint and model, the given per-call timeout.
    pub fn from_env(timeout: Duration) -> Self {
        Self {
            client: reqwest::blocking::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            api_key: std::env::var(API_KEY_ENV).ok(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point at a different OpenAI-compatible endpoint (self-hosted gateway,
    /// test server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn encode_variant(variant: &ImageVariant) -> Result<String, RecognitionError> {
        let mut png = Vec::new();
        image::DynamicImage::ImageLuma8(variant.image.clone())
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .map_err(|e| RecognitionError::EngineProcessing(format!("encoding variant: {e}")))?;
        Ok(base64::engine::general_purpose::STANDARD.encode(png))
    }
}

impl OcrEngine for CloudVisionEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Cloud
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    fn availability_hint(&self) -> String {
        if self.api_key.is_none() {
            format!("{API_KEY_ENV} not set")
        } else {
            format!("cloud vision available (model: {})", self.model)
        }
    }

    fn try_recognize(&self, variant: &ImageVariant) -> Result<EngineResult, RecognitionError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| RecognitionError::EngineInit(format!("{API_KEY_ENV} not set")))?;

        let image_b64 = Self::encode_variant(variant)?;
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text {
                        text: TRANSCRIBE_PROMPT,
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: format!("data:image/png;base64,{image_b64}"),
                        },
                    },
                ],
            }],
            max_tokens: 1024,
            temperature: 0.0,
        };

        let start = std::time::Instant::now();
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .map_err(|e| RecognitionError::CloudTransport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(RecognitionError::CloudTransport(format!(
                "status {status}: {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| RecognitionError::MalformedResponse(e.to_string()))?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                RecognitionError::MalformedResponse("response carried no content".to_string())
            })?;

        let (text, recovered) = extract_card_lines(&content);
        if text.trim().is_empty() {
            return Err(RecognitionError::MalformedResponse(
                "no usable text in response".to_string(),
            ));
        }

        let confidence = heuristic_confidence(&text);
        tracing::info!(
            model = %self.model,
            elapsed_ms = %start.elapsed().as_millis(),
            text_len = text.len(),
            confidence,
            recovered,
            "cloud vision read complete"
        );

        let mut result = EngineResult::new(text, confidence, EngineKind::Cloud)
            .with_diagnostic("model", self.model.clone());
        if recovered {
            result = result.with_diagnostic("recovery", "raw-lines-fallback");
        }
        Ok(result)
    }
}

/// Parse the model's `{"lines": [...]}` payload. When the payload is not
/// valid JSON the raw content (fences stripped) is kept line by line, since
/// a partial answer beats a discarded one. Returns the text and whether the
/// fallback was taken.
fn extract_card_lines(content: &str) -> (String, bool) {
    let stripped = strip_code_fences(content);

    if let Ok(payload) = serde_json::from_str::<LinesPayload>(stripped) {
        let text = payload
            .lines
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        return (text, false);
    }

    let text = stripped
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && *l != "{" && *l != "}")
        .collect::<Vec<_>>()
        .join("\n");
    (text, true)
}

fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag after the opening fence.
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.trim_end_matches('`').trim()
}
