//! DashScope (Qwen) client for coherence scoring, prompt refinement and
//! frame description.
//!
//! Talks to the OpenAI-compatible chat endpoint. Responses that should be
//! structured are requested as JSON and parsed with markdown-fence
//! stripping, since the models occasionally wrap payloads in code blocks.

use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{MlError, MlResult};
use crate::traits::{CoherenceScore, FrameDescription, LanguageModel, VisionLanguage};
use async_trait::async_trait;
use vguard_models::FrameRef;

const DASHSCOPE_CHAT_URL: &str =
    "https://dashscope.aliyuncs.com/compatible-mode/v1/chat/completions";

/// Text models tried in order until one answers.
const TEXT_MODELS: &[&str] = &["qwen-plus", "qwen-turbo"];

/// Vision-language models tried in order until one answers.
const VISION_MODELS: &[&str] = &["qwen-vl-plus", "qwen-vl-max"];

/// DashScope API client.
pub struct DashScopeClient {
    api_key: String,
    client: Client,
}

/// Chat completion request.
#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: MessageContent,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize)]
struct ImageUrl {
    url: String,
}

/// Chat completion response.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Structured coherence payload the model is asked to return.
#[derive(Debug, Deserialize)]
struct CoherencePayload {
    score: f64,
    #[serde(default)]
    suggestions: Vec<String>,
}

/// Structured description payload the model is asked to return.
#[derive(Debug, Deserialize)]
struct DescriptionPayload {
    description: String,
    #[serde(default)]
    subjects: Vec<String>,
    #[serde(default)]
    style: String,
}

impl DashScopeClient {
    /// Create a new client from the `DASHSCOPE_API_KEY` environment variable.
    pub fn new() -> MlResult<Self> {
        let api_key = std::env::var("DASHSCOPE_API_KEY")
            .map_err(|_| MlError::MissingApiKey("DASHSCOPE_API_KEY not set".to_string()))?;
        Ok(Self::with_api_key(api_key))
    }

    /// Create a client with an explicit key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self {
            api_key: api_key.into(),
            client,
        }
    }

    /// Run one chat completion, trying each model until one succeeds.
    async fn chat(&self, models: &[&str], messages: Vec<ChatMessage>) -> MlResult<String> {
        let mut last_error = None;

        for model in models {
            debug!(model = %model, "DashScope chat attempt");
            let request = ChatRequest {
                model: model.to_string(),
                messages: messages.clone(),
                temperature: 0.1,
            };

            match self.call_chat_api(&request).await {
                Ok(text) => {
                    info!(model = %model, "DashScope chat succeeded");
                    return Ok(text);
                }
                Err(e) => {
                    warn!(model = %model, error = %e, "DashScope model failed");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| MlError::request_failed("all DashScope models failed")))
    }

    async fn call_chat_api(&self, request: &ChatRequest) -> MlResult<String> {
        let response = self
            .client
            .post(DASHSCOPE_CHAT_URL)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| MlError::request_failed(format!("DashScope request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(MlError::Api { status, body });
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| MlError::invalid_response(format!("bad chat payload: {}", e)))?;

        chat.choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| MlError::invalid_response("no choices in chat response"))
    }

    /// Read a frame and wrap it as a base64 data URL for the vision models.
    async fn frame_data_url(&self, frame: &FrameRef) -> MlResult<String> {
        let bytes = tokio::fs::read(frame.path())
            .await
            .map_err(|e| MlError::request_failed(format!("cannot read frame {}: {}", frame, e)))?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        Ok(format!("data:image/jpeg;base64,{}", encoded))
    }
}

/// Strip a ```json ... ``` fence if the model wrapped its payload in one.
fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    text.strip_suffix("```").unwrap_or(text).trim()
}

#[async_trait]
impl LanguageModel for DashScopeClient {
    async fn score_coherence(&self, previous: &str, current: &str) -> MlResult<CoherenceScore> {
        let messages = vec![
            ChatMessage {
                role: "system",
                content: MessageContent::Text(
                    "You are a video continuity analyst. Given two consecutive scene \
                     descriptions, rate how coherently the second follows the first. \
                     Return ONLY a JSON object: {\"score\": <0-100>, \"suggestions\": \
                     [\"...\"]}. Suggestions name concrete fixes, most important first."
                        .to_string(),
                ),
            },
            ChatMessage {
                role: "user",
                content: MessageContent::Text(format!(
                    "Previous scene: {}\nCurrent scene: {}",
                    previous, current
                )),
            },
        ];

        let text = self.chat(TEXT_MODELS, messages).await?;
        let payload: CoherencePayload = serde_json::from_str(strip_code_fence(&text))
            .map_err(|e| MlError::invalid_response(format!("bad coherence payload: {}", e)))?;

        Ok(CoherenceScore {
            score: payload.score.clamp(0.0, 100.0),
            suggestions: payload.suggestions,
        })
    }

    async fn refine_prompt(&self, original: &str, issues: &[String]) -> MlResult<String> {
        let messages = vec![
            ChatMessage {
                role: "system",
                content: MessageContent::Text(
                    "You optimize prompts for a video generation pipeline. Rewrite the \
                     prompt so every listed consistency issue is addressed while the \
                     creative intent is preserved. Return only the rewritten prompt."
                        .to_string(),
                ),
            },
            ChatMessage {
                role: "user",
                content: MessageContent::Text(format!(
                    "Prompt:\n{}\n\nConsistency issues:\n{}",
                    original,
                    issues.join("\n")
                )),
            },
        ];

        let refined = self.chat(TEXT_MODELS, messages).await?;
        let refined = refined.trim();
        if refined.is_empty() {
            return Err(MlError::invalid_response("model returned an empty prompt"));
        }
        Ok(refined.to_string())
    }
}

#[async_trait]
impl VisionLanguage for DashScopeClient {
    async fn describe(&self, frame: &FrameRef) -> MlResult<FrameDescription> {
        let data_url = self.frame_data_url(frame).await?;
        let messages = vec![ChatMessage {
            role: "user",
            content: MessageContent::Parts(vec![
                ContentPart::ImageUrl {
                    image_url: ImageUrl { url: data_url },
                },
                ContentPart::Text {
                    text: "Describe this video frame. Return ONLY a JSON object: \
                           {\"description\": \"...\", \"subjects\": [\"...\"], \
                           \"style\": \"...\"}."
                        .to_string(),
                },
            ]),
        }];

        let text = self.chat(VISION_MODELS, messages).await?;
        let payload: DescriptionPayload = serde_json::from_str(strip_code_fence(&text))
            .map_err(|e| MlError::invalid_response(format!("bad description payload: {}", e)))?;

        Ok(FrameDescription {
            description: payload.description,
            subjects: payload.subjects.into_iter().collect::<BTreeSet<_>>(),
            style: payload.style,
        })
    }
}
