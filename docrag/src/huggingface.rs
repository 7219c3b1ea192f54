//! Answer generator backed by Hugging Face chat completions.
//!
//! This module is only available when the `huggingface` feature is enabled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{RagError, Result};
use crate::generator::{GenerationRequest, Generator};
use crate::http::post_json;

const DEFAULT_BASE_URL: &str = "https://router.huggingface.co/v1";
const DEFAULT_MODEL: &str = "Qwen/Qwen2.5-Coder-32B-Instruct";
const PROVIDER: &str = "HuggingFace";

/// A [`Generator`] calling the OpenAI-style `/chat/completions` route of the
/// Hugging Face inference router.
///
/// The request carries two messages: the system prompt and a user turn built
/// by [`GenerationRequest::user_prompt`].
///
/// # Example
///
/// ```rust,ignore
/// use docrag::huggingface::HuggingFaceGenerator;
///
/// let generator = HuggingFaceGenerator::from_env()?;
/// let answer = generator.generate(&GenerationRequest::new(question, context)).await?;
/// ```
pub struct HuggingFaceGenerator {
    client: reqwest::Client,
    token: String,
    base_url: String,
    model: String,
}

impl HuggingFaceGenerator {
    /// # Errors
    ///
    /// Returns [`RagError::GenerationError`] if `token` is empty.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.is_empty() {
            return Err(unavailable("access token must not be empty"));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            token,
            base_url: DEFAULT_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
        })
    }

    /// Create a generator using the `HF_TOKEN` environment variable.
    pub fn from_env() -> Result<Self> {
        let token = std::env::var("HF_TOKEN")
            .map_err(|_| unavailable("HF_TOKEN environment variable not set"))?;
        Self::new(token)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

fn unavailable(message: impl Into<String>) -> RagError {
    RagError::GenerationError { provider: PROVIDER.into(), message: message.into() }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl Generator for HuggingFaceGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let user_prompt = request.user_prompt();
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage { role: "system", content: &request.system_prompt },
                ChatMessage { role: "user", content: &user_prompt },
            ],
            max_tokens: request.max_tokens,
        };
        let url = format!("{}/chat/completions", self.base_url);

        debug!(
            provider = PROVIDER,
            model = %self.model,
            context_chunks = request.context.len(),
            "requesting completion"
        );

        let response: ChatResponse =
            post_json(&self.client, &url, &self.token, &body).await.map_err(|message| {
                error!(provider = PROVIDER, model = %self.model, %message, "request failed");
                unavailable(message)
            })?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| unavailable("API returned no completion"))
    }
}
