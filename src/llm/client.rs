//! Client for the external text-generation service
//!
//! Every prompt the tool sends goes through a `TextGenerator`. The HTTP
//! implementation speaks the OpenAI chat-completions shape; tests substitute
//! a scripted generator.

use crate::config::ServiceConfig;
use crate::error::{Result, TailorError};
use log::{debug, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// Model parameters sent with every request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl From<&ServiceConfig> for GenerationOptions {
    fn from(config: &ServiceConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system: String,
    pub prompt: String,
    pub options: GenerationOptions,
}

impl GenerationRequest {
    pub fn new(system: &str, prompt: String, options: &GenerationOptions) -> Self {
        Self {
            system: system.to_string(),
            prompt,
            options: options.clone(),
        }
    }
}

pub trait TextGenerator {
    /// One request, one free-text reply. No retries at this level.
    fn generate(&self, request: &GenerationRequest) -> impl Future<Output = Result<String>> + Send;
}

/// Call `generator`, retrying once immediately if the first failure is transient.
pub async fn generate_with_retry<G: TextGenerator>(generator: &G, request: &GenerationRequest) -> Result<String> {
    match generator.generate(request).await {
        Ok(text) => Ok(text),
        Err(e) if e.is_transient() => {
            warn!("Generation failed ({}), retrying once", e);
            generator.generate(request).await
        }
        Err(e) => Err(e),
    }
}

/// Endpoint and credentials. The key is passed in explicitly; nothing here reads the environment.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub endpoint: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl ServiceSettings {
    pub fn new(config: &ServiceConfig, api_key: String) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            api_key,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct HttpGenerator {
    client: Client,
    settings: ServiceSettings,
}

impl HttpGenerator {
    pub fn new(settings: ServiceSettings) -> Result<Self> {
        if settings.api_key.trim().is_empty() {
            return Err(TailorError::Configuration("API key is empty".to_string()));
        }
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| TailorError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, settings })
    }
}

impl TextGenerator for HttpGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let body = ChatRequest {
            model: &request.options.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            temperature: request.options.temperature,
            max_tokens: request.options.max_tokens,
        };

        let response = self
            .client
            .post(&self.settings.endpoint)
            .bearer_auth(&self.settings.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(TailorError::Service {
                message: format!("status {}: {}", status.as_u16(), message),
                transient: status.is_server_error() || status.as_u16() == 408,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        if let Some(usage) = &parsed.usage {
            debug!(
                "Generation succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| TailorError::Service {
                message: "service returned empty content".to_string(),
                transient: false,
            })
    }
}

/// Strips ```json ... ``` or ``` ... ``` fences from a reply.
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = if let Some(stripped) = text.strip_prefix("```json") {
        stripped
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
    } else {
        return text;
    };
    inner
        .trim_start()
        .strip_suffix("```")
        .map(str::trim)
        .unwrap_or_else(|| inner.trim())
}
