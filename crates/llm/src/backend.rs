//! OpenAI-compatible chat-completion backend

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use avatar_assistant_config::constants::{endpoints, llm, timeouts};
use avatar_assistant_config::LlmConfig;
use avatar_assistant_core::{
    FinishReason, GenerateRequest, GenerateResponse, LanguageModel, Result as CoreResult,
};

use crate::LlmError;

/// Configuration for OpenAI-compatible backends
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API endpoint (OpenAI: https://api.openai.com/v1)
    pub endpoint: String,
    /// API key
    pub api_key: String,
    /// Model name
    pub model: String,
    /// Maximum tokens to generate when the request does not set a bound
    pub max_tokens: u32,
    /// Temperature (0-2)
    pub temperature: f32,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            endpoint: endpoints::OPENAI_DEFAULT.to_string(),
            api_key: String::new(),
            model: llm::DEFAULT_MODEL.to_string(),
            max_tokens: llm::DEFAULT_MAX_TOKENS,
            temperature: llm::DEFAULT_TEMPERATURE,
            timeout: Duration::from_secs(timeouts::LLM_REQUEST_SECS),
        }
    }
}

impl OpenAIConfig {
    /// Create config for OpenAI
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            ..Default::default()
        }
    }

    /// Build from settings, using the session's API key
    pub fn from_settings(settings: &LlmConfig, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: settings.endpoint.clone(),
            api_key: api_key.into(),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            timeout: Duration::from_secs(settings.timeout_seconds),
        }
    }
}

/// OpenAI-compatible backend
///
/// Works with OpenAI and any server exposing `/chat/completions`.
pub struct OpenAIBackend {
    config: OpenAIConfig,
    client: Client,
}

impl OpenAIBackend {
    /// Create new OpenAI backend
    pub fn new(config: OpenAIConfig) -> Result<Self, LlmError> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::Configuration("API key required".to_string()));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Get the full API URL for chat completions
    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.config.endpoint.trim_end_matches('/'))
    }

    /// Build request headers
    fn build_headers(&self) -> reqwest::header::HeaderMap {
        use reqwest::header::HeaderValue;

        let mut headers = reqwest::header::HeaderMap::new();

        let auth_value = format!("Bearer {}", self.config.api_key);
        if let Ok(val) = HeaderValue::from_str(&auth_value) {
            headers.insert(reqwest::header::AUTHORIZATION, val);
        }

        headers.insert(
            reqwest::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        headers
    }

    fn build_request(&self, request: &GenerateRequest) -> OpenAIChatRequest {
        OpenAIChatRequest {
            model: request
                .model
                .clone()
                .unwrap_or_else(|| self.config.model.clone()),
            messages: request
                .messages
                .iter()
                .map(|m| OpenAIMessage {
                    role: m.role.to_string(),
                    content: m.content.clone(),
                })
                .collect(),
            max_tokens: Some(request.max_tokens.unwrap_or(self.config.max_tokens)),
            temperature: Some(request.temperature.unwrap_or(self.config.temperature)),
        }
    }

    async fn complete(&self, request: &GenerateRequest) -> Result<GenerateResponse, LlmError> {
        let body = self.build_request(request);

        let response = self
            .client
            .post(self.chat_url())
            .headers(self.build_headers())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {}: {}", status, error_text)));
        }

        let response: OpenAIChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("No choices in response".to_string()))?;

        let text = choice
            .message
            .content
            .ok_or_else(|| LlmError::InvalidResponse("Empty message content".to_string()))?;

        Ok(GenerateResponse {
            text,
            finish_reason: match choice.finish_reason.as_deref() {
                Some("length") => FinishReason::Length,
                Some("content_filter") => FinishReason::ContentFilter,
                _ => FinishReason::Stop,
            },
            completion_tokens: response.usage.map(|u| u.completion_tokens),
        })
    }
}

#[async_trait]
impl LanguageModel for OpenAIBackend {
    async fn generate(&self, request: GenerateRequest) -> CoreResult<GenerateResponse> {
        let start = std::time::Instant::now();
        let response = self.complete(&request).await?;

        tracing::debug!(
            model = %self.config.model,
            elapsed_ms = start.elapsed().as_millis() as u64,
            completion_tokens = ?response.completion_tokens,
            "Chat completion finished"
        );

        Ok(response)
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/models", self.config.endpoint.trim_end_matches('/'));
        self.client
            .get(&url)
            .headers(self.build_headers())
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

// OpenAI API types
#[derive(Debug, Serialize)]
struct OpenAIChatRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIChatResponse {
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_config_default() {
        let config = OpenAIConfig::default();
        assert_eq!(config.endpoint, "https://api.openai.com/v1");
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert_eq!(config.max_tokens, 200);
    }

    #[test]
    fn test_openai_backend_creation() {
        let config = OpenAIConfig::default();
        assert!(OpenAIBackend::new(config).is_err());

        let config = OpenAIConfig::openai("sk-xxx", "gpt-4");
        assert!(OpenAIBackend::new(config).is_ok());

        let config = OpenAIConfig {
            endpoint: "http://localhost:8000/v1".to_string(),
            ..OpenAIConfig::openai("not-needed", "llama-3")
        };
        assert!(OpenAIBackend::new(config).is_ok());
    }

    #[test]
    fn test_openai_chat_url() {
        let config = OpenAIConfig::openai("sk-xxx", "gpt-4");
        let backend = OpenAIBackend::new(config).unwrap();
        assert_eq!(backend.chat_url(), "https://api.openai.com/v1/chat/completions");

        let config = OpenAIConfig {
            endpoint: "http://localhost:8000/v1/".to_string(),
            ..OpenAIConfig::openai("not-needed", "llama-3")
        };
        let backend = OpenAIBackend::new(config).unwrap();
        assert_eq!(backend.chat_url(), "http://localhost:8000/v1/chat/completions");
    }

    #[test]
    fn test_request_uses_configured_bounds() {
        let backend = OpenAIBackend::new(OpenAIConfig::openai("sk-xxx", "gpt-3.5-turbo")).unwrap();
        let request = GenerateRequest::new("system text").with_user_message("Hello");

        let json = serde_json::to_value(backend.build_request(&request)).unwrap();
        assert_eq!(json["model"], "gpt-3.5-turbo");
        assert_eq!(json["max_tokens"], 200);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "Hello");
    }

    #[test]
    fn test_from_settings() {
        let settings = LlmConfig {
            max_tokens: 120,
            ..LlmConfig::default()
        };
        let config = OpenAIConfig::from_settings(&settings, "sk-session");
        assert_eq!(config.api_key, "sk-session");
        assert_eq!(config.max_tokens, 120);
        assert_eq!(config.timeout, Duration::from_secs(60));
    }
}
