//! Completion service collaborator.
//!
//! The assistant only needs "messages in, text out". [`OpenAiCompatibleClient`]
//! implements that over any OpenAI-style chat-completions endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::CompletionConfig;
use crate::error::CompletionError;

pub const API_KEY_ENV: &str = "SHADOWLIGHT_API_KEY";
pub const FALLBACK_API_KEY_ENV: &str = "GROQ_API_KEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError>;
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

pub struct OpenAiCompatibleClient {
    config: CompletionConfig,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompatibleClient {
    pub fn new(config: CompletionConfig, api_key: impl Into<String>) -> Result<Self, CompletionError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            config,
            api_key: api_key.into(),
            client,
        })
    }

    /// Builds a client from config, taking the API key from the config file
    /// or, failing that, from the environment.
    pub fn from_config(config: &CompletionConfig) -> Result<Self, CompletionError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(api_key_from_env)
            .ok_or(CompletionError::MissingApiKey)?;
        Self::new(config.clone(), api_key)
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

fn api_key_from_env() -> Option<String> {
    [API_KEY_ENV, FALLBACK_API_KEY_ENV]
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|k| !k.trim().is_empty())
}

#[async_trait]
impl CompletionService for OpenAiCompatibleClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError> {
        let payload = CompletionRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        tracing::debug!(
            endpoint = %self.config.endpoint,
            model = %self.config.model,
            messages = messages.len(),
            "sending completion request"
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Status { status, body });
        }

        let resp: CompletionResponse = response.json().await?;
        reply_text(resp)
    }
}

fn reply_text(resp: CompletionResponse) -> Result<String, CompletionError> {
    let choice = resp
        .choices
        .into_iter()
        .next()
        .ok_or(CompletionError::EmptyResponse)?;
    Ok(choice.message.and_then(|m| m.content).unwrap_or_default())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_openai_shape() {
        let messages = vec![ChatMessage::system("be brief"), ChatMessage::user("hi")];
        let req = CompletionRequest {
            model: "m",
            messages: &messages,
            temperature: 0.5,
            max_tokens: 1024,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["model"], "m");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
        assert_eq!(json["max_tokens"], 1024);
    }

    #[test]
    fn reply_text_takes_first_choice() {
        let resp: CompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"hello"}},{"message":{"content":"ignored"}}]}"#,
        )
        .unwrap();
        assert_eq!(reply_text(resp).unwrap(), "hello");
    }

    #[test]
    fn reply_text_without_content_is_empty() {
        let resp: CompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant"}}]}"#).unwrap();
        assert_eq!(reply_text(resp).unwrap(), "");
    }

    #[test]
    fn reply_text_without_choices_is_an_error() {
        let resp: CompletionResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(matches!(reply_text(resp), Err(CompletionError::EmptyResponse)));
    }

    #[test]
    fn config_key_takes_precedence() {
        let config = CompletionConfig {
            api_key: Some("from-config".into()),
            ..Default::default()
        };
        let client = OpenAiCompatibleClient::from_config(&config).unwrap();
        assert_eq!(client.api_key, "from-config");
        assert_eq!(client.model(), "llama-3.1-8b-instant");
    }
}
