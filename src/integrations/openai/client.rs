// src/integrations/openai/client.rs
//
// Chat-completions client backing the assistant action.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::integrations::backend::{AssistantBackend, TransportFailure};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiClientConfig {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for OpenAiClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct OpenAiClient {
    config: OpenAiClientConfig,
    http_client: Client,
}

impl OpenAiClient {
    pub fn new(config: OpenAiClientConfig) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Transport(e.into()))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn request_body(&self, prompt: &str) -> serde_json::Value {
        json!({
            "model": self.config.model,
            "messages": [
                { "role": "user", "content": prompt }
            ]
        })
    }

    fn first_answer(response: ChatResponse) -> Result<String, TransportFailure> {
        response
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| TransportFailure::Other("Assistant returned no answer".to_string()))
    }
}

#[async_trait]
impl AssistantBackend for OpenAiClient {
    async fn ask(&self, api_key: &str, prompt: &str) -> Result<String, TransportFailure> {
        let response = self
            .http_client
            .post(self.completions_url())
            .header(header::CONTENT_TYPE, "application/json")
            .bearer_auth(api_key)
            .json(&self.request_body(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|envelope| envelope.error.message)
                .unwrap_or_else(|_| status.to_string());
            return Err(TransportFailure::status(status.as_u16(), message));
        }

        let body = response.text().await?;
        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            TransportFailure::Other(format!("Failed to parse assistant response: {}", e))
        })?;

        Self::first_answer(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body() {
        let client = OpenAiClient::new(OpenAiClientConfig::default()).unwrap();
        let body = client.request_body("Tell me about Alien");

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "Tell me about Alien");
        assert_eq!(
            client.completions_url(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_first_answer_is_trimmed() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"  A classic.\n"}}]}"#,
        )
        .unwrap();
        assert_eq!(OpenAiClient::first_answer(response).unwrap(), "A classic.");
    }

    #[test]
    fn test_no_choices_is_a_failure() {
        let response: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            OpenAiClient::first_answer(response),
            Err(TransportFailure::Other(_))
        ));
    }
}
