//! AzureOpenAiProvider -- concrete [`CompletionProvider`] for the Azure
//! OpenAI chat-completions REST API.
//!
//! Sends non-streaming requests to
//! `{endpoint}/openai/deployments/{deployment}/chat/completions` with the
//! `api-key` header. The key is wrapped in [`secrecy::SecretString`] and is
//! never logged or included in `Debug` output.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use logsage_core::llm::provider::CompletionProvider;
use logsage_types::config::LlmConfig;
use logsage_types::llm::{CompletionRequest, CompletionResponse, LlmError, Usage};

/// Azure OpenAI completion provider.
pub struct AzureOpenAiProvider {
    client: reqwest::Client,
    api_key: SecretString,
    endpoint: String,
    deployment: String,
    api_version: String,
}

/// Wire request body for the chat-completions endpoint.
#[derive(Debug, Serialize)]
struct ChatCompletionsRequest {
    messages: Vec<WireMessage>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionsResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

impl AzureOpenAiProvider {
    /// Create a new provider from connection config and an API key.
    pub fn new(config: &LlmConfig, api_key: SecretString) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            api_key,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            deployment: config.deployment.clone(),
            api_version: config.api_version.clone(),
        }
    }

    /// Override the endpoint (useful for tests and proxies).
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    fn url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, self.deployment, self.api_version
        )
    }

    fn to_wire_request(request: &CompletionRequest) -> ChatCompletionsRequest {
        ChatCompletionsRequest {
            messages: request
                .messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role.to_string(),
                    content: m.content.clone(),
                })
                .collect(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }
}

impl CompletionProvider for AzureOpenAiProvider {
    fn name(&self) -> &str {
        "azure-openai"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = Self::to_wire_request(request);

        let response = self
            .client
            .post(self.url())
            .header("api-key", self.api_key.expose_secret())
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Provider {
                message: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => LlmError::AuthenticationFailed,
                429 => LlmError::RateLimited,
                400 => LlmError::InvalidRequest(error_body),
                _ => LlmError::Provider {
                    message: format!("HTTP {status}: {error_body}"),
                },
            });
        }

        let wire: ChatCompletionsResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Deserialization(format!("failed to parse response: {e}")))?;

        // None content (an empty choice list or a null message) is passed
        // through; the orchestrator decides whether that is fatal for the
        // step it is on.
        let content = wire.choices.into_iter().next().and_then(|c| c.message.content);
        let usage = wire.usage.unwrap_or_default();

        Ok(CompletionResponse {
            content,
            usage: Usage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logsage_types::llm::Message;

    fn make_provider() -> AzureOpenAiProvider {
        AzureOpenAiProvider::new(
            &LlmConfig {
                endpoint: "https://example.openai.azure.com/".to_string(),
                deployment: "gpt-4o".to_string(),
                api_version: "2024-06-01".to_string(),
            },
            SecretString::from("test-key-not-real"),
        )
    }

    #[test]
    fn test_provider_name() {
        assert_eq!(make_provider().name(), "azure-openai");
    }

    #[test]
    fn test_url_strips_trailing_slash() {
        assert_eq!(
            make_provider().url(),
            "https://example.openai.azure.com/openai/deployments/gpt-4o/chat/completions?api-version=2024-06-01"
        );
    }

    #[test]
    fn test_wire_request_shape() {
        let request = CompletionRequest {
            model: "gpt-4o".to_string(),
            messages: vec![Message::system("instructions"), Message::user("question")],
            max_tokens: 1024,
            temperature: Some(0.0),
        };
        let wire = AzureOpenAiProvider::to_wire_request(&request);
        let json = serde_json::to_string(&wire).unwrap();
        assert!(json.contains("\"role\":\"system\""));
        assert!(json.contains("\"role\":\"user\""));
        assert!(json.contains("\"max_tokens\":1024"));
    }

    #[test]
    fn test_response_with_null_content() {
        let wire: ChatCompletionsResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(wire.choices[0].message.content.is_none());
    }

    #[test]
    fn test_response_with_usage() {
        let wire: ChatCompletionsResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"content":"hi"}}],"usage":{"prompt_tokens":10,"completion_tokens":2}}"#,
        )
        .unwrap();
        assert_eq!(wire.usage.unwrap().prompt_tokens, 10);
    }
}
