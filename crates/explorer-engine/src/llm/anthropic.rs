use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{ExplorerError, Result};
use crate::traits::{LlmClient, LlmCompletion};

use super::LlmClientConfig;

pub struct AnthropicClient {
    client: Client,
    config: LlmClientConfig,
    api_base: String,
}

impl AnthropicClient {
    pub fn new(config: LlmClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ExplorerError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            config,
            api_base: "https://api.anthropic.com/v1".to_string(),
        })
    }
}

#[derive(Serialize)]
struct MessageRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessageResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize, Default)]
struct Usage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(&self, system: &str, user: &str, temperature: f32) -> Result<LlmCompletion> {
        let body = MessageRequest {
            model: &self.config.model,
            max_tokens: 4096,
            temperature,
            system,
            messages: vec![Message { role: "user", content: user }],
        };

        let response = self
            .client
            .post(format!("{}/messages", self.api_base))
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&body)
            .send()
            .await
            .map_err(|e| ExplorerError::Llm(format!("Anthropic request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ExplorerError::Llm(format!(
                "Anthropic returned {status}: {text}"
            )));
        }

        let parsed: MessageResponse = response
            .json()
            .await
            .map_err(|e| ExplorerError::Llm(format!("malformed Anthropic response: {e}")))?;

        let text = parsed
            .content
            .into_iter()
            .map(|b| b.text)
            .collect::<Vec<_>>()
            .join("");

        let (input_tokens, output_tokens) = parsed
            .usage
            .map(|u| (u.input_tokens, u.output_tokens))
            .unwrap_or((0, 0));

        Ok(LlmCompletion { text, input_tokens, output_tokens })
    }
}
