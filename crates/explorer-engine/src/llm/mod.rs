//! Three concrete `LlmClient` implementations behind one capability set,
//! selected by `LlmProviderKind` at session construction.

mod anthropic;
mod gemini;
mod openai;
pub mod prompt;

pub use anthropic::AnthropicClient;
pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

use std::time::Duration;

use explorer_types::LlmProviderKind;

use crate::error::{ExplorerError, Result};
use crate::traits::LlmClient;

/// Shared HTTP-client construction parameters for all three providers.
#[derive(Clone, Debug)]
pub struct LlmClientConfig {
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

pub fn build_client(kind: LlmProviderKind, config: LlmClientConfig) -> Result<Box<dyn LlmClient>> {
    if config.api_key.is_empty() {
        return Err(ExplorerError::Config(format!(
            "missing API key for {kind:?} provider"
        )));
    }
    match kind {
        LlmProviderKind::OpenAi => Ok(Box::new(OpenAiClient::new(config)?)),
        LlmProviderKind::Anthropic => Ok(Box::new(AnthropicClient::new(config)?)),
        LlmProviderKind::Gemini => Ok(Box::new(GeminiClient::new(config)?)),
    }
}
