use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use crate::config::LLMConfig;
use crate::types::{AppResult, LLMRequest, LLMResponse};

#[async_trait]
pub trait LLMAdapter: Send + Sync {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse>;
}

/// Build the backend adapter described by the configuration.
///
/// The default base URL selects the Groq adapter; any other base is treated as
/// a generic OpenAI-compatible endpoint.
pub fn adapter_from_config(config: &LLMConfig) -> Arc<dyn LLMAdapter> {
    let timeout = Duration::from_secs(config.timeout_secs);

    if config.api_base == crate::llm::groq::GROQ_API_BASE {
        Arc::new(crate::llm::groq::GroqAdapter::new(&config.api_key, timeout))
    } else {
        Arc::new(crate::llm::openai::OpenAICompatAdapter::new_with_api_base(
            &config.api_key,
            &config.api_base,
            timeout,
        ))
    }
}
