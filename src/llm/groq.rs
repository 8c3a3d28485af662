use crate::llm::provider::LLMAdapter;
use crate::types::{AppResult, LLMRequest, LLMResponse};
use async_trait::async_trait;
use std::time::Duration;

pub const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";

pub struct GroqAdapter {
    inner: crate::llm::openai::OpenAICompatAdapter,
}

impl GroqAdapter {
    pub fn new(api_key: &str, timeout: Duration) -> Self {
        Self {
            inner: crate::llm::openai::OpenAICompatAdapter::new_with_api_base(api_key, GROQ_API_BASE, timeout),
        }
    }
}

#[async_trait]
impl LLMAdapter for GroqAdapter {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        self.inner.create_chat_completion(request).await
    }
}

/// Groq-hosted models with tool-use support
pub mod models {
    pub const LLAMA_3_3_70B: &str = "llama-3.3-70b-versatile";

    pub const DEFAULT: &str = LLAMA_3_3_70B;
}
