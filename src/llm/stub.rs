// Scripted backend for tests: replays queued replies and records every request

use crate::llm::provider::LLMAdapter;
use crate::types::{AppError, AppResult, LLMRequest, LLMResponse, TokenUsage, ToolCall};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Default)]
pub struct ScriptedAdapter {
    replies: Mutex<VecDeque<AppResult<LLMResponse>>>,
    requests: Mutex<Vec<LLMRequest>>,
}

impl ScriptedAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply_text(self, content: &str) -> Self {
        self.push(Ok(text_response(content)))
    }

    pub fn reply_tool_calls(self, calls: Vec<ToolCall>) -> Self {
        self.push(Ok(LLMResponse {
            content: String::new(),
            tool_calls: calls,
            finish_reason: "tool_calls".to_string(),
            usage: TokenUsage::default(),
        }))
    }

    pub fn reply_error(self, message: &str) -> Self {
        self.push(Err(AppError::LLMApi(message.to_string())))
    }

    fn push(self, reply: AppResult<LLMResponse>) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn requests(&self) -> Vec<LLMRequest> {
        self.requests.lock().unwrap().clone()
    }
}

pub fn text_response(content: &str) -> LLMResponse {
    LLMResponse {
        content: content.to_string(),
        tool_calls: Vec::new(),
        finish_reason: "stop".to_string(),
        usage: TokenUsage::default(),
    }
}

#[async_trait]
impl LLMAdapter for ScriptedAdapter {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::LLMApi("script exhausted".to_string())))
    }
}
