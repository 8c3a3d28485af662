//! Generic role runner
//!
//! One function drives every role: system instructions + user prompt go to the
//! backend; if the role has tools and the model asks for them, the calls are
//! executed and their results fed back until the model answers in text.

use super::roles::WorkerRole;
use super::tools::ToolBox;
use crate::llm::LLMAdapter;
use crate::types::{AppError, AppResult, LLMMessage, LLMRequest};
use std::sync::Arc;
use tracing::{debug, info};

const DEFAULT_TEMPERATURE: f32 = 0.7;

pub struct RoleRunner {
    llm: Arc<dyn LLMAdapter>,
    tools: ToolBox,
    max_tool_rounds: usize,
}

impl RoleRunner {
    pub fn new(llm: Arc<dyn LLMAdapter>, tools: ToolBox, max_tool_rounds: usize) -> Self {
        Self {
            llm,
            tools,
            max_tool_rounds,
        }
    }

    /// Run `role` on `prompt` and return its final text answer
    pub async fn run(&self, role: &WorkerRole, prompt: &str) -> AppResult<String> {
        let tools = if role.uses_tools() {
            self.tools.definitions()
        } else {
            Vec::new()
        };

        let mut messages = vec![LLMMessage::system(role.system_prompt()), LLMMessage::user(prompt)];

        for round in 0..=self.max_tool_rounds {
            let request = LLMRequest {
                model: role.model.clone(),
                messages: messages.clone(),
                tools: tools.clone(),
                max_tokens: None,
                temperature: Some(DEFAULT_TEMPERATURE),
            };

            let response = self.llm.create_chat_completion(&request).await?;
            debug!(
                role = role.name,
                round,
                finish_reason = %response.finish_reason,
                total_tokens = response.usage.total_tokens,
                "Backend replied"
            );

            if response.tool_calls.is_empty() || tools.is_empty() {
                let text = response.content.trim();
                if text.is_empty() {
                    return Err(AppError::LLMApi(format!("{} returned an empty response", role.name)));
                }
                return Ok(text.to_string());
            }

            if round == self.max_tool_rounds {
                break;
            }

            info!(role = role.name, calls = response.tool_calls.len(), "Model requested tools");
            let calls = response.tool_calls.clone();
            messages.push(LLMMessage::assistant(response.content, response.tool_calls));
            for call in &calls {
                let output = self.tools.execute(call).await;
                messages.push(LLMMessage::tool(&call.id, output));
            }
        }

        Err(AppError::LLMApi(format!(
            "{} did not produce an answer within {} tool rounds",
            role.name, self.max_tool_rounds
        )))
    }
}
