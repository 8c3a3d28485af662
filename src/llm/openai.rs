// OpenAI-compatible chat completions adapter
// Works against any endpoint that speaks the /chat/completions wire format
// (Groq, OpenAI, local gateways). Tool calls use the "function" tool type.

use crate::llm::provider::LLMAdapter;
use crate::types::{AppError, AppResult, LLMMessage, LLMRequest, LLMResponse, Role, TokenUsage, ToolCall, ToolDefinition};
use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionMessageToolCall, ChatCompletionMessageToolCalls,
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestToolMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionTool, ChatCompletionTools,
        CreateChatCompletionRequestArgs, FunctionCall, FunctionObjectArgs,
    },
    Client,
};
use async_trait::async_trait;
use std::time::Duration;

pub struct OpenAICompatAdapter {
    client: Client<OpenAIConfig>,
    timeout: Duration,
}

impl OpenAICompatAdapter {
    pub fn new_with_api_base(api_key: &str, api_base: &str, timeout: Duration) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base.trim_end_matches('/'));

        Self {
            client: Client::with_config(config),
            timeout,
        }
    }

    fn convert_message(msg: &LLMMessage) -> Result<ChatCompletionRequestMessage, OpenAIError> {
        let message = match msg.role {
            Role::System => ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(msg.content.clone())
                    .build()?,
            ),
            Role::User => ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(msg.content.clone())
                    .build()?,
            ),
            Role::Assistant => {
                let mut args = ChatCompletionRequestAssistantMessageArgs::default();
                // Assistant turns that only carry tool calls send no content
                if !msg.content.is_empty() || msg.tool_calls.is_empty() {
                    args.content(msg.content.clone());
                }
                if !msg.tool_calls.is_empty() {
                    args.tool_calls(msg.tool_calls.iter().map(to_wire_call).collect::<Vec<_>>());
                }
                ChatCompletionRequestMessage::Assistant(args.build()?)
            }
            Role::Tool => ChatCompletionRequestMessage::Tool(
                ChatCompletionRequestToolMessageArgs::default()
                    .content(msg.content.clone())
                    .tool_call_id(msg.tool_call_id.clone().unwrap_or_default())
                    .build()?,
            ),
        };

        Ok(message)
    }
}

fn to_wire_call(call: &ToolCall) -> ChatCompletionMessageToolCalls {
    ChatCompletionMessageToolCalls::Function(ChatCompletionMessageToolCall {
        id: call.id.clone(),
        function: FunctionCall {
            name: call.name.clone(),
            arguments: call.arguments.clone(),
        },
    })
}

fn convert_tool(tool: &ToolDefinition) -> Result<ChatCompletionTools, OpenAIError> {
    let function = FunctionObjectArgs::default()
        .name(tool.name.clone())
        .description(tool.description.clone())
        .parameters(tool.parameters.clone())
        .build()?;

    Ok(ChatCompletionTools::Function(
        ChatCompletionTool { function },
    ))
}

fn request_error(e: OpenAIError) -> AppError {
    AppError::LLMApi(format!("Request failed: {}", e))
}

#[async_trait]
impl LLMAdapter for OpenAICompatAdapter {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        let messages = request
            .messages
            .iter()
            .map(Self::convert_message)
            .collect::<Result<Vec<_>, _>>()
            .map_err(request_error)?;

        let tools = request
            .tools
            .iter()
            .map(convert_tool)
            .collect::<Result<Vec<_>, _>>()
            .map_err(request_error)?;

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(request.model.as_str()).messages(messages);
        if !tools.is_empty() {
            args.tools(tools);
        }
        if let Some(max_tokens) = request.max_tokens {
            args.max_completion_tokens(max_tokens);
        }
        if let Some(temperature) = request.temperature {
            args.temperature(temperature);
        }
        let body = args.build().map_err(request_error)?;

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(body))
            .await
            .map_err(|_| {
                AppError::LLMApi(format!("Request timed out after {}s", self.timeout.as_secs()))
            })?
            .map_err(request_error)?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::LLMApi("Backend returned no choices".to_string()))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .filter_map(|call| match call {
                ChatCompletionMessageToolCalls::Function(call) => Some(ToolCall {
                    id: call.id,
                    name: call.function.name,
                    arguments: call.function.arguments,
                }),
                _ => None,
            })
            .collect();

        let usage = response
            .usage
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            })
            .unwrap_or_default();

        // FinishReason serializes to the wire name ("stop", "tool_calls", ...)
        let finish_reason = choice
            .finish_reason
            .and_then(|reason| serde_json::to_value(reason).ok())
            .and_then(|value| value.as_str().map(str::to_string))
            .unwrap_or_else(|| "unknown".to_string());

        Ok(LLMResponse {
            content: choice.message.content.unwrap_or_default(),
            tool_calls,
            finish_reason,
            usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn adapter(base: &str) -> OpenAICompatAdapter {
        OpenAICompatAdapter::new_with_api_base("test-key", base, Duration::from_secs(5))
    }

    fn request(tools: Vec<ToolDefinition>) -> LLMRequest {
        LLMRequest {
            model: "llama-3.3-70b-versatile".to_string(),
            messages: vec![LLMMessage::system("be brief"), LLMMessage::user("hi")],
            tools,
            max_tokens: None,
            temperature: Some(0.7),
        }
    }

    fn completion_body(message: &str, finish_reason: &str, usage: &str) -> String {
        format!(
            r#"{{"id":"chatcmpl-1","object":"chat.completion","created":1700000000,
                "model":"llama-3.3-70b-versatile",
                "choices":[{{"index":0,"message":{},"finish_reason":"{}","logprobs":null}}]{}}}"#,
            message, finish_reason, usage
        )
    }

    #[tokio::test]
    async fn test_text_completion() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": "llama-3.3-70b-versatile",
                "messages": [
                    { "role": "system", "content": "be brief" },
                    { "role": "user", "content": "hi" }
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body(
                r#"{"role":"assistant","content":"hello"}"#,
                "stop",
                r#","usage":{"prompt_tokens":3,"completion_tokens":1,"total_tokens":4}"#,
            ))
            .create_async()
            .await;

        let response = adapter(&server.url())
            .create_chat_completion(&request(vec![]))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.content, "hello");
        assert_eq!(response.finish_reason, "stop");
        assert_eq!(response.usage.total_tokens, 4);
        assert!(response.tool_calls.is_empty());
    }

    #[tokio::test]
    async fn test_tool_call_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_body(Matcher::Regex(r#""name":"lookup""#.to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body(
                r#"{"role":"assistant","content":null,
                    "tool_calls":[{"id":"call_1","type":"function","function":{"name":"lookup","arguments":"{\"q\":\"x\"}"}}]}"#,
                "tool_calls",
                "",
            ))
            .create_async()
            .await;

        let tool = ToolDefinition {
            name: "lookup".to_string(),
            description: "look something up".to_string(),
            parameters: serde_json::json!({ "type": "object", "properties": {} }),
        };
        let response = adapter(&server.url())
            .create_chat_completion(&request(vec![tool]))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.content, "");
        assert_eq!(response.finish_reason, "tool_calls");
        assert_eq!(response.tool_calls.len(), 1);
        assert_eq!(response.tool_calls[0].id, "call_1");
        assert_eq!(response.tool_calls[0].name, "lookup");
        assert_eq!(response.tool_calls[0].arguments, r#"{"q":"x"}"#);
    }

    #[tokio::test]
    async fn test_error_body_is_surfaced() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"error":{"message":"Invalid API Key","type":"invalid_request_error","param":null,"code":"invalid_api_key"}}"#,
            )
            .create_async()
            .await;

        let err = adapter(&server.url())
            .create_chat_completion(&request(vec![]))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::LLMApi(_)));
        assert!(err.to_string().contains("Invalid API Key"));
    }

    #[tokio::test]
    async fn test_empty_choices_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"id":"chatcmpl-1","object":"chat.completion","created":1700000000,"model":"m","choices":[]}"#,
            )
            .create_async()
            .await;

        let err = adapter(&server.url())
            .create_chat_completion(&request(vec![]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no choices"));
    }

    #[test]
    fn test_tool_only_assistant_turn_sends_no_content() {
        let msg = LLMMessage::assistant(
            "",
            vec![ToolCall {
                id: "call_1".to_string(),
                name: "lookup".to_string(),
                arguments: "{}".to_string(),
            }],
        );
        let wire = serde_json::to_value(OpenAICompatAdapter::convert_message(&msg).unwrap()).unwrap();
        assert_eq!(wire["role"], "assistant");
        assert!(wire["content"].is_null());
        assert_eq!(wire["tool_calls"][0]["type"], "function");
        assert_eq!(wire["tool_calls"][0]["function"]["name"], "lookup");
    }

    #[test]
    fn test_tool_result_keeps_call_id() {
        let wire = serde_json::to_value(
            OpenAICompatAdapter::convert_message(&LLMMessage::tool("call_9", "result")).unwrap(),
        )
        .unwrap();
        assert_eq!(wire["role"], "tool");
        assert_eq!(wire["tool_call_id"], "call_9");
        assert_eq!(wire["content"], "result");
    }
}
