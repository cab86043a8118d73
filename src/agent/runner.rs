//! The Agent Runner
//!
//! One bounded tool-calling loop per request: send the conversation and
//! tool definitions to the model, execute any tool calls it returns, feed
//! the results back, and stop at the first plain-text answer. Exactly one
//! `AgentOutcome` per request; model errors propagate unchanged.

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::types::{
    AgentOutcome, ChatMessage, ChatRole, InferenceClient, InferenceOptions, ReasoningStep,
    TokenUsage, ToolContext,
};

use super::system_prompt::build_system_prompt;
use super::tools::{create_builtin_tools, execute_tool, tools_to_inference_format, BuiltinTool};

/// Maximum inference rounds before the loop gives up without an answer.
const MAX_TOOL_ROUNDS: usize = 8;

/// Maximum tool calls executed from a single model response.
const MAX_TOOL_CALLS_PER_ROUND: usize = 10;

/// Binds the model endpoint, the system instruction and the two tools
/// into one invocable agent.
pub struct AgentRunner {
    inference: Arc<dyn InferenceClient>,
    tools: Vec<BuiltinTool>,
    context: ToolContext,
    instruction: String,
    capture_steps: bool,
}

impl AgentRunner {
    pub fn new(inference: Arc<dyn InferenceClient>, context: ToolContext, capture_steps: bool) -> Self {
        Self {
            inference,
            tools: create_builtin_tools(),
            context,
            instruction: build_system_prompt(),
            capture_steps,
        }
    }

    /// Run one request through the agent. Returns the final answer, the
    /// captured steps (when enabled) and the accumulated token usage.
    pub async fn run(&self, request: &str) -> Result<AgentOutcome> {
        let mut messages = vec![
            ChatMessage::text(ChatRole::System, self.instruction.clone()),
            ChatMessage::text(ChatRole::User, request),
        ];

        let tool_defs = tools_to_inference_format(&self.tools);
        let mut steps: Vec<ReasoningStep> = Vec::new();
        let mut usage = TokenUsage::default();

        for round in 1..=MAX_TOOL_ROUNDS {
            info!(
                "[THINK] calling {} (round {}/{})",
                self.inference.model(),
                round,
                MAX_TOOL_ROUNDS
            );

            let options = InferenceOptions {
                tools: Some(tool_defs.clone()),
                ..Default::default()
            };

            let response = self.inference.chat(messages.clone(), Some(options)).await?;
            usage.add(&response.usage);

            let tool_calls = response.tool_calls.clone().unwrap_or_default();

            if tool_calls.is_empty() {
                if response.message.content.is_empty() {
                    return Err(Error::ModelEndpoint(
                        "model returned neither an answer nor a tool call".to_string(),
                    ));
                }
                info!("[ANSWER] {}", preview(&response.message.content, 200));
                return Ok(AgentOutcome {
                    final_text: response.message.content,
                    steps,
                    usage,
                });
            }

            // Keep the assistant's tool-call message in the transcript so the
            // follow-up tool results attach to it.
            messages.push(response.message.clone());

            for (call_count, tc) in tool_calls.iter().enumerate() {
                if call_count >= MAX_TOOL_CALLS_PER_ROUND {
                    warn!(
                        "[TOOLS] max tool calls per round reached ({})",
                        MAX_TOOL_CALLS_PER_ROUND
                    );
                    // Every call in the assistant message still needs a
                    // tool-role reply or the endpoint rejects the transcript.
                    for skipped in &tool_calls[call_count..] {
                        messages.push(ChatMessage {
                            role: ChatRole::Tool,
                            content: format!(
                                "ERROR: not executed, max tool calls per round is {}",
                                MAX_TOOL_CALLS_PER_ROUND
                            ),
                            name: Some(skipped.function.name.clone()),
                            tool_calls: None,
                            tool_call_id: Some(skipped.id.clone()),
                        });
                    }
                    break;
                }

                let args: serde_json::Value =
                    serde_json::from_str(&tc.function.arguments).unwrap_or_default();

                let call_desc = format!(
                    "{}({})",
                    tc.function.name,
                    preview(&serde_json::to_string(&args).unwrap_or_default(), 100)
                );
                info!("[TOOL] {}", call_desc);

                let mut result =
                    execute_tool(&tc.function.name, &args, &self.tools, &self.context).await;
                // Match the ID the model assigned to this call.
                result.id = tc.id.clone();

                let payload = match result.error {
                    Some(ref err) => format!("ERROR: {}", err),
                    None => result.result.clone(),
                };
                info!("[TOOL RESULT] {}: {}", tc.function.name, preview(&payload, 200));

                if self.capture_steps {
                    steps.push(ReasoningStep {
                        input: call_desc,
                        output: payload.clone(),
                    });
                }

                messages.push(ChatMessage {
                    role: ChatRole::Tool,
                    content: payload,
                    name: Some(tc.function.name.clone()),
                    tool_calls: None,
                    tool_call_id: Some(tc.id.clone()),
                });
            }
        }

        Err(Error::ModelEndpoint(format!(
            "no final answer after {} tool rounds",
            MAX_TOOL_ROUNDS
        )))
    }
}

/// Truncate a string for log output, respecting char boundaries.
fn preview(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::records::user_records;
    use crate::types::{
        InferenceResponse, InferenceToolCall, InferenceToolCallFunction, SearchProvider,
        SearchResult,
    };

    struct StubSearch;

    #[async_trait]
    impl SearchProvider for StubSearch {
        async fn search(&self, _query: &str) -> crate::error::Result<Vec<SearchResult>> {
            Ok(vec![])
        }
    }

    /// Inference client that replays a fixed script of responses and
    /// records every message transcript it was called with.
    struct ScriptedClient {
        responses: Mutex<VecDeque<InferenceResponse>>,
        transcripts: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl ScriptedClient {
        fn new(responses: Vec<InferenceResponse>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                transcripts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl InferenceClient for ScriptedClient {
        async fn chat(
            &self,
            messages: Vec<ChatMessage>,
            _options: Option<InferenceOptions>,
        ) -> crate::error::Result<InferenceResponse> {
            self.transcripts.lock().unwrap().push(messages);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| Error::ModelEndpoint("script exhausted".to_string()))
        }

        fn model(&self) -> String {
            "scripted".to_string()
        }
    }

    fn text_response(content: &str) -> InferenceResponse {
        InferenceResponse {
            id: "r".to_string(),
            model: "scripted".to_string(),
            message: ChatMessage::text(ChatRole::Assistant, content),
            tool_calls: None,
            usage: TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            },
            finish_reason: "stop".to_string(),
        }
    }

    fn tool_response(name: &str, arguments: serde_json::Value) -> InferenceResponse {
        let call = InferenceToolCall {
            id: "call_1".to_string(),
            call_type: "function".to_string(),
            function: InferenceToolCallFunction {
                name: name.to_string(),
                arguments: arguments.to_string(),
            },
        };
        InferenceResponse {
            id: "r".to_string(),
            model: "scripted".to_string(),
            message: ChatMessage {
                role: ChatRole::Assistant,
                content: String::new(),
                name: None,
                tool_calls: Some(vec![call.clone()]),
                tool_call_id: None,
            },
            tool_calls: Some(vec![call]),
            usage: TokenUsage::default(),
            finish_reason: "tool_calls".to_string(),
        }
    }

    fn many_calls_response(count: usize) -> InferenceResponse {
        let calls: Vec<InferenceToolCall> = (1..=count)
            .map(|i| InferenceToolCall {
                id: format!("call_{}", i),
                call_type: "function".to_string(),
                function: InferenceToolCallFunction {
                    name: "get_user_data".to_string(),
                    arguments: json!({ "min_age": 20 }).to_string(),
                },
            })
            .collect();
        InferenceResponse {
            id: "r".to_string(),
            model: "scripted".to_string(),
            message: ChatMessage {
                role: ChatRole::Assistant,
                content: String::new(),
                name: None,
                tool_calls: Some(calls.clone()),
                tool_call_id: None,
            },
            tool_calls: Some(calls),
            usage: TokenUsage::default(),
            finish_reason: "tool_calls".to_string(),
        }
    }

    fn runner(client: Arc<ScriptedClient>, capture_steps: bool) -> AgentRunner {
        let context = ToolContext {
            records: user_records(),
            search: Arc::new(StubSearch),
        };
        AgentRunner::new(client, context, capture_steps)
    }

    #[tokio::test]
    async fn test_plain_answer_needs_no_tools() {
        let client = Arc::new(ScriptedClient::new(vec![text_response("Salaam beta!")]));
        let outcome = runner(client.clone(), true)
            .run("Just say hello")
            .await
            .unwrap();

        assert_eq!(outcome.final_text, "Salaam beta!");
        assert!(outcome.steps.is_empty());
        assert_eq!(client.transcripts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_tool_round_feeds_results_back_to_model() {
        let client = Arc::new(ScriptedClient::new(vec![
            tool_response("get_user_data", json!({ "min_age": 20 })),
            text_response("Zainscity is a great match!"),
        ]));
        let outcome = runner(client.clone(), true)
            .run("Find a match of 20 minimum age")
            .await
            .unwrap();

        assert_eq!(outcome.final_text, "Zainscity is a great match!");
        assert_eq!(outcome.steps.len(), 1);
        assert!(outcome.steps[0].input.starts_with("get_user_data("));
        assert!(outcome.steps[0].output.contains("Zainscity"));

        // The second call must carry the tool result as a tool-role message.
        let transcripts = client.transcripts.lock().unwrap();
        assert_eq!(transcripts.len(), 2);
        let tool_msg = transcripts[1]
            .iter()
            .find(|m| m.role == ChatRole::Tool)
            .expect("tool result message missing");
        assert!(tool_msg.content.contains("Zainscity"));
        assert_eq!(tool_msg.tool_call_id.as_deref(), Some("call_1"));
    }

    #[tokio::test]
    async fn test_steps_not_captured_when_disabled() {
        let client = Arc::new(ScriptedClient::new(vec![
            tool_response("get_user_data", json!({ "min_age": 2 })),
            text_response("done"),
        ]));
        let outcome = runner(client, false).run("anything").await.unwrap();
        assert!(outcome.steps.is_empty());
    }

    #[tokio::test]
    async fn test_model_error_propagates_unchanged() {
        let client = Arc::new(ScriptedClient::new(vec![]));
        let err = runner(client, false).run("anything").await.unwrap_err();
        assert!(matches!(err, Error::ModelEndpoint(_)));
    }

    #[tokio::test]
    async fn test_round_cap_ends_the_loop() {
        let responses = (0..MAX_TOOL_ROUNDS + 2)
            .map(|_| tool_response("get_user_data", json!({ "min_age": 2 })))
            .collect();
        let client = Arc::new(ScriptedClient::new(responses));
        let err = runner(client.clone(), false).run("loop forever").await.unwrap_err();
        assert!(err.to_string().contains("tool rounds"));
        assert_eq!(client.transcripts.lock().unwrap().len(), MAX_TOOL_ROUNDS);
    }

    #[tokio::test]
    async fn test_usage_accumulates_across_rounds() {
        let client = Arc::new(ScriptedClient::new(vec![
            tool_response("get_user_data", json!({ "min_age": 20 })),
            text_response("final"),
        ]));
        let outcome = runner(client, false).run("anything").await.unwrap();
        assert_eq!(outcome.usage.total_tokens, 15);
    }

    #[tokio::test]
    async fn test_every_tool_call_gets_a_reply_even_past_the_cap() {
        let client = Arc::new(ScriptedClient::new(vec![
            many_calls_response(MAX_TOOL_CALLS_PER_ROUND + 3),
            text_response("done"),
        ]));
        let outcome = runner(client.clone(), false).run("anything").await.unwrap();
        assert_eq!(outcome.final_text, "done");

        // The follow-up transcript must answer every call id, including
        // the ones the cap kept from executing.
        let transcripts = client.transcripts.lock().unwrap();
        let follow_up = &transcripts[1];
        let assistant = follow_up
            .iter()
            .find(|m| m.role == ChatRole::Assistant && m.tool_calls.is_some())
            .expect("assistant tool-call message missing");
        for call in assistant.tool_calls.as_ref().unwrap() {
            let reply = follow_up
                .iter()
                .find(|m| {
                    m.role == ChatRole::Tool && m.tool_call_id.as_deref() == Some(call.id.as_str())
                })
                .expect("tool call left without a reply");
            if call.id == format!("call_{}", MAX_TOOL_CALLS_PER_ROUND + 1) {
                assert!(reply.content.starts_with("ERROR: not executed"));
            }
        }
        let tool_replies = follow_up.iter().filter(|m| m.role == ChatRole::Tool).count();
        assert_eq!(tool_replies, MAX_TOOL_CALLS_PER_ROUND + 3);
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        let s = "مرحبا بكم في عالم الرشتة";
        let p = preview(s, 10);
        assert!(p.ends_with("..."));
        assert!(p.len() <= 14);
    }
}
