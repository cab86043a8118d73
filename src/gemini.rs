//! Gemini Inference Client
//!
//! Wraps Google's OpenAI-compatible `/chat/completions` endpoint. One
//! request/response exchange per call; endpoint failures (auth, network,
//! malformed response) surface as `Error::ModelEndpoint` and are never
//! retried or classified further.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::types::{
    ChatMessage, ChatRole, InferenceClient, InferenceOptions, InferenceResponse,
    InferenceToolCall, InferenceToolCallFunction, TokenUsage,
};

/// Inference client for OpenAI-compatible chat completions against Gemini.
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    http: Client,
}

impl GeminiClient {
    /// Create a new inference client.
    ///
    /// * `base_url` - OpenAI-compatible base URL
    ///   (e.g. `https://generativelanguage.googleapis.com/v1beta/openai`).
    /// * `api_key` - API key sent as a bearer token.
    /// * `model` - Model identifier (e.g. `gemini-2.0-flash`).
    /// * `max_tokens` - Default max tokens per completion.
    pub fn new(base_url: String, api_key: String, model: String, max_tokens: u32) -> Self {
        Self {
            base_url,
            api_key,
            model,
            max_tokens,
            http: Client::new(),
        }
    }
}

#[async_trait]
impl InferenceClient for GeminiClient {
    async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        options: Option<InferenceOptions>,
    ) -> Result<InferenceResponse> {
        let token_limit = options
            .as_ref()
            .and_then(|o| o.max_tokens)
            .unwrap_or(self.max_tokens);

        let formatted_messages: Vec<Value> = messages.iter().map(format_message).collect();

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": formatted_messages,
            "max_tokens": token_limit,
            "stream": false,
        });

        if let Some(ref opts) = options {
            if let Some(temp) = opts.temperature {
                body["temperature"] = serde_json::json!(temp);
            }
            if let Some(ref tool_defs) = opts.tools {
                if !tool_defs.is_empty() {
                    body["tools"] = serde_json::json!(tool_defs);
                    body["tool_choice"] = serde_json::json!("auto");
                }
            }
        }

        let url = format!("{}/chat/completions", self.base_url);
        let resp = self
            .http
            .post(&url)
            .header("Content-Type", "application/json")
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::ModelEndpoint(format!("request failed: {}", e)))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(Error::ModelEndpoint(format!(
                "{}: {}",
                status.as_u16(),
                text
            )));
        }

        let data: Value = resp
            .json()
            .await
            .map_err(|e| Error::ModelEndpoint(format!("failed to parse response: {}", e)))?;

        parse_response(&data, &self.model)
    }

    fn model(&self) -> String {
        self.model.clone()
    }
}

/// Decode the OpenAI-compatible completion JSON into an `InferenceResponse`.
fn parse_response(data: &Value, requested_model: &str) -> Result<InferenceResponse> {
    let choice = data["choices"]
        .get(0)
        .ok_or_else(|| Error::ModelEndpoint("no completion choice returned".to_string()))?;

    let message = &choice["message"];

    let usage = TokenUsage {
        prompt_tokens: data["usage"]["prompt_tokens"].as_u64().unwrap_or(0),
        completion_tokens: data["usage"]["completion_tokens"].as_u64().unwrap_or(0),
        total_tokens: data["usage"]["total_tokens"].as_u64().unwrap_or(0),
    };

    let tool_calls: Option<Vec<InferenceToolCall>> = message["tool_calls"].as_array().map(|tcs| {
        tcs.iter()
            .map(|tc| InferenceToolCall {
                id: tc["id"].as_str().unwrap_or("").to_string(),
                call_type: "function".to_string(),
                function: InferenceToolCallFunction {
                    name: tc["function"]["name"].as_str().unwrap_or("").to_string(),
                    arguments: tc["function"]["arguments"]
                        .as_str()
                        .unwrap_or("{}")
                        .to_string(),
                },
            })
            .collect()
    });

    let role = match message["role"].as_str().unwrap_or("assistant") {
        "system" => ChatRole::System,
        "user" => ChatRole::User,
        "tool" => ChatRole::Tool,
        _ => ChatRole::Assistant,
    };

    let response_message = ChatMessage {
        role,
        content: message["content"].as_str().unwrap_or("").to_string(),
        name: message["name"].as_str().map(|s| s.to_string()),
        tool_calls: tool_calls.clone(),
        tool_call_id: message["tool_call_id"].as_str().map(|s| s.to_string()),
    };

    Ok(InferenceResponse {
        id: data["id"].as_str().unwrap_or("").to_string(),
        model: data["model"].as_str().unwrap_or(requested_model).to_string(),
        message: response_message,
        tool_calls,
        usage,
        finish_reason: choice["finish_reason"].as_str().unwrap_or("stop").to_string(),
    })
}

/// Format a `ChatMessage` into the JSON shape the wire protocol expects.
fn format_message(msg: &ChatMessage) -> Value {
    let mut formatted = serde_json::json!({
        "role": msg.role,
        "content": msg.content,
    });

    if let Some(ref name) = msg.name {
        formatted["name"] = serde_json::json!(name);
    }

    if let Some(ref tool_calls) = msg.tool_calls {
        let tc_json: Vec<Value> = tool_calls
            .iter()
            .map(|tc| {
                serde_json::json!({
                    "id": tc.id,
                    "type": tc.call_type,
                    "function": {
                        "name": tc.function.name,
                        "arguments": tc.function.arguments,
                    }
                })
            })
            .collect();
        formatted["tool_calls"] = serde_json::json!(tc_json);
    }

    if let Some(ref tool_call_id) = msg.tool_call_id {
        formatted["tool_call_id"] = serde_json::json!(tool_call_id);
    }

    formatted
}
