//! Core Types
//!
//! Data shapes shared across the crate: the matchmaking domain records,
//! the OpenAI-compatible chat/inference plumbing, and the traits behind
//! which the external collaborators (model endpoint, search provider,
//! messaging provider) live.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

// ─── Domain ──────────────────────────────────────────────────────

/// One entry in the fixed, read-only record set the agent filters over.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRecord {
    pub name: String,
    pub age: u32,
}

/// One web search hit, projected to exactly three fields.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResult {
    pub title: String,
    pub href: String,
    pub body: String,
}

/// The final product of one agent invocation. Exactly one per request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentOutcome {
    /// The final textual answer.
    pub final_text: String,
    /// Intermediate tool steps, recorded only when step capture is enabled.
    pub steps: Vec<ReasoningStep>,
    /// Token usage accumulated over all inference rounds.
    pub usage: TokenUsage,
}

/// One intermediate step: what was asked of a tool and what came back.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReasoningStep {
    pub input: String,
    pub output: String,
}

// ─── Tool System ─────────────────────────────────────────────────

/// Result of one tool invocation, fed back to the model verbatim.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
    pub result: String,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Runtime context handed to every tool invocation.
pub struct ToolContext {
    /// The static record set, defined at process start, never mutated.
    pub records: Vec<UserRecord>,
    /// The web search capability.
    pub search: Arc<dyn SearchProvider>,
}

// ─── Inference ───────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
    Tool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<InferenceToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    /// A plain message with no tool metadata.
    pub fn text(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            name: None,
            tool_calls: None,
            tool_call_id: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InferenceToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub call_type: String,
    pub function: InferenceToolCallFunction,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InferenceToolCallFunction {
    pub name: String,
    /// JSON-encoded argument object, exactly as the model produced it.
    pub arguments: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceResponse {
    pub id: String,
    pub model: String,
    pub message: ChatMessage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<InferenceToolCall>>,
    pub usage: TokenUsage,
    pub finish_reason: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct InferenceOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<InferenceToolDefinition>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InferenceToolDefinition {
    #[serde(rename = "type")]
    pub def_type: String,
    pub function: InferenceToolDefinitionFunction,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InferenceToolDefinitionFunction {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl TokenUsage {
    pub fn add(&mut self, other: &TokenUsage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
    }
}

// ─── External Collaborators ──────────────────────────────────────

/// Seam to the hosted chat-completions endpoint.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        options: Option<InferenceOptions>,
    ) -> Result<InferenceResponse>;

    /// The model identifier requests are issued against.
    fn model(&self) -> String;
}

/// Seam to the web search provider.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>>;
}

/// Seam to the outbound messaging provider.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str) -> Result<()>;
}
