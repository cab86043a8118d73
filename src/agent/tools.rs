//! Agent Tool System
//!
//! Defines the two tools exposed to the model and dispatches their
//! execution. Tool failures are captured in the result and fed back to
//! the model; they never abort the loop.

use std::time::Instant;

use anyhow::Result;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::records::filter_records;
use crate::types::{
    InferenceToolDefinition, InferenceToolDefinitionFunction, ToolCallResult, ToolContext,
};

/// A tool the agent can invoke, with its declared parameter schema.
#[derive(Debug, Clone)]
pub struct BuiltinTool {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Create the tools exposed to the agent: the record filter and the web search.
pub fn create_builtin_tools() -> Vec<BuiltinTool> {
    vec![
        BuiltinTool {
            name: "get_user_data".to_string(),
            description: "Retrieve user records based on a minimum age.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "min_age": {
                        "type": "integer",
                        "description": "Minimum age a record must have to be included"
                    }
                },
                "required": ["min_age"]
            }),
        },
        BuiltinTool {
            name: "search_web".to_string(),
            description: "Search the web. Returns up to 5 results, each with a title, a link and a snippet.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query"
                    }
                },
                "required": ["query"]
            }),
        },
    ]
}

/// Convert the tool list to OpenAI-compatible inference tool definitions.
pub fn tools_to_inference_format(tools: &[BuiltinTool]) -> Vec<InferenceToolDefinition> {
    tools
        .iter()
        .map(|t| InferenceToolDefinition {
            def_type: "function".to_string(),
            function: InferenceToolDefinitionFunction {
                name: t.name.clone(),
                description: t.description.clone(),
                parameters: t.parameters.clone(),
            },
        })
        .collect()
}

/// Execute a tool call and return the result. Errors end up in the
/// `error` field rather than propagating.
pub async fn execute_tool(
    tool_name: &str,
    args: &Value,
    tools: &[BuiltinTool],
    ctx: &ToolContext,
) -> ToolCallResult {
    let start = Instant::now();

    if !tools.iter().any(|t| t.name == tool_name) {
        return ToolCallResult {
            id: format!("tc_{}", Uuid::new_v4()),
            name: tool_name.to_string(),
            arguments: args.clone(),
            result: String::new(),
            duration_ms: 0,
            error: Some(format!("Unknown tool: {}", tool_name)),
        };
    }

    match execute_tool_inner(tool_name, args, ctx).await {
        Ok(output) => ToolCallResult {
            id: format!("tc_{}", Uuid::new_v4()),
            name: tool_name.to_string(),
            arguments: args.clone(),
            result: output,
            duration_ms: start.elapsed().as_millis() as u64,
            error: None,
        },
        Err(err) => ToolCallResult {
            id: format!("tc_{}", Uuid::new_v4()),
            name: tool_name.to_string(),
            arguments: args.clone(),
            result: String::new(),
            duration_ms: start.elapsed().as_millis() as u64,
            error: Some(err.to_string()),
        },
    }
}

/// Internal tool dispatch. Arguments are validated here, at the boundary.
async fn execute_tool_inner(tool_name: &str, args: &Value, ctx: &ToolContext) -> Result<String> {
    match tool_name {
        "get_user_data" => {
            let min_age = args["min_age"]
                .as_u64()
                .ok_or_else(|| anyhow::anyhow!("Missing 'min_age' argument"))?;

            let matched = filter_records(&ctx.records, min_age as u32);
            Ok(serde_json::to_string(&matched)?)
        }

        "search_web" => {
            let query = args["query"]
                .as_str()
                .ok_or_else(|| anyhow::anyhow!("Missing 'query' argument"))?;

            let results = ctx.search.search(query).await?;
            Ok(serde_json::to_string(&results)?)
        }

        _ => anyhow::bail!("Unknown tool: {}", tool_name),
    }
}
