//! Tool-selection protocol: decision prompt construction and tolerant
//! parsing of the model's reply.
//!
//! The model is asked to answer with exactly one JSON object, either a
//! `tool_use` or a `text` decision. Models wrap JSON in markdown fences or
//! ignore the contract entirely, so parsing is layered: strip fences, parse
//! JSON, then match the tagged shape. Each failure mode has a distinct,
//! pinned fallback.

use itertools::Itertools;
use rmcp::model::Tool;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::{SystemTime, UNIX_EPOCH};

/// A decision produced by the model, validated at the boundary.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolDecision {
    /// Invoke a named tool with the given arguments.
    ToolUse {
        name: String,
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        input: Map<String, Value>,
    },
    /// Answer the user directly with this text.
    Text { text: String },
}

/// Outcome of parsing the model's decision reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedDecision {
    /// Valid JSON matching one of the two decision shapes.
    Decision(ToolDecision),
    /// Valid JSON that matches neither shape; the raw reply becomes the
    /// final answer verbatim.
    Unrecognized(String),
    /// Not JSON at all; the request falls back to general conversation.
    Invalid,
}

/// Parse the model's reply with the layered fallbacks described above.
pub fn parse_decision(raw: &str) -> ParsedDecision {
    let trimmed = raw.trim();
    let body = strip_code_fences(trimmed);

    match serde_json::from_str::<Value>(body) {
        Err(_) => ParsedDecision::Invalid,
        Ok(value) => match serde_json::from_value::<ToolDecision>(value) {
            Ok(decision) => ParsedDecision::Decision(decision),
            Err(_) => ParsedDecision::Unrecognized(trimmed.to_string()),
        },
    }
}

/// Extract the contents of a markdown code fence, preferring a ```json
/// fence over a bare one. Returns the input unchanged when unfenced.
fn strip_code_fences(text: &str) -> &str {
    if let Some(start) = text.find("```json") {
        let rest = &text[start + 7..];
        let end = rest.find("```").unwrap_or(rest.len());
        rest[..end].trim()
    } else if let Some(start) = text.find("```") {
        let rest = &text[start + 3..];
        let end = rest.find("```").unwrap_or(rest.len());
        rest[..end].trim()
    } else {
        text
    }
}

/// Build the single-turn decision prompt: the verbatim user request, the
/// numbered tool catalog, and the strict output contract.
pub fn selection_prompt(user_prompt: &str, tools: &[Tool]) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);

    format!(
        r#"You are an intelligent assistant that can use tools to help users. Based on the user's request, decide whether to use a tool or respond directly.

User request: "{user_prompt}"

Available tools:
{catalog}

Instructions:
1. If the user's request can be fulfilled with one of the available tools, respond with EXACTLY this JSON format:
   {{
     "type": "tool_use",
     "name": "tool-name",
     "id": "tool-{millis}",
     "input": {{
       "param1": "value1",
       "param2": "value2"
     }}
   }}

2. If no tool is needed or suitable, respond with this JSON format and provide your actual answer:
   {{
     "type": "text",
     "text": "Your actual answer to the user's question here"
   }}

3. Make sure the tool name matches exactly one of the available tools
4. Include all required parameters in the "input" object as specified in the tool description
5. Use appropriate values for the parameters based on the user's request
6. Always include a unique "id" field with format "tool-{{timestamp}}"
7. For text responses, provide the actual helpful answer to the user's question, not a placeholder

Choose the most appropriate action:"#,
        catalog = format_tool_catalog(tools),
    )
}

/// Render the numbered tool catalog, one line per tool with its parameter
/// map drawn from the input schema's `properties`.
pub fn format_tool_catalog(tools: &[Tool]) -> String {
    tools
        .iter()
        .enumerate()
        .map(|(index, tool)| {
            let params = tool
                .input_schema
                .get("properties")
                .and_then(Value::as_object)
                .filter(|props| !props.is_empty())
                .map(|props| {
                    props
                        .iter()
                        .map(|(key, value)| {
                            let hint = value
                                .get("description")
                                .or_else(|| value.get("type"))
                                .and_then(Value::as_str)
                                .unwrap_or_default();
                            format!("\"{key}\": \"{hint}\"")
                        })
                        .join(", ")
                })
                .unwrap_or_else(|| "no parameters".to_string());

            let description = tool.description.as_deref().unwrap_or_default();
            format!(
                "{}. \"{}\" - {} - Parameters: {{{}}}",
                index + 1,
                tool.name,
                description,
                params
            )
        })
        .join("\n")
}

/// Build the narration prompt sent after a tool has been executed.
pub fn explanation_prompt(
    user_prompt: &str,
    tool_name: &str,
    invocation_id: &str,
    input: &Map<String, Value>,
    result_text: &str,
) -> String {
    format!(
        "User asked: \"{user_prompt}\"\n\nTool \"{tool_name}\" (ID: {invocation_id}) was executed with parameters: {args}\n\nTool result:\n{result_text}\n\nProvide a helpful explanation of what was accomplished and any relevant details for the user.",
        args = Value::Object(input.clone()),
    )
}

/// Render the unstructured tool context appended to general-conversation
/// prompts.
pub fn tools_context(tools: &[Tool]) -> String {
    format!(
        "Available tools if needed:\n- {}",
        tools
            .iter()
            .map(|t| format!("{}: {}", t.name, t.description.as_deref().unwrap_or_default()))
            .join("\n- ")
    )
}
