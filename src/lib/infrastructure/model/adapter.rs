//! Message adapters - convert between different API formats

use crate::application::tooling::ToolDescriptor;
use crate::constants::{THOUGHT_CLOSE, THOUGHT_OPEN};
use crate::domain::{ContentBlock, Role, ToolStatus, Turn};
use serde_json::{Map, Value, json};
use std::collections::VecDeque;

/// Adapter for converting messages to different API formats
pub struct MessageAdapter;

impl MessageAdapter {
    /// Convert turns to Anthropic Messages API format
    ///
    /// Consecutive turns that map to the same role are merged into one
    /// message, so tool results that follow a tool call arrive as a single
    /// `user` message of `tool_result` blocks. Call ids missing from the
    /// history are synthesized and paired with results in call order.
    pub fn to_anthropic_format(turns: &[Turn]) -> Vec<Value> {
        let mut messages: Vec<(&'static str, Vec<Value>)> = Vec::new();
        let mut unanswered: VecDeque<String> = VecDeque::new();
        let mut synthesized = 0usize;

        for turn in turns {
            let (role, blocks) = match turn.role {
                Role::User => ("user", anthropic_blocks(&turn.content, &mut unanswered)),
                Role::Assistant => {
                    let mut blocks = Vec::new();
                    for block in &turn.content {
                        match block {
                            ContentBlock::Text { text, is_thought } => {
                                if let Some(text) = visible_text(text, *is_thought) {
                                    blocks.push(json!({"type": "text", "text": text}));
                                }
                            }
                            ContentBlock::ToolUse {
                                id,
                                name,
                                arguments,
                            } => {
                                let id = id.clone().unwrap_or_else(|| {
                                    synthesized += 1;
                                    format!("toolu_local_{synthesized}")
                                });
                                unanswered.push_back(id.clone());
                                blocks.push(json!({
                                    "type": "tool_use",
                                    "id": id,
                                    "name": name,
                                    "input": arguments_object(arguments),
                                }));
                            }
                            ContentBlock::ToolResult { .. } => {}
                        }
                    }
                    ("assistant", blocks)
                }
                Role::ToolResult => ("user", anthropic_blocks(&turn.content, &mut unanswered)),
                Role::Other => continue,
            };

            if blocks.is_empty() {
                continue;
            }
            match messages.last_mut() {
                Some((last_role, last_blocks)) if *last_role == role => last_blocks.extend(blocks),
                _ => messages.push((role, blocks)),
            }
        }

        messages
            .into_iter()
            .map(|(role, content)| json!({"role": role, "content": content}))
            .collect()
    }

    /// Convert turns to OpenAI-style chat format
    ///
    /// Returns: `[{"role": "...", "content": "...", "tool_calls": [...]}]`
    /// with one `tool` message per tool result.
    pub fn to_openai_format(system_prompt: Option<&str>, turns: &[Turn]) -> Vec<Value> {
        let mut messages = Vec::new();
        if let Some(prompt) = system_prompt.filter(|p| !p.trim().is_empty()) {
            messages.push(json!({"role": "system", "content": prompt}));
        }

        let mut unanswered: VecDeque<String> = VecDeque::new();
        let mut synthesized = 0usize;

        for turn in turns {
            match turn.role {
                Role::User | Role::Assistant => {
                    let mut texts = Vec::new();
                    let mut calls = Vec::new();
                    for block in &turn.content {
                        match block {
                            ContentBlock::Text { text, is_thought } => {
                                texts.extend(visible_text(text, *is_thought));
                            }
                            ContentBlock::ToolUse {
                                id,
                                name,
                                arguments,
                            } => {
                                let id = id.clone().unwrap_or_else(|| {
                                    synthesized += 1;
                                    format!("call_local_{synthesized}")
                                });
                                unanswered.push_back(id.clone());
                                calls.push(json!({
                                    "id": id,
                                    "type": "function",
                                    "function": {
                                        "name": name,
                                        "arguments": arguments_object(arguments).to_string(),
                                    }
                                }));
                            }
                            ContentBlock::ToolResult { .. } => {}
                        }
                    }

                    let role = if turn.role == Role::User {
                        "user"
                    } else {
                        "assistant"
                    };
                    if texts.is_empty() && calls.is_empty() {
                        continue;
                    }
                    let mut message = Map::new();
                    message.insert("role".into(), json!(role));
                    message.insert(
                        "content".into(),
                        if texts.is_empty() {
                            Value::Null
                        } else {
                            json!(texts.join("\n"))
                        },
                    );
                    if !calls.is_empty() {
                        message.insert("tool_calls".into(), Value::Array(calls));
                    }
                    messages.push(Value::Object(message));
                }
                Role::ToolResult => {
                    for block in &turn.content {
                        if let ContentBlock::ToolResult {
                            tool_use_id,
                            content,
                            ..
                        } = block
                        {
                            let id = pair_result(tool_use_id.as_deref(), &mut unanswered);
                            messages.push(json!({
                                "role": "tool",
                                "tool_call_id": id,
                                "content": content,
                            }));
                        }
                    }
                }
                Role::Other => {}
            }
        }

        messages
    }

    pub fn anthropic_tools(tools: &[ToolDescriptor]) -> Vec<Value> {
        tools
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "description": tool.description.clone().unwrap_or_default(),
                    "input_schema": schema_or_empty(&tool.input_schema),
                })
            })
            .collect()
    }

    pub fn openai_tools(tools: &[ToolDescriptor]) -> Vec<Value> {
        tools
            .iter()
            .map(|tool| {
                json!({
                    "type": "function",
                    "function": {
                        "name": tool.name,
                        "description": tool.description.clone().unwrap_or_default(),
                        "parameters": schema_or_empty(&tool.input_schema),
                    }
                })
            })
            .collect()
    }
}

fn anthropic_blocks(content: &[ContentBlock], unanswered: &mut VecDeque<String>) -> Vec<Value> {
    content
        .iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text, is_thought } => {
                visible_text(text, *is_thought).map(|text| json!({"type": "text", "text": text}))
            }
            ContentBlock::ToolResult {
                tool_use_id,
                status,
                content,
                ..
            } => Some(json!({
                "type": "tool_result",
                "tool_use_id": pair_result(tool_use_id.as_deref(), unanswered),
                "content": content,
                "is_error": *status == ToolStatus::Error,
            })),
            ContentBlock::ToolUse { .. } => None,
        })
        .collect()
}

/// Results carrying an id answer that call; the rest answer the oldest open one.
fn pair_result(id: Option<&str>, unanswered: &mut VecDeque<String>) -> String {
    match id {
        Some(id) => {
            if let Some(pos) = unanswered.iter().position(|open| open == id) {
                unanswered.remove(pos);
            }
            id.to_string()
        }
        None => unanswered
            .pop_front()
            .unwrap_or_else(|| "unpaired_tool_result".to_string()),
    }
}

/// Thoughts are re-wrapped in their delimiters so the model sees its own reasoning.
fn visible_text(text: &str, is_thought: bool) -> Option<String> {
    if text.trim().is_empty() {
        return None;
    }
    if is_thought {
        Some(format!("{THOUGHT_OPEN}{text}{THOUGHT_CLOSE}"))
    } else {
        Some(text.to_string())
    }
}

fn arguments_object(arguments: &[(String, Value)]) -> Value {
    Value::Object(
        arguments
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
    )
}

fn schema_or_empty(schema: &Value) -> Value {
    if schema.is_object() {
        schema.clone()
    } else {
        json!({"type": "object", "properties": {}})
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool_use(id: Option<&str>, name: &str) -> ContentBlock {
        ContentBlock::ToolUse {
            id: id.map(String::from),
            name: name.to_string(),
            arguments: vec![("extension".to_string(), json!(".py"))],
        }
    }

    fn tool_result(id: Option<&str>, name: &str, content: &str) -> Turn {
        Turn::new(
            Role::ToolResult,
            vec![ContentBlock::ToolResult {
                tool_use_id: id.map(String::from),
                tool_name: name.to_string(),
                status: ToolStatus::Success,
                content: content.to_string(),
            }],
        )
    }

    #[test]
    fn anthropic_merges_consecutive_tool_results_into_one_user_message() {
        let turns = vec![
            Turn::user("add and multiply"),
            Turn::assistant(vec![
                ContentBlock::thought("two calls"),
                tool_use(Some("a"), "add"),
                tool_use(Some("b"), "multiply"),
            ]),
            tool_result(Some("a"), "add", "5"),
            tool_result(Some("b"), "multiply", "6"),
        ];

        let messages = MessageAdapter::to_anthropic_format(&turns);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1]["content"][0]["text"], "<thinking>two calls</thinking>");
        assert_eq!(messages[1]["content"][1]["input"]["extension"], ".py");
        assert_eq!(messages[2]["role"], "user");
        let results = messages[2]["content"].as_array().expect("blocks");
        assert_eq!(results.len(), 2);
        assert_eq!(results[1]["tool_use_id"], "b");
    }

    #[test]
    fn missing_ids_are_paired_in_call_order() {
        let turns = vec![
            Turn::assistant(vec![tool_use(None, "list_files")]),
            tool_result(None, "list_files", "a.py"),
        ];
        let messages = MessageAdapter::to_anthropic_format(&turns);
        let call_id = &messages[0]["content"][0]["id"];
        assert_eq!(&messages[1]["content"][0]["tool_use_id"], call_id);
    }

    #[test]
    fn openai_format_uses_tool_calls_and_tool_messages() {
        let turns = vec![
            Turn::user("list"),
            Turn::assistant(vec![tool_use(Some("call_1"), "list_files")]),
            tool_result(Some("call_1"), "list_files", "a.py"),
            Turn::assistant(vec![ContentBlock::text("a.py")]),
        ];
        let messages = MessageAdapter::to_openai_format(Some("be brief"), &turns);
        assert_eq!(messages[0]["role"], "system");
        assert!(messages[2]["content"].is_null());
        assert_eq!(messages[2]["tool_calls"][0]["function"]["arguments"], r#"{"extension":".py"}"#);
        assert_eq!(messages[3]["role"], "tool");
        assert_eq!(messages[3]["tool_call_id"], "call_1");
        assert_eq!(messages[4]["content"], "a.py");
    }

    #[test]
    fn tool_schemas_default_to_empty_object() {
        let tools = vec![ToolDescriptor {
            name: "ping".into(),
            description: None,
            input_schema: Value::Null,
            server: "s".into(),
        }];
        let anthropic = MessageAdapter::anthropic_tools(&tools);
        assert_eq!(anthropic[0]["input_schema"]["type"], "object");
        let openai = MessageAdapter::openai_tools(&tools);
        assert_eq!(openai[0]["function"]["name"], "ping");
    }
}
