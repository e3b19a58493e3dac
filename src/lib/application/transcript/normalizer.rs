//! Turns raw agent output of varying shape into [`Turn`] values.
//!
//! Raw turns arrive as JSON objects that spell their role either as a `role`
//! key or as a `type` tag, and carry content either as a plain string or as a
//! list of typed blocks. Everything downstream only ever sees the normalized
//! form produced here. Normalization never fails: unknown blocks are dropped.

use crate::constants::{THOUGHT_CLOSE, THOUGHT_OPEN};
use crate::domain::{ContentBlock, Role, ToolStatus, Turn};
use serde_json::{Map, Value};
use tracing::debug;

/// Top-level agent output after shape detection.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnStream {
    Turns(Vec<Turn>),
    Unrecognized(String),
}

impl TurnStream {
    pub fn from_raw(raw: &Value) -> Self {
        match raw {
            Value::Array(items) if items.is_empty() || items.iter().any(is_turn_value) => {
                TurnStream::Turns(normalize_stream(items))
            }
            Value::Object(map) => match map.get("messages") {
                Some(Value::Array(items)) => TurnStream::Turns(normalize_stream(items)),
                _ if looks_like_turn(map) => TurnStream::Turns(vec![normalize_turn(raw)]),
                _ => TurnStream::Unrecognized(raw.to_string()),
            },
            Value::String(text) => TurnStream::Unrecognized(text.clone()),
            other => TurnStream::Unrecognized(other.to_string()),
        }
    }
}

fn looks_like_turn(map: &Map<String, Value>) -> bool {
    map.contains_key("role") || map.contains_key("type")
}

fn is_turn_value(raw: &Value) -> bool {
    matches!(raw, Value::Object(map) if looks_like_turn(map))
}

pub fn normalize_stream(raw: &[Value]) -> Vec<Turn> {
    raw.iter().map(normalize_turn).collect()
}

pub fn normalize_turn(raw: &Value) -> Turn {
    let Value::Object(map) = raw else {
        let text = match raw {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        return Turn::new(Role::Other, text_blocks(&text));
    };

    let mut role = resolve_role(map);
    let mut content = match map.get("content") {
        Some(Value::String(text)) => text_blocks(text),
        Some(Value::Array(items)) => items.iter().flat_map(normalize_block).collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => {
            debug!(kind = value_kind(other), "dropping unsupported turn content");
            Vec::new()
        }
    };

    if role == Role::ToolResult {
        content = fold_tool_turn(map, content);
    } else if role == Role::User
        && !content.is_empty()
        && content
            .iter()
            .all(|block| matches!(block, ContentBlock::ToolResult { .. }))
    {
        role = Role::ToolResult;
    }

    if let Some(Value::Array(calls)) = map.get("tool_calls") {
        content.extend(calls.iter().filter_map(normalize_tool_call));
    }

    Turn::new(role, content)
}

fn resolve_role(map: &Map<String, Value>) -> Role {
    ["role", "type"]
        .iter()
        .filter_map(|key| map.get(*key).and_then(Value::as_str))
        .find(|value| !value.trim().is_empty())
        .map(Role::parse)
        .unwrap_or(Role::Other)
}

/// A tool turn with plain text content becomes one result block built from
/// the turn-level name, status and call id.
fn fold_tool_turn(map: &Map<String, Value>, content: Vec<ContentBlock>) -> Vec<ContentBlock> {
    if content
        .iter()
        .any(|block| matches!(block, ContentBlock::ToolResult { .. }))
    {
        return content;
    }

    let text = content
        .iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n");

    vec![ContentBlock::ToolResult {
        tool_use_id: string_field(map, &["tool_call_id", "tool_use_id"]),
        tool_name: string_field(map, &["name"]).unwrap_or_else(|| "tool".to_string()),
        status: resolve_status(map),
        content: text,
    }]
}

fn normalize_block(raw: &Value) -> Vec<ContentBlock> {
    let map = match raw {
        Value::String(text) => return text_blocks(text),
        Value::Object(map) => map,
        other => {
            debug!(kind = value_kind(other), "dropping unrecognized content block");
            return Vec::new();
        }
    };

    match map.get("type").and_then(Value::as_str) {
        Some("text") => match map.get("text").and_then(Value::as_str) {
            Some(text) => text_blocks(text),
            None => Vec::new(),
        },
        Some("tool_use") => {
            let Some(name) = string_field(map, &["name"]) else {
                debug!("dropping tool_use block without a name");
                return Vec::new();
            };
            let arguments = map
                .get("input")
                .or_else(|| map.get("arguments"))
                .map(ordered_arguments)
                .unwrap_or_default();
            vec![ContentBlock::ToolUse {
                id: string_field(map, &["id"]),
                name,
                arguments,
            }]
        }
        Some("tool_result") => vec![ContentBlock::ToolResult {
            tool_use_id: string_field(map, &["tool_use_id", "tool_call_id"]),
            tool_name: string_field(map, &["name", "tool_name"])
                .unwrap_or_else(|| "tool".to_string()),
            status: resolve_status(map),
            content: flatten_content(map.get("content")),
        }],
        other => {
            debug!(block_type = ?other, "dropping unrecognized content block");
            Vec::new()
        }
    }
}

/// Supports both `{name, args, id}` and `{id, function: {name, arguments}}`.
fn normalize_tool_call(raw: &Value) -> Option<ContentBlock> {
    let map = raw.as_object()?;
    let id = string_field(map, &["id"]);

    if let Some(Value::Object(function)) = map.get("function") {
        let name = string_field(function, &["name"])?;
        let arguments = match function.get("arguments") {
            Some(Value::String(encoded)) => serde_json::from_str::<Value>(encoded)
                .map(|value| ordered_arguments(&value))
                .unwrap_or_default(),
            Some(value) => ordered_arguments(value),
            None => Vec::new(),
        };
        return Some(ContentBlock::ToolUse {
            id,
            name,
            arguments,
        });
    }

    let name = string_field(map, &["name"])?;
    let arguments = map
        .get("args")
        .or_else(|| map.get("arguments"))
        .map(ordered_arguments)
        .unwrap_or_default();
    Some(ContentBlock::ToolUse {
        id,
        name,
        arguments,
    })
}

/// Splits text into an optional thought block and the visible remainder.
fn text_blocks(text: &str) -> Vec<ContentBlock> {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix(THOUGHT_OPEN) else {
        return vec![ContentBlock::text(text)];
    };

    let (thought, rest) = match inner.find(THOUGHT_CLOSE) {
        Some(end) => (&inner[..end], &inner[end + THOUGHT_CLOSE.len()..]),
        None => (inner, ""),
    };

    let mut blocks = vec![ContentBlock::thought(thought.trim())];
    let rest = rest.trim();
    if !rest.is_empty() {
        blocks.push(ContentBlock::text(rest));
    }
    blocks
}

fn ordered_arguments(value: &Value) -> Vec<(String, Value)> {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
        _ => Vec::new(),
    }
}

fn resolve_status(map: &Map<String, Value>) -> ToolStatus {
    if map.get("is_error").and_then(Value::as_bool) == Some(true) {
        return ToolStatus::Error;
    }
    ToolStatus::parse(map.get("status").and_then(Value::as_str))
}

fn flatten_content(content: Option<&Value>) -> String {
    match content {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(text) => Some(text.clone()),
                Value::Object(map) => map.get("text").and_then(Value::as_str).map(String::from),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn string_field(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| map.get(*key).and_then(Value::as_str))
        .find(|value| !value.is_empty())
        .map(String::from)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
