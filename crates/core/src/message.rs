//! Chat message wire types
//!
//! Messages follow the function-calling chat format. An assistant message
//! either carries text or carries tool calls, never both; the enum makes the
//! mixed shape unrepresentable and the wire form writes an explicit `null`
//! content next to `tool_calls`.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

/// Function name and JSON-encoded arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// Arguments as a JSON string, never a nested object
    pub arguments: String,
}

/// A single tool invocation issued by the assistant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub call_type: String,
    pub function: FunctionCall,
}

impl ToolCall {
    pub fn function(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            call_type: "function".to_string(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }

    /// Decode the argument string
    pub fn arguments_json(&self) -> Result<serde_json::Value, Error> {
        Ok(serde_json::from_str(&self.function.arguments)?)
    }
}

/// Format the n-th call id of a conversation (1-based): `call_001`, `call_002`, ...
pub fn call_id(n: u32) -> String {
    format!("call_{:03}", n)
}

/// Parse a call id back to its sequence number
pub fn parse_call_id(id: &str) -> Option<u32> {
    let digits = id.strip_prefix("call_")?;
    if digits.len() < 3 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireMessage", into = "WireMessage")]
pub enum Message {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        content: String,
    },
    /// Assistant turn that only invokes tools
    ToolCalls {
        tool_calls: Vec<ToolCall>,
    },
    Tool {
        content: String,
        tool_call_id: String,
        name: String,
    },
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self::System {
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant {
            content: content.into(),
        }
    }

    pub fn tool_call(call: ToolCall) -> Self {
        Self::ToolCalls {
            tool_calls: vec![call],
        }
    }

    /// Tool response linked to the call it answers
    pub fn tool_response(call: &ToolCall, content: impl Into<String>) -> Self {
        Self::Tool {
            content: content.into(),
            tool_call_id: call.id.clone(),
            name: call.function.name.clone(),
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Message::System { .. } => Role::System,
            Message::User { .. } => Role::User,
            Message::Assistant { .. } | Message::ToolCalls { .. } => Role::Assistant,
            Message::Tool { .. } => Role::Tool,
        }
    }

    /// Text content, `None` for tool-call messages
    pub fn content(&self) -> Option<&str> {
        match self {
            Message::System { content }
            | Message::User { content }
            | Message::Assistant { content }
            | Message::Tool { content, .. } => Some(content),
            Message::ToolCalls { .. } => None,
        }
    }

    pub fn tool_calls(&self) -> &[ToolCall] {
        match self {
            Message::ToolCalls { tool_calls } => tool_calls,
            _ => &[],
        }
    }

    /// Replace the text of a system message
    pub fn with_system_content(self, content: impl Into<String>) -> Self {
        match self {
            Message::System { .. } => Message::System {
                content: content.into(),
            },
            other => other,
        }
    }
}

/// Flat on-the-wire representation
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireMessage {
    role: Role,
    // Always written, `null` when the message carries tool calls
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

impl From<Message> for WireMessage {
    fn from(message: Message) -> Self {
        let role = message.role();
        let mut wire = WireMessage {
            role,
            content: None,
            tool_calls: None,
            tool_call_id: None,
            name: None,
        };
        match message {
            Message::System { content } | Message::User { content } | Message::Assistant { content } => {
                wire.content = Some(content);
            }
            Message::ToolCalls { tool_calls } => {
                wire.tool_calls = Some(tool_calls);
            }
            Message::Tool {
                content,
                tool_call_id,
                name,
            } => {
                wire.content = Some(content);
                wire.tool_call_id = Some(tool_call_id);
                wire.name = Some(name);
            }
        }
        wire
    }
}

impl TryFrom<WireMessage> for Message {
    type Error = Error;

    fn try_from(wire: WireMessage) -> Result<Self, Self::Error> {
        let calls = wire.tool_calls.filter(|calls| !calls.is_empty());
        match (wire.role, wire.content, calls) {
            (_, Some(_), Some(_)) => Err(Error::Structure(
                "message carries both content and tool_calls".to_string(),
            )),
            (Role::Assistant, None, Some(tool_calls)) => Ok(Message::ToolCalls { tool_calls }),
            (role, None, Some(_)) => Err(Error::Structure(format!(
                "{} message cannot carry tool_calls",
                role.as_str()
            ))),
            (role, None, None) => Err(Error::Structure(format!(
                "{} message without content",
                role.as_str()
            ))),
            (Role::System, Some(content), None) => Ok(Message::System { content }),
            (Role::User, Some(content), None) => Ok(Message::User { content }),
            (Role::Assistant, Some(content), None) => Ok(Message::Assistant { content }),
            (Role::Tool, Some(content), None) => match (wire.tool_call_id, wire.name) {
                (Some(tool_call_id), Some(name)) => Ok(Message::Tool {
                    content,
                    tool_call_id,
                    name,
                }),
                _ => Err(Error::Structure(
                    "tool message requires tool_call_id and name".to_string(),
                )),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_call_message_has_null_content() {
        let call = ToolCall::function(call_id(1), "search_trains", r#"{"origin":"Roma Termini"}"#);
        let json = serde_json::to_value(Message::tool_call(call)).unwrap();

        assert_eq!(json["role"], "assistant");
        assert!(json["content"].is_null());
        assert!(json.as_object().unwrap().contains_key("content"));
        assert_eq!(json["tool_calls"][0]["id"], "call_001");
        assert_eq!(json["tool_calls"][0]["type"], "function");
        assert!(json["tool_calls"][0]["function"]["arguments"].is_string());
    }

    #[test]
    fn test_tool_response_links_call() {
        let call = ToolCall::function(call_id(7), "ui_control", r#"{"action":"next"}"#);
        let response = Message::tool_response(&call, r#"{"page":2}"#);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["role"], "tool");
        assert_eq!(json["tool_call_id"], "call_007");
        assert_eq!(json["name"], "ui_control");
    }

    #[test]
    fn test_text_message_omits_tool_fields() {
        let json = serde_json::to_string(&Message::user("Milano")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"Milano"}"#);
    }

    #[test]
    fn test_mixed_message_rejected() {
        let raw = r#"{"role":"assistant","content":"ciao","tool_calls":[{"id":"call_001","type":"function","function":{"name":"search_trains","arguments":"{}"}}]}"#;
        let parsed: Result<Message, _> = serde_json::from_str(raw);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_wire_roundtrip_of_tool_calls() {
        let call = ToolCall::function(call_id(2), "purchase_ticket", r#"{"train_id":"FR9812"}"#);
        let original = Message::tool_call(call);
        let text = serde_json::to_string(&original).unwrap();
        let parsed: Message = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, original);
        assert_eq!(parsed.content(), None);
    }

    #[test]
    fn test_call_id_format() {
        assert_eq!(call_id(1), "call_001");
        assert_eq!(call_id(42), "call_042");
        assert_eq!(call_id(1234), "call_1234");
        assert_eq!(parse_call_id("call_010"), Some(10));
        assert_eq!(parse_call_id("call_7"), None);
        assert_eq!(parse_call_id("id_001"), None);
    }
}
