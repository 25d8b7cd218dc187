//! Message and conversation history types.
//!
//! These are the values exchanged with a chat-style model during a run:
//! the task prompt goes in as a user message, tool calls come back on
//! assistant messages, and tool results are appended tagged with the
//! originating call id.

use serde::{Deserialize, Serialize};

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The task prompt author
    User,
    /// The model
    Assistant,
    /// Tool execution result
    Tool,
}

/// A single message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,

    /// Tool calls requested by the assistant (if any)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<MessageToolCall>,

    /// If this is a tool result, which tool call it responds to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    fn with_role(role: Role, content: String) -> Self {
        Self {
            role,
            content,
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, content.into())
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, content.into())
    }

    /// Create an assistant message that only carries tool calls.
    pub fn assistant_tool_calls(tool_calls: Vec<MessageToolCall>) -> Self {
        let mut message = Self::with_role(Role::Assistant, String::new());
        message.tool_calls = tool_calls;
        message
    }

    /// Create a tool result message.
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        let mut message = Self::with_role(Role::Tool, content.into());
        message.tool_call_id = Some(tool_call_id.into());
        message
    }
}

/// A tool call embedded in an assistant message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageToolCall {
    /// Opaque call id, echoed back on the tool result
    pub id: String,

    /// Name of the tool to invoke
    pub name: String,

    /// Arguments as a JSON string, exactly as the model emitted them
    pub arguments: String,
}

/// The ordered history sent to the model on every turn.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Conversation {
    pub messages: Vec<Message>,
}

impl Conversation {
    /// Start a conversation from the task prompt.
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(prompt)],
        }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversation_starts_with_user_prompt() {
        let conv = Conversation::from_prompt("Sync all courses");
        assert_eq!(conv.len(), 1);
        assert_eq!(conv.messages[0].role, Role::User);
        assert_eq!(conv.messages[0].content, "Sync all courses");
    }

    #[test]
    fn tool_result_carries_call_id() {
        let msg = Message::tool_result("tc1", "[]");
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.tool_call_id.as_deref(), Some("tc1"));
        assert_eq!(msg.content, "[]");
    }

    #[test]
    fn assistant_tool_calls_keep_order() {
        let msg = Message::assistant_tool_calls(vec![
            MessageToolCall {
                id: "a".into(),
                name: "list_my_courses".into(),
                arguments: "{}".into(),
            },
            MessageToolCall {
                id: "b".into(),
                name: "list_modules".into(),
                arguments: r#"{"course_id":"1"}"#.into(),
            },
        ]);
        let names: Vec<_> = msg.tool_calls.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["list_my_courses", "list_modules"]);
        assert!(msg.content.is_empty());
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Tool).unwrap();
        assert_eq!(json, "\"tool\"");
    }
}
