//! Conversation types for the counseling chat.
//!
//! The transcript is the entire conversational context: there is no
//! server-side session memory, so the full ordered message sequence is sent
//! back to the model on every turn. Messages are append-only during a
//! session.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A message as sent to / received from the completion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: Role,
    pub content: String,
}

impl WireMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// A message in the local transcript. `streaming` marks an assistant message
/// still being assembled from incremental fragments.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub streaming: bool,
}

/// Append-only ordered message sequence for one session.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a completed user message, returning its id.
    pub fn push_user(&mut self, content: impl Into<String>) -> Uuid {
        self.push(Role::User, content.into(), false)
    }

    /// Append a completed assistant message, returning its id.
    pub fn push_assistant(&mut self, content: impl Into<String>) -> Uuid {
        self.push(Role::Assistant, content.into(), false)
    }

    /// Start an empty assistant message that will grow as stream fragments
    /// arrive. Returns its id.
    pub fn begin_assistant_stream(&mut self) -> Uuid {
        self.push(Role::Assistant, String::new(), true)
    }

    /// Append a text fragment to an in-progress message. Fragments for
    /// unknown or already-finished messages are dropped; a stale stream must
    /// not write into a newer message.
    pub fn append_fragment(&mut self, id: Uuid, fragment: &str) {
        if let Some(msg) = self.messages.iter_mut().find(|m| m.id == id && m.streaming) {
            msg.content.push_str(fragment);
        }
    }

    /// Mark an in-progress message as complete. When the terminal frame
    /// carries the final assembled content, it replaces the accumulation.
    pub fn finish_stream(&mut self, id: Uuid, final_content: Option<String>) {
        if let Some(msg) = self.messages.iter_mut().find(|m| m.id == id && m.streaming) {
            if let Some(content) = final_content {
                msg.content = content;
            }
            msg.streaming = false;
        }
    }

    /// The wire-format history sent to the completion endpoint.
    pub fn to_wire(&self) -> Vec<WireMessage> {
        self.messages
            .iter()
            .map(|m| WireMessage { role: m.role, content: m.content.clone() })
            .collect()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn push(&mut self, role: Role, content: String, streaming: bool) -> Uuid {
        let id = Uuid::new_v4();
        self.messages.push(ChatMessage { id, role, content, streaming });
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_is_ordered_and_append_only() {
        let mut t = Transcript::new();
        t.push_assistant("你好呀");
        t.push_user("我今天有点难过");
        let wire = t.to_wire();
        assert_eq!(wire.len(), 2);
        assert_eq!(wire[0].role, Role::Assistant);
        assert_eq!(wire[1].role, Role::User);
        assert_eq!(wire[1].content, "我今天有点难过");
    }

    #[test]
    fn test_streaming_assembly() {
        let mut t = Transcript::new();
        let id = t.begin_assistant_stream();
        t.append_fragment(id, "我在");
        t.append_fragment(id, "听你说");
        t.finish_stream(id, None);

        let msg = &t.messages()[0];
        assert_eq!(msg.content, "我在听你说");
        assert!(!msg.streaming);

        // Fragments after completion are dropped.
        t.append_fragment(id, "多余的");
        assert_eq!(t.messages()[0].content, "我在听你说");
    }

    #[test]
    fn test_finish_with_terminal_content_wins() {
        let mut t = Transcript::new();
        let id = t.begin_assistant_stream();
        t.append_fragment(id, "部分");
        t.finish_stream(id, Some("完整的回复".into()));
        assert_eq!(t.messages()[0].content, "完整的回复");
    }

    #[test]
    fn test_role_serde() {
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
        let m: WireMessage = serde_json::from_str("{\"role\":\"user\",\"content\":\"hi\"}").unwrap();
        assert_eq!(m.role, Role::User);
    }
}
