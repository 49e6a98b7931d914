//! The persistent support chat: transport, log model, and intent
//! detection.

pub mod client;
pub mod stomp;

use std::rc::Rc;

use jiff::Timestamp;
use payloads::chat::{ChatMessage, Structured, classify};
use uuid::Uuid;
use yew::Reducible;

pub use client::{ConnectionStatus, Handlers, StompClient, StompConfig};

/// Destination the client publishes its join event to.
pub const JOIN_DESTINATION: &str = "/app/chat.addUser";
/// Destination for outbound user messages.
pub const SEND_DESTINATION: &str = "/app/chat.sendMessage";
/// Broadcast topic carrying every participant's messages.
pub const PUBLIC_TOPIC: &str = "/topic/public";

/// How long a typing indicator stays up without a follow-up message.
pub const TYPING_TIMEOUT_MS: u32 = 3_000;

/// Phrases that mean the sender wants results around their device
/// location.
const NEAR_ME_PHRASES: [&str; 4] =
    ["near me", "nearby", "close to me", "around me"];

/// True when the outbound text should carry device coordinates.
pub fn needs_location(text: &str) -> bool {
    let lowered = text.to_lowercase();
    NEAR_ME_PHRASES
        .iter()
        .any(|phrase| lowered.contains(phrase))
}

/// Who authored a log entry, relative to the configured display name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryAuthor {
    User,
    System,
    Peer,
}

#[derive(Clone, PartialEq)]
pub struct LogEntry {
    pub id: Uuid,
    pub message: ChatMessage,
    /// Rendering variant, decided once when the entry is appended.
    pub structured: Structured,
    pub received_at: Timestamp,
}

impl LogEntry {
    fn new(message: ChatMessage) -> Self {
        let structured = classify(&message);
        Self {
            id: Uuid::new_v4(),
            message,
            structured,
            received_at: Timestamp::now(),
        }
    }

    pub fn author(&self, username: &str) -> EntryAuthor {
        match self.message.sender.as_deref() {
            Some("system") => EntryAuthor::System,
            Some(sender) if sender == username || sender == "user" => {
                EntryAuthor::User
            }
            _ => EntryAuthor::Peer,
        }
    }

    pub fn is_error(&self) -> bool {
        self.message.kind == Some(payloads::chat::MessageKind::Error)
    }
}

/// Append-only message log plus the transient typing indicator.
#[derive(Clone, PartialEq, Default)]
pub struct ChatLog {
    pub entries: Vec<LogEntry>,
    pub typing: bool,
}

pub enum ChatLogAction {
    /// A system-authored informational line.
    System(String),
    /// A system-authored error line.
    Error(String),
    /// A message delivered from the broadcast topic. Supersedes any typing
    /// indicator.
    Incoming(ChatMessage),
    TypingStarted,
    TypingStopped,
}

impl ChatLog {
    fn system_entry(content: String, kind: payloads::chat::MessageKind) -> LogEntry {
        LogEntry::new(ChatMessage {
            content: Some(content),
            sender: Some("system".to_string()),
            kind: Some(kind),
            display_format: Some(payloads::chat::DisplayFormat::String),
            ..Default::default()
        })
    }
}

impl Reducible for ChatLog {
    type Action = ChatLogAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        match action {
            ChatLogAction::System(content) => {
                next.entries.push(Self::system_entry(
                    content,
                    payloads::chat::MessageKind::Message,
                ));
            }
            ChatLogAction::Error(content) => {
                next.entries.push(Self::system_entry(
                    content,
                    payloads::chat::MessageKind::Error,
                ));
            }
            ChatLogAction::Incoming(message) => {
                next.typing = false;
                next.entries.push(LogEntry::new(message));
            }
            ChatLogAction::TypingStarted => next.typing = true,
            ChatLogAction::TypingStopped => next.typing = false,
        }
        Rc::new(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn near_me_intent_is_case_insensitive() {
        assert!(needs_location("Show blood banks NEAR ME"));
        assert!(needs_location("anything nearby?"));
        assert!(needs_location("banks close to me please"));
        assert!(needs_location("what is around me"));
        assert!(!needs_location("find O+ blood in Delhi"));
    }

    #[test]
    fn incoming_messages_supersede_typing() {
        let log = Rc::new(ChatLog::default());
        let log = log.reduce(ChatLogAction::TypingStarted);
        assert!(log.typing);

        let log =
            log.reduce(ChatLogAction::Incoming(ChatMessage::text("hi", "bot")));
        assert!(!log.typing);
        assert_eq!(log.entries.len(), 1);
    }

    #[test]
    fn system_entries_are_attributed_and_styled() {
        let log = Rc::new(ChatLog::default());
        let log = log.reduce(ChatLogAction::Error("denied".to_string()));
        let entry = &log.entries[0];
        assert_eq!(entry.author("Somebody"), EntryAuthor::System);
        assert!(entry.is_error());
        assert_eq!(
            entry.structured,
            Structured::PlainText("denied".to_string())
        );
    }

    #[test]
    fn authorship_follows_the_configured_name() {
        let entry = LogEntry::new(ChatMessage::text("hello", "Priya"));
        assert_eq!(entry.author("Priya"), EntryAuthor::User);
        assert_eq!(entry.author("Somebody"), EntryAuthor::Peer);
    }
}
