use std::rc::Rc;

use jiff::Timestamp;
use uuid::Uuid;
use yew::prelude::*;

use crate::get_assistant_client;
use crate::hooks::use_speech;

/// Fixed reply appended when the assistant backend fails for any reason.
pub const FALLBACK_REPLY: &str =
    "Sorry, I encountered an error. Please try again.";

const GREETING: &str = "Hello! I'm your BloodLink assistant. I can help \
                        you find blood units in your area. Ask me about \
                        blood availability, blood banks, or specific \
                        blood types.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Clone, PartialEq)]
pub struct ChatEntry {
    pub id: Uuid,
    pub role: ChatRole,
    pub text: String,
    pub timestamp: Timestamp,
}

impl ChatEntry {
    fn new(role: ChatRole, text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            text,
            timestamp: Timestamp::now(),
        }
    }
}

/// Append-only log for the request/response assistant session.
#[derive(Clone, PartialEq)]
pub struct AssistantLog {
    pub entries: Vec<ChatEntry>,
    pub processing: bool,
}

impl AssistantLog {
    pub fn greeting() -> Self {
        Self {
            entries: vec![ChatEntry::new(
                ChatRole::Assistant,
                GREETING.to_string(),
            )],
            processing: false,
        }
    }

    /// Append the user entry and mark the session busy. Refused while a
    /// request is already in flight or for blank input.
    pub fn begin(&mut self, text: &str) -> bool {
        let text = text.trim();
        if self.processing || text.is_empty() {
            return false;
        }
        self.entries
            .push(ChatEntry::new(ChatRole::User, text.to_string()));
        self.processing = true;
        true
    }

    /// Append the reply (or the fixed fallback) and clear the busy flag;
    /// both outcomes land exactly one assistant entry.
    pub fn complete(&mut self, result: Result<String, String>) {
        let text = match result {
            Ok(reply) => reply,
            Err(error) => {
                tracing::error!(%error, "assistant request failed");
                FALLBACK_REPLY.to_string()
            }
        };
        self.entries.push(ChatEntry::new(ChatRole::Assistant, text));
        self.processing = false;
    }
}

pub enum AssistantAction {
    Begin(String),
    Complete(Result<String, String>),
}

impl Reducible for AssistantLog {
    type Action = AssistantAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        match action {
            AssistantAction::Begin(text) => {
                next.begin(&text);
            }
            AssistantAction::Complete(result) => next.complete(result),
        }
        Rc::new(next)
    }
}

/// Hook return type for the assistant session
pub struct AssistantHookReturn {
    pub entries: Vec<ChatEntry>,
    pub processing: bool,
    pub send: Callback<String>,
}

/// Hook to manage the request/response assistant session.
///
/// One backend call per send, no retry. The reply is spoken through the
/// speech synthesis engine when one is available.
#[hook]
pub fn use_assistant() -> AssistantHookReturn {
    let log = use_reducer(AssistantLog::greeting);
    // Callback-side guard against overlapping requests; the log's own
    // `processing` flag drives the rendered state.
    let busy = use_mut_ref(|| false);

    let send = {
        let log = log.clone();
        use_callback((), move |text: String, _| {
            let trimmed = text.trim().to_string();
            if trimmed.is_empty() || *busy.borrow() {
                return;
            }
            *busy.borrow_mut() = true;
            log.dispatch(AssistantAction::Begin(trimmed.clone()));

            let log = log.clone();
            let busy = busy.clone();
            yew::platform::spawn_local(async move {
                let api_client = get_assistant_client();
                let result = api_client
                    .ask(&trimmed)
                    .await
                    .map_err(|e| e.to_string());
                if let Ok(reply) = &result {
                    use_speech::speak(reply);
                }
                log.dispatch(AssistantAction::Complete(result));
                *busy.borrow_mut() = false;
            });
        })
    };

    AssistantHookReturn {
        entries: log.entries.clone(),
        processing: log.processing,
        send,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_seeds_the_log() {
        let log = AssistantLog::greeting();
        assert_eq!(log.entries.len(), 1);
        assert_eq!(log.entries[0].role, ChatRole::Assistant);
        assert!(!log.processing);
    }

    #[test]
    fn begin_refuses_blank_and_busy() {
        let mut log = AssistantLog::greeting();
        assert!(!log.begin("   "));
        assert!(log.begin("find O+ blood"));
        assert!(log.processing);
        assert!(!log.begin("second question"));
        assert_eq!(log.entries.len(), 2);
    }

    #[test]
    fn failure_clears_processing_and_appends_one_fallback() {
        let mut log = AssistantLog::greeting();
        log.begin("anything");
        let before = log.entries.len();

        log.complete(Err("backend unreachable".to_string()));
        assert!(!log.processing);
        assert_eq!(log.entries.len(), before + 1);
        let last = log.entries.last().unwrap();
        assert_eq!(last.role, ChatRole::Assistant);
        assert_eq!(last.text, FALLBACK_REPLY);
    }

    #[test]
    fn success_appends_the_reply_verbatim() {
        let mut log = AssistantLog::greeting();
        log.begin("anything");
        log.complete(Ok("Apollo has 5 units of O+.".to_string()));
        assert!(!log.processing);
        assert_eq!(
            log.entries.last().unwrap().text,
            "Apollo has 5 units of O+."
        );
    }
}
