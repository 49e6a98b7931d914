use serde::{Deserialize, Serialize};

/// Body for the assistant backend's text-generation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantQuery {
    pub message: String,
}
