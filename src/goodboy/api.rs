//! Request and response shapes exchanged with front ends.
//!
//! These are plain serde types; whatever transport a front end uses (HTTP,
//! a desktop window, a terminal) hands a [`ChatRequest`] to
//! [`Brain::chat`](crate::brain::Brain::chat) and serializes the
//! [`ChatResponse`] it gets back.

use crate::goodboy::action_queue::SuggestedAction;
use crate::goodboy::error::GoodBoyError;
use crate::goodboy::router::RoutingMode;
use serde::{Deserialize, Serialize};

pub const MAX_MESSAGE_CHARS: usize = 8000;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<RoutingMode>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        ChatRequest {
            message: message.into(),
            mode: None,
        }
    }

    pub fn with_mode(mut self, mode: RoutingMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Reject empty, whitespace-only and oversized messages.
    pub fn validate(&self) -> Result<(), GoodBoyError> {
        if self.message.trim().is_empty() {
            return Err(GoodBoyError::Validation("message is empty".to_string()));
        }
        let chars = self.message.chars().count();
        if chars > MAX_MESSAGE_CHARS {
            return Err(GoodBoyError::Validation(format!(
                "message is {} characters, the limit is {}",
                chars, MAX_MESSAGE_CHARS
            )));
        }
        Ok(())
    }
}

/// One persona's contribution, as shown in the trace.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AgentTrace {
    pub agent: String,
    pub proposal: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RouteMetadata {
    pub mode: RoutingMode,
    pub agents: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotional_tone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_time_ms: Option<u64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatResponse {
    pub output: String,
    pub agent_trace: Vec<AgentTrace>,
    pub route_metadata: RouteMetadata,
    #[serde(default)]
    pub suggested_actions: Vec<SuggestedAction>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TeachRequest {
    pub topic: String,
    pub instruction: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TeachResponse {
    pub status: String,
    pub lesson_id: String,
}
