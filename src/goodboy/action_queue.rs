//! Follow-up actions derived from replies, queued for the user or a tool
//! runner to pick up later.

use crate::goodboy::error::GoodBoyError;
use crate::goodboy::jsonl;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ACTION_QUEUE_FILE: &str = "action_queue.jsonl";

/// A follow-up the assistant proposes alongside a reply.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SuggestedAction {
    pub kind: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
}

impl SuggestedAction {
    pub fn new(kind: &str, description: &str, tool_name: Option<&str>) -> Self {
        SuggestedAction {
            kind: kind.to_string(),
            description: description.to_string(),
            tool_name: tool_name.map(str::to_string),
        }
    }
}

/// Follow-ups implied by the message text.
pub fn suggest_actions(message: &str) -> Vec<SuggestedAction> {
    let lower = message.to_lowercase();
    let mut actions = Vec::new();
    if ["code", "build", "implement"].iter().any(|w| lower.contains(w)) {
        actions.push(SuggestedAction::new(
            "suggestion",
            "Review and test the generated code",
            Some("code_review"),
        ));
    }
    if ["schedule", "remind"].iter().any(|w| lower.contains(w)) {
        actions.push(SuggestedAction::new(
            "reminder",
            "Set up notification for this event",
            Some("create_reminder"),
        ));
    }
    actions
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct QueuedAction {
    pub kind: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(default)]
    pub tool_args: serde_json::Value,
    pub source_message: String,
    pub source_reply: String,
    pub created_at: DateTime<Utc>,
}

pub struct ActionQueue {
    path: PathBuf,
}

impl ActionQueue {
    pub fn open(dir: impl AsRef<Path>) -> Self {
        ActionQueue {
            path: dir.as_ref().join(ACTION_QUEUE_FILE),
        }
    }

    /// Append `actions`, each tagged with the exchange that produced it.
    pub fn enqueue(
        &self,
        actions: &[SuggestedAction],
        source_message: &str,
        source_reply: &str,
    ) -> Result<usize, GoodBoyError> {
        let now = Utc::now();
        for action in actions {
            let queued = QueuedAction {
                kind: action.kind.clone(),
                description: action.description.clone(),
                tool_name: action.tool_name.clone(),
                tool_args: serde_json::Value::Object(Default::default()),
                source_message: source_message.to_string(),
                source_reply: source_reply.to_string(),
                created_at: now,
            };
            jsonl::append_record(&self.path, &queued)?;
        }
        Ok(actions.len())
    }

    pub fn load_all(&self) -> Result<Vec<QueuedAction>, GoodBoyError> {
        Ok(jsonl::read_records(&self.path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_and_schedule_requests_get_follow_ups() {
        let actions = suggest_actions("Build the app and remind me tomorrow");
        let tools: Vec<_> = actions.iter().filter_map(|a| a.tool_name.as_deref()).collect();
        assert_eq!(tools, vec!["code_review", "create_reminder"]);
        assert!(suggest_actions("tell me a joke").is_empty());
    }
}
