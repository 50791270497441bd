//! Conversation memory: an append-only log of exchanges in `messages.jsonl`.

use crate::goodboy::error::GoodBoyError;
use crate::goodboy::jsonl;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const MESSAGES_FILE: &str = "messages.jsonl";
pub const DEFAULT_CONTEXT_WINDOW: usize = 10;

/// One stored exchange. At least one side is present.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ConversationTurn {
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assistant: Option<String>,
}

/// Recency window returned by [`ConversationMemory::get_context`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MemoryContext {
    pub recent_messages: Vec<ConversationTurn>,
    pub conversation_length: usize,
    pub last_interaction: Option<DateTime<Utc>>,
}

impl MemoryContext {
    /// Text of the most recent user turn in the window.
    pub fn last_user_message(&self) -> Option<&str> {
        self.recent_messages
            .iter()
            .rev()
            .find_map(|t| t.user.as_deref())
    }
}

/// A memory search result.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MemorySearchHit {
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: String,
}

pub struct ConversationMemory {
    path: PathBuf,
    turns: Vec<ConversationTurn>,
}

impl ConversationMemory {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, GoodBoyError> {
        let path = dir.as_ref().join(MESSAGES_FILE);
        let turns = jsonl::read_records(&path)?;
        Ok(ConversationMemory { path, turns })
    }

    /// Store one exchange stamped with the current time.
    pub fn add_message(
        &mut self,
        user: Option<&str>,
        assistant: Option<&str>,
    ) -> Result<ConversationTurn, GoodBoyError> {
        if user.is_none() && assistant.is_none() {
            return Err(GoodBoyError::Validation(
                "a conversation turn needs user or assistant text".to_string(),
            ));
        }
        let turn = ConversationTurn {
            timestamp: Utc::now(),
            user: user.map(str::to_string),
            assistant: assistant.map(str::to_string),
        };
        jsonl::append_record(&self.path, &turn)?;
        self.turns.push(turn.clone());
        Ok(turn)
    }

    /// The last `k` turns in stored order.
    pub fn get_context(&self, k: usize) -> MemoryContext {
        let start = self.turns.len().saturating_sub(k);
        MemoryContext {
            recent_messages: self.turns[start..].to_vec(),
            conversation_length: self.turns.len(),
            last_interaction: self.turns.last().map(|t| t.timestamp),
        }
    }

    /// Newest-first, case-insensitive substring search over user text.
    pub fn search(&self, query: &str, k: usize) -> Vec<MemorySearchHit> {
        let needle = query.to_lowercase();
        self.turns
            .iter()
            .rev()
            .filter_map(|t| t.user.as_ref().map(|text| (t.timestamp, text)))
            .filter(|(_, text)| text.to_lowercase().contains(&needle))
            .take(k)
            .map(|(timestamp, text)| MemorySearchHit {
                text: text.clone(),
                timestamp,
                kind: "user_message".to_string(),
            })
            .collect()
    }

    /// Drop turns older than `days` and rewrite the log. Returns how many
    /// turns were removed. A window too large to represent keeps everything.
    pub fn cleanup_old_entries(&mut self, days: i64) -> Result<usize, GoodBoyError> {
        let cutoff = match Duration::try_days(days.max(0))
            .and_then(|window| Utc::now().checked_sub_signed(window))
        {
            Some(cutoff) => cutoff,
            None => {
                log::warn!(
                    "goodboy::memory: retention of {} days is out of range, keeping all turns",
                    days
                );
                return Ok(0);
            }
        };
        let before = self.turns.len();
        self.turns.retain(|t| t.timestamp >= cutoff);
        let removed = before - self.turns.len();
        if removed > 0 {
            jsonl::rewrite_records(&self.path, &self.turns)?;
            log::info!("goodboy::memory: removed {} turns older than {} days", removed, days);
        }
        Ok(removed)
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
