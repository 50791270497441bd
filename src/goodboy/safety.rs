//! Tool-suggestion policy and the hashed audit trail.

use crate::goodboy::config::SafetyMode;
use crate::goodboy::error::GoodBoyError;
use crate::goodboy::jsonl;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const SAFE_TOOLS: &[&str] = &[
    "code_review",
    "memory_search",
    "suggest_refactor",
    "format_code",
    "lint_check",
];

pub const DANGEROUS_OPERATIONS: &[&str] = &[
    "delete_files",
    "system_command",
    "modify_core",
    "export_data",
    "reset_state",
];

pub const AUDIT_FILE: &str = "audit.jsonl";

/// Decides which tools the assistant may suggest.
#[derive(Clone, Debug)]
pub struct SafetyPolicy {
    mode: SafetyMode,
    allowed_tools: HashSet<String>,
}

impl SafetyPolicy {
    pub fn new<I, S>(mode: SafetyMode, allowed_tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SafetyPolicy {
            mode,
            allowed_tools: allowed_tools.into_iter().map(Into::into).collect(),
        }
    }

    pub fn mode(&self) -> SafetyMode {
        self.mode
    }

    pub fn can_execute(&self, tool: &str) -> bool {
        if DANGEROUS_OPERATIONS.contains(&tool) {
            return self.mode == SafetyMode::Autonomous && self.allowed_tools.contains(tool);
        }
        if SAFE_TOOLS.contains(&tool) {
            return true;
        }
        if self.mode == SafetyMode::ReadOnly {
            return false;
        }
        self.allowed_tools.is_empty() || self.allowed_tools.contains(tool)
    }
}

/// One audit record. Message and reply are stored as short hashes only.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub message_hash: String,
    pub agents: Vec<String>,
    pub result_hash: String,
}

/// First eight hex characters of the SHA-256 of `text`.
pub fn short_hash(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    digest.iter().take(4).map(|b| format!("{:02x}", b)).collect()
}

pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn open(dir: impl AsRef<Path>) -> Self {
        AuditLog {
            path: dir.as_ref().join(AUDIT_FILE),
        }
    }

    pub fn log_interaction(
        &self,
        message: &str,
        agents: &[String],
        result: &str,
    ) -> Result<AuditEntry, GoodBoyError> {
        let entry = AuditEntry {
            timestamp: Utc::now(),
            message_hash: short_hash(message),
            agents: agents.to_vec(),
            result_hash: short_hash(result),
        };
        jsonl::append_record(&self.path, &entry)?;
        Ok(entry)
    }

    pub fn entries(&self) -> Result<Vec<AuditEntry>, GoodBoyError> {
        Ok(jsonl::read_records(&self.path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_only_allows_safe_tools_only() {
        let policy = SafetyPolicy::new(SafetyMode::ReadOnly, Vec::<String>::new());
        assert!(policy.can_execute("code_review"));
        assert!(!policy.can_execute("create_reminder"));
        assert!(!policy.can_execute("delete_files"));
    }

    #[test]
    fn dangerous_needs_autonomous_and_allow_list() {
        let interactive = SafetyPolicy::new(SafetyMode::Interactive, vec!["delete_files"]);
        assert!(!interactive.can_execute("delete_files"));
        let autonomous = SafetyPolicy::new(SafetyMode::Autonomous, vec!["delete_files"]);
        assert!(autonomous.can_execute("delete_files"));
        assert!(!autonomous.can_execute("reset_state"));
    }

    #[test]
    fn allow_list_restricts_other_tools() {
        let open = SafetyPolicy::new(SafetyMode::Interactive, Vec::<String>::new());
        assert!(open.can_execute("create_reminder"));
        let listed = SafetyPolicy::new(SafetyMode::Interactive, vec!["send_email"]);
        assert!(!listed.can_execute("create_reminder"));
        assert!(listed.can_execute("send_email"));
        assert!(listed.can_execute("lint_check"));
    }

    #[test]
    fn short_hash_is_eight_hex_chars() {
        // sha256("abc") = ba7816bf...
        assert_eq!(short_hash("abc"), "ba7816bf");
    }
}
