//! Merges persona proposals into the single reply the user sees.
//!
//! One backend call per request. When that call fails the reply is built
//! deterministically from the proposals themselves, so the output is never
//! empty.

use crate::goodboy::client_wrapper::{generate_with_deadline, ClientWrapper};
use crate::goodboy::persona::{truncate_chars, Proposal};
use std::sync::Arc;
use std::time::Duration;

/// Reply used when no persona produced anything.
pub const EMPTY_PROPOSALS_REPLY: &str = "I couldn't process that request. Could you rephrase it?";

/// First line of the deterministic fallback reply.
pub const FALLBACK_LEAD_IN: &str = "Based on council analysis:";

/// Characters kept from each proposal in the fallback reply.
pub const FALLBACK_EXCERPT_CHARS: usize = 200;

pub const SYNTHESIS_MAX_TOKENS: usize = 600;
pub const SYNTHESIS_TEMPERATURE: f32 = 0.7;

pub const SYNTHESIS_SYSTEM_PROMPT: &str = "You are GoodBoy.AI, speaking to the user with one voice.\n\n\
Several council members have each proposed an answer to the user's request. \
Write the final reply:\n\
- Resolve any conflicts between the proposals and pick the best approach.\n\
- Do not quote the proposals verbatim and do not name the council members.\n\
- Speak in the first person as a single assistant.\n\
- Use at most 3 short paragraphs, optionally followed by a short numbered plan.\n\
- Apply any relevant learnings the user has taught you.";

/// Outcome of a synthesis pass.
#[derive(Clone, Debug, PartialEq)]
pub struct Synthesis {
    pub text: String,
    /// True when the backend call failed and the fallback text was used.
    pub used_fallback: bool,
}

/// Turns proposals plus lesson text into one reply.
#[derive(Clone)]
pub struct Synthesizer {
    client: Arc<dyn ClientWrapper>,
    max_tokens: usize,
    temperature: f32,
    deadline: Duration,
}

impl Synthesizer {
    pub fn new(client: Arc<dyn ClientWrapper>) -> Self {
        Synthesizer {
            client,
            max_tokens: SYNTHESIS_MAX_TOKENS,
            temperature: SYNTHESIS_TEMPERATURE,
            deadline: Duration::from_secs(120),
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Merge `proposals` for `message`. `lessons` are instruction lines
    /// retrieved from the lesson store.
    pub async fn synthesize(
        &self,
        message: &str,
        proposals: &[Proposal],
        lessons: &[String],
    ) -> Synthesis {
        if proposals.is_empty() {
            return Synthesis {
                text: EMPTY_PROPOSALS_REPLY.to_string(),
                used_fallback: false,
            };
        }

        let context = synthesis_context(message, proposals, lessons);
        let result = generate_with_deadline(
            self.client.as_ref(),
            SYNTHESIS_SYSTEM_PROMPT,
            message,
            Some(&context),
            self.max_tokens,
            self.temperature,
            self.deadline,
        )
        .await;

        match result {
            Ok(text) if !text.trim().is_empty() => Synthesis {
                text: text.trim().to_string(),
                used_fallback: false,
            },
            Ok(_) => {
                log::warn!("goodboy::synthesizer: backend returned an empty reply");
                fallback(proposals)
            }
            Err(e) => {
                log::error!("goodboy::synthesizer: {}", e);
                fallback(proposals)
            }
        }
    }
}

fn fallback(proposals: &[Proposal]) -> Synthesis {
    Synthesis {
        text: fallback_reply(proposals),
        used_fallback: true,
    }
}

/// The context block handed to the backend.
pub fn synthesis_context(message: &str, proposals: &[Proposal], lessons: &[String]) -> String {
    let mut parts = vec![format!("User Request: {}", message)];

    let inputs: Vec<String> = proposals
        .iter()
        .map(|p| format!("**{}**: {}", p.persona, p.content))
        .collect();
    parts.push(format!("Agent Inputs:\n{}", inputs.join("\n\n")));

    if !lessons.is_empty() {
        let lines: Vec<String> = lessons.iter().map(|l| format!("- {}", l)).collect();
        parts.push(format!("Relevant Learnings:\n{}", lines.join("\n")));
    }
    parts.join("\n\n")
}

/// Lead-in line followed by the opening of every proposal.
pub fn fallback_reply(proposals: &[Proposal]) -> String {
    let bullets: Vec<String> = proposals
        .iter()
        .map(|p| format!("- {}", truncate_chars(&p.content, FALLBACK_EXCERPT_CHARS)))
        .collect();
    format!("{}\n\n{}", FALLBACK_LEAD_IN, bullets.join("\n"))
}
