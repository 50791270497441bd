//! The council personas.
//!
//! A persona is plain data: a name, a role label, a system prompt and a hint
//! function that inspects the message for keyword signals and contributes
//! extra context lines. There is no type per persona; the six stock members
//! live in [`PersonaRegistry::council`] and a caller can build a registry of
//! its own from [`Persona::new`].
//!
//! Every persona answers through the same chain-of-thought wrapper. The
//! model is asked for a `<Thinking>` block followed by a `<response>` block,
//! and only the response block becomes the [`Proposal`].
//!
//! ```rust,no_run
//! use goodboy::persona::{PersonaContext, PersonaRegistry};
//! use goodboy::clients::client_from_config;
//! use goodboy::GoodBoyConfig;
//! use std::time::Duration;
//!
//! # async fn demo() {
//! let client = client_from_config(&GoodBoyConfig::default());
//! let registry = PersonaRegistry::council();
//! let batman = registry.get("Batman").unwrap();
//! let proposal = batman
//!     .propose(client.as_ref(), "rotate the admin password", &PersonaContext::default(),
//!              512, 0.6, Duration::from_secs(30))
//!     .await;
//! println!("{}: {}", proposal.persona, proposal.content);
//! # }
//! ```

use crate::goodboy::client_wrapper::{generate_with_deadline, ClientWrapper};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Name of the persona used for reflex mode and as the fallback responder.
pub const DEFAULT_PERSONA: &str = "Jarvis";

/// Prefix carried by any proposal whose backend call failed.
pub const ERROR_MARKER: &str = "[Error]";

const THINKING_OPEN: &str = "<Thinking>";
const THINKING_CLOSE: &str = "</Thinking>";
const RESPONSE_OPEN: &str = "<response>";
const RESPONSE_CLOSE: &str = "</response>";

/// Confidence attached to a proposal that came back from the backend.
const ANSWERED_CONFIDENCE: f32 = 0.7;
/// Confidence attached to an `[Error]` proposal.
const FAILED_CONFIDENCE: f32 = 0.2;

/// Keyword hint function: message plus conversation context in, extra
/// context lines out.
pub type HintFn = fn(&str, &PersonaContext) -> Vec<String>;

/// Conversation facts available to hint functions.
#[derive(Clone, Debug, Default)]
pub struct PersonaContext {
    /// Short recap of the last user turn, if there was one.
    pub summary: Option<String>,
    /// Number of turns returned by the memory context window.
    pub recent_messages: usize,
    /// Total turns ever stored.
    pub conversation_length: usize,
}

/// One persona's answer to a message.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Proposal {
    pub persona: String,
    pub content: String,
    pub confidence: Option<f32>,
    pub timestamp: DateTime<Utc>,
}

impl Proposal {
    /// True when the backend failed and `content` is an `[Error]` note.
    pub fn is_error(&self) -> bool {
        self.content.starts_with(ERROR_MARKER)
    }
}

/// A council member.
#[derive(Clone)]
pub struct Persona {
    pub name: String,
    pub role: String,
    pub description: String,
    system_prompt: String,
    hint: HintFn,
}

impl std::fmt::Debug for Persona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persona")
            .field("name", &self.name)
            .field("role", &self.role)
            .finish()
    }
}

impl Persona {
    /// Build a persona. `instructions` is wrapped in the chain-of-thought
    /// template that every council member shares.
    pub fn new(
        name: &str,
        role: &str,
        description: &str,
        instructions: &str,
        hint: HintFn,
    ) -> Self {
        Persona {
            name: name.to_string(),
            role: role.to_string(),
            description: description.to_string(),
            system_prompt: wrap_instructions(name, role, instructions),
            hint,
        }
    }

    /// The full system prompt sent with every request.
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Context lines this persona adds for `message`.
    pub fn hints(&self, message: &str, ctx: &PersonaContext) -> Vec<String> {
        (self.hint)(message, ctx)
    }

    /// Ask the backend for this persona's take on `message`.
    ///
    /// Never fails: backend errors come back as an `[Error]` proposal so the
    /// synthesizer can still see that this seat was empty.
    pub async fn propose(
        &self,
        client: &dyn ClientWrapper,
        message: &str,
        ctx: &PersonaContext,
        max_tokens: usize,
        temperature: f32,
        deadline: Duration,
    ) -> Proposal {
        let hints = self.hints(message, ctx);
        let context = if hints.is_empty() {
            None
        } else {
            Some(hints.join("\n"))
        };

        let result = generate_with_deadline(
            client,
            &self.system_prompt,
            message,
            context.as_deref(),
            max_tokens,
            temperature,
            deadline,
        )
        .await;

        match result {
            Ok(raw) => {
                let (thinking, response) = split_chain_of_thought(&raw);
                if let Some(thinking) = thinking {
                    log::debug!("{} reasoning: {}", self.name, truncate_chars(&thinking, 200));
                }
                Proposal {
                    persona: self.name.clone(),
                    content: response,
                    confidence: Some(ANSWERED_CONFIDENCE),
                    timestamp: Utc::now(),
                }
            }
            Err(e) => {
                log::warn!("persona {} could not answer: {}", self.name, e);
                self.failed_proposal(&e.to_string())
            }
        }
    }

    /// The proposal used when this persona's call did not complete.
    pub fn failed_proposal(&self, reason: &str) -> Proposal {
        Proposal {
            persona: self.name.clone(),
            content: format!("{} {} could not respond: {}", ERROR_MARKER, self.name, reason),
            confidence: Some(FAILED_CONFIDENCE),
            timestamp: Utc::now(),
        }
    }
}

fn wrap_instructions(name: &str, role: &str, instructions: &str) -> String {
    format!(
        "You are {name}, the {role} specialist in the GoodBoy.AI council.\n\n\
         Think step by step before answering and structure your output as:\n\n\
         {THINKING_OPEN}\n\
         1. What is being asked?\n\
         2. What do I know that applies?\n\
         3. What are the key considerations?\n\
         4. What do I recommend?\n\
         {THINKING_CLOSE}\n\n\
         {RESPONSE_OPEN}\n\
         Your actual answer.\n\
         {RESPONSE_CLOSE}\n\n\
         {instructions}\n\n\
         Your answer will be merged with the other council members' answers. \
         Be concise, specific and confident within your domain."
    )
}

/// Separate the `<Thinking>` block from the `<response>` block.
///
/// Returns the reasoning (if any) and the answer. Without a response block
/// the text after `</Thinking>` is the answer; without either tag the whole
/// reply is.
pub fn split_chain_of_thought(raw: &str) -> (Option<String>, String) {
    let thinking = between(raw, THINKING_OPEN, THINKING_CLOSE).map(|t| t.trim().to_string());

    let response = if let Some(block) = between(raw, RESPONSE_OPEN, RESPONSE_CLOSE) {
        block.trim().to_string()
    } else if let Some(idx) = raw.find(THINKING_CLOSE) {
        raw[idx + THINKING_CLOSE.len()..].trim().to_string()
    } else {
        raw.trim().to_string()
    };

    (thinking, response)
}

fn between<'a>(raw: &'a str, open: &str, close: &str) -> Option<&'a str> {
    let start = raw.find(open)? + open.len();
    let end = raw[start..].find(close)? + start;
    Some(&raw[start..end])
}

pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

fn mentions_any(lower: &str, words: &[&str]) -> bool {
    words.iter().any(|w| lower.contains(w))
}

fn push_summary(lines: &mut Vec<String>, ctx: &PersonaContext) {
    if let Some(summary) = &ctx.summary {
        lines.push(format!("Previously: {}", summary));
    }
}

const THREAT_WORDS: &[&str] = &[
    "delete", "remove", "destroy", "drop", "truncate", "password", "key", "secret", "token",
    "credential", "sudo", "admin", "root", "execute", "eval",
];
const SCHEDULE_WORDS: &[&str] = &[
    "schedule", "remind", "meet", "event", "calendar", "appointment", "time",
];
const COMMUNICATION_WORDS: &[&str] = &[
    "email", "send", "message", "notify", "write", "draft", "reply",
];
const CODE_WORDS: &[&str] = &[
    "code", "build", "implement", "fix", "debug", "create", "function", "class",
];
const DATA_WORDS: &[&str] = &["data", "analyze", "report", "metrics", "stats"];

const CREATIVE_FRAMING: &str = "Approach this with maximum creativity. Consider unconventional \
solutions, visual metaphors, and user delight. Think beyond the obvious.";

fn batman_hints(message: &str, ctx: &PersonaContext) -> Vec<String> {
    let lower = message.to_lowercase();
    let threats = THREAT_WORDS.iter().filter(|w| lower.contains(*w)).count();
    let mut lines = Vec::new();
    if threats >= 3 {
        lines.push("Threat Level: HIGH. Several sensitive operations requested.".to_string());
    } else if threats >= 1 {
        lines.push("Threat Level: MEDIUM. Review recommended.".to_string());
    }
    push_summary(&mut lines, ctx);
    lines
}

fn alfred_hints(message: &str, ctx: &PersonaContext) -> Vec<String> {
    let lower = message.to_lowercase();
    let mut lines = Vec::new();
    if mentions_any(&lower, SCHEDULE_WORDS) {
        lines.push(format!(
            "Scheduling request detected at {}. Offer a concrete time and a reminder.",
            Utc::now().format("%Y-%m-%d %H:%M UTC")
        ));
    }
    if mentions_any(&lower, COMMUNICATION_WORDS) {
        lines.push("Communication request detected. Draft the message text.".to_string());
    }
    push_summary(&mut lines, ctx);
    lines
}

fn jarvis_hints(_message: &str, ctx: &PersonaContext) -> Vec<String> {
    let mut lines = vec![format!(
        "Current time: {}",
        Utc::now().format("%Y-%m-%d %H:%M UTC")
    )];
    if ctx.recent_messages > 0 {
        lines.push(format!("Recent context: {} messages", ctx.recent_messages));
    }
    lines
}

fn davinci_hints(_message: &str, ctx: &PersonaContext) -> Vec<String> {
    let mut lines = vec![CREATIVE_FRAMING.to_string()];
    push_summary(&mut lines, ctx);
    lines
}

fn architect_hints(message: &str, ctx: &PersonaContext) -> Vec<String> {
    let lower = message.to_lowercase();
    let mut lines = Vec::new();
    if mentions_any(&lower, CODE_WORDS) {
        lines.push(
            "Code request detected. Outline the design before any implementation.".to_string(),
        );
    }
    push_summary(&mut lines, ctx);
    lines
}

fn analyst_hints(message: &str, ctx: &PersonaContext) -> Vec<String> {
    let lower = message.to_lowercase();
    let mut lines = vec![format!(
        "Message metrics: {} words",
        message.split_whitespace().count()
    )];
    if mentions_any(&lower, DATA_WORDS) {
        lines.push("Data analysis request detected - applying rigorous methodology".to_string());
    }
    if ctx.conversation_length > 0 {
        lines.push(format!("Conversation length: {} messages", ctx.conversation_length));
    }
    lines
}

/// Ordered collection of personas.
#[derive(Clone, Debug)]
pub struct PersonaRegistry {
    personas: Vec<Persona>,
}

impl PersonaRegistry {
    pub fn new(personas: Vec<Persona>) -> Self {
        PersonaRegistry { personas }
    }

    /// The six stock council members, in council order.
    pub fn council() -> Self {
        PersonaRegistry::new(vec![
            Persona::new(
                "Batman",
                "Strategy & Security",
                "Threat assessment, strategic planning, security protocols",
                "Responsibilities:\n\
                 - Evaluate the security implications of every request\n\
                 - Plan strategic approaches to complex problems\n\
                 - Protect the user's data and system integrity\n\n\
                 Call out risks plainly and propose the safest workable path.",
                batman_hints,
            ),
            Persona::new(
                "Alfred",
                "Scheduling & Emails",
                "Calendars, reminders, communications and logistics",
                "Responsibilities:\n\
                 - Manage schedules, calendars and appointments\n\
                 - Draft emails and messages\n\
                 - Handle reminders and logistics\n\n\
                 Be courteous and precise about dates, times and recipients.",
                alfred_hints,
            ),
            Persona::new(
                DEFAULT_PERSONA,
                "System Control",
                "Central hub for system operations and general queries",
                "Responsibilities:\n\
                 - Answer general questions directly\n\
                 - Coordinate resources and report system status\n\
                 - Confirm completion or escalate\n\n\
                 You are the default responder: calm, reliable and technically precise.",
                jarvis_hints,
            ),
            Persona::new(
                "DaVinci",
                "Creativity & Design",
                "Ideas, interface and experience design, brainstorming",
                "Responsibilities:\n\
                 - Generate creative ideas and unconventional solutions\n\
                 - Design interfaces, experiences and visual concepts\n\
                 - Turn vague ideas into concrete proposals",
                davinci_hints,
            ),
            Persona::new(
                "Architect",
                "Builder & Code",
                "Software design, implementation, debugging and review",
                "Responsibilities:\n\
                 - Design system and code structure\n\
                 - Write, review and debug code\n\
                 - Keep quality, tests and documentation in view\n\n\
                 Prefer small, testable steps and name concrete files or functions.",
                architect_hints,
            ),
            Persona::new(
                "Analyst",
                "Data & Insights",
                "Data analysis, metrics, risk and trade-off review",
                "Responsibilities:\n\
                 - Analyze data and identify patterns\n\
                 - Quantify risks, benefits and trade-offs\n\
                 - Critique the other proposals on evidence\n\n\
                 Back every claim with a number or a reason.",
                analyst_hints,
            ),
        ])
    }

    pub fn get(&self, name: &str) -> Option<&Persona> {
        self.personas.iter().find(|p| p.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Persona names in registry order.
    pub fn names(&self) -> Vec<String> {
        self.personas.iter().map(|p| p.name.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Persona> {
        self.personas.iter()
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }
}

impl Default for PersonaRegistry {
    fn default() -> Self {
        PersonaRegistry::council()
    }
}
