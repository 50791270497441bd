//! Persona selection.
//!
//! | Mode        | Personas                                         |
//! |-------------|--------------------------------------------------|
//! | `reflex`    | Jarvis                                           |
//! | `council`   | every registered persona, registry order         |
//! | `strategic` | Batman, Architect, Analyst                       |
//! | `auto`      | learned hint if present, else first keyword pair |
//!
//! Auto-mode signals are lowercase substring checks evaluated in a fixed
//! precedence order; see [`Signal`].

use crate::goodboy::error::GoodBoyError;
use crate::goodboy::persona::{PersonaRegistry, DEFAULT_PERSONA};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Routing strategy for one request.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum RoutingMode {
    #[default]
    Auto,
    Reflex,
    Council,
    Strategic,
}

impl RoutingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoutingMode::Auto => "auto",
            RoutingMode::Reflex => "reflex",
            RoutingMode::Council => "council",
            RoutingMode::Strategic => "strategic",
        }
    }
}

impl fmt::Display for RoutingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoutingMode {
    type Err = GoodBoyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(RoutingMode::Auto),
            "reflex" => Ok(RoutingMode::Reflex),
            "council" => Ok(RoutingMode::Council),
            "strategic" => Ok(RoutingMode::Strategic),
            other => Err(GoodBoyError::Validation(format!(
                "unknown routing mode '{}'",
                other
            ))),
        }
    }
}

/// Keyword categories checked in auto mode, highest precedence first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Signal {
    Code,
    /// Scheduling or communication; one category, two word lists.
    Scheduling,
    Creative,
    Security,
    Data,
}

const CODE_SIGNAL: &[&str] = &[
    "code", "build", "fix", "implement", "debug", "function", "class", "error",
];
const SCHEDULE_SIGNAL: &[&str] = &["schedule", "remind", "meet", "calendar", "appointment", "time"];
const EMAIL_SIGNAL: &[&str] = &["email", "send", "message", "write", "draft"];
const CREATIVE_SIGNAL: &[&str] =
    &["creative", "design", "idea", "brainstorm", "imagine", "concept"];
const SECURITY_SIGNAL: &[&str] =
    &["security", "threat", "protect", "safe", "password", "permission"];
const DATA_SIGNAL: &[&str] = &["data", "analyze", "report", "metrics", "stats", "numbers"];

const STRATEGIC_TEAM: [&str; 3] = ["Batman", "Architect", "Analyst"];
const DEFAULT_PAIR: [&str; 2] = [DEFAULT_PERSONA, "Analyst"];

impl Signal {
    /// All signals, in precedence order.
    pub const ORDER: [Signal; 5] = [
        Signal::Code,
        Signal::Scheduling,
        Signal::Creative,
        Signal::Security,
        Signal::Data,
    ];

    pub fn matches(&self, lower: &str) -> bool {
        let hit = |words: &[&str]| words.iter().any(|w| lower.contains(w));
        match self {
            Signal::Code => hit(CODE_SIGNAL),
            Signal::Scheduling => hit(SCHEDULE_SIGNAL) || hit(EMAIL_SIGNAL),
            Signal::Creative => hit(CREATIVE_SIGNAL),
            Signal::Security => hit(SECURITY_SIGNAL),
            Signal::Data => hit(DATA_SIGNAL),
        }
    }

    fn pair(&self) -> [&'static str; 2] {
        match self {
            Signal::Code => ["Architect", "Analyst"],
            Signal::Scheduling => ["Alfred", DEFAULT_PERSONA],
            Signal::Creative => ["DaVinci", "Architect"],
            Signal::Security => ["Batman", "Analyst"],
            Signal::Data => ["Analyst", DEFAULT_PERSONA],
        }
    }

    fn rationale(&self) -> &'static str {
        match self {
            Signal::Code => "Code signals -> Architect (build) + Analyst (review)",
            Signal::Scheduling => "Scheduling/email -> Alfred (admin) + Jarvis (execution)",
            Signal::Creative => "Creative request -> DaVinci (design) + Architect (feasibility)",
            Signal::Security => "Security concern -> Batman (threat) + Analyst (assessment)",
            Signal::Data => "Data request -> Analyst (insights) + Jarvis (system)",
        }
    }
}

/// Every signal present in `message`, precedence order.
pub fn detect_signals(message: &str) -> Vec<Signal> {
    let lower = message.to_lowercase();
    Signal::ORDER
        .iter()
        .copied()
        .filter(|s| s.matches(&lower))
        .collect()
}

/// Which personas answer, and why.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub mode: RoutingMode,
    pub personas: Vec<String>,
    pub rationale: String,
}

/// Maps a message and mode onto persona names from one registry.
#[derive(Clone, Debug)]
pub struct Router {
    council: Vec<String>,
}

impl Router {
    pub fn new(registry: &PersonaRegistry) -> Self {
        Router {
            council: registry.names(),
        }
    }

    /// Pick personas for `message`.
    ///
    /// `hint` only matters in auto mode, where a non-empty hint (after
    /// dropping names the registry does not know) replaces keyword routing.
    pub fn route(
        &self,
        message: &str,
        mode: RoutingMode,
        hint: Option<&[String]>,
    ) -> RoutingDecision {
        let decision = match mode {
            RoutingMode::Reflex => self.decision(mode, &[DEFAULT_PERSONA], "Fast reflex mode"),
            RoutingMode::Council => RoutingDecision {
                mode,
                personas: self.council.clone(),
                rationale: "Full council deliberation".to_string(),
            },
            RoutingMode::Strategic => self.decision(
                mode,
                &STRATEGIC_TEAM,
                "Strategic planning with security and analysis",
            ),
            RoutingMode::Auto => self.route_auto(message, hint),
        };
        log::debug!(
            "goodboy::router: {} -> {:?} ({})",
            decision.mode,
            decision.personas,
            decision.rationale
        );
        decision
    }

    fn route_auto(&self, message: &str, hint: Option<&[String]>) -> RoutingDecision {
        if let Some(hinted) = hint {
            let known: Vec<String> = hinted
                .iter()
                .filter(|name| self.council.contains(name))
                .cloned()
                .collect();
            if !known.is_empty() {
                return RoutingDecision {
                    mode: RoutingMode::Auto,
                    personas: known,
                    rationale: "Optimized routing from learned patterns".to_string(),
                };
            }
        }

        let lower = message.to_lowercase();
        match Signal::ORDER.iter().find(|s| s.matches(&lower)) {
            Some(signal) => self.decision(RoutingMode::Auto, &signal.pair(), signal.rationale()),
            None => self.decision(
                RoutingMode::Auto,
                &DEFAULT_PAIR,
                "General query -> Jarvis (core) + Analyst",
            ),
        }
    }

    fn decision(&self, mode: RoutingMode, names: &[&str], rationale: &str) -> RoutingDecision {
        RoutingDecision {
            mode,
            personas: names.iter().map(|n| n.to_string()).collect(),
            rationale: rationale.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parses_and_displays() {
        assert_eq!("Council".parse::<RoutingMode>().unwrap(), RoutingMode::Council);
        assert_eq!(RoutingMode::Strategic.to_string(), "strategic");
        assert!("fast".parse::<RoutingMode>().is_err());
    }

    #[test]
    fn signals_follow_precedence() {
        let found = detect_signals("fix the report design");
        assert_eq!(found, vec![Signal::Code, Signal::Creative, Signal::Data]);
    }
}
