//! Evolution ledger: interaction counters, per-persona proficiency and the
//! overseer, reflection and processed-action logs.
//!
//! The state document (`evolution.json`) is rewritten after every change;
//! the three logs are append-only JSONL files next to it.

use crate::goodboy::error::GoodBoyError;
use crate::goodboy::jsonl;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const EVOLUTION_FILE: &str = "evolution.json";
pub const OVERSEER_FILE: &str = "overseer_suggestions.jsonl";
pub const REFLECTIONS_FILE: &str = "self_reflections.jsonl";
pub const PROCESSED_FILE: &str = "processed_actions.jsonl";

pub const PROFICIENCY_FLOOR: f32 = 0.1;
pub const PROFICIENCY_CEILING: f32 = 1.0;
const SUCCESS_STEP: f32 = 0.05;
const FAILURE_STEP: f32 = 0.03;
const REBALANCE_THRESHOLD: f32 = 0.8;
const CONSOLIDATION_PERIOD: u64 = 100;

/// Persisted ledger state.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EvolutionState {
    pub version: String,
    pub generation: u64,
    pub total_interactions: u64,
    pub successful_resolutions: u64,
    pub agent_proficiency: BTreeMap<String, f32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EvolutionState {
    fn fresh(personas: &[String]) -> Self {
        let now = Utc::now();
        EvolutionState {
            version: "1.0".to_string(),
            generation: 0,
            total_interactions: 0,
            successful_resolutions: 0,
            agent_proficiency: personas
                .iter()
                .map(|p| (p.clone(), PROFICIENCY_CEILING))
                .collect(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// An overseer recommendation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct OverseerSuggestion {
    pub id: String,
    pub description: String,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_agent: Option<String>,
    pub suggested_at: DateTime<Utc>,
}

/// Returned by [`EvolutionLedger::trigger_generation_increment`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GenerationInfo {
    pub generation: u64,
    pub interactions_this_gen: u64,
    pub timestamp: DateTime<Utc>,
}

/// Snapshot returned to status callers.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EvolutionStatus {
    pub generation: u64,
    pub total_interactions: u64,
    pub success_rate: f64,
    pub agent_proficiency: BTreeMap<String, f32>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReflectionKind {
    Limitation,
    Learning,
    Evolution,
}

impl ReflectionKind {
    pub fn for_confidence(confidence: f32) -> Self {
        if confidence < 0.5 {
            ReflectionKind::Limitation
        } else if confidence > 0.9 {
            ReflectionKind::Evolution
        } else {
            ReflectionKind::Learning
        }
    }
}

/// One self-reflection entry.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Reflection {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: ReflectionKind,
    pub message_length: usize,
    pub confidence: f32,
    pub analysis: String,
    pub next_steps: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProcessedAction {
    pub timestamp: DateTime<Utc>,
    pub action_id: String,
    pub result: serde_json::Value,
    pub generation: u64,
}

/// Owner of `evolution.json` and its companion logs.
pub struct EvolutionLedger {
    state: EvolutionState,
    state_path: PathBuf,
    overseer_path: PathBuf,
    reflections_path: PathBuf,
    processed_path: PathBuf,
}

impl EvolutionLedger {
    /// Open the ledger in `dir`, seeding proficiency 1.0 for any persona the
    /// stored state does not know yet.
    pub fn open(dir: impl AsRef<Path>, personas: &[String]) -> Result<Self, GoodBoyError> {
        let dir = dir.as_ref();
        let state_path = dir.join(EVOLUTION_FILE);
        let mut state = jsonl::read_document::<EvolutionState>(&state_path)?
            .unwrap_or_else(|| EvolutionState::fresh(personas));
        for persona in personas {
            state
                .agent_proficiency
                .entry(persona.clone())
                .or_insert(PROFICIENCY_CEILING);
        }

        let ledger = EvolutionLedger {
            state,
            state_path,
            overseer_path: dir.join(OVERSEER_FILE),
            reflections_path: dir.join(REFLECTIONS_FILE),
            processed_path: dir.join(PROCESSED_FILE),
        };
        ledger.save()?;
        Ok(ledger)
    }

    pub fn state(&self) -> &EvolutionState {
        &self.state
    }

    /// Count one interaction and adjust the proficiency of every persona
    /// that took part. Names the ledger does not track are ignored.
    pub fn record_interaction(
        &mut self,
        message: &str,
        response: &str,
        agents_used: &[String],
        success: bool,
    ) -> Result<(), GoodBoyError> {
        self.state.total_interactions += 1;
        if success {
            self.state.successful_resolutions += 1;
        }
        for agent in agents_used {
            if let Some(score) = self.state.agent_proficiency.get_mut(agent) {
                let delta = if success { SUCCESS_STEP } else { -FAILURE_STEP };
                *score = (*score + delta).clamp(PROFICIENCY_FLOOR, PROFICIENCY_CEILING);
            }
        }
        self.state.updated_at = Utc::now();
        log::debug!(
            "goodboy::evolution: interaction #{} ({} -> {} chars, success={})",
            self.state.total_interactions,
            message.len(),
            response.len(),
            success
        );
        self.save()
    }

    /// Overseer pass. Suggestions are appended to the overseer log and
    /// returned.
    pub fn suggest_actions(&mut self) -> Result<Vec<OverseerSuggestion>, GoodBoyError> {
        let now = Utc::now();
        let mut suggestions = Vec::new();

        let total = self.state.total_interactions;
        if total > 0 && total % CONSOLIDATION_PERIOD == 0 {
            suggestions.push(OverseerSuggestion {
                id: "memory_optimize".to_string(),
                description: "Perform memory consolidation and optimization".to_string(),
                priority: Priority::Medium,
                target_agent: None,
                suggested_at: now,
            });
        }

        let lowest = self
            .state
            .agent_proficiency
            .iter()
            .min_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal));
        if let Some((agent, score)) = lowest {
            if *score < REBALANCE_THRESHOLD {
                suggestions.push(OverseerSuggestion {
                    id: "rebalance_agents".to_string(),
                    description: format!("Improve {} performance ({:.2})", agent, score),
                    priority: Priority::High,
                    target_agent: Some(agent.clone()),
                    suggested_at: now,
                });
            }
        }

        for suggestion in &suggestions {
            jsonl::append_record(&self.overseer_path, suggestion)?;
        }
        Ok(suggestions)
    }

    /// Start a new generation. Unconditional.
    pub fn trigger_generation_increment(&mut self) -> Result<GenerationInfo, GoodBoyError> {
        self.state.generation += 1;
        self.state.updated_at = Utc::now();
        self.save()?;
        log::info!("goodboy::evolution: generation {}", self.state.generation);
        Ok(GenerationInfo {
            generation: self.state.generation,
            interactions_this_gen: self.state.total_interactions,
            timestamp: self.state.updated_at,
        })
    }

    /// Write a self-reflection for one exchange and return it.
    pub fn reflect_on_performance(
        &self,
        message: &str,
        output: &str,
        confidence: f32,
    ) -> Result<Reflection, GoodBoyError> {
        let mut analysis = String::from("Performance Analysis: ");
        analysis.push_str(if output.chars().count() > 200 {
            "Comprehensive response provided. "
        } else {
            "Brief response noted. "
        });
        analysis.push_str(if output.to_lowercase().contains("error") {
            "Issue encountered - flagged for improvement."
        } else {
            "Execution successful."
        });

        let mut next_steps = Vec::new();
        if confidence < 0.6 {
            next_steps.push("Increase certainty in responses".to_string());
            next_steps.push("Consult more agents for edge cases".to_string());
        }
        if output.chars().count() < 50 {
            next_steps.push("Provide more detailed explanations".to_string());
        }

        let reflection = Reflection {
            timestamp: Utc::now(),
            kind: ReflectionKind::for_confidence(confidence),
            message_length: message.chars().count(),
            confidence,
            analysis,
            next_steps,
        };
        jsonl::append_record(&self.reflections_path, &reflection)?;
        Ok(reflection)
    }

    /// Log the outcome of a processed suggestion or queued action.
    pub fn process_and_log_action(
        &self,
        action_id: &str,
        result: serde_json::Value,
    ) -> Result<ProcessedAction, GoodBoyError> {
        let processed = ProcessedAction {
            timestamp: Utc::now(),
            action_id: action_id.to_string(),
            result,
            generation: self.state.generation,
        };
        jsonl::append_record(&self.processed_path, &processed)?;
        Ok(processed)
    }

    pub fn status(&self) -> EvolutionStatus {
        EvolutionStatus {
            generation: self.state.generation,
            total_interactions: self.state.total_interactions,
            success_rate: self.state.successful_resolutions as f64
                / self.state.total_interactions.max(1) as f64,
            agent_proficiency: self.state.agent_proficiency.clone(),
            timestamp: Utc::now(),
        }
    }

    /// Every suggestion ever logged, oldest first.
    pub fn suggestion_history(&self) -> Result<Vec<OverseerSuggestion>, GoodBoyError> {
        Ok(jsonl::read_records(&self.overseer_path)?)
    }

    fn save(&self) -> Result<(), GoodBoyError> {
        jsonl::write_document(&self.state_path, &self.state)?;
        Ok(())
    }
}
