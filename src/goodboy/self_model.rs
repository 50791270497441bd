//! The assistant's view of itself, persisted to `brain_state.json`.

use crate::goodboy::analysis::EmotionalTone;
use crate::goodboy::error::GoodBoyError;
use crate::goodboy::jsonl;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const BRAIN_STATE_FILE: &str = "brain_state.json";

const IDENTITY: &str = "GoodBoy.AI";
const PURPOSE: &str = "A loyal, helpful and continuously improving AI companion";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SelfModelState {
    pub total_thoughts: u64,
    pub successful_tasks: u64,
    pub failed_tasks: u64,
    pub confidence_level: f32,
    pub energy_level: f32,
    pub mood: EmotionalTone,
    pub last_updated: DateTime<Utc>,
}

impl Default for SelfModelState {
    fn default() -> Self {
        SelfModelState {
            total_thoughts: 0,
            successful_tasks: 0,
            failed_tasks: 0,
            confidence_level: 0.7,
            energy_level: 1.0,
            mood: EmotionalTone::Helpful,
            last_updated: Utc::now(),
        }
    }
}

pub struct SelfModel {
    path: PathBuf,
    state: SelfModelState,
}

impl SelfModel {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, GoodBoyError> {
        let path = dir.as_ref().join(BRAIN_STATE_FILE);
        let state = jsonl::read_document(&path)?.unwrap_or_default();
        Ok(SelfModel { path, state })
    }

    pub fn state(&self) -> &SelfModelState {
        &self.state
    }

    /// Confidence drifts up 0.01 per success and down 0.02 per failure
    /// (never below 0.3); harder tasks drain more energy.
    pub fn update_after_task(
        &mut self,
        success: bool,
        complexity: f32,
        mood: EmotionalTone,
    ) -> Result<(), GoodBoyError> {
        let s = &mut self.state;
        s.total_thoughts += 1;
        if success {
            s.successful_tasks += 1;
            s.confidence_level = (s.confidence_level + 0.01).min(1.0);
        } else {
            s.failed_tasks += 1;
            s.confidence_level = (s.confidence_level - 0.02).max(0.3);
        }
        s.energy_level = (s.energy_level - complexity * 0.05).max(0.1);
        s.mood = mood;
        s.last_updated = Utc::now();
        self.save()
    }

    pub fn rest(&mut self) -> Result<(), GoodBoyError> {
        self.state.energy_level = (self.state.energy_level + 0.1).min(1.0);
        self.state.last_updated = Utc::now();
        self.save()
    }

    pub fn introspect(&self) -> String {
        let s = &self.state;
        let success_rate = s.successful_tasks as f32 / s.total_thoughts.max(1) as f32;
        format!(
            "I am {}. {}. Currently feeling {} with {:.0}% confidence. \
             My success rate is {:.0}% over {} interactions. Energy level: {:.0}%.",
            IDENTITY,
            PURPOSE,
            s.mood,
            s.confidence_level * 100.0,
            success_rate * 100.0,
            s.total_thoughts,
            s.energy_level * 100.0
        )
    }

    fn save(&self) -> Result<(), GoodBoyError> {
        jsonl::write_document(&self.path, &self.state)?;
        Ok(())
    }
}
