//! Mini-bot nursery: specialised sub-agents hatched from routing patterns
//! that keep recurring.
//!
//! A mini-bot is a record, not a process. It remembers which persona it
//! descends from and which message prefix triggers it, and tracks a running
//! average of the quality of the exchanges it was credited with. Bots whose
//! average falls below 0.3 retire.

use crate::goodboy::error::GoodBoyError;
use crate::goodboy::jsonl;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const MINIBOTS_FILE: &str = "minibots.jsonl";
pub const RETIREMENT_THRESHOLD: f32 = 0.3;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MiniBotStatus {
    Active,
    Retired,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MiniBot {
    pub id: String,
    pub name: String,
    pub specialization: String,
    pub parent_agent: String,
    pub trigger_pattern: String,
    pub created_at: DateTime<Utc>,
    pub performance: f32,
    pub interactions: u32,
    pub status: MiniBotStatus,
}

pub struct MiniBotNursery {
    path: PathBuf,
    bots: Vec<MiniBot>,
}

impl MiniBotNursery {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, GoodBoyError> {
        let path = dir.as_ref().join(MINIBOTS_FILE);
        let bots = jsonl::read_records(&path)?;
        Ok(MiniBotNursery { path, bots })
    }

    pub fn spawn(
        &mut self,
        parent_agent: &str,
        specialization: &str,
        trigger_pattern: &str,
    ) -> Result<MiniBot, GoodBoyError> {
        let siblings = self
            .bots
            .iter()
            .filter(|b| b.parent_agent == parent_agent)
            .count();
        let mut id = uuid::Uuid::new_v4().simple().to_string();
        id.truncate(8);
        let bot = MiniBot {
            id,
            name: format!("{}_mini_{}", parent_agent, siblings + 1),
            specialization: specialization.to_string(),
            parent_agent: parent_agent.to_string(),
            trigger_pattern: trigger_pattern.to_lowercase(),
            created_at: Utc::now(),
            performance: 1.0,
            interactions: 0,
            status: MiniBotStatus::Active,
        };
        jsonl::append_record(&self.path, &bot)?;
        log::info!("goodboy::minibots: spawned {} ({})", bot.name, bot.specialization);
        self.bots.push(bot.clone());
        Ok(bot)
    }

    /// Fold `quality` into the bot's running average. Unknown ids are
    /// reported as `NotFound`.
    pub fn update_performance(&mut self, id: &str, quality: f32) -> Result<MiniBot, GoodBoyError> {
        let bot = self
            .bots
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| GoodBoyError::NotFound(format!("mini-bot {}", id)))?;
        bot.interactions += 1;
        let n = bot.interactions as f32;
        bot.performance = (bot.performance * (n - 1.0) + quality) / n;
        if bot.performance < RETIREMENT_THRESHOLD && bot.status == MiniBotStatus::Active {
            bot.status = MiniBotStatus::Retired;
            log::info!("goodboy::minibots: retired {} ({:.2})", bot.name, bot.performance);
        }
        let updated = bot.clone();
        jsonl::rewrite_records(&self.path, &self.bots)?;
        Ok(updated)
    }

    /// Active bot whose trigger pattern starts `message`, if any.
    pub fn find_for_message(&self, message: &str) -> Option<&MiniBot> {
        let lower = message.to_lowercase();
        self.active()
            .find(|b| !b.trigger_pattern.is_empty() && lower.starts_with(&b.trigger_pattern))
    }

    pub fn has_active_trigger(&self, trigger_pattern: &str) -> bool {
        let trigger = trigger_pattern.to_lowercase();
        self.active().any(|b| b.trigger_pattern == trigger)
    }

    pub fn active(&self) -> impl Iterator<Item = &MiniBot> {
        self.bots.iter().filter(|b| b.status == MiniBotStatus::Active)
    }

    pub fn all(&self) -> &[MiniBot] {
        &self.bots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_average_retires_poor_bots() {
        let dir = tempfile::tempdir().unwrap();
        let mut nursery = MiniBotNursery::open(dir.path()).unwrap();
        let bot = nursery.spawn("Alfred", "meeting invites", "schedule a meeting").unwrap();
        assert_eq!(bot.name, "Alfred_mini_1");
        assert_eq!(bot.id.len(), 8);

        let after_one = nursery.update_performance(&bot.id, 0.0).unwrap();
        assert_eq!(after_one.performance, 0.0);
        assert_eq!(after_one.status, MiniBotStatus::Retired);
        assert!(nursery.find_for_message("schedule a meeting at 3").is_none());

        let reopened = MiniBotNursery::open(dir.path()).unwrap();
        assert_eq!(reopened.all()[0].status, MiniBotStatus::Retired);
    }

    #[test]
    fn unknown_bot_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut nursery = MiniBotNursery::open(dir.path()).unwrap();
        assert!(matches!(
            nursery.update_performance("nope", 1.0),
            Err(GoodBoyError::NotFound(_))
        ));
    }
}
