//! Lessons the user has taught the assistant.
//!
//! Lessons are stored one per line in `teachings.jsonl` and scored against
//! each incoming message:
//!
//! ```text
//! score = (3 · topic_in_query + 2 · tags_in_query + shared_instruction_words)
//!         · (0.5 + effectiveness)
//! ```
//!
//! Feedback nudges `effectiveness_score` by 0.1 in either direction, clamped
//! to `[0, 1]`, which in turn scales future scores.

use crate::goodboy::error::GoodBoyError;
use crate::goodboy::jsonl;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

pub const LESSONS_FILE: &str = "teachings.jsonl";

const TOPIC_WEIGHT: f32 = 3.0;
const TAG_WEIGHT: f32 = 2.0;
const FEEDBACK_STEP: f32 = 0.1;
const DEFAULT_EFFECTIVENESS: f32 = 0.5;

fn default_effectiveness() -> f32 {
    DEFAULT_EFFECTIVENESS
}

/// A user-taught instruction.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Lesson {
    pub id: String,
    pub topic: String,
    pub instruction: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub use_count: u32,
    #[serde(default = "default_effectiveness")]
    pub effectiveness_score: f32,
}

/// Lowercase alphanumeric words of `text`.
fn words(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

/// Relevance of `lesson` to `query`; zero means unrelated.
pub fn score_lesson(lesson: &Lesson, query: &str) -> f32 {
    let query_lower = query.to_lowercase();
    let query_words = words(query);

    let mut raw = 0.0;
    let topic = lesson.topic.trim().to_lowercase();
    if !topic.is_empty() && query_lower.contains(&topic) {
        raw += TOPIC_WEIGHT;
    }
    // `ci-cd` or `node.js` match when every word part appears in the query
    for tag in &lesson.tags {
        let parts = words(tag);
        if !parts.is_empty() && parts.is_subset(&query_words) {
            raw += TAG_WEIGHT;
        }
    }
    raw += words(&lesson.instruction).intersection(&query_words).count() as f32;

    raw * (0.5 + lesson.effectiveness_score)
}

/// Append-only store of [`Lesson`]s.
pub struct LessonStore {
    path: PathBuf,
    lessons: Vec<Lesson>,
}

impl LessonStore {
    /// Open (or lazily create) `teachings.jsonl` inside `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, GoodBoyError> {
        let path = dir.as_ref().join(LESSONS_FILE);
        let lessons = jsonl::read_records(&path)?;
        Ok(LessonStore { path, lessons })
    }

    pub fn add_lesson<I, S>(
        &mut self,
        topic: &str,
        instruction: &str,
        tags: I,
    ) -> Result<Lesson, GoodBoyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if instruction.trim().is_empty() {
            return Err(GoodBoyError::Validation("lesson instruction is empty".to_string()));
        }
        let lesson = Lesson {
            id: uuid::Uuid::new_v4().to_string(),
            topic: topic.trim().to_string(),
            instruction: instruction.trim().to_string(),
            tags: tags
                .into_iter()
                .map(|t| t.as_ref().trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
            created_at: Utc::now(),
            use_count: 0,
            effectiveness_score: DEFAULT_EFFECTIVENESS,
        };
        jsonl::append_record(&self.path, &lesson)?;
        log::debug!("goodboy::lessons: added lesson {} on '{}'", lesson.id, lesson.topic);
        self.lessons.push(lesson.clone());
        Ok(lesson)
    }

    /// Up to `k` lessons with a positive score, best first. Equal scores keep
    /// insertion order.
    pub fn get_relevant_lessons(&self, query: &str, k: usize) -> Vec<Lesson> {
        let mut scored: Vec<(f32, &Lesson)> = self
            .lessons
            .iter()
            .map(|l| (score_lesson(l, query), l))
            .filter(|(score, _)| *score > 0.0)
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.into_iter().take(k).map(|(_, l)| l.clone()).collect()
    }

    /// Record feedback on a lesson. Returns `false` for an unknown id.
    pub fn mark_lesson_used(&mut self, id: &str, was_helpful: bool) -> Result<bool, GoodBoyError> {
        let Some(lesson) = self.lessons.iter_mut().find(|l| l.id == id) else {
            return Ok(false);
        };
        let step = if was_helpful { FEEDBACK_STEP } else { -FEEDBACK_STEP };
        lesson.effectiveness_score = (lesson.effectiveness_score + step).clamp(0.0, 1.0);
        lesson.use_count += 1;
        jsonl::rewrite_records(&self.path, &self.lessons)?;
        Ok(true)
    }

    pub fn get(&self, id: &str) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id == id)
    }

    /// The most recent `limit` lessons, oldest first.
    pub fn recent(&self, limit: usize) -> &[Lesson] {
        let start = self.lessons.len().saturating_sub(limit);
        &self.lessons[start..]
    }

    pub fn len(&self) -> usize {
        self.lessons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
