//! Learned routing patterns.
//!
//! Every scored interaction appends a [`LearnedPattern`] to
//! `learned_patterns.jsonl`. Later messages that share a keyword with recent
//! patterns get a routing hint: the personas that appeared most often in
//! those patterns.

use crate::goodboy::error::GoodBoyError;
use crate::goodboy::jsonl;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const PATTERNS_FILE: &str = "learned_patterns.jsonl";

const STOPWORDS: &[&str] = &["the", "a", "an", "and", "or", "is", "are", "to", "for"];
const KEYWORD_LIMIT: usize = 5;
const HINT_SCAN_LIMIT: usize = 5;
const HINT_SIZE: usize = 2;
const OPTIMIZATION_MIN_PATTERNS: usize = 10;
const OPTIMIZATION_WINDOW: usize = 100;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LearnedPattern {
    pub timestamp: DateTime<Utc>,
    pub keywords: Vec<String>,
    pub agents: Vec<String>,
    pub quality: f32,
    pub message_length: usize,
}

/// Best-scoring persona combination among recent patterns.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RoutingOptimization {
    pub suggested_agents: Vec<String>,
    pub avg_quality: f32,
    pub frequency: usize,
    pub timestamp: DateTime<Utc>,
}

/// First five distinct lowercase words longer than two characters that are
/// not stopwords, with surrounding punctuation removed.
pub fn extract_keywords(message: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for raw in message.split_whitespace() {
        let word = raw
            .trim_matches(|c: char| c.is_ascii_punctuation())
            .to_lowercase();
        if word.chars().count() <= 2 || STOPWORDS.contains(&word.as_str()) {
            continue;
        }
        if !keywords.contains(&word) {
            keywords.push(word);
        }
        if keywords.len() == KEYWORD_LIMIT {
            break;
        }
    }
    keywords
}

pub struct LearningEngine {
    path: PathBuf,
    patterns: Vec<LearnedPattern>,
}

impl LearningEngine {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, GoodBoyError> {
        let path = dir.as_ref().join(PATTERNS_FILE);
        let patterns = jsonl::read_records(&path)?;
        Ok(LearningEngine { path, patterns })
    }

    pub fn learn_from_interaction(
        &mut self,
        message: &str,
        agents_used: &[String],
        quality: f32,
    ) -> Result<LearnedPattern, GoodBoyError> {
        let pattern = LearnedPattern {
            timestamp: Utc::now(),
            keywords: extract_keywords(message),
            agents: agents_used.to_vec(),
            quality,
            message_length: message.chars().count(),
        };
        jsonl::append_record(&self.path, &pattern)?;
        self.patterns.push(pattern.clone());
        Ok(pattern)
    }

    /// Top personas among the five most recent patterns sharing any keyword.
    /// Ties keep the order in which personas were first seen.
    pub fn get_routing_hint(&self, keywords: &[String]) -> Option<Vec<String>> {
        let matches: Vec<&LearnedPattern> = self
            .patterns
            .iter()
            .rev()
            .filter(|p| keywords.iter().any(|k| p.keywords.contains(k)))
            .take(HINT_SCAN_LIMIT)
            .collect();
        if matches.is_empty() {
            return None;
        }

        let mut counts: Vec<(String, usize)> = Vec::new();
        for pattern in matches {
            for agent in &pattern.agents {
                match counts.iter_mut().find(|(name, _)| name == agent) {
                    Some((_, n)) => *n += 1,
                    None => counts.push((agent.clone(), 1)),
                }
            }
        }
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        Some(counts.into_iter().take(HINT_SIZE).map(|(name, _)| name).collect())
    }

    /// Needs at least ten patterns; looks at the last hundred.
    pub fn suggest_routing_optimization(&self) -> Option<RoutingOptimization> {
        if self.patterns.len() < OPTIMIZATION_MIN_PATTERNS {
            return None;
        }
        let start = self.patterns.len().saturating_sub(OPTIMIZATION_WINDOW);
        let mut combos: BTreeMap<Vec<String>, Vec<f32>> = BTreeMap::new();
        for pattern in &self.patterns[start..] {
            let mut key = pattern.agents.clone();
            key.sort();
            combos.entry(key).or_default().push(pattern.quality);
        }

        let mut best: Option<(Vec<String>, f32, usize)> = None;
        for (agents, qualities) in combos {
            let avg = qualities.iter().sum::<f32>() / qualities.len() as f32;
            if best.as_ref().map_or(true, |(_, b, _)| avg > *b) {
                best = Some((agents, avg, qualities.len()));
            }
        }
        best.map(|(suggested_agents, avg_quality, frequency)| RoutingOptimization {
            suggested_agents,
            avg_quality,
            frequency,
            timestamp: Utc::now(),
        })
    }

    pub fn patterns(&self) -> &[LearnedPattern] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_skip_stopwords_and_short_words() {
        let kws = extract_keywords("Schedule a meeting for the team, and the TEAM lunch?");
        assert_eq!(kws, vec!["schedule", "meeting", "team", "lunch"]);
    }

    #[test]
    fn keywords_cap_at_five() {
        let kws = extract_keywords("alpha bravo charlie delta echo foxtrot golf");
        assert_eq!(kws.len(), 5);
        assert_eq!(kws.last().map(String::as_str), Some("echo"));
    }
}
