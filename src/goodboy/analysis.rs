//! Query analysis and reply scoring.
//!
//! Both are keyword heuristics. `analyze_query` decides which routing mode a
//! request gets when the caller did not pick one; `score_confidence` grades
//! the final reply and drives every success/failure counter.

use crate::goodboy::router::RoutingMode;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    Technical,
    Scheduling,
    Creative,
    Analytical,
    Security,
    SelfInquiry,
    General,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserEmotion {
    Urgent,
    Polite,
    Confused,
    Neutral,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmotionalTone {
    Helpful,
    Concerned,
    Excited,
    Thoughtful,
}

impl fmt::Display for EmotionalTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EmotionalTone::Helpful => "helpful",
            EmotionalTone::Concerned => "concerned",
            EmotionalTone::Excited => "excited",
            EmotionalTone::Thoughtful => "thoughtful",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct QueryAnalysis {
    pub query_type: QueryType,
    pub complexity: f32,
    pub user_emotion: UserEmotion,
    pub suggested_mode: RoutingMode,
    pub primary_topic: String,
    pub word_count: usize,
}

impl QueryAnalysis {
    pub fn emotional_tone(&self) -> EmotionalTone {
        if self.user_emotion == UserEmotion::Urgent {
            EmotionalTone::Concerned
        } else if self.query_type == QueryType::Creative {
            EmotionalTone::Excited
        } else if self.query_type == QueryType::SelfInquiry {
            EmotionalTone::Thoughtful
        } else if self.user_emotion == UserEmotion::Confused {
            EmotionalTone::Helpful
        } else if self.complexity > 0.6 {
            EmotionalTone::Thoughtful
        } else {
            EmotionalTone::Helpful
        }
    }
}

const TOPIC_STOPWORDS: &[&str] = &[
    "the", "a", "an", "is", "are", "to", "for", "and", "or", "what", "how", "can", "you",
];

fn any_of(lower: &str, words: &[&str]) -> bool {
    words.iter().any(|w| lower.contains(w))
}

pub fn analyze_query(query: &str) -> QueryAnalysis {
    let lower = query.to_lowercase();

    let query_type = if any_of(&lower, &["code", "build", "implement", "fix", "debug"]) {
        QueryType::Technical
    } else if any_of(&lower, &["schedule", "remind", "meeting", "calendar"]) {
        QueryType::Scheduling
    } else if any_of(&lower, &["create", "design", "imagine", "brainstorm"]) {
        QueryType::Creative
    } else if any_of(&lower, &["analyze", "data", "report", "stats"]) {
        QueryType::Analytical
    } else if any_of(&lower, &["secure", "protect", "threat", "risk"]) {
        QueryType::Security
    } else if any_of(&lower, &["how are you", "who are you", "what can you"]) {
        QueryType::SelfInquiry
    } else {
        QueryType::General
    };

    let word_count = query.split_whitespace().count();
    let question_bonus = if query.contains('?') { 0.3 } else { 0.0 };
    let complexity = (word_count as f32 / 50.0 + question_bonus).min(1.0);

    let user_emotion = if any_of(&lower, &["urgent", "asap", "quickly", "help!"]) {
        UserEmotion::Urgent
    } else if any_of(&lower, &["thanks", "please", "appreciate"]) {
        UserEmotion::Polite
    } else if any_of(&lower, &["confused", "don't understand", "what"]) {
        UserEmotion::Confused
    } else {
        UserEmotion::Neutral
    };

    let suggested_mode = if complexity < 0.3 {
        RoutingMode::Reflex
    } else if complexity > 0.7 || matches!(query_type, QueryType::Security | QueryType::Technical) {
        RoutingMode::Council
    } else {
        RoutingMode::Auto
    };

    let primary_topic = lower
        .split_whitespace()
        .find(|w| !TOPIC_STOPWORDS.contains(w) && w.chars().count() > 3)
        .unwrap_or("general")
        .to_string();

    QueryAnalysis {
        query_type,
        complexity,
        user_emotion,
        suggested_mode,
        primary_topic,
        word_count,
    }
}

const ERROR_MARKERS: &[&str] = &["[Error]", "[LLM Error]"];
const ACTIONABLE_PHRASES: &[&str] = &["here's", "here is", "you can", "to do this"];

pub const SUCCESS_THRESHOLD: f32 = 0.6;

/// Heuristic quality of `response` as an answer to `query`, in `[0.1, 1.0]`.
pub fn score_confidence(query: &str, response: &str) -> f32 {
    let mut confidence: f32 = 0.7;

    if ERROR_MARKERS.iter().any(|m| response.contains(m)) {
        confidence -= 0.4;
    }

    let response_words = response.split_whitespace().count();
    let query_words = query.split_whitespace().count();
    if response_words < 5 {
        confidence -= 0.2;
    } else if response_words > query_words * 3 {
        confidence += 0.1;
    }

    let lower = response.to_lowercase();
    if ACTIONABLE_PHRASES.iter().any(|p| lower.contains(p)) {
        confidence += 0.1;
    }

    confidence.clamp(0.1, 1.0)
}

pub fn is_success(confidence: f32) -> bool {
    confidence > SUCCESS_THRESHOLD
}
