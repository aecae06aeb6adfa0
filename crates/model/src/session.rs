use alloc::{string::String, vec::Vec};
use serde::Serialize;

use crate::quiz::Difficulty;

/// One judged answer, kept in the order it happened.
#[derive(Clone, Serialize)]
pub struct HistoryEntry {
    /// Text of the question that was answered.
    pub question: String,
    /// What the player submitted.
    pub user_answer: String,
    /// What the question expected.
    pub correct_answer: String,
    /// Whether the two matched exactly.
    pub is_correct: bool,
    /// Tier the question was served at.
    pub difficulty: Difficulty,
    /// When the question was served, as an RFC 3339 string.
    pub timestamp: String,
}

/// Reply to an answer submission.
#[derive(Serialize)]
pub struct Verdict {
    pub is_correct: bool,
    pub correct_answer: String,
    pub score: u32,
    pub total_questions: u32,
    pub new_difficulty: Difficulty,
}

/// Read-only view of a session's progress so far.
#[derive(Serialize)]
pub struct Summary {
    pub history: Vec<HistoryEntry>,
    pub score: u32,
    pub total_questions: u32,
}
