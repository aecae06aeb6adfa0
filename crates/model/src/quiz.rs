use alloc::{string::String, vec::Vec};
use core::fmt::{self, Display};
use serde::{Deserialize, Serialize};

/// Question tier; drives both the generation prompt and the labels reported back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        })
    }
}

/// A single multiple-choice question as it crosses the wire.
#[derive(Clone, Debug, Deserialize)]
pub struct Question {
    /// Question to be displayed to the player.
    pub question: String,
    /// Possible answers to select from; exactly four.
    pub options: Vec<String>,
    /// The option holding the right answer.
    pub correct_answer: String,
    /// A nudge shown on request.
    pub hint: String,
    /// Tier this question was authored or generated for.
    pub difficulty: Difficulty,
}
