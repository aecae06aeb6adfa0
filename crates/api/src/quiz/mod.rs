mod bank;
mod error;

use std::collections::BTreeSet;

use model::quiz::{Difficulty, Question};
use rand::seq::SliceRandom;

use crate::gemini::Gemini;

/// Attempts on the generator before the bank takes over.
const MAX_ATTEMPTS: u32 = 3;

/// Where a drawn question actually came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
    Generated,
    Fallback,
}

/// A question ready to serve.
pub struct Draw {
    pub question: Question,
    pub source: Source,
    /// The bank ran dry, so the caller must start the used-question log over.
    pub recycled: bool,
}

/// Question source: the Gemini generator when a key is configured, the
/// built-in bank otherwise or whenever generation keeps failing.
pub struct Quizzer {
    remote: Option<Gemini>,
}

impl Quizzer {
    pub fn new(remote: Option<Gemini>) -> Self {
        Self { remote }
    }

    /// Draws the next question at the given difficulty, avoiding everything
    /// in `used`. Generation gets a few attempts; the bank never fails.
    pub async fn draw(&self, difficulty: Difficulty, used: &BTreeSet<Box<str>>) -> Draw {
        for attempt in 1..=MAX_ATTEMPTS {
            match self.try_generate(difficulty, used).await {
                Ok(mut question) => {
                    question.options.shuffle(&mut rand::thread_rng());
                    return Draw { question, source: Source::Generated, recycled: false };
                }
                Err(error::Error::Disabled) => break,
                Err(err) => log::warn!("generation attempt {attempt} failed: {err}"),
            }
        }

        let (mut question, recycled) = bank::pick(used);
        question.options.shuffle(&mut rand::thread_rng());
        Draw { question, source: Source::Fallback, recycled }
    }

    async fn try_generate(&self, difficulty: Difficulty, used: &BTreeSet<Box<str>>) -> error::Result<Question> {
        let remote = self.remote.as_ref().ok_or(error::Error::Disabled)?;
        let reply = remote.generate(&prompt_for(difficulty)).await?;
        let question: Question = serde_json::from_str(strip_code_fence(&reply))?;
        vet(&question, used)?;
        Ok(question)
    }
}

fn prompt_for(difficulty: Difficulty) -> String {
    format!(
        r#"Generate a unique world geography multiple-choice question with these requirements:
- Difficulty level: {difficulty}
- 1 correct answer and 3 plausible incorrect answers
- Include a brief hint
- Format as valid JSON with these exact keys:
{{
    "question": "question text",
    "options": ["option1", "option2", "option3", "option4"],
    "correct_answer": "correct option",
    "hint": "helpful hint",
    "difficulty": "{difficulty}"
}}
Return ONLY the JSON object, no additional text or markdown.
Make sure the options are clear and distinct from each other."#
    )
}

/// Peels a Markdown code fence off the reply, with or without the `json` tag.
/// The prompt forbids fences, but the model sends them anyway at times.
fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let Some(text) = text.strip_prefix("```") else {
        return text;
    };
    let text = text.strip_prefix("json").unwrap_or(text);
    text.strip_suffix("```").unwrap_or(text).trim()
}

/// Checks a parsed reply against the shape the client depends on.
fn vet(question: &Question, used: &BTreeSet<Box<str>>) -> error::Result<()> {
    if question.options.len() != 4 {
        return Err(error::Error::Options);
    }
    let distinct: BTreeSet<_> = question.options.iter().collect();
    if distinct.len() != question.options.len() {
        return Err(error::Error::Options);
    }
    if !question.options.contains(&question.correct_answer) {
        return Err(error::Error::Answer);
    }
    if question.hint.trim().is_empty() {
        return Err(error::Error::Hint);
    }
    if used.contains(question.question.as_str()) {
        return Err(error::Error::Duplicate);
    }
    Ok(())
}
