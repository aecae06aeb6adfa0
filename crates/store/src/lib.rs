pub mod error;

pub use error::Error;

use chrono::{SecondsFormat, Utc};
use dashmap::{mapref::one::RefMut, DashMap};
use model::{
    quiz::{Difficulty, Question},
    session::{HistoryEntry, Summary, Verdict},
};
use std::{
    collections::BTreeSet,
    time::{Duration, Instant},
};

/// Tier to generate the next question at. Rises with the running score.
pub fn question_tier(score: u32) -> Difficulty {
    if score >= 5 {
        Difficulty::Hard
    } else if score >= 2 {
        Difficulty::Medium
    } else {
        Difficulty::Easy
    }
}

/// Tier label reported back after an answer is judged.
///
/// One point stricter than [`question_tier`]; the mismatch is deliberate and
/// callers rely on both sets of thresholds exactly as they are.
pub fn reported_tier(score: u32) -> Difficulty {
    if score > 5 {
        Difficulty::Hard
    } else if score > 2 {
        Difficulty::Medium
    } else {
        Difficulty::Easy
    }
}

fn now_stamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// The question a session is currently being asked.
struct Asked {
    question: Question,
    asked_at: String,
}

struct Session {
    score: u32,
    total: u32,
    used: BTreeSet<Box<str>>,
    current: Option<Asked>,
    history: Vec<HistoryEntry>,
    last_seen: Instant,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            score: 0,
            total: 0,
            used: BTreeSet::new(),
            current: None,
            history: Vec::new(),
            last_seen: Instant::now(),
        }
    }
}

/// Container for every live player session, keyed by the cookie token.
#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<Box<str>, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up the session, creating it with default counters when absent.
    /// Every access counts as activity for the idle sweeper.
    fn entry(&self, sid: &str) -> RefMut<'_, Box<str>, Session> {
        let mut session = self.sessions.entry(Box::from(sid)).or_default();
        session.last_seen = Instant::now();
        session
    }

    /// Ensures the session exists. Calling this on a live session changes nothing.
    pub fn init(&self, sid: &str) {
        drop(self.entry(sid));
    }

    /// Throws away whatever the session had and starts it over from defaults.
    pub fn reset(&self, sid: &str) {
        self.sessions.remove(sid);
        drop(self.entry(sid));
    }

    /// Tier for the next question, derived from the session's score.
    pub fn question_difficulty(&self, sid: &str) -> Difficulty {
        question_tier(self.entry(sid).score)
    }

    /// Snapshot of the question texts already served to this session.
    pub fn used_questions(&self, sid: &str) -> BTreeSet<Box<str>> {
        self.entry(sid).used.clone()
    }

    /// Makes `question` the one the session must answer next and logs its text
    /// as used. With `recycle` set, the used-question log starts over first.
    /// Any previously pending question is overwritten, answered or not.
    pub fn record_question(&self, sid: &str, question: &Question, recycle: bool) {
        let mut session = self.entry(sid);
        if recycle {
            session.used.clear();
        }
        session.used.insert(question.question.as_str().into());
        session.current = Some(Asked { question: question.clone(), asked_at: now_stamp() });
    }

    /// Judges `answer` against the pending question by exact string equality.
    ///
    /// A correct answer bumps the score; every answer bumps the total and lands
    /// in the history. The pending question stays in place afterwards, so a
    /// repeated submission is judged again and appends another entry.
    pub fn check_answer(&self, sid: &str, answer: &str) -> error::Result<Verdict> {
        let mut session = self.entry(sid);
        let (question, correct_answer, difficulty, timestamp) = match session.current {
            Some(ref asked) => (
                asked.question.question.clone(),
                asked.question.correct_answer.clone(),
                asked.question.difficulty,
                asked.asked_at.clone(),
            ),
            None => return Err(Error::NoActiveQuestion),
        };

        let is_correct = answer == correct_answer;
        if is_correct {
            session.score += 1;
        }
        session.total += 1;
        session.history.push(HistoryEntry {
            question,
            user_answer: answer.into(),
            correct_answer: correct_answer.clone(),
            is_correct,
            difficulty,
            timestamp,
        });

        Ok(Verdict {
            is_correct,
            correct_answer,
            score: session.score,
            total_questions: session.total,
            new_difficulty: reported_tier(session.score),
        })
    }

    /// Clones the session's history and counters for the read-only endpoint.
    pub fn snapshot(&self, sid: &str) -> Summary {
        let session = self.entry(sid);
        Summary { history: session.history.clone(), score: session.score, total_questions: session.total }
    }

    /// Drops sessions untouched for longer than `idle`. Returns how many this
    /// pass removed; sessions arriving concurrently never enter the count.
    pub fn sweep(&self, idle: Duration) -> usize {
        let now = Instant::now();
        let mut evicted = 0;
        self.sessions.retain(|_, session| {
            let keep = now.duration_since(session.last_seen) <= idle;
            if !keep {
                evicted += 1;
            }
            keep
        });
        evicted
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
