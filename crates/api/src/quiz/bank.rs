use std::collections::BTreeSet;

use model::quiz::{Difficulty, Question};
use rand::{seq::SliceRandom, Rng};

/// Canned question, kept as static text until it is actually served.
struct Entry {
    question: &'static str,
    options: [&'static str; 4],
    answer: &'static str,
    hint: &'static str,
    difficulty: Difficulty,
}

impl From<&Entry> for Question {
    fn from(entry: &Entry) -> Self {
        Self {
            question: entry.question.into(),
            options: entry.options.iter().copied().map(String::from).collect(),
            correct_answer: entry.answer.into(),
            hint: entry.hint.into(),
            difficulty: entry.difficulty,
        }
    }
}

const BANK: [Entry; 4] = [
    Entry {
        question: "Which country has the longest coastline in the world?",
        options: ["Russia", "Canada", "Norway", "Australia"],
        answer: "Canada",
        hint: "This country is in North America and has over 200,000 km of coastline.",
        difficulty: Difficulty::Medium,
    },
    Entry {
        question: "What is the capital of Brazil?",
        options: ["Rio de Janeiro", "São Paulo", "Brasília", "Salvador"],
        answer: "Brasília",
        hint: "This planned city became the capital in 1960.",
        difficulty: Difficulty::Easy,
    },
    Entry {
        question: "Which desert is the largest in the world?",
        options: ["Sahara", "Arabian", "Gobi", "Antarctic"],
        answer: "Antarctic",
        hint: "It's located at the southernmost continent.",
        difficulty: Difficulty::Hard,
    },
    Entry {
        question: "Which continent contains the most fresh water?",
        options: ["North America", "Asia", "Africa", "Antarctica"],
        answer: "Antarctica",
        hint: "About 70% of the world's fresh water is frozen here.",
        difficulty: Difficulty::Hard,
    },
];

/// Picks an entry not yet served to the session. When everything has been
/// served already, picks from the whole bank again and flags the recycle.
pub fn pick(used: &BTreeSet<Box<str>>) -> (Question, bool) {
    let mut rng = rand::thread_rng();
    let fresh: Vec<_> = BANK.iter().filter(|entry| !used.contains(entry.question)).collect();
    match fresh.choose(&mut rng) {
        Some(&entry) => (entry.into(), false),
        None => {
            let entry = &BANK[rng.gen_range(0..BANK.len())];
            (entry.into(), true)
        }
    }
}
