use core::fmt::{self, Display};

use crate::{fetch, gemini};

#[derive(Debug)]
pub enum Error {
    /// No API key was configured, so there is nothing to call.
    Disabled,
    /// The exchange with the generator failed.
    Fetch(fetch::Error),
    /// The reply is not JSON at all, fences stripped or not.
    Syntax,
    /// The reply is JSON but not a complete question.
    Data,
    /// The options are not exactly four distinct strings.
    Options,
    /// The flagged answer is not among the options.
    Answer,
    /// The hint is blank.
    Hint,
    /// The question was already served in this session.
    Duplicate,
}

impl From<gemini::Error> for Error {
    fn from(err: gemini::Error) -> Self {
        match err {
            gemini::Error::Fetch(err) => Self::Fetch(err),
            gemini::Error::Empty => Self::Data,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        use serde_json::error::Category;
        match err.classify() {
            Category::Data => Self::Data,
            _ => Self::Syntax,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(err) => err.fmt(f),
            Self::Disabled => f.write_str("generation is disabled"),
            Self::Syntax => f.write_str("reply is not valid JSON"),
            Self::Data => f.write_str("reply is missing required fields"),
            Self::Options => f.write_str("exactly four distinct options required"),
            Self::Answer => f.write_str("correct answer must be one of the options"),
            Self::Hint => f.write_str("hint must not be blank"),
            Self::Duplicate => f.write_str("question was already served"),
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;
