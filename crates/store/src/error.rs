use core::fmt::{self, Display};

#[derive(Debug)]
pub enum Error {
    /// An answer was submitted before any question was served.
    NoActiveQuestion,
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoActiveQuestion => "No active question",
        })
    }
}

pub type Result<T> = core::result::Result<T, Error>;
