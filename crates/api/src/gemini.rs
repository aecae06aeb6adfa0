use core::fmt::{self, Display};
use std::time::Duration;

use hyper::Uri;
use serde::{Deserialize, Serialize};

use crate::fetch::{self, Fetcher};

const ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const MODEL: &str = "gemini-2.0-flash";

/// Budget for one full exchange with the model.
const TIMEOUT: Duration = Duration::from_secs(10);

/// Client for Google's Generative Language API.
pub struct Gemini {
    /// Full `generateContent` endpoint with the API key baked into the query.
    endpoint: Box<str>,
    fetcher: Fetcher,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    /// Absent entirely when the prompt is blocked outright.
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Vec<TextPart>,
}

#[derive(Deserialize)]
struct TextPart {
    text: String,
}

impl Gemini {
    pub fn new(key: &str, fetcher: Fetcher) -> Self {
        let endpoint = format!("{ENDPOINT}/{MODEL}:generateContent?key={key}").into_boxed_str();
        Self { endpoint, fetcher }
    }

    /// Sends one prompt and returns the concatenated text of the first candidate.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let uri: Uri = self.endpoint.parse().map_err(fetch::Error::from)?;
        let request = GenerateRequest { contents: [Content { parts: [Part { text: prompt }] }] };
        let response: GenerateResponse = self.fetcher.post_json(uri, &request, TIMEOUT).await?;

        let candidate = response.candidates.into_iter().next().ok_or(Error::Empty)?;
        let text: String = candidate.content.parts.into_iter().map(|part| part.text).collect();
        if text.is_empty() {
            return Err(Error::Empty);
        }
        Ok(text)
    }
}

#[derive(Debug)]
pub enum Error {
    /// The exchange with the model failed outright.
    Fetch(fetch::Error),
    /// The model replied without any usable text.
    Empty,
}

impl From<fetch::Error> for Error {
    fn from(err: fetch::Error) -> Self {
        Self::Fetch(err)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(err) => err.fmt(f),
            Self::Empty => f.write_str("no text candidates in the reply"),
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;
