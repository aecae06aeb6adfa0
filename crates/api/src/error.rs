use core::fmt::{self, Display};

use http_body_util::Full;
use hyper::{body::Bytes, header::CONTENT_TYPE, http::HeaderValue, Response, StatusCode};

#[derive(Debug)]
pub enum Error {
    /// No endpoint is mounted at the requested path.
    NotFound,
    /// The path exists, but not under this method.
    Method,
    /// The request body is not the JSON shape the endpoint expects.
    InvalidBody,
    /// The declared payload length is beyond what any answer needs.
    TooLarge,
    /// An answer arrived before any question was served.
    NoActiveQuestion,
    /// The question pipeline failed past the point where the bank could cover for it.
    Question,
    /// Everything else. Details go to the log, not the client.
    Internal,
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Method => StatusCode::METHOD_NOT_ALLOWED,
            Self::InvalidBody | Self::NoActiveQuestion => StatusCode::BAD_REQUEST,
            Self::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Question | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Renders the error as the JSON payload the browser client looks for.
    pub fn into_response(self) -> Response<Full<Bytes>> {
        let status = self.status();
        let payload = match &self {
            Self::Question => serde_json::json!({ "error": self.to_string(), "fallback": true }),
            err => serde_json::json!({ "error": err.to_string() }),
        };

        let mut res = Response::new(Full::from(payload.to_string()));
        *res.status_mut() = status;
        assert!(!res.headers_mut().append(CONTENT_TYPE, HeaderValue::from_static("application/json")));
        res
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotFound => "Not found",
            Self::Method => "Method not allowed",
            Self::InvalidBody => "Invalid request data",
            Self::TooLarge => "Payload too large",
            Self::NoActiveQuestion => "No active question",
            Self::Question => "Failed to generate question",
            Self::Internal => "Internal server error",
        })
    }
}

impl From<store::Error> for Error {
    fn from(err: store::Error) -> Self {
        match err {
            store::Error::NoActiveQuestion => Self::NoActiveQuestion,
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;
