mod answer;
mod error;
mod fetch;
mod gemini;
mod history;
mod home;
mod places;
mod question;
mod quiz;
mod util;

use core::time::Duration;
use std::sync::Arc;

use http_body_util::{BodyExt, Full};
use hyper::{
    body::{Body, Bytes},
    header::CONTENT_LENGTH,
    Method, Request, Response,
};
use store::SessionStore;

use crate::{error::Error, fetch::Fetcher, gemini::Gemini, places::Places, quiz::Quizzer};

/// Upper bound on the declared `/check_answer` payload, in bytes.
const MAX_ANSWER_LENGTH: u64 = 1024;

struct Inner {
    store: SessionStore,
    quizzer: Quizzer,
    places: Option<Places>,
}

/// Cheaply clonable handle on the whole service state.
pub struct App {
    inner: Arc<Inner>,
}

impl Clone for App {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl App {
    /// Wires the service up from whichever upstream keys are configured.
    /// A missing key degrades the matching feature instead of failing startup.
    pub fn new(gemini_key: Option<&str>, places_key: Option<&str>) -> Self {
        let fetcher = Fetcher::new();

        let remote = gemini_key.map(|key| Gemini::new(key, fetcher.clone()));
        if remote.is_none() {
            log::warn!("GEMINI_API_KEY is not set; question generation falls back to the built-in bank");
        }

        let places = places_key.and_then(|key| Places::new(key, fetcher));
        if places.is_none() {
            log::warn!("FOURSQUARE_API_KEY is not set; questions are served without photos");
        }

        let inner = Inner { store: SessionStore::new(), quizzer: Quizzer::new(remote), places };
        Self { inner: Arc::new(inner) }
    }

    /// Evicts sessions idle for longer than `idle`. Returns the eviction count.
    pub fn sweep_sessions(&self, idle: Duration) -> usize {
        self.inner.store.sweep(idle)
    }

    async fn try_respond<B: Body>(&self, req: Request<B>) -> error::Result<Response<Full<Bytes>>> {
        let (parts, body) = req.into_parts();
        let Inner { store, quizzer, places } = &*self.inner;
        match (&parts.method, parts.uri.path()) {
            (&Method::GET, "/") => home::try_respond(store, &parts.headers),
            (&Method::GET, "/get_question") => {
                question::try_respond(store, quizzer, places.as_ref(), &parts.headers).await
            }
            (&Method::POST, "/check_answer") => {
                // Verify the declared length before buffering anything
                let length: u64 = parts
                    .headers
                    .get(CONTENT_LENGTH)
                    .and_then(|header| header.to_str().ok())
                    .and_then(|header| header.parse().ok())
                    .ok_or(Error::InvalidBody)?;
                if length >= MAX_ANSWER_LENGTH {
                    return Err(Error::TooLarge);
                }
                // Gather the full payload before parsing
                let bytes = body.collect().await.map_err(|_| Error::Internal)?.to_bytes();
                answer::try_respond(store, &parts.headers, &bytes)
            }
            (&Method::GET, "/get_history") => history::try_respond(store, &parts.headers),
            (_, "/" | "/get_question" | "/check_answer" | "/get_history") => Err(Error::Method),
            _ => Err(Error::NotFound),
        }
    }

    /// Routes one request. Never fails; errors render as their JSON payloads.
    pub async fn respond<B: Body>(&self, req: Request<B>) -> Response<Full<Bytes>> {
        match self.try_respond(req).await {
            Ok(res) => res,
            Err(err) => err.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::{
        header::{HeaderValue, SET_COOKIE},
        StatusCode,
    };
    use std::collections::BTreeSet;

    const SID: &str = "0123456789abcdef0123456789abcdef";

    fn get(path: &str) -> Request<Full<Bytes>> {
        let mut req = Request::new(Full::new(Bytes::new()));
        *req.uri_mut() = path.parse().unwrap();
        req
    }

    fn post(path: &str, body: &str) -> Request<Full<Bytes>> {
        let mut req = Request::new(Full::from(body.to_owned()));
        *req.method_mut() = Method::POST;
        *req.uri_mut() = path.parse().unwrap();
        assert!(!req.headers_mut().append(CONTENT_LENGTH, HeaderValue::from(body.len())));
        req
    }

    fn with_cookie<B>(mut req: Request<B>, sid: &str) -> Request<B> {
        let cookie = HeaderValue::from_str(&format!("sid={sid}")).unwrap();
        assert!(!req.headers_mut().append("Cookie", cookie));
        req
    }

    async fn body_json(res: Response<Full<Bytes>>) -> serde_json::Value {
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test(flavor = "current_thread")]
    async fn unknown_path_is_not_found() {
        let app = App::new(None, None);
        let res = app.respond(get("/nope")).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn wrong_method_is_rejected() {
        let app = App::new(None, None);

        let res = app.respond(post("/", "")).await;
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);

        let res = app.respond(get("/check_answer")).await;
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body_json(res).await["error"], "Method not allowed");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn home_mints_a_cookie_and_serves_the_page() {
        let app = App::new(None, None);

        let res = app.respond(get("/")).await;
        assert_eq!(res.status(), StatusCode::OK);
        let cookie = res.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with("sid="));
        let page = res.into_body().collect().await.unwrap().to_bytes();
        assert!(page.starts_with(b"<!DOCTYPE html>"));

        let res = app.respond(with_cookie(get("/"), SID)).await;
        assert!(res.headers().get(SET_COOKIE).is_none());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn question_route_mints_cookies_too() {
        let app = App::new(None, None);
        let res = app.respond(get("/get_question")).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().get(SET_COOKIE).is_some());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn full_round_offline() {
        let app = App::new(None, None);

        let res = app.respond(with_cookie(get("/get_question"), SID)).await;
        assert_eq!(res.status(), StatusCode::OK);
        let question = body_json(res).await;
        let options = question["options"].as_array().unwrap();
        assert_eq!(options.len(), 4);
        assert!(question["image"].is_null());
        assert!(!question["hint"].as_str().unwrap().is_empty());

        let chosen = options[0].as_str().unwrap().to_owned();
        let payload = serde_json::json!({ "answer": chosen }).to_string();
        let res = app.respond(with_cookie(post("/check_answer", &payload), SID)).await;
        assert_eq!(res.status(), StatusCode::OK);
        let verdict = body_json(res).await;

        let correct = verdict["correct_answer"].as_str().unwrap();
        assert!(question["options"].as_array().unwrap().iter().any(|option| option == correct));
        assert_eq!(verdict["is_correct"].as_bool().unwrap(), chosen == correct);
        assert_eq!(verdict["total_questions"], 1);
        assert_eq!(verdict["new_difficulty"], "easy");
        let score = verdict["score"].as_u64().unwrap();
        assert_eq!(score == 1, chosen == correct);

        let history = body_json(app.respond(with_cookie(get("/get_history"), SID)).await).await;
        assert_eq!(history["total_questions"], 1);
        assert_eq!(history["score"].as_u64().unwrap(), score);
        let entries = history["history"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["user_answer"].as_str().unwrap(), chosen);
        assert_eq!(entries[0]["is_correct"].as_bool().unwrap(), chosen == correct);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn answer_without_question_is_a_client_error() {
        let app = App::new(None, None);
        let res = app.respond(with_cookie(post("/check_answer", r#"{"answer":"Canada"}"#), SID)).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(res).await["error"], "No active question");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn malformed_answer_payload_is_a_client_error() {
        let app = App::new(None, None);

        let res = app.respond(with_cookie(post("/check_answer", "not json"), SID)).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(res).await["error"], "Invalid request data");

        let res = app.respond(with_cookie(post("/check_answer", r#"{"response":"Canada"}"#), SID)).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(res).await["error"], "Invalid request data");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn oversized_answer_payload_is_rejected() {
        let app = App::new(None, None);

        let padded = format!(r#"{{"answer":"{}"}}"#, "x".repeat(2048));
        let res = app.respond(with_cookie(post("/check_answer", &padded), SID)).await;
        assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body_json(res).await["error"], "Payload too large");

        let mut req = post("/check_answer", r#"{"answer":"Canada"}"#);
        req.headers_mut().remove(CONTENT_LENGTH);
        let res = app.respond(with_cookie(req, SID)).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(res).await["error"], "Invalid request data");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn home_resets_the_running_score() {
        let app = App::new(None, None);

        let question = body_json(app.respond(with_cookie(get("/get_question"), SID)).await).await;
        let payload = serde_json::json!({ "answer": question["options"][0] }).to_string();
        let res = app.respond(with_cookie(post("/check_answer", &payload), SID)).await;
        assert_eq!(res.status(), StatusCode::OK);

        let res = app.respond(with_cookie(get("/"), SID)).await;
        assert_eq!(res.status(), StatusCode::OK);

        let history = body_json(app.respond(with_cookie(get("/get_history"), SID)).await).await;
        assert_eq!(history["total_questions"], 0);
        assert!(history["history"].as_array().unwrap().is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn dedupe_across_the_whole_bank() {
        let app = App::new(None, None);

        let mut seen = BTreeSet::new();
        for _ in 0..4 {
            let question = body_json(app.respond(with_cookie(get("/get_question"), SID)).await).await;
            assert!(seen.insert(question["question"].as_str().unwrap().to_owned()));
        }

        // The bank is exhausted now, so the next draw recycles
        let res = app.respond(with_cookie(get("/get_question"), SID)).await;
        assert_eq!(res.status(), StatusCode::OK);
        let question = body_json(res).await;
        assert!(seen.contains(question["question"].as_str().unwrap()));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn sweeping_forgets_idle_sessions() {
        let app = App::new(None, None);
        let res = app.respond(with_cookie(get("/get_question"), SID)).await;
        assert_eq!(res.status(), StatusCode::OK);

        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(app.sweep_sessions(Duration::from_millis(10)), 1);

        let res = app.respond(with_cookie(post("/check_answer", r#"{"answer":"Canada"}"#), SID)).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
