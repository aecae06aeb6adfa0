use http_body_util::Full;
use hyper::{body::Bytes, header::CONTENT_TYPE, http::HeaderValue, HeaderMap, Response};
use model::quiz::Difficulty;
use serde::Serialize;
use store::SessionStore;

use crate::{
    error::{self, Error},
    places::Places,
    quiz::{Quizzer, Source},
    util::session,
};

/// Wire shape of a served question. The correct answer never leaves the server
/// here; the client learns it from the verdict after answering.
#[derive(Serialize)]
struct Reply<'a> {
    question: &'a str,
    options: &'a [String],
    hint: &'a str,
    image: Option<&'a str>,
    difficulty: Difficulty,
}

pub async fn try_respond(
    store: &SessionStore,
    quizzer: &Quizzer,
    places: Option<&Places>,
    headers: &HeaderMap,
) -> error::Result<Response<Full<Bytes>>> {
    let (sid, minted) = session::resolve(headers);
    store.init(&sid);

    let difficulty = store.question_difficulty(&sid);
    let used = store.used_questions(&sid);
    let draw = quizzer.draw(difficulty, &used).await;
    if matches!(draw.source, Source::Fallback) {
        log::info!("serving a bank question at {difficulty} difficulty");
    }
    store.record_question(&sid, &draw.question, draw.recycled);

    let image = match places {
        Some(places) => places.lookup(&draw.question.correct_answer).await,
        None => None,
    };

    let reply = Reply {
        question: &draw.question.question,
        options: &draw.question.options,
        hint: &draw.question.hint,
        image: image.as_deref(),
        difficulty: draw.question.difficulty,
    };
    let payload = serde_json::to_vec(&reply).map_err(|err| {
        log::error!("question serialization failed: {err}");
        Error::Question
    })?;

    let mut res = Response::new(Full::from(payload));
    assert!(!res.headers_mut().append(CONTENT_TYPE, HeaderValue::from_static("application/json")));
    session::attach(&mut res, &sid, minted).map_err(|_| Error::Internal)?;
    Ok(res)
}
