use http_body_util::Full;
use hyper::{body::Bytes, header::CONTENT_TYPE, http::HeaderValue, HeaderMap, Response};
use serde::Deserialize;
use store::SessionStore;

use crate::{
    error::{self, Error},
    util::session,
};

#[derive(Deserialize)]
struct Payload {
    answer: String,
}

/// Judges the submitted answer against the session's pending question.
pub fn try_respond(store: &SessionStore, headers: &HeaderMap, body: &[u8]) -> error::Result<Response<Full<Bytes>>> {
    let (sid, minted) = session::resolve(headers);
    store.init(&sid);

    let Payload { answer } = serde_json::from_slice(body).map_err(|_| Error::InvalidBody)?;
    let verdict = store.check_answer(&sid, &answer)?;
    let payload = serde_json::to_vec(&verdict).map_err(|err| {
        log::error!("verdict serialization failed: {err}");
        Error::Internal
    })?;

    let mut res = Response::new(Full::from(payload));
    assert!(!res.headers_mut().append(CONTENT_TYPE, HeaderValue::from_static("application/json")));
    session::attach(&mut res, &sid, minted).map_err(|_| Error::Internal)?;
    Ok(res)
}
