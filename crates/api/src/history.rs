use http_body_util::Full;
use hyper::{body::Bytes, header::CONTENT_TYPE, http::HeaderValue, HeaderMap, Response};
use store::SessionStore;

use crate::{
    error::{self, Error},
    util::session,
};

/// Serves the session's answer log along with the running counters.
pub fn try_respond(store: &SessionStore, headers: &HeaderMap) -> error::Result<Response<Full<Bytes>>> {
    let (sid, minted) = session::resolve(headers);

    let summary = store.snapshot(&sid);
    let payload = serde_json::to_vec(&summary).map_err(|err| {
        log::error!("history serialization failed: {err}");
        Error::Internal
    })?;

    let mut res = Response::new(Full::from(payload));
    assert!(!res.headers_mut().append(CONTENT_TYPE, HeaderValue::from_static("application/json")));
    session::attach(&mut res, &sid, minted).map_err(|_| Error::Internal)?;
    Ok(res)
}
