use http_body_util::Full;
use hyper::{body::Bytes, header::CONTENT_TYPE, http::HeaderValue, HeaderMap, Response};
use store::SessionStore;

use crate::{
    error::{self, Error},
    util::session,
};

/// The whole browser client, embedded at build time.
const INDEX_HTML: &str = include_str!("../assets/index.html");

/// Serves the page and starts the player's session over from scratch.
pub fn try_respond(store: &SessionStore, headers: &HeaderMap) -> error::Result<Response<Full<Bytes>>> {
    let (sid, minted) = session::resolve(headers);
    store.reset(&sid);

    let mut res = Response::new(Full::from(INDEX_HTML));
    assert!(!res.headers_mut().append(CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8")));
    session::attach(&mut res, &sid, minted).map_err(|_| Error::Internal)?;
    Ok(res)
}
