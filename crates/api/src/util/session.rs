use hyper::{
    header::{HeaderValue, InvalidHeaderValue, SET_COOKIE},
    HeaderMap, Response,
};
use rand::Rng;

/// Name of the cookie carrying the session token.
pub const COOKIE: &str = "sid";

/// Extracts the session token from the `Cookie` header, if any.
pub fn extract(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Cookie")?
        .to_str()
        .ok()?
        .split(';')
        .filter_map(|section| section.split_once('='))
        .find_map(|(key, value)| (key.trim_start() == COOKIE).then_some(value))
}

/// Mints a fresh session token: 16 random bytes rendered as hex.
pub fn issue() -> Box<str> {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill(&mut bytes[..]);
    hex::encode(bytes).into_boxed_str()
}

/// Returns the request's session token, minting one when the request carries
/// none. The flag reports whether minting happened.
pub fn resolve(headers: &HeaderMap) -> (Box<str>, bool) {
    match extract(headers) {
        Some(sid) => (Box::from(sid), false),
        None => (issue(), true),
    }
}

/// Attaches the `Set-Cookie` header for a freshly minted token. Tokens the
/// browser already holds are not echoed back.
pub fn attach<B>(res: &mut Response<B>, sid: &str, minted: bool) -> Result<(), InvalidHeaderValue> {
    if minted {
        let cookie = HeaderValue::from_str(&format!("{COOKIE}={sid}; Path=/; HttpOnly; SameSite=Lax"))?;
        assert!(!res.headers_mut().append(SET_COOKIE, cookie));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_sid_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert("Cookie", HeaderValue::from_static("theme=dark; sid=deadbeef; lang=en"));
        assert_eq!(extract(&headers), Some("deadbeef"));
    }

    #[test]
    fn missing_cookie_yields_none() {
        assert_eq!(extract(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert("Cookie", HeaderValue::from_static("theme=dark"));
        assert_eq!(extract(&headers), None);
    }

    #[test]
    fn issued_tokens_are_hex_and_unique() {
        let first = issue();
        let second = issue();
        assert_eq!(first.len(), 32);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(first, second);
    }

    #[test]
    fn attach_sets_cookie_only_when_minted() {
        let mut res = Response::new(());
        attach(&mut res, "cafe", false).unwrap();
        assert!(res.headers().get(SET_COOKIE).is_none());

        attach(&mut res, "cafe", true).unwrap();
        let cookie = res.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with("sid=cafe;"));
        assert!(cookie.contains("HttpOnly"));
    }
}
