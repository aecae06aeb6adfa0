use core::fmt::{self, Display};
use std::time::Duration;

use http_body_util::{BodyExt, Full};
use hyper::{body::Bytes, header::HeaderValue, http::uri, Method, Request, StatusCode, Uri};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use serde::{de::DeserializeOwned, Serialize};

/// Shared HTTPS client for the upstream JSON APIs.
#[derive(Clone)]
pub struct Fetcher {
    client: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
}

impl Fetcher {
    pub fn new() -> Self {
        let connector = HttpsConnectorBuilder::new().with_webpki_roots().https_only().enable_http1().build();
        Self { client: Client::builder(TokioExecutor::new()).build(connector) }
    }

    /// Sends the request and gathers the reply body, all under one deadline.
    async fn dispatch(&self, req: Request<Full<Bytes>>, limit: Duration) -> Result<Bytes> {
        let exchange = async {
            let res = self.client.request(req).await?;
            let status = res.status();
            if !status.is_success() {
                return Err(Error::Status(status));
            }
            Ok(res.into_body().collect().await?.to_bytes())
        };
        match tokio::time::timeout(limit, exchange).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout),
        }
    }

    /// Issues a GET and decodes the JSON reply.
    pub async fn get_json<T: DeserializeOwned>(&self, uri: Uri, auth: Option<&HeaderValue>, limit: Duration) -> Result<T> {
        use hyper::header::{ACCEPT, AUTHORIZATION};
        let mut req = Request::new(Full::new(Bytes::new()));
        *req.uri_mut() = uri;

        let headers = req.headers_mut();
        assert!(!headers.append(ACCEPT, HeaderValue::from_static("application/json")));
        if let Some(auth) = auth {
            assert!(!headers.append(AUTHORIZATION, auth.clone()));
        }

        let body = self.dispatch(req, limit).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Issues a POST carrying `body` as JSON and decodes the JSON reply.
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(&self, uri: Uri, body: &B, limit: Duration) -> Result<T> {
        use hyper::header::{ACCEPT, CONTENT_TYPE};
        let payload = serde_json::to_vec(body)?;
        let mut req = Request::new(Full::from(payload));
        *req.method_mut() = Method::POST;
        *req.uri_mut() = uri;

        let headers = req.headers_mut();
        assert!(!headers.append(CONTENT_TYPE, HeaderValue::from_static("application/json")));
        assert!(!headers.append(ACCEPT, HeaderValue::from_static("application/json")));

        let body = self.dispatch(req, limit).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[derive(Debug)]
pub enum Error {
    /// The assembled endpoint is not a valid URI.
    Uri(uri::InvalidUri),
    /// The connection could not be established or broke mid-exchange.
    Send(hyper_util::client::legacy::Error),
    /// The reply body stopped short.
    Body(hyper::Error),
    /// The upstream answered with a non-success status.
    Status(StatusCode),
    /// The reply is not the JSON shape we asked for.
    Json(serde_json::Error),
    /// The exchange outlived its deadline.
    Timeout,
}

impl From<uri::InvalidUri> for Error {
    fn from(err: uri::InvalidUri) -> Self {
        Self::Uri(err)
    }
}

impl From<hyper_util::client::legacy::Error> for Error {
    fn from(err: hyper_util::client::legacy::Error) -> Self {
        Self::Send(err)
    }
}

impl From<hyper::Error> for Error {
    fn from(err: hyper::Error) -> Self {
        Self::Body(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uri(err) => err.fmt(f),
            Self::Send(err) => err.fmt(f),
            Self::Body(err) => err.fmt(f),
            Self::Status(status) => write!(f, "unexpected status code {status}"),
            Self::Json(err) => err.fmt(f),
            Self::Timeout => f.write_str("request timed out"),
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;
