// IEM HTTP client
//
// Wraps `reqwest::Client` with IEM URL construction, bearer-token headers
// and the response normalisation every endpoint shares. Endpoint methods
// live in sibling modules (auth, applications, devices, ...) as inherent
// impls so this module stays about transport mechanics.

use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace, warn};
use url::Url;

use crate::auth::BearerToken;
use crate::error::Error;
use crate::response::Response;
use crate::transport::TransportConfig;

/// Conventional IEM error envelope: `{"errors":[{"message":"..."}]}`.
#[derive(serde::Deserialize)]
struct ErrorEnvelope {
    errors: Vec<ErrorEntry>,
}

#[derive(serde::Deserialize)]
struct ErrorEntry {
    message: String,
}

/// The two API surfaces exposed by an Industrial Edge Manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Api {
    /// `/portal/api/v1` -- login, catalog, devices, batches.
    Portal,
    /// `/p.service/api/v4` -- app/config management, discovery, deploy.
    Service,
}

impl Api {
    fn segments(self) -> [&'static str; 3] {
        match self {
            Self::Portal => ["portal", "api", "v1"],
            Self::Service => ["p.service", "api", "v4"],
        }
    }
}

/// Raw HTTP client for an Industrial Edge Manager.
///
/// Stateless apart from the connection pool: the bearer token is passed
/// into every call, and every call issues exactly one request.
#[derive(Debug, Clone)]
pub struct IemClient {
    http: reqwest::Client,
    base_url: Url,
}

/// A 200 reply whose body has been read but not yet interpreted.
pub(crate) struct Received {
    status: StatusCode,
    body: String,
}

impl IemClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the IEM root, e.g. `https://iem.example.com`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The IEM base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/{api prefix}/{segments...}`, percent-encoding each
    /// segment so names with spaces or slashes stay a single segment.
    pub(crate) fn url(&self, api: Api, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(api.segments())
            .extend(segments);
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Start a request, attaching the bearer token when one is given.
    ///
    /// The token goes into `Authorization` verbatim; IEM does not expect
    /// a `Bearer ` scheme prefix.
    pub(crate) fn request(
        &self,
        method: Method,
        url: Url,
        token: Option<&BearerToken>,
    ) -> Result<RequestBuilder, Error> {
        debug!("{method} {url}");
        let builder = self.http.request(method, url);
        match token {
            Some(token) => {
                let mut value =
                    HeaderValue::from_str(token.expose()).map_err(|_| Error::InvalidToken)?;
                value.set_sensitive(true);
                Ok(builder.header(AUTHORIZATION, value))
            }
            None => Ok(builder),
        }
    }

    /// Send a request and read the body.
    ///
    /// Only HTTP 200 counts as success; every other status is turned into
    /// [`Error::Rejected`] with the message pulled from the error envelope.
    pub(crate) async fn send(&self, builder: RequestBuilder) -> Result<Received, Error> {
        let resp = builder.send().await.map_err(|e| {
            warn!(error = %e, "request failed before a response was received");
            Error::Transport(e)
        })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            warn!(error = %e, %status, "failed to read response body");
            Error::Transport(e)
        })?;
        trace!(%status, bytes = body.len(), "response received");

        if status == StatusCode::OK {
            Ok(Received { status, body })
        } else {
            let message = error_message(status, &body);
            debug!(%status, %message, "request rejected");
            Err(Error::Rejected {
                status: status.as_u16(),
                message,
            })
        }
    }
}

impl Received {
    fn malformed(&self, label: &'static str, pointer: &'static str) -> Error {
        Error::Malformed {
            label,
            status: self.status.as_u16(),
            pointer,
            body: self.body.clone(),
        }
    }

    /// Deserialize the value at JSON `pointer` (e.g. `/data/access_token`).
    pub(crate) fn extract<T: DeserializeOwned>(
        &self,
        label: &'static str,
        pointer: &'static str,
    ) -> Result<Response<T>, Error> {
        let mut root: Value =
            serde_json::from_str(&self.body).map_err(|_| self.malformed(label, pointer))?;
        let value = root
            .pointer_mut(pointer)
            .map(Value::take)
            .ok_or_else(|| self.malformed(label, pointer))?;
        let payload = serde_json::from_value(value).map_err(|_| self.malformed(label, pointer))?;
        Ok(Response::ok(label, payload))
    }

    /// Like [`extract`](Self::extract), but a missing or non-JSON body is
    /// acceptable and yields `None`.
    pub(crate) fn extract_optional(&self, label: &'static str, pointer: &str) -> Response<Option<Value>> {
        let value = serde_json::from_str::<Value>(&self.body)
            .ok()
            .and_then(|mut root| root.pointer_mut(pointer).map(Value::take))
            .filter(|v| !v.is_null());
        Response::ok(label, value)
    }

    /// Keep the raw body text as the payload.
    pub(crate) fn text(self, label: &'static str) -> Response<String> {
        Response::ok(label, self.body)
    }

    /// Discard the body and report a fixed status message.
    pub(crate) fn status(self, label: &'static str, message: &str) -> Response<String> {
        Response::ok(label, message.to_owned())
    }
}

/// Pull `errors[0].message` out of a rejection body, falling back to the
/// raw text, then to the canonical reason phrase for empty bodies.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        if let Some(first) = envelope.errors.into_iter().next() {
            return first.message;
        }
    }
    if body.trim().is_empty() {
        status.to_string()
    } else {
        body.to_owned()
    }
}
