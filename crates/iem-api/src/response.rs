// Uniform outcome of a single IEM call.
//
// `ApiResult<T>` is what endpoint methods return. `Outcome` is the flat
// `{success, status_code, label, payload}` view of the same thing, used
// for reporting and structured CLI output.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

/// Result of exactly one remote call.
pub type ApiResult<T> = Result<Response<T>, Error>;

/// A successful (HTTP 200) reply with its extracted payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response<T> {
    /// Always 200; kept so reporting does not have to assume it.
    pub status: u16,
    /// Short tag naming what the payload represents, e.g. `"Apps list"`.
    pub label: &'static str,
    pub payload: T,
}

impl<T> Response<T> {
    pub(crate) fn ok(label: &'static str, payload: T) -> Self {
        Self {
            status: 200,
            label,
            payload,
        }
    }

    pub fn into_payload(self) -> T {
        self.payload
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Response<U> {
        Response {
            status: self.status,
            label: self.label,
            payload: f(self.payload),
        }
    }
}

/// Flat, serializable view of an [`ApiResult`].
///
/// `status_code` is `-1` when no usable response was received; `success`
/// is `true` exactly when `status_code` is 200.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub success: bool,
    pub status_code: i32,
    pub label: String,
    pub payload: Value,
}

impl Outcome {
    pub fn from_result<T: Serialize>(result: &ApiResult<T>) -> Self {
        match result {
            Ok(response) => Self::from_response(response),
            Err(err) => Self::from_error(err),
        }
    }

    pub fn from_response<T: Serialize>(response: &Response<T>) -> Self {
        let payload = serde_json::to_value(&response.payload)
            .unwrap_or_else(|e| Value::String(format!("unserializable payload: {e}")));
        Self {
            success: true,
            status_code: i32::from(response.status),
            label: response.label.to_owned(),
            payload,
        }
    }

    pub fn from_error(err: &Error) -> Self {
        Self {
            success: false,
            status_code: err.status_code(),
            label: err.label().to_owned(),
            payload: Value::String(err.message()),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let payload = match &self.payload {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        write!(
            f,
            "success: {}\tstatus: {}\tlabel: {}\tpayload: {payload}",
            self.success, self.status_code, self.label
        )
    }
}
