//! Response envelope handling
//!
//! Most endpoints wrap their payload as `{ "success": true, "data": ..., "meta": {...} }`;
//! older ones return the payload bare. The decision is explicit: a body is
//! treated as wrapped only when `success` is `true` and `data` is present and
//! non-null, otherwise the whole body is the payload.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::FetchError;
use super::transport::RawResponse;

/// Interpretation of a parsed response body
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Wrapped { data: Value, meta: Option<Value> },
    Bare(Value),
}

impl Payload {
    pub fn data(&self) -> &Value {
        match self {
            Payload::Wrapped { data, .. } => data,
            Payload::Bare(value) => value,
        }
    }

    pub fn into_data(self) -> Value {
        match self {
            Payload::Wrapped { data, .. } => data,
            Payload::Bare(value) => value,
        }
    }

    pub fn meta(&self) -> Option<&Value> {
        match self {
            Payload::Wrapped { meta, .. } => meta.as_ref(),
            Payload::Bare(_) => None,
        }
    }
}

pub fn unwrap_envelope(body: Value) -> Payload {
    let is_wrapped = body.get("success").and_then(Value::as_bool) == Some(true)
        && body.get("data").is_some_and(|data| !data.is_null());

    if !is_wrapped {
        return Payload::Bare(body);
    }

    match body {
        Value::Object(mut map) => {
            let data = map.remove("data").unwrap_or(Value::Null);
            let meta = map.remove("meta");
            Payload::Wrapped { data, meta }
        }
        other => Payload::Bare(other),
    }
}

/// Turn a settled response into the caller's payload type.
///
/// Non-2xx statuses fail with `HTTP <status>: <statusText>` before the body
/// is looked at.
pub fn decode_response<T: DeserializeOwned>(response: RawResponse) -> Result<T, FetchError> {
    if !response.is_success() {
        return Err(FetchError::Http {
            status: response.status,
            status_text: response.status_text,
        });
    }

    let body: Value = serde_json::from_str(&response.body)?;
    Ok(serde_json::from_value(unwrap_envelope(body).into_data())?)
}
