//! Response envelope and the result-unwrapping rule.
//!
//! # Format
//!
//! ```json
//! {
//!   "sessionId": "abc123",
//!   "status": 0,
//!   "value": { ... }
//! }
//! ```
//!
//! `status` 0 is success. Session creation may instead carry the id in
//! the last segment of a `Location` header.

// ============================================================================
// Imports
// ============================================================================

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

// ============================================================================
// Envelope
// ============================================================================

/// Parsed response body.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// Protocol status code; missing means 0.
    pub status: u64,
    /// The `value` member, `None` when absent.
    pub value: Option<Value>,
    /// Session id embedded in the body.
    pub session_id: Option<String>,
    /// `Location` response header.
    pub location: Option<String>,
}

impl Envelope {
    /// Parses a response body received for `path`.
    ///
    /// Embedded NUL bytes are stripped first. A blank body is an empty
    /// envelope; anything else that is not a JSON object yields
    /// [`ErrorKind::Protocol`](crate::error::ErrorKind::Protocol).
    pub fn parse(path: &str, body: &[u8], location: Option<String>) -> Result<Self> {
        let text = sanitize(body);

        if text.trim().is_empty() {
            return Ok(Self {
                status: 0,
                value: None,
                session_id: None,
                location,
            });
        }

        let parsed: Value = serde_json::from_str(&text)
            .map_err(|e| Error::protocol(path, text.clone(), e.to_string()))?;

        let Value::Object(mut map) = parsed else {
            return Err(Error::protocol(path, text, "envelope is not a JSON object"));
        };

        let status = match map.get("status") {
            None | Some(Value::Null) => 0,
            Some(status) => status
                .as_u64()
                .ok_or_else(|| Error::protocol(path, text.clone(), "status is not an integer"))?,
        };

        let session_id = match map.get("sessionId") {
            Some(Value::String(id)) => Some(id.clone()),
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => None,
        };

        Ok(Self {
            status,
            value: map.remove("value"),
            session_id,
            location,
        })
    }

    /// Returns `true` if the status is 0.
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == 0
    }

    /// Converts a non-zero status into its typed error.
    pub fn into_error(self) -> Error {
        let message = self
            .value
            .as_ref()
            .and_then(|v| v.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string);
        Error::status(self.status, message)
    }

    /// Session id from the body, else from the `Location` header.
    #[must_use]
    pub fn resolve_session_id(&self) -> Option<String> {
        if let Some(id) = &self.session_id
            && !id.is_empty()
        {
            return Some(id.clone());
        }
        self.location
            .as_deref()
            .map(|loc| loc.trim_end_matches('/'))
            .and_then(|loc| loc.rsplit('/').next())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
    }
}

/// Strips NUL bytes and decodes the body as UTF-8.
fn sanitize(body: &[u8]) -> String {
    let cleaned: Vec<u8> = body.iter().copied().filter(|b| *b != 0).collect();
    String::from_utf8_lossy(&cleaned).into_owned()
}

// ============================================================================
// Payload
// ============================================================================

/// Shape of an envelope's `value` member.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// No `value` member.
    Absent,
    /// `value: null`.
    Null,
    /// `value: {}`.
    EmptyMap,
    /// A keyed structure with at least one member.
    Map(Map<String, Value>),
    /// An array, empty or not.
    Array(Vec<Value>),
    /// A string, number or boolean.
    Scalar(Value),
}

impl Payload {
    /// Classifies a raw `value` member.
    #[must_use]
    pub fn classify(value: Option<Value>) -> Self {
        match value {
            None => Self::Absent,
            Some(Value::Null) => Self::Null,
            Some(Value::Object(map)) if map.is_empty() => Self::EmptyMap,
            Some(Value::Object(map)) => Self::Map(map),
            Some(Value::Array(items)) => Self::Array(items),
            Some(scalar) => Self::Scalar(scalar),
        }
    }
}

// ============================================================================
// Reply
// ============================================================================

/// Successful outcome of one dispatched command.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// A meaningful `value`.
    Value(Value),
    /// No meaningful value; callers continue with the driver itself.
    Unit,
    /// The whole envelope, when the command asked for it.
    Raw(Envelope),
}

impl Reply {
    /// Returns `true` for [`Reply::Unit`].
    #[inline]
    #[must_use]
    pub fn is_unit(&self) -> bool {
        matches!(self, Self::Unit)
    }

    /// Returns the value, with `Unit` as `null`.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Value(value) => value,
            Self::Unit => Value::Null,
            Self::Raw(envelope) => envelope.value.unwrap_or(Value::Null),
        }
    }

    /// Deserializes the value into `T`.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T> {
        Ok(serde_json::from_value(self.into_value())?)
    }
}

/// Reads a boolean reply; `null` counts as `false`.
///
/// Any other value is an unexpected in-page result and fails with
/// [`ErrorKind::Script`](crate::ErrorKind::Script).
pub(crate) fn expect_bool(value: &Value, source: &str) -> Result<bool> {
    match value {
        Value::Bool(flag) => Ok(*flag),
        Value::Null => Ok(false),
        other => Err(Error::script(format!(
            "{source} returned {other}, expected a boolean"
        ))),
    }
}

/// Applies the result-unwrapping rule.
///
/// Absent, `null` and `{}` mean "no value". This conflates a command that
/// legitimately returns an empty object with one that returns nothing.
#[must_use]
pub fn unwrap_payload(payload: Payload) -> Reply {
    match payload {
        Payload::Absent | Payload::Null | Payload::EmptyMap => Reply::Unit,
        Payload::Map(map) => Reply::Value(Value::Object(map)),
        Payload::Array(items) => Reply::Value(Value::Array(items)),
        Payload::Scalar(scalar) => Reply::Value(scalar),
    }
}

// ============================================================================
// Tests
// ============================================================================
