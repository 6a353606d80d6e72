//! Type-safe identifiers for server-side entities.
//!
//! Newtype wrappers prevent passing an element id where a session id is
//! expected. Both are opaque to the client: the server may issue strings
//! or numbers, and numbers are kept in their decimal string form.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// SessionId
// ============================================================================

/// Identifier issued by the remote end when a session is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Creates a session id from its string form.
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// ElementId
// ============================================================================

/// Server-assigned identifier of a DOM element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Key used by JSON wire protocol servers for element references.
    pub const LEGACY_KEY: &'static str = "ELEMENT";

    /// Key used by W3C servers for element references.
    pub const W3C_KEY: &'static str = "element-6066-11e4-a52e-4f735466cecf";

    /// Creates an element id from its string form.
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extracts the id from a wire element reference.
    ///
    /// Accepts `{"ELEMENT": id}`, the W3C key, or a bare string/number.
    #[must_use]
    pub fn from_reference(value: &Value) -> Option<Self> {
        let raw = match value {
            Value::Object(map) => map.get(Self::LEGACY_KEY).or_else(|| map.get(Self::W3C_KEY))?,
            other => other,
        };
        match raw {
            Value::String(s) => Some(Self(s.clone())),
            Value::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }

    /// Builds the wire reference passed as a script argument.
    #[must_use]
    pub fn to_reference(&self) -> Value {
        let mut map = serde_json::Map::with_capacity(2);
        map.insert(Self::LEGACY_KEY.to_string(), Value::String(self.0.clone()));
        map.insert(Self::W3C_KEY.to_string(), Value::String(self.0.clone()));
        Value::Object(map)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================
