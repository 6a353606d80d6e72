//! Resolved driver options and JSON option utilities.
//!
//! [`DriverOptions`] is what a [`DriverBuilder`](super::DriverBuilder)
//! produces after validation. The free functions here operate on plain
//! JSON objects and are used to layer user capabilities over defaults.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use wire_webdriver::driver::options::merge;
//!
//! let merged = merge(
//!     &json!({"browserName": "firefox", "proxy": {"type": "direct"}}),
//!     &json!({"proxy": {"httpProxy": "localhost:3128"}}),
//! );
//! assert_eq!(merged["proxy"]["type"], "direct");
//! assert_eq!(merged["proxy"]["httpProxy"], "localhost:3128");
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use serde_json::{Value, json};
use url::Url;

use crate::browser::Strategy;

use super::timeouts::TimeoutKind;

// ============================================================================
// Constants
// ============================================================================

/// Default protocol path prefix.
pub const DEFAULT_PATH_PREFIX: &str = "/wd/hub";

/// Default interval between polling attempts.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Capabilities every session request starts from.
#[must_use]
pub fn default_capabilities() -> Value {
    json!({
        "browserName": "firefox",
        "javascriptEnabled": true,
    })
}

// ============================================================================
// DriverOptions
// ============================================================================

/// Validated driver configuration.
#[derive(Debug, Clone)]
pub struct DriverOptions {
    /// `scheme://host:port/` of the remote end.
    pub origin: Url,

    /// Path prefix without trailing slash, e.g. `/wd/hub`.
    pub path_prefix: String,

    /// Desired capabilities, already merged over the defaults.
    pub capabilities: Value,

    /// Strategy used when a query names none.
    pub default_strategy: Strategy,

    /// Delay between polling attempts.
    pub poll_interval: Duration,

    /// Source of the injected helper library.
    pub helper_library: String,

    /// Whether the call log emits events.
    pub log_calls: bool,

    /// Timeouts set on the builder, in the order they were given.
    pub timeouts: Vec<(TimeoutKind, Duration)>,
}

impl DriverOptions {
    /// Timeouts that must be pushed to the server after `init`.
    pub fn server_timeouts(&self) -> impl Iterator<Item = (TimeoutKind, Duration)> + '_ {
        self.timeouts
            .iter()
            .copied()
            .filter(|(kind, _)| kind.is_server_enforced())
    }
}

// ============================================================================
// JSON Utilities
// ============================================================================

/// Returns `true` for a JSON object.
#[inline]
#[must_use]
pub fn is_plain_object(value: &Value) -> bool {
    value.is_object()
}

/// Deep-merges `overlay` into a copy of `base`.
///
/// Nested objects merge key by key; every other value in `overlay`
/// (arrays included) replaces the one in `base`.
#[must_use]
pub fn merge(base: &Value, overlay: &Value) -> Value {
    let mut merged = base.clone();
    merge_into(&mut merged, overlay);
    merged
}

fn merge_into(target: &mut Value, overlay: &Value) {
    match (target, overlay) {
        (Value::Object(target), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match target.get_mut(key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        merge_into(existing, value);
                    }
                    _ => {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, overlay) => *target = overlay.clone(),
    }
}

// ============================================================================
// Tests
// ============================================================================
