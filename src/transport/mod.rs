//! HTTP transport layer.
//!
//! This module moves bytes between the dispatcher and the remote end.
//! It knows nothing about envelopes or status codes.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Driver (Rust)  │                              │  Remote end     │
//! │                 │      HTTP/1.1 + JSON         │  (hub / driver) │
//! │  Dispatcher     │─────────────────────────────►│                 │
//! │  → Transport    │◄─────────────────────────────│  /wd/hub/...    │
//! │                 │      host:port               │                 │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `http` | reqwest-backed [`HttpTransport`] |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use async_trait::async_trait;

use crate::error::Result;
use crate::protocol::Method;

// ============================================================================
// Submodules
// ============================================================================

/// reqwest-backed transport.
pub mod http;

#[cfg(test)]
pub(crate) mod mock;

// ============================================================================
// Re-exports
// ============================================================================

pub use http::HttpTransport;

// ============================================================================
// Types
// ============================================================================

/// Outgoing HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Request method.
    pub method: Method,
    /// Absolute path, starting with `/`.
    pub path: String,
    /// Header name/value pairs.
    pub headers: Vec<(String, String)>,
    /// Request body.
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// Returns the first header value with the given name (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Incoming HTTP response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// `Location` header, when present.
    pub location: Option<String>,
    /// Response body.
    pub body: Vec<u8>,
}

// ============================================================================
// Transport
// ============================================================================

/// Sends one HTTP request to the remote end.
///
/// Failures that prevent any response from arriving are returned as-is;
/// a response with any HTTP status is a success at this layer.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Sends `request` and waits for the full response.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}
