//! Wire protocol message types.
//!
//! This module defines the values exchanged with the remote end: the
//! immutable [`Command`] descriptor built for every call and the
//! [`Envelope`] parsed from every response.
//!
//! # Protocol Overview
//!
//! | Message | Direction | Purpose |
//! |---------|-----------|---------|
//! | `Command` | Local → Remote | Relative path, HTTP method, JSON payload |
//! | `Envelope` | Remote → Local | `status`, `value`, `sessionId` |
//!
//! Every session-scoped path is relative to `{prefix}/session/{id}`:
//!
//! - `POST /url` navigates
//! - `POST /element` finds an element
//! - `GET /element/{id}/text` reads element text
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `command` | Command descriptors by domain |
//! | `response` | Envelope parsing and the result-unwrapping rule |

// ============================================================================
// Submodules
// ============================================================================

/// Command descriptors organized by domain.
pub mod command;

/// Response envelope and result unwrapping.
pub mod response;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::{Command, Cookie, FrameRef, Method, MouseButton};
pub use response::{Envelope, Payload, Reply, unwrap_payload};
pub(crate) use response::expect_bool;
