//! Wire WebDriver - async client for the JSON wire protocol.
//!
//! This library drives a browser through a remote end that speaks the
//! JSON wire protocol (Selenium server, standalone drivers, grid hubs).
//!
//! # Architecture
//!
//! The client follows a command/envelope model:
//!
//! - **Local End (Rust)**: builds a [`protocol::Command`] per operation and
//!   dispatches it over HTTP against the session's base path
//! - **Remote End (server)**: answers with an envelope
//!   `{status, value, sessionId}`; status `0` is success
//!
//! Key design principles:
//!
//! - One [`Driver`] owns one session; clones share it
//! - Elements are server-side ids scoped to the session that produced them
//! - Selectors resolve natively or through an injected selection script
//! - Waits poll a predicate against a single deadline
//!
//! # Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use wire_webdriver::{Driver, Result, TimeoutKind, UrlPattern, WaitOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let driver = Driver::builder()
//!         .host("127.0.0.1")
//!         .port(4444)
//!         .timeout(TimeoutKind::Implicit, Duration::from_millis(500))
//!         .connect()
//!         .await?;
//!
//!     driver.url("http://localhost/index.html").await?;
//!     driver.click("a[href='terms.html']").await?;
//!     driver
//!         .wait_for_url_change(
//!             Some(UrlPattern::from("http://localhost/index.html")),
//!             None,
//!             WaitOptions::new(),
//!         )
//!         .await?;
//!     println!("Page title: {}", driver.title().await?);
//!
//!     driver.delete_session().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`browser`] | [`Element`], selector [`Query`], keyboard input |
//! | [`driver`] | [`Driver`], builder, waits, selection strategies |
//! | [`error`] | Error taxonomy and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | Command descriptors and response envelopes |
//! | [`transport`] | HTTP transport |

// ============================================================================
// Modules
// ============================================================================

/// Browser entities: element handles, selectors, keys.
pub mod browser;

/// Session facade and configuration.
///
/// Use [`Driver::builder()`] to create a configured driver instance.
pub mod driver;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers for sessions and elements.
pub mod identifiers;

/// Wire protocol message types.
pub mod protocol;

/// HTTP transport layer.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Browser types
pub use browser::{ChainStep, Element, Key, KeyInput, Point, Query, Size, Strategy};

// Driver types
pub use driver::{
    Driver, DriverBuilder, DriverOptions, ScriptStrategy, SelectionRequest, SelectionStrategy,
    TimeoutKind, UrlPattern, WaitOptions,
};

// Error types
pub use error::{Error, ErrorKind, Result, Status};

// Identifier types
pub use identifiers::{ElementId, SessionId};

// Protocol types
pub use protocol::{Cookie, FrameRef, MouseButton};

// Transport types
pub use transport::{HttpTransport, Transport};
