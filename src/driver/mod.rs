//! Session facade.
//!
//! [`Driver`] owns one remote session and exposes every session-scoped
//! command. The facade is split by concern; each file adds an `impl Driver`
//! block.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Driver`] | Session handle; cheap to clone |
//! | [`DriverBuilder`] | Fluent configuration builder |
//! | [`DriverOptions`] | Resolved configuration |
//! | [`TimeoutKind`] | Server-enforced and client-side timeout categories |
//! | [`WaitOptions`] | Deadline and error behavior of a wait |
//! | [`SelectionStrategy`] | Pluggable selector resolution |
//!
//! # Example
//!
//! ```no_run
//! use wire_webdriver::{Driver, Query, Result, WaitOptions};
//!
//! # async fn example() -> Result<()> {
//! let driver = Driver::builder().host("127.0.0.1").port(4444).connect().await?;
//!
//! driver.url("http://localhost/index.html").await?;
//! driver.click("a.terms").await?;
//! driver
//!     .wait_for_element("#accept", &Query::new(), WaitOptions::new())
//!     .await?;
//!
//! driver.delete_session().await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// In-page script sources.
pub mod assets;

/// Fluent builder pattern for driver configuration.
pub mod builder;

/// Core driver implementation and session lifecycle.
pub mod core;

/// Resolved options, defaults and option merging.
pub mod options;

/// Selection strategies and the script bootstrap.
pub mod strategy;

/// Timeout categories.
pub mod timeouts;

/// Polling engine and waits.
pub mod wait;

mod delegate;
mod dispatch;
mod elements;
mod frames;
mod input;
mod interceptor;
mod navigation;
mod screenshot;
mod script;
mod storage;

#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::DriverBuilder;
pub use core::Driver;
pub(crate) use core::DriverInner;
pub use delegate::DELEGATED_COMMANDS;
pub use dispatch::CONTENT_TYPE;
pub use options::DriverOptions;
pub use strategy::{ScriptStrategy, SelectionRequest, SelectionStrategy};
pub use timeouts::TimeoutKind;
pub use wait::{UrlPattern, WaitOptions};
