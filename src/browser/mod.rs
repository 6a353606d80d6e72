//! Browser entities module.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Element`] | Handle to a server-resolved DOM node |
//! | [`Query`] | Selector options: strategy, `no_error`, chain, parent |
//! | [`Strategy`] | Selection algorithm name |
//! | [`ChainStep`] | One traversal step applied by the script strategy |
//! | [`Key`] / [`KeyInput`] | Keyboard input |
//!
//! # Example
//!
//! ```no_run
//! use wire_webdriver::{ChainStep, Driver, Query, Result, Strategy};
//!
//! # async fn example(driver: Driver) -> Result<()> {
//! let query = Query::new()
//!     .using(Strategy::script())
//!     .chain(ChainStep::closest("form"))
//!     .chain(ChainStep::find("button"));
//!
//! if let Some(button) = driver.get("input[name=email]", &query).await? {
//!     button.click().await?;
//! }
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// DOM element handles.
pub mod element;

/// Keyboard keys and key sequences.
pub mod keyboard;

/// Selector strategies, queries and the CSS dialect.
pub mod selector;

// ============================================================================
// Re-exports
// ============================================================================

pub use crate::protocol::Cookie;
pub use element::{Element, Point, Size};
pub use keyboard::{Key, KeyInput};
pub use selector::{ChainStep, Query, Strategy};
