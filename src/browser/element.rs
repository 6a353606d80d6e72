//! DOM element handles.
//!
//! An [`Element`] pairs a server-assigned id with the session it came
//! from. It refers back to its driver weakly: the driver outlives its
//! elements, and a handle whose driver was dropped fails with
//! [`ErrorKind::NoSession`](crate::error::ErrorKind::NoSession).
//!
//! # Example
//!
//! ```ignore
//! use wire_webdriver::Key;
//!
//! let field = driver.element("input[name='q']").await?;
//! field.clear().await?;
//! field.type_text("rust wire protocol").await?;
//! field.press(Key::Enter).await?;
//!
//! let label = field.attribute("aria-label").await?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::{Arc, Weak};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use crate::driver::wait::WaitOptions;
use crate::driver::{Driver, DriverInner};
use crate::error::{Error, Result};
use crate::identifiers::{ElementId, SessionId};
use crate::protocol::{Command, Reply, expect_bool};

use super::keyboard::{self, Key, KeyInput};
use super::selector::Query;

// ============================================================================
// Geometry
// ============================================================================

/// Position of an element's top-left corner, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal offset.
    pub x: f64,
    /// Vertical offset.
    pub y: f64,
}

/// Rendered size, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

// ============================================================================
// Element
// ============================================================================

/// A handle to a DOM element in the session's current browsing context.
///
/// Two handles are equal when they carry the same id and come from the same
/// session of the same driver.
#[derive(Clone)]
pub struct Element {
    id: ElementId,
    session: SessionId,
    driver: Weak<DriverInner>,
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("id", &self.id)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.session == other.session && Weak::ptr_eq(&self.driver, &other.driver)
    }
}

impl Eq for Element {}

// ============================================================================
// Element - Constructor & Accessors
// ============================================================================

impl Element {
    pub(crate) fn new(id: ElementId, session: SessionId, driver: Weak<DriverInner>) -> Self {
        Self {
            id,
            session,
            driver,
        }
    }

    /// Returns this element's id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> &ElementId {
        &self.id
    }

    /// Returns the session this element was resolved in.
    #[inline]
    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.session
    }

    /// Wire reference for passing this element as a script argument.
    #[must_use]
    pub fn reference(&self) -> Value {
        self.id.to_reference()
    }

    /// Returns `true` if this handle was produced by `driver`'s current session.
    #[must_use]
    pub fn belongs_to(&self, driver: &Driver) -> bool {
        Weak::ptr_eq(&self.driver, &Arc::downgrade(&driver.inner))
            && driver.session_id().as_ref() == Some(&self.session)
    }

    /// Returns the owning driver.
    pub fn driver(&self) -> Result<Driver> {
        self.driver
            .upgrade()
            .map(|inner| Driver { inner })
            .ok_or_else(|| Error::no_session("driver for this element was dropped"))
    }

    /// Dispatches an element command through the call log.
    async fn command(&self, operation: &'static str, command: Command) -> Result<Reply> {
        let driver = self.driver()?;
        driver
            .logged(operation, self.id.as_str(), driver.dispatch(command))
            .await
            .map_err(|e| e.parametrize([("element_id", self.id.as_str())]))
    }

    /// Runs an in-page script with this element as `arguments[0]`.
    async fn script(&self, operation: &'static str, script: &str) -> Result<Value> {
        let reply = self
            .command(operation, Command::execute(script, vec![self.reference()]))
            .await?;
        Ok(reply.into_value())
    }
}

// ============================================================================
// Element - Actions
// ============================================================================

impl Element {
    /// Clicks the element.
    pub async fn click(&self) -> Result<()> {
        debug!(element_id = %self.id, "Clicking element");
        self.command("click", Command::element_post(&self.id, "click", json!({})))
            .await
            .map(drop)
    }

    /// Submits the form this element belongs to.
    pub async fn submit(&self) -> Result<()> {
        debug!(element_id = %self.id, "Submitting form");
        self.command("submit", Command::element_post(&self.id, "submit", json!({})))
            .await
            .map(drop)
    }

    /// Clears a text input or textarea.
    pub async fn clear(&self) -> Result<()> {
        self.command("clear", Command::element_post(&self.id, "clear", json!({})))
            .await
            .map(drop)
    }

    /// Types text into the element.
    pub async fn type_text(&self, text: &str) -> Result<()> {
        debug!(element_id = %self.id, text_len = text.len(), "Typing text");
        self.command(
            "type_text",
            Command::element_value(&self.id, vec![text.to_string()]),
        )
        .await
        .map(drop)
    }

    /// Sends a mixed sequence of text and keys.
    pub async fn send_keys(&self, keys: &[KeyInput]) -> Result<()> {
        self.command(
            "send_keys",
            Command::element_value(&self.id, keyboard::encode(keys)),
        )
        .await
        .map(drop)
    }

    /// Presses a single key.
    pub async fn press(&self, key: Key) -> Result<()> {
        debug!(element_id = %self.id, ?key, "Pressing key");
        self.send_keys(&[KeyInput::Key(key)]).await
    }

    /// Moves the pointer over the element.
    pub async fn hover(&self) -> Result<()> {
        self.command("hover", Command::move_to(Some(&self.id), None))
            .await
            .map(drop)
    }

    /// Scrolls the element into view.
    pub async fn scroll_into_view(&self) -> Result<()> {
        self.script("scroll_into_view", crate::driver::assets::SCROLL_INTO_VIEW)
            .await
            .map(drop)
    }
}

// ============================================================================
// Element - Properties
// ============================================================================

impl Element {
    /// Visible text.
    pub async fn text(&self) -> Result<String> {
        self.command("text", Command::element_get(&self.id, "text"))
            .await?
            .into_typed::<Option<String>>()
            .map(Option::unwrap_or_default)
    }

    /// Current `value` property.
    pub async fn value(&self) -> Result<Option<String>> {
        self.attribute("value").await
    }

    /// Lower-case tag name.
    pub async fn tag_name(&self) -> Result<String> {
        self.command("tag_name", Command::element_get(&self.id, "name"))
            .await?
            .into_typed::<Option<String>>()
            .map(Option::unwrap_or_default)
    }

    /// Attribute or property value; `None` when unset.
    ///
    /// Non-string values (booleans, numbers) are returned in JSON text form.
    pub async fn attribute(&self, name: &str) -> Result<Option<String>> {
        let value = self
            .command("attribute", Command::element_attribute(&self.id, name))
            .await?
            .into_value();
        Ok(match value {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        })
    }

    /// Computed CSS property value.
    pub async fn css(&self, property: &str) -> Result<String> {
        self.command("css", Command::element_css(&self.id, property))
            .await?
            .into_typed::<Option<String>>()
            .map(Option::unwrap_or_default)
    }

    /// Outer HTML.
    pub async fn html(&self) -> Result<String> {
        match self.script("html", crate::driver::assets::OUTER_HTML).await? {
            Value::String(html) => Ok(html),
            Value::Null => Ok(String::new()),
            other => Err(Error::invalid_response(format!("expected HTML text, got {other}"))),
        }
    }

    /// Whether a checkbox, radio or option is selected.
    pub async fn is_selected(&self) -> Result<bool> {
        self.flag("is_selected", "selected").await
    }

    /// Whether the element is enabled.
    pub async fn is_enabled(&self) -> Result<bool> {
        self.flag("is_enabled", "enabled").await
    }

    /// Whether the element is rendered.
    pub async fn is_displayed(&self) -> Result<bool> {
        self.flag("is_displayed", "displayed").await
    }

    /// Position relative to the document.
    pub async fn location(&self) -> Result<Point> {
        self.command("location", Command::element_get(&self.id, "location"))
            .await?
            .into_typed()
    }

    /// Rendered size.
    pub async fn size(&self) -> Result<Size> {
        self.command("size", Command::element_get(&self.id, "size"))
            .await?
            .into_typed()
    }

    /// Asks the server whether both handles refer to the same DOM node.
    pub async fn equals(&self, other: &Element) -> Result<bool> {
        let value = self
            .command("equals", Command::element_equals(&self.id, &other.id))
            .await?
            .into_value();
        expect_bool(&value, "equals")
    }

    async fn flag(&self, operation: &'static str, suffix: &str) -> Result<bool> {
        let value = self
            .command(operation, Command::element_get(&self.id, suffix))
            .await?
            .into_value();
        expect_bool(&value, operation)
    }
}

// ============================================================================
// Element - Scoped Lookup & Waits
// ============================================================================

impl Element {
    /// Resolves a selector among this element's descendants.
    pub async fn get(&self, selector: &str, query: &Query) -> Result<Option<Element>> {
        let driver = self.driver()?;
        driver
            .get(selector, &query.clone().parent(self.clone()))
            .await
    }

    /// Resolves a selector to every matching descendant.
    pub async fn get_list(&self, selector: &str, query: &Query) -> Result<Vec<Element>> {
        let driver = self.driver()?;
        driver
            .get_list(selector, &query.clone().parent(self.clone()))
            .await
    }

    /// Waits until the element is detached from the document.
    ///
    /// Returns `Ok(true)` once the server reports the element stale or
    /// missing, and `Ok(false)` on timeout when `options` suppresses the
    /// error.
    pub async fn wait_until_gone(&self, options: WaitOptions) -> Result<bool> {
        let driver = self.driver()?;
        let options = options.describe_if_unset(|| format!("element {} to disappear", self.id));
        let id = &self.id;
        let probe = &driver;
        driver
            .wait_for(
                move || async move {
                    match probe.dispatch(Command::element_get(id, "name")).await {
                        Ok(_) => Ok(false),
                        Err(e) if e.is_element_error() => Ok(true),
                        Err(e) => Err(e),
                    }
                },
                options,
            )
            .await
    }
}

// ============================================================================
// Tests
// ============================================================================
