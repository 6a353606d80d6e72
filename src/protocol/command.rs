//! Command descriptors organized by domain.
//!
//! A [`Command`] is an immutable value: a path relative to the session's
//! base path, an HTTP method, an optional JSON payload and a flag asking
//! for the raw envelope instead of the unwrapped `value`.
//!
//! # Command Domains
//!
//! | Domain | Paths |
//! |--------|-------|
//! | Session | `/session`, `/status`, `/timeouts` |
//! | Navigation | `/url`, `/back`, `/forward`, `/refresh`, `/title`, `/source` |
//! | Script | `/execute`, `/execute_async` |
//! | Element | `/element`, `/elements`, `/element/{id}/...` |
//! | Context | `/frame`, `/window`, `/window_handles`, alerts |
//! | Input | `/keys`, `/moveto`, `/click`, `/buttondown`, `/buttonup` |
//! | Storage | `/cookie` |

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::Result;
use crate::identifiers::ElementId;

// ============================================================================
// Method
// ============================================================================

/// HTTP method of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `DELETE`
    Delete,
}

impl Method {
    /// Returns the method name as sent on the wire.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

// ============================================================================
// Command
// ============================================================================

/// One protocol command.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    path: String,
    method: Method,
    payload: Option<Value>,
    raw: bool,
}

impl Command {
    /// Creates a `GET` command.
    #[inline]
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: Method::Get,
            payload: None,
            raw: false,
        }
    }

    /// Creates a `POST` command with a JSON payload.
    #[inline]
    #[must_use]
    pub fn post(path: impl Into<String>, payload: Value) -> Self {
        Self {
            path: path.into(),
            method: Method::Post,
            payload: Some(payload),
            raw: false,
        }
    }

    /// Creates a `DELETE` command.
    #[inline]
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: Method::Delete,
            payload: None,
            raw: false,
        }
    }

    /// Asks the dispatcher for the whole envelope instead of its value.
    #[inline]
    #[must_use]
    pub fn raw(mut self) -> Self {
        self.raw = true;
        self
    }

    /// Returns the path relative to the session base path.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the HTTP method.
    #[inline]
    #[must_use]
    pub fn method(&self) -> Method {
        self.method
    }

    /// Returns the JSON payload, if any.
    #[inline]
    #[must_use]
    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    /// Returns `true` if the raw envelope was requested.
    #[inline]
    #[must_use]
    pub fn wants_raw(&self) -> bool {
        self.raw
    }

    /// Serializes the payload to UTF-8 JSON bytes.
    ///
    /// Commands without payload produce an empty body.
    pub fn body(&self) -> Result<Vec<u8>> {
        match &self.payload {
            Some(payload) => Ok(serde_json::to_vec(payload)?),
            None => Ok(Vec::new()),
        }
    }
}

/// Percent-encodes one path segment.
fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

// ============================================================================
// Session Commands
// ============================================================================

impl Command {
    /// Creates a session. Path is relative to the protocol prefix.
    #[must_use]
    pub fn new_session(capabilities: Value) -> Self {
        Self::post("/session", json!({ "desiredCapabilities": capabilities })).raw()
    }

    /// Server status. Path is relative to the protocol prefix.
    #[must_use]
    pub fn status() -> Self {
        Self::get("/status")
    }

    /// Ends the session.
    #[must_use]
    pub fn delete_session() -> Self {
        Self::delete("")
    }

    /// Capabilities the session was created with.
    #[must_use]
    pub fn capabilities() -> Self {
        Self::get("")
    }

    /// Sets one server-enforced timeout.
    #[must_use]
    pub fn set_timeout(kind: &str, ms: u64) -> Self {
        Self::post("/timeouts", json!({ "type": kind, "ms": ms }))
    }
}

// ============================================================================
// Navigation Commands
// ============================================================================

impl Command {
    /// Navigates to a URL.
    #[must_use]
    pub fn navigate(url: &str) -> Self {
        Self::post("/url", json!({ "url": url }))
    }

    /// Reads the current URL.
    #[must_use]
    pub fn current_url() -> Self {
        Self::get("/url")
    }

    /// Reloads the page.
    #[must_use]
    pub fn refresh() -> Self {
        Self::post("/refresh", json!({}))
    }

    /// Navigates back in history.
    #[must_use]
    pub fn back() -> Self {
        Self::post("/back", json!({}))
    }

    /// Navigates forward in history.
    #[must_use]
    pub fn forward() -> Self {
        Self::post("/forward", json!({}))
    }

    /// Reads the document title.
    #[must_use]
    pub fn title() -> Self {
        Self::get("/title")
    }

    /// Reads the page source.
    #[must_use]
    pub fn source() -> Self {
        Self::get("/source")
    }

    /// Captures a base64 PNG of the viewport.
    #[must_use]
    pub fn screenshot() -> Self {
        Self::get("/screenshot")
    }
}

// ============================================================================
// Script Commands
// ============================================================================

impl Command {
    /// Runs a synchronous script.
    #[must_use]
    pub fn execute(script: &str, args: Vec<Value>) -> Self {
        Self::post("/execute", json!({ "script": script, "args": args }))
    }

    /// Runs a script that finishes by invoking its last argument.
    #[must_use]
    pub fn execute_async(script: &str, args: Vec<Value>) -> Self {
        Self::post("/execute_async", json!({ "script": script, "args": args }))
    }
}

// ============================================================================
// Element Commands
// ============================================================================

impl Command {
    /// Finds the first matching element, optionally below `parent`.
    #[must_use]
    pub fn find_element(using: &str, value: &str, parent: Option<&ElementId>) -> Self {
        let path = match parent {
            Some(parent) => format!("/element/{}/element", segment(parent.as_str())),
            None => "/element".to_string(),
        };
        Self::post(path, json!({ "using": using, "value": value }))
    }

    /// Finds all matching elements, optionally below `parent`.
    #[must_use]
    pub fn find_elements(using: &str, value: &str, parent: Option<&ElementId>) -> Self {
        let path = match parent {
            Some(parent) => format!("/element/{}/elements", segment(parent.as_str())),
            None => "/elements".to_string(),
        };
        Self::post(path, json!({ "using": using, "value": value }))
    }

    /// Element-scoped `GET`.
    #[must_use]
    pub fn element_get(id: &ElementId, suffix: &str) -> Self {
        Self::get(format!("/element/{}/{suffix}", segment(id.as_str())))
    }

    /// Element-scoped `POST`.
    #[must_use]
    pub fn element_post(id: &ElementId, suffix: &str, payload: Value) -> Self {
        Self::post(
            format!("/element/{}/{suffix}", segment(id.as_str())),
            payload,
        )
    }

    /// Reads an attribute.
    #[must_use]
    pub fn element_attribute(id: &ElementId, name: &str) -> Self {
        Self::element_get(id, &format!("attribute/{}", segment(name)))
    }

    /// Reads a computed CSS property.
    #[must_use]
    pub fn element_css(id: &ElementId, property: &str) -> Self {
        Self::element_get(id, &format!("css/{}", segment(property)))
    }

    /// Compares two element ids on the server.
    #[must_use]
    pub fn element_equals(id: &ElementId, other: &ElementId) -> Self {
        Self::element_get(id, &format!("equals/{}", segment(other.as_str())))
    }

    /// Sends a key sequence to an element.
    #[must_use]
    pub fn element_value(id: &ElementId, keys: Vec<String>) -> Self {
        Self::element_post(id, "value", json!({ "value": keys }))
    }
}

// ============================================================================
// Context Commands
// ============================================================================

impl Command {
    /// Switches to a frame.
    #[must_use]
    pub fn frame(target: &FrameRef) -> Self {
        Self::post("/frame", json!({ "id": target.to_value() }))
    }

    /// Switches to the parent frame.
    #[must_use]
    pub fn parent_frame() -> Self {
        Self::post("/frame/parent", json!({}))
    }

    /// Reads the current window handle.
    #[must_use]
    pub fn window_handle() -> Self {
        Self::get("/window_handle")
    }

    /// Lists all window handles.
    #[must_use]
    pub fn window_handles() -> Self {
        Self::get("/window_handles")
    }

    /// Switches to a window by name or handle.
    #[must_use]
    pub fn switch_window(name: &str) -> Self {
        Self::post("/window", json!({ "name": name }))
    }

    /// Closes the current window.
    #[must_use]
    pub fn close_window() -> Self {
        Self::delete("/window")
    }

    /// Reads a window's size.
    #[must_use]
    pub fn window_size(handle: &str) -> Self {
        Self::get(format!("/window/{}/size", segment(handle)))
    }

    /// Resizes a window.
    #[must_use]
    pub fn set_window_size(handle: &str, width: u32, height: u32) -> Self {
        Self::post(
            format!("/window/{}/size", segment(handle)),
            json!({ "width": width, "height": height }),
        )
    }

    /// Maximizes a window.
    #[must_use]
    pub fn maximize_window(handle: &str) -> Self {
        Self::post(format!("/window/{}/maximize", segment(handle)), json!({}))
    }

    /// Reads the text of the open dialog.
    #[must_use]
    pub fn alert_text() -> Self {
        Self::get("/alert_text")
    }

    /// Accepts the open dialog.
    #[must_use]
    pub fn accept_alert() -> Self {
        Self::post("/accept_alert", json!({}))
    }

    /// Dismisses the open dialog.
    #[must_use]
    pub fn dismiss_alert() -> Self {
        Self::post("/dismiss_alert", json!({}))
    }
}

// ============================================================================
// Input Commands
// ============================================================================

impl Command {
    /// Sends keys to the active element.
    #[must_use]
    pub fn keys(keys: Vec<String>) -> Self {
        Self::post("/keys", json!({ "value": keys }))
    }

    /// Moves the pointer to an element and/or by an offset.
    #[must_use]
    pub fn move_to(element: Option<&ElementId>, offset: Option<(i64, i64)>) -> Self {
        let mut payload = serde_json::Map::new();
        if let Some(element) = element {
            payload.insert("element".into(), Value::String(element.as_str().to_string()));
        }
        if let Some((x, y)) = offset {
            payload.insert("xoffset".into(), json!(x));
            payload.insert("yoffset".into(), json!(y));
        }
        Self::post("/moveto", Value::Object(payload))
    }

    /// Clicks at the pointer position.
    #[must_use]
    pub fn mouse_click(button: MouseButton) -> Self {
        Self::post("/click", json!({ "button": button.code() }))
    }

    /// Double-clicks at the pointer position.
    #[must_use]
    pub fn double_click() -> Self {
        Self::post("/doubleclick", json!({}))
    }

    /// Presses a mouse button.
    #[must_use]
    pub fn button_down(button: MouseButton) -> Self {
        Self::post("/buttondown", json!({ "button": button.code() }))
    }

    /// Releases a mouse button.
    #[must_use]
    pub fn button_up(button: MouseButton) -> Self {
        Self::post("/buttonup", json!({ "button": button.code() }))
    }
}

// ============================================================================
// Storage Commands
// ============================================================================

impl Command {
    /// Lists visible cookies.
    #[must_use]
    pub fn cookies() -> Self {
        Self::get("/cookie")
    }

    /// Adds a cookie.
    #[must_use]
    pub fn add_cookie(cookie: &Cookie) -> Self {
        Self::post("/cookie", json!({ "cookie": cookie }))
    }

    /// Deletes every visible cookie.
    #[must_use]
    pub fn delete_cookies() -> Self {
        Self::delete("/cookie")
    }

    /// Deletes one cookie by name.
    #[must_use]
    pub fn delete_cookie(name: &str) -> Self {
        Self::delete(format!("/cookie/{}", segment(name)))
    }
}

// ============================================================================
// FrameRef
// ============================================================================

/// Target of a frame switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameRef {
    /// The top-level document.
    Top,
    /// Frame by zero-based index.
    Index(u16),
    /// Frame by `name` or `id` attribute.
    Name(String),
    /// Frame by its `<iframe>` element.
    Element(ElementId),
}

impl FrameRef {
    fn to_value(&self) -> Value {
        match self {
            Self::Top => Value::Null,
            Self::Index(index) => json!(index),
            Self::Name(name) => json!(name),
            Self::Element(id) => id.to_reference(),
        }
    }
}

// ============================================================================
// MouseButton
// ============================================================================

/// Mouse button for pointer commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseButton {
    /// Primary button.
    #[default]
    Left,
    /// Wheel button.
    Middle,
    /// Secondary button.
    Right,
}

impl MouseButton {
    fn code(self) -> u8 {
        match self {
            Self::Left => 0,
            Self::Middle => 1,
            Self::Right => 2,
        }
    }
}

// ============================================================================
// Cookie
// ============================================================================

/// A browser cookie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value.
    pub value: String,
    /// Path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Domain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Secure flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secure: Option<bool>,
    /// HttpOnly flag.
    #[serde(rename = "httpOnly", default, skip_serializing_if = "Option::is_none")]
    pub http_only: Option<bool>,
    /// Expiry in seconds since the epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<u64>,
}

impl Cookie {
    /// Creates a new cookie with name and value.
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: None,
            domain: None,
            secure: None,
            http_only: None,
            expiry: None,
        }
    }

    /// Sets the path.
    #[inline]
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the domain.
    #[inline]
    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_element_paths() {
        let top = Command::find_element("css selector", "#a", None);
        assert_eq!(top.path(), "/element");
        assert_eq!(top.method(), Method::Post);
        assert_eq!(
            top.payload(),
            Some(&json!({"using": "css selector", "value": "#a"}))
        );

        let scoped = Command::find_elements("xpath", "//li", Some(&ElementId::new("5")));
        assert_eq!(scoped.path(), "/element/5/elements");
    }

    #[test]
    fn test_new_session_wants_raw() {
        let cmd = Command::new_session(json!({"browserName": "firefox"}));
        assert!(cmd.wants_raw());
        assert_eq!(cmd.path(), "/session");
        assert_eq!(
            cmd.payload(),
            Some(&json!({"desiredCapabilities": {"browserName": "firefox"}}))
        );
    }

    #[test]
    fn test_path_segments_are_encoded() {
        let cmd = Command::delete_cookie("a b/c");
        assert_eq!(cmd.path(), "/cookie/a%20b%2Fc");

        let attr = Command::element_attribute(&ElementId::new("1"), "data-x");
        assert_eq!(attr.path(), "/element/1/attribute/data-x");
    }

    #[test]
    fn test_body_is_empty_without_payload() {
        assert!(Command::title().body().unwrap().is_empty());
        assert_eq!(
            Command::navigate("http://x/").body().unwrap(),
            br#"{"url":"http://x/"}"#.to_vec()
        );
    }

    #[test]
    fn test_move_to_payload() {
        let cmd = Command::move_to(Some(&ElementId::new("3")), Some((4, -2)));
        assert_eq!(
            cmd.payload(),
            Some(&json!({"element": "3", "xoffset": 4, "yoffset": -2}))
        );
        assert_eq!(Command::move_to(None, None).payload(), Some(&json!({})));
    }

    #[test]
    fn test_frame_ref_values() {
        assert_eq!(
            Command::frame(&FrameRef::Top).payload(),
            Some(&json!({"id": null}))
        );
        assert_eq!(
            Command::frame(&FrameRef::Index(2)).payload(),
            Some(&json!({"id": 2}))
        );
    }

    #[test]
    fn test_cookie_serialization_skips_unset() {
        let cookie = Cookie::new("sid", "1").with_path("/");
        let value = serde_json::to_value(&cookie).unwrap();
        assert_eq!(value, json!({"name": "sid", "value": "1", "path": "/"}));
    }
}
