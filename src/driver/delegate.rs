//! Driver-level shortcuts for element commands.
//!
//! Every element operation is mirrored on [`Driver`] with a leading
//! selector: `driver.click("#save")` is `driver.element("#save")` followed
//! by [`Element::click`]. The table below is the single list both the
//! methods and [`DELEGATED_COMMANDS`] are generated from. Scoped lookups
//! (`get`, `get_list`) are not mirrored; [`Driver::get`] and
//! [`Driver::get_list`] already cover them.

use crate::browser::{Element, Key, KeyInput, Point, Size};
use crate::error::Result;

use super::Driver;
use super::wait::WaitOptions;

macro_rules! delegate_element_commands {
    ($(
        $(#[$meta:meta])*
        fn $name:ident($($arg:ident: $ty:ty),*) -> $ret:ty;
    )*) => {
        impl Driver {
            $(
                $(#[$meta])*
                pub async fn $name(&self, selector: &str $(, $arg: $ty)*) -> Result<$ret> {
                    self.element(selector).await?.$name($($arg),*).await
                }
            )*
        }

        /// Element operations mirrored on [`Driver`].
        pub const DELEGATED_COMMANDS: &[&str] = &[$(stringify!($name)),*];
    };
}

delegate_element_commands! {
    /// Clicks the element matching `selector`.
    fn click() -> ();
    /// Submits the form containing the element matching `selector`.
    fn submit() -> ();
    /// Clears the element matching `selector`.
    fn clear() -> ();
    /// Types `text` into the element matching `selector`.
    fn type_text(text: &str) -> ();
    /// Sends a key sequence to the element matching `selector`.
    fn send_keys(keys: &[KeyInput]) -> ();
    /// Presses one key in the element matching `selector`.
    fn press(key: Key) -> ();
    /// Moves the pointer over the element matching `selector`.
    fn hover() -> ();
    /// Scrolls the element matching `selector` into view.
    fn scroll_into_view() -> ();
    /// Visible text of the element matching `selector`.
    fn text() -> String;
    /// `value` property of the element matching `selector`.
    fn value() -> Option<String>;
    /// Tag name of the element matching `selector`.
    fn tag_name() -> String;
    /// Attribute of the element matching `selector`.
    fn attribute(name: &str) -> Option<String>;
    /// Computed CSS property of the element matching `selector`.
    fn css(property: &str) -> String;
    /// Outer HTML of the element matching `selector`.
    fn html() -> String;
    /// Whether the element matching `selector` is selected.
    fn is_selected() -> bool;
    /// Whether the element matching `selector` is enabled.
    fn is_enabled() -> bool;
    /// Whether the element matching `selector` is displayed.
    fn is_displayed() -> bool;
    /// Page position of the element matching `selector`.
    fn location() -> Point;
    /// Rendered size of the element matching `selector`.
    fn size() -> Size;
    /// Whether the element matching `selector` is `other`.
    fn equals(other: &Element) -> bool;
    /// Waits until the element matching `selector` detaches.
    fn wait_until_gone(options: WaitOptions) -> bool;
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::transport::mock;

    use crate::driver::testing::{active_driver, default_route};

    #[tokio::test]
    async fn test_delegate_matches_manual_call() {
        let (driver, mock) = active_driver(default_route).await;

        driver.click("#save").await.unwrap();
        let delegated: Vec<_> = mock.requests().into_iter().skip(1).collect();

        let (driver, mock) = active_driver(default_route).await;
        driver.element("#save").await.unwrap().click().await.unwrap();
        let manual: Vec<_> = mock.requests().into_iter().skip(1).collect();

        assert_eq!(delegated.len(), 2);
        for (a, b) in delegated.iter().zip(&manual) {
            assert_eq!((a.method, &a.path, &a.body), (b.method, &b.path, &b.body));
        }
    }

    #[tokio::test]
    async fn test_delegate_forwards_arguments_and_result() {
        let (driver, mock) = active_driver(|req| {
            if req.path.ends_with("/attribute/href") {
                mock::ok(json!("/terms.html"))
            } else {
                default_route(req)
            }
        })
        .await;

        let href = driver.attribute("a.terms", "href").await.unwrap();
        assert_eq!(href.as_deref(), Some("/terms.html"));

        driver.type_text("input", "hi").await.unwrap();
        assert_eq!(
            mock.last_body("/wd/hub/session/abc123/element/0/value").unwrap(),
            json!({ "value": ["hi"] })
        );
    }

    #[tokio::test]
    async fn test_delegate_lookup_failure_is_tagged() {
        let (driver, mock) = active_driver(|_| mock::status(7, "missing")).await;
        let err = driver.text("#nope").await.unwrap_err();
        assert!(err.is_no_such_element());
        assert_eq!(err.context().get("element"), Some("#nope"));
        assert_eq!(mock.calls().len(), 2);
    }

    #[test]
    fn test_table_covers_element_operations() {
        assert!(DELEGATED_COMMANDS.contains(&"click"));
        assert!(DELEGATED_COMMANDS.contains(&"wait_until_gone"));
        assert!(!DELEGATED_COMMANDS.contains(&"get"));
        assert!(!DELEGATED_COMMANDS.contains(&"get_list"));
        assert_eq!(DELEGATED_COMMANDS.len(), 21);
    }
}
