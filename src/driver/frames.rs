//! Frame, window and dialog commands.
//!
//! Window commands that address a specific window take its handle; `None`
//! means the current window.

use crate::browser::{Element, Size};
use crate::error::Result;
use crate::protocol::{Command, FrameRef};

use super::Driver;

/// Handle the remote end reads as "the current window".
const CURRENT_WINDOW: &str = "current";

impl From<&Element> for FrameRef {
    fn from(element: &Element) -> Self {
        Self::Element(element.id().clone())
    }
}

// ============================================================================
// Driver - Frames
// ============================================================================

impl Driver {
    /// Switches the command context to a frame.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let iframe = driver.element("iframe.editor").await?;
    /// driver.frame(&FrameRef::from(&iframe)).await?;
    /// driver.frame(&FrameRef::Top).await?;
    /// ```
    pub async fn frame(&self, target: &FrameRef) -> Result<()> {
        self.logged("frame", "", async {
            self.dispatch(Command::frame(target)).await?;
            Ok(())
        })
        .await
    }

    /// Switches to the parent of the current frame.
    pub async fn parent_frame(&self) -> Result<()> {
        self.logged("parent_frame", "", async {
            self.dispatch(Command::parent_frame()).await?;
            Ok(())
        })
        .await
    }
}

// ============================================================================
// Driver - Windows
// ============================================================================

impl Driver {
    /// Returns the current window handle.
    pub async fn window_handle(&self) -> Result<String> {
        self.logged("window_handle", "", self.dispatch_typed(Command::window_handle()))
            .await
    }

    /// Returns every open window handle.
    pub async fn window_handles(&self) -> Result<Vec<String>> {
        self.logged("window_handles", "", async {
            let handles: Option<Vec<String>> =
                self.dispatch_typed(Command::window_handles()).await?;
            Ok(handles.unwrap_or_default())
        })
        .await
    }

    /// Switches to a window by name or handle.
    pub async fn switch_window(&self, name: &str) -> Result<()> {
        self.logged("switch_window", name, async {
            self.dispatch(Command::switch_window(name)).await?;
            Ok(())
        })
        .await
    }

    /// Closes the current window.
    pub async fn close_window(&self) -> Result<()> {
        self.logged("close_window", "", async {
            self.dispatch(Command::close_window()).await?;
            Ok(())
        })
        .await
    }

    /// Returns the outer size of a window.
    pub async fn window_size(&self, handle: Option<&str>) -> Result<Size> {
        let handle = handle.unwrap_or(CURRENT_WINDOW);
        self.logged("window_size", handle, self.dispatch_typed(Command::window_size(handle)))
            .await
    }

    /// Resizes a window.
    pub async fn set_window_size(&self, handle: Option<&str>, width: u32, height: u32) -> Result<()> {
        let handle = handle.unwrap_or(CURRENT_WINDOW);
        self.logged("set_window_size", handle, async {
            self.dispatch(Command::set_window_size(handle, width, height))
                .await?;
            Ok(())
        })
        .await
    }

    /// Maximizes a window.
    pub async fn maximize_window(&self, handle: Option<&str>) -> Result<()> {
        let handle = handle.unwrap_or(CURRENT_WINDOW);
        self.logged("maximize_window", handle, async {
            self.dispatch(Command::maximize_window(handle)).await?;
            Ok(())
        })
        .await
    }
}

// ============================================================================
// Driver - Alerts
// ============================================================================

impl Driver {
    /// Returns the text of the open dialog.
    pub async fn alert_text(&self) -> Result<String> {
        self.logged("alert_text", "", async {
            let text: Option<String> = self.dispatch_typed(Command::alert_text()).await?;
            Ok(text.unwrap_or_default())
        })
        .await
    }

    /// Accepts the open dialog.
    pub async fn accept_alert(&self) -> Result<()> {
        self.logged("accept_alert", "", async {
            self.dispatch(Command::accept_alert()).await?;
            Ok(())
        })
        .await
    }

    /// Dismisses the open dialog.
    pub async fn dismiss_alert(&self) -> Result<()> {
        self.logged("dismiss_alert", "", async {
            self.dispatch(Command::dismiss_alert()).await?;
            Ok(())
        })
        .await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::error::Status;
    use crate::protocol::Method;
    use crate::transport::mock;

    use crate::driver::testing::{active_driver, default_route};

    const BASE: &str = "/wd/hub/session/abc123";

    #[tokio::test]
    async fn test_frame_targets() {
        let (driver, mock) = active_driver(default_route).await;
        let iframe = driver.element("iframe").await.unwrap();

        driver.frame(&FrameRef::Index(1)).await.unwrap();
        assert_eq!(mock.last_body(&format!("{BASE}/frame")).unwrap(), json!({ "id": 1 }));

        driver.frame(&FrameRef::from(&iframe)).await.unwrap();
        assert_eq!(
            mock.last_body(&format!("{BASE}/frame")).unwrap(),
            json!({ "id": { "ELEMENT": "0" } })
        );

        driver.frame(&FrameRef::Top).await.unwrap();
        assert_eq!(mock.last_body(&format!("{BASE}/frame")).unwrap(), json!({ "id": null }));

        driver.parent_frame().await.unwrap();
        assert_eq!(
            mock.calls().last().unwrap(),
            &(Method::Post, format!("{BASE}/frame/parent"))
        );
    }

    #[tokio::test]
    async fn test_windows() {
        let (driver, mock) = active_driver(|req| {
            if req.path.ends_with("/window_handles") {
                mock::ok(json!(["w1", "w2"]))
            } else if req.path.ends_with("/window_handle") {
                mock::ok(json!("w1"))
            } else if req.path.ends_with("/size") && req.method == Method::Get {
                mock::ok(json!({ "width": 1280, "height": 720 }))
            } else {
                mock::ok(json!(null))
            }
        })
        .await;

        assert_eq!(driver.window_handle().await.unwrap(), "w1");
        assert_eq!(driver.window_handles().await.unwrap(), vec!["w1", "w2"]);

        let size = driver.window_size(None).await.unwrap();
        assert_eq!(size, Size { width: 1280.0, height: 720.0 });

        driver.set_window_size(Some("w2"), 800, 600).await.unwrap();
        assert_eq!(
            mock.last_body(&format!("{BASE}/window/w2/size")).unwrap(),
            json!({ "width": 800, "height": 600 })
        );

        tokio_test::assert_ok!(driver.maximize_window(None).await);
        tokio_test::assert_ok!(driver.switch_window("w2").await);
        tokio_test::assert_ok!(driver.close_window().await);

        let calls = mock.calls();
        let tail = &calls[calls.len() - 3..];
        assert_eq!(tail[0], (Method::Post, format!("{BASE}/window/current/maximize")));
        assert_eq!(tail[1], (Method::Post, format!("{BASE}/window")));
        assert_eq!(tail[2], (Method::Delete, format!("{BASE}/window")));
    }

    #[tokio::test]
    async fn test_alerts() {
        let (driver, mock) = active_driver(|req| {
            if req.path.ends_with("/alert_text") {
                mock::ok(json!("Leave page?"))
            } else {
                mock::ok(json!(null))
            }
        })
        .await;

        assert_eq!(driver.alert_text().await.unwrap(), "Leave page?");
        driver.accept_alert().await.unwrap();
        driver.dismiss_alert().await.unwrap();

        let paths: Vec<_> = mock.calls().into_iter().skip(2).map(|(_, p)| p).collect();
        assert_eq!(
            paths,
            vec![format!("{BASE}/accept_alert"), format!("{BASE}/dismiss_alert")]
        );
    }

    #[tokio::test]
    async fn test_no_alert_open() {
        let (driver, _mock) = active_driver(|_| mock::status(27, "no alert")).await;
        let err = driver.accept_alert().await.unwrap_err();
        assert_eq!(err.status_kind(), Some(Status::NoAlertOpenError));
    }
}
