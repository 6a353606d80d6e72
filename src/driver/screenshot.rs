//! Screenshot capture.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as Base64Standard;
use tracing::debug;

use crate::error::{Error, Result};
use crate::protocol::Command;

use super::Driver;

// ============================================================================
// Driver - Screenshot
// ============================================================================

impl Driver {
    /// Captures the viewport and returns the decoded PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidResponse`](crate::ErrorKind::InvalidResponse)
    /// if the reply is not a string, or a decode error if it is not base64.
    pub async fn screenshot(&self) -> Result<Vec<u8>> {
        self.logged("screenshot", "", async {
            let value = self.dispatch(Command::screenshot()).await?.into_value();
            let data = value.as_str().ok_or_else(|| {
                Error::invalid_response(format!("screenshot is not base64 text: {value}"))
            })?;
            let bytes = Base64Standard.decode(data)?;
            debug!(bytes = bytes.len(), "Captured screenshot");
            Ok(bytes)
        })
        .await
    }

    /// Captures the viewport and writes the PNG to `path`.
    ///
    /// # Example
    ///
    /// ```ignore
    /// driver.save_screenshot("failure.png").await?;
    /// ```
    pub async fn save_screenshot(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let subject = path.display().to_string();
        self.logged("save_screenshot", &subject, async {
            let bytes = self.screenshot().await?;
            tokio::fs::write(path, bytes).await?;
            debug!(path = %subject, "Saved screenshot");
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

    use crate::error::ErrorKind;
    use crate::transport::mock;

    use crate::driver::testing::{active_driver, capture_logs};

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

    #[tokio::test]
    async fn test_screenshot_decodes_base64() {
        let encoded = Base64Standard.encode(PNG_MAGIC);
        let (driver, _mock) = active_driver(move |_| mock::ok(json!(encoded))).await;
        assert_eq!(driver.screenshot().await.unwrap(), PNG_MAGIC);
    }

    #[tokio::test]
    async fn test_save_screenshot_writes_file() {
        let encoded = Base64Standard.encode(PNG_MAGIC);
        let (driver, _mock) = active_driver(move |_| mock::ok(json!(encoded))).await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.png");
        driver.save_screenshot(&path).await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), PNG_MAGIC);
    }

    #[tokio::test]
    async fn test_save_screenshot_goes_through_call_log() {
        let encoded = Base64Standard.encode(PNG_MAGIC);
        let (driver, _mock) = active_driver(move |_| mock::ok(json!(encoded))).await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.png");

        let (_guard, logs) = capture_logs();
        driver.save_screenshot(&path).await.unwrap();

        let text = logs.text();
        assert!(text.contains("save_screenshot"), "{text}");
        assert!(text.contains(&path.display().to_string()), "{text}");
        assert!(text.contains("Call finished"), "{text}");

        let missing_dir = dir.path().join("missing").join("page.png");
        assert!(driver.save_screenshot(&missing_dir).await.is_err());
        assert!(logs.text().contains("Call failed"));
    }

    #[tokio::test]
    async fn test_screenshot_rejects_bad_payloads() {
        let (driver, _mock) = active_driver(|_| mock::ok(json!(42))).await;
        let err = driver.screenshot().await.unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidResponse { .. }));

        let (driver, _mock) = active_driver(|_| mock::ok(json!("not base64!"))).await;
        let err = driver.screenshot().await.unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Base64(_)));
    }
}
