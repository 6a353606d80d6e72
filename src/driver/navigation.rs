//! Page navigation and document queries.

use crate::error::Result;
use crate::protocol::Command;

use super::Driver;

// ============================================================================
// Driver - Navigation
// ============================================================================

impl Driver {
    /// Navigates the current window to `to`.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote end rejects the navigation.
    pub async fn url(&self, to: &str) -> Result<()> {
        self.logged("url", to, async {
            self.dispatch(Command::navigate(to)).await?;
            Ok(())
        })
        .await
    }

    /// Returns the URL of the current page.
    pub async fn current_url(&self) -> Result<String> {
        self.logged("current_url", "", self.dispatch_typed(Command::current_url()))
            .await
    }

    /// Reloads the current page.
    pub async fn refresh(&self) -> Result<()> {
        self.logged("refresh", "", async {
            self.dispatch(Command::refresh()).await?;
            Ok(())
        })
        .await
    }

    /// Goes back one entry in history.
    pub async fn back(&self) -> Result<()> {
        self.logged("back", "", async {
            self.dispatch(Command::back()).await?;
            Ok(())
        })
        .await
    }

    /// Goes forward one entry in history.
    pub async fn forward(&self) -> Result<()> {
        self.logged("forward", "", async {
            self.dispatch(Command::forward()).await?;
            Ok(())
        })
        .await
    }

    /// Returns the document title.
    pub async fn title(&self) -> Result<String> {
        self.logged("title", "", async {
            let title: Option<String> = self.dispatch_typed(Command::title()).await?;
            Ok(title.unwrap_or_default())
        })
        .await
    }

    /// Returns the serialized page source.
    pub async fn source(&self) -> Result<String> {
        self.logged("source", "", async {
            let source: Option<String> = self.dispatch_typed(Command::source()).await?;
            Ok(source.unwrap_or_default())
        })
        .await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::protocol::Method;
    use crate::transport::mock;

    use crate::driver::testing::{active_driver, default_route};

    #[tokio::test]
    async fn test_navigation_commands() {
        let (driver, mock) = active_driver(default_route).await;

        driver.url("http://localhost/index.html").await.unwrap();
        driver.refresh().await.unwrap();
        driver.back().await.unwrap();
        driver.forward().await.unwrap();

        let calls = mock.calls();
        let base = "/wd/hub/session/abc123";
        assert_eq!(calls[1], (Method::Post, format!("{base}/url")));
        assert_eq!(calls[2], (Method::Post, format!("{base}/refresh")));
        assert_eq!(calls[3], (Method::Post, format!("{base}/back")));
        assert_eq!(calls[4], (Method::Post, format!("{base}/forward")));
        assert_eq!(
            mock.last_body("/wd/hub/session/abc123/url").unwrap(),
            json!({ "url": "http://localhost/index.html" })
        );
    }

    #[tokio::test]
    async fn test_document_queries() -> anyhow::Result<()> {
        let (driver, _mock) = active_driver(|req| match req.path.rsplit('/').next() {
            Some("url") => mock::ok(json!("http://localhost/a.html")),
            Some("title") => mock::ok(json!("Home")),
            Some("source") => mock::ok(json!("<html></html>")),
            _ => mock::ok(json!(null)),
        })
        .await;

        assert_eq!(driver.current_url().await?, "http://localhost/a.html");
        assert_eq!(driver.title().await?, "Home");
        assert_eq!(driver.source().await?, "<html></html>");
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_title_reads_as_empty_string() {
        let (driver, _mock) = active_driver(default_route).await;
        assert_eq!(driver.title().await.unwrap(), "");
    }
}
