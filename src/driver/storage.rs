//! Cookie commands.

use tracing::debug;

use crate::error::Result;
use crate::protocol::{Command, Cookie};

use super::Driver;

// ============================================================================
// Driver - Cookies
// ============================================================================

impl Driver {
    /// Returns every cookie visible to the current page.
    pub async fn cookies(&self) -> Result<Vec<Cookie>> {
        self.logged("cookies", "", async {
            let cookies: Option<Vec<Cookie>> = self.dispatch_typed(Command::cookies()).await?;
            Ok(cookies.unwrap_or_default())
        })
        .await
    }

    /// Returns the cookie named `name`, if the page can see one.
    ///
    /// The protocol has no single-cookie read, so this filters
    /// [`Driver::cookies`].
    pub async fn cookie(&self, name: &str) -> Result<Option<Cookie>> {
        let cookie = self
            .cookies()
            .await?
            .into_iter()
            .find(|cookie| cookie.name == name);
        debug!(name, found = cookie.is_some(), "Looked up cookie");
        Ok(cookie)
    }

    /// Sets a cookie on the current page.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use wire_webdriver::Cookie;
    ///
    /// driver.set_cookie(&Cookie::new("session", "abc123").with_path("/")).await?;
    /// ```
    pub async fn set_cookie(&self, cookie: &Cookie) -> Result<()> {
        self.logged("set_cookie", &cookie.name, async {
            self.dispatch(Command::add_cookie(cookie)).await?;
            Ok(())
        })
        .await
    }

    /// Deletes a cookie by name.
    pub async fn delete_cookie(&self, name: &str) -> Result<()> {
        self.logged("delete_cookie", name, async {
            self.dispatch(Command::delete_cookie(name)).await?;
            Ok(())
        })
        .await
    }

    /// Deletes every cookie visible to the current page.
    pub async fn delete_cookies(&self) -> Result<()> {
        self.logged("delete_cookies", "", async {
            self.dispatch(Command::delete_cookies()).await?;
            Ok(())
        })
        .await
    }
}

// ============================================================================
// Tests
// ============================================================================
