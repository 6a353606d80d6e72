//! Builder pattern for driver configuration.
//!
//! Provides a fluent API for configuring and creating [`Driver`] instances.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use serde_json::json;
//! use wire_webdriver::{Driver, Strategy, TimeoutKind};
//!
//! # async fn example() -> wire_webdriver::Result<()> {
//! let driver = Driver::builder()
//!     .host("selenium.local")
//!     .port(4444)
//!     .capabilities(json!({"browserName": "chrome"}))
//!     .default_strategy(Strategy::XPath)
//!     .timeout(TimeoutKind::Implicit, Duration::from_secs(2))
//!     .connect()
//!     .await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use url::Url;

use crate::browser::Strategy;
use crate::error::{Error, Result};
use crate::transport::{HttpTransport, Transport};

use super::assets;
use super::core::Driver;
use super::options::{
    DEFAULT_PATH_PREFIX, DEFAULT_POLL_INTERVAL, DriverOptions, default_capabilities, is_plain_object,
    merge,
};
use super::timeouts::TimeoutKind;

// ============================================================================
// Constants
// ============================================================================

/// Default remote host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default remote port.
pub const DEFAULT_PORT: u16 = 4444;

// ============================================================================
// DriverBuilder
// ============================================================================

/// Builder for configuring a [`Driver`] instance.
///
/// Use [`Driver::builder()`] to create a new builder.
#[derive(Debug, Clone)]
pub struct DriverBuilder {
    /// Remote host name or address.
    host: String,
    /// Remote port.
    port: u16,
    /// Protocol path prefix.
    path_prefix: String,
    /// User capabilities, merged over the defaults at build time.
    capabilities: Option<Value>,
    /// Strategy for queries that name none.
    default_strategy: Strategy,
    /// Timeouts in the order they were set.
    timeouts: Vec<(TimeoutKind, Duration)>,
    /// Delay between polling attempts.
    poll_interval: Duration,
    /// Replacement helper library source.
    helper_library: Option<String>,
    /// Whether calls are logged.
    log_calls: bool,
    /// Custom transport.
    transport: Option<Arc<dyn Transport>>,
}

impl Default for DriverBuilder {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            path_prefix: DEFAULT_PATH_PREFIX.to_string(),
            capabilities: None,
            default_strategy: Strategy::Css,
            timeouts: Vec::new(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            helper_library: None,
            log_calls: true,
            transport: None,
        }
    }
}

// ============================================================================
// DriverBuilder Implementation
// ============================================================================

impl DriverBuilder {
    /// Creates a builder targeting `127.0.0.1:4444/wd/hub`.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the remote host.
    #[inline]
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the remote port.
    #[inline]
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the protocol path prefix (default `/wd/hub`).
    #[inline]
    #[must_use]
    pub fn path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.path_prefix = prefix.into();
        self
    }

    /// Sets desired capabilities.
    ///
    /// They are deep-merged over `{browserName: "firefox", javascriptEnabled: true}`.
    #[inline]
    #[must_use]
    pub fn capabilities(mut self, capabilities: Value) -> Self {
        self.capabilities = Some(capabilities);
        self
    }

    /// Sets the strategy used when a query names none.
    #[inline]
    #[must_use]
    pub fn default_strategy(mut self, strategy: Strategy) -> Self {
        self.default_strategy = strategy;
        self
    }

    /// Sets a timeout.
    ///
    /// Server-enforced categories are pushed to the remote end right
    /// after the session is created.
    #[must_use]
    pub fn timeout(mut self, kind: TimeoutKind, duration: Duration) -> Self {
        self.timeouts.retain(|(k, _)| *k != kind);
        self.timeouts.push((kind, duration));
        self
    }

    /// Sets the delay between polling attempts (default 100 ms).
    #[inline]
    #[must_use]
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Replaces the helper library injected by script strategies.
    ///
    /// The source must define `window.__wdHelper`.
    #[inline]
    #[must_use]
    pub fn helper_library(mut self, source: impl Into<String>) -> Self {
        self.helper_library = Some(source.into());
        self
    }

    /// Enables or disables call logging (default enabled).
    #[inline]
    #[must_use]
    pub fn log_calls(mut self, enabled: bool) -> Self {
        self.log_calls = enabled;
        self
    }

    /// Uses a custom transport instead of HTTP.
    #[inline]
    #[must_use]
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Builds the driver with validation. No request is sent.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::Config`](crate::error::ErrorKind::Config) for an empty
    ///   host, port 0, a zero poll interval or non-object capabilities
    /// - [`ErrorKind::Url`](crate::error::ErrorKind::Url) if host and port
    ///   do not form a valid URL
    pub fn build(self) -> Result<Driver> {
        let origin = self.validate_origin()?;
        let path_prefix = normalize_prefix(&self.path_prefix);
        let capabilities = self.resolve_capabilities()?;

        if self.poll_interval.is_zero() {
            return Err(Error::config("poll interval must be greater than zero"));
        }

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(origin.clone())?),
        };

        let options = DriverOptions {
            origin,
            path_prefix,
            capabilities,
            default_strategy: self.default_strategy,
            poll_interval: self.poll_interval,
            helper_library: self
                .helper_library
                .unwrap_or_else(|| assets::HELPER_LIBRARY.to_string()),
            log_calls: self.log_calls,
            timeouts: self.timeouts,
        };

        Ok(Driver::from_parts(transport, options))
    }

    /// Builds the driver and creates its session.
    pub async fn connect(self) -> Result<Driver> {
        let driver = self.build()?;
        driver.init().await?;
        Ok(driver)
    }
}

// ============================================================================
// Validation
// ============================================================================

impl DriverBuilder {
    /// Validates host and port into an origin URL.
    fn validate_origin(&self) -> Result<Url> {
        let host = self.host.trim();
        if host.is_empty() {
            return Err(Error::config(
                "Remote host is required. Use .host() to set it.\n\
                 Example: Driver::builder().host(\"127.0.0.1\")",
            ));
        }
        if self.port == 0 {
            return Err(Error::config("Remote port must be non-zero"));
        }

        Ok(Url::parse(&format!("http://{host}:{}/", self.port))?)
    }

    /// Merges user capabilities over the defaults.
    fn resolve_capabilities(&self) -> Result<Value> {
        match &self.capabilities {
            None => Ok(default_capabilities()),
            Some(caps) if is_plain_object(caps) => Ok(merge(&default_capabilities(), caps)),
            Some(other) => Err(Error::config(format!(
                "capabilities must be a JSON object, got {other}"
            ))),
        }
    }
}

/// Ensures a leading slash and strips trailing ones; `/` becomes empty.
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
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

    #[test]
    fn test_defaults() {
        let driver = DriverBuilder::new().build().unwrap();
        let options = driver.options();
        assert_eq!(options.origin.as_str(), "http://127.0.0.1:4444/");
        assert_eq!(options.path_prefix, "/wd/hub");
        assert_eq!(options.default_strategy, Strategy::Css);
        assert_eq!(options.poll_interval, Duration::from_millis(100));
        assert_eq!(
            options.capabilities,
            json!({"browserName": "firefox", "javascriptEnabled": true})
        );
        assert!(options.helper_library.contains("__wdHelper"));
    }

    #[test]
    fn test_capabilities_are_merged() {
        let driver = DriverBuilder::new()
            .capabilities(json!({"browserName": "chrome", "version": "120"}))
            .build()
            .unwrap();
        assert_eq!(
            driver.options().capabilities,
            json!({"browserName": "chrome", "javascriptEnabled": true, "version": "120"})
        );
    }

    #[test]
    fn test_rejects_bad_config() {
        for builder in [
            DriverBuilder::new().host(""),
            DriverBuilder::new().port(0),
            DriverBuilder::new().poll_interval(Duration::ZERO),
            DriverBuilder::new().capabilities(json!(["not", "an", "object"])),
        ] {
            let err = builder.build().unwrap_err();
            assert!(matches!(err.kind(), ErrorKind::Config { .. }), "{err}");
        }
    }

    #[test]
    fn test_prefix_normalization() {
        assert_eq!(normalize_prefix("/wd/hub/"), "/wd/hub");
        assert_eq!(normalize_prefix("wd/hub"), "/wd/hub");
        assert_eq!(normalize_prefix("/"), "");
        assert_eq!(normalize_prefix(""), "");
    }

    #[test]
    fn test_later_timeout_replaces_earlier() {
        let builder = DriverBuilder::new()
            .timeout(TimeoutKind::Script, Duration::from_secs(1))
            .timeout(TimeoutKind::Script, Duration::from_secs(2));
        assert_eq!(
            builder.timeouts,
            vec![(TimeoutKind::Script, Duration::from_secs(2))]
        );
    }

    #[test]
    fn test_builder_is_clone() {
        let builder = DriverBuilder::new().host("grid");
        let cloned = builder.clone();
        assert_eq!(builder.host, cloned.host);
    }
}
