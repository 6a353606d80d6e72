//! Condition polling and the waits built on it.
//!
//! [`Driver::wait_for`] evaluates a predicate every poll interval until it
//! reports `true` or a single deadline, started once, elapses. The attempt
//! loop and the deadline race in one `tokio::select!`; whichever finishes
//! first settles the wait and the other is dropped, so a late predicate
//! result is never observed.
//!
//! | Wait | Condition |
//! |------|-----------|
//! | [`Driver::wait_for_element`] | selector resolves |
//! | [`Driver::wait_for_element_absent`] | selector never resolved, or its element detached |
//! | [`Driver::wait_for_url_change`] | current URL left `old` and/or reached `new` |
//! | [`Driver::wait_for_document_ready`] | in-page `ready` callback fired |
//! | [`Driver::wait_for_script`] | in-page expression is truthy |
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use wire_webdriver::{Query, UrlPattern, WaitOptions};
//!
//! driver.element("#login").await?.click().await?;
//! driver
//!     .wait_for_url_change(
//!         Some(UrlPattern::from("https://app.local/login")),
//!         None,
//!         WaitOptions::new().timeout(Duration::from_secs(5)),
//!     )
//!     .await?;
//! let banner = driver.wait_for_element(".welcome", &Query::new(), WaitOptions::new()).await?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::future::Future;
use std::time::Duration;

use parking_lot::Mutex;
use regex::Regex;
use serde_json::{Value, json};
use tokio::time::sleep;
use tracing::debug;

use crate::browser::{Element, Query};
use crate::error::{Error, ErrorKind, Result, Status};
use crate::protocol::{Command, expect_bool};

use super::Driver;
use super::assets;
use super::strategy::ScriptMode;
use super::timeouts::{TimeoutKind, millis};

// ============================================================================
// WaitOptions
// ============================================================================

/// Options shared by all wait operations.
#[derive(Debug, Clone, Default)]
pub struct WaitOptions {
    timeout: Option<Duration>,
    no_error: bool,
    description: Option<String>,
}

impl WaitOptions {
    /// Waits up to the driver's poll timeout and errors on expiry.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the deadline.
    #[inline]
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Resolves with `false` instead of a timeout error.
    #[inline]
    #[must_use]
    pub fn no_error(mut self) -> Self {
        self.no_error = true;
        self
    }

    /// Describes what is awaited; included in the timeout message.
    #[inline]
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub(crate) fn describe_if_unset(mut self, describe: impl FnOnce() -> String) -> Self {
        if self.description.is_none() {
            self.description = Some(describe());
        }
        self
    }
}

// ============================================================================
// Polling Engine
// ============================================================================

/// Polls `predicate` every `interval` until it holds or `timeout` elapses.
///
/// Returns `Ok(true)` when the predicate held, `Ok(false)` when the
/// deadline won, and the predicate's error if it failed first.
pub(crate) async fn poll_until<F, Fut>(
    interval: Duration,
    timeout: Duration,
    mut predicate: F,
) -> Result<bool>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let attempts = async move {
        loop {
            if predicate().await? {
                return Ok(());
            }
            sleep(interval).await;
        }
    };

    tokio::select! {
        biased;
        outcome = attempts => outcome.map(|()| true),
        () = sleep(timeout) => Ok(false),
    }
}

impl Driver {
    /// Waits until `predicate` reports `true`.
    ///
    /// The predicate runs immediately, then once per poll interval. An
    /// error from the predicate ends the wait with that error.
    ///
    /// Returns `Ok(true)` when the condition was met and `Ok(false)` when
    /// the deadline passed with [`WaitOptions::no_error`] set; otherwise a
    /// deadline yields [`ErrorKind::Timeout`].
    pub async fn wait_for<F, Fut>(&self, predicate: F, options: WaitOptions) -> Result<bool>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<bool>>,
    {
        let timeout = options
            .timeout
            .unwrap_or_else(|| self.timeout(TimeoutKind::Poll));
        let subject = options.description.clone().unwrap_or_default();

        self.logged("wait_for", &subject, async {
            let met = poll_until(self.inner.options.poll_interval, timeout, predicate).await?;
            settle(met, timeout, options)
        })
        .await
    }

    /// Waits until `selector` resolves and returns the element.
    ///
    /// "No such element" means "not yet"; any other error ends the wait.
    /// Returns `None` only when the deadline passed with
    /// [`WaitOptions::no_error`] set.
    pub async fn wait_for_element(
        &self,
        selector: &str,
        query: &Query,
        options: WaitOptions,
    ) -> Result<Option<Element>> {
        let options = options.describe_if_unset(|| format!("element {selector}"));
        let found = Mutex::new(None);
        let slot = &found;

        let met = self
            .wait_for(
                move || async move {
                    match self.get(selector, query).await {
                        Ok(Some(element)) => {
                            *slot.lock() = Some(element);
                            Ok(true)
                        }
                        Ok(None) => Ok(false),
                        Err(e) if e.is_no_such_element() => Ok(false),
                        Err(e) => Err(e),
                    }
                },
                options,
            )
            .await?;

        Ok(if met { found.into_inner() } else { None })
    }

    /// Waits until `selector` no longer resolves to an attached element.
    ///
    /// Succeeds immediately if nothing matches; otherwise waits for the
    /// first match to detach.
    pub async fn wait_for_element_absent(
        &self,
        selector: &str,
        query: &Query,
        options: WaitOptions,
    ) -> Result<bool> {
        let options = options.describe_if_unset(|| format!("element {selector} to disappear"));
        match self.get(selector, &query.clone().no_error()).await? {
            None => Ok(true),
            Some(element) => element.wait_until_gone(options).await,
        }
    }

    /// Waits until the current URL leaves `old` and/or matches `new`.
    ///
    /// Query strings are ignored on both sides. Empty exact patterns count
    /// as absent; at least one pattern is required.
    pub async fn wait_for_url_change(
        &self,
        old: Option<UrlPattern>,
        new: Option<UrlPattern>,
        options: WaitOptions,
    ) -> Result<bool> {
        let old = old.filter(|p| !p.is_empty());
        let new = new.filter(|p| !p.is_empty());
        if old.is_none() && new.is_none() {
            return Err(ErrorKind::MissingUrl.into());
        }

        let options = options.describe_if_unset(|| match (&old, &new) {
            (_, Some(new)) => format!("URL to match {new}"),
            (Some(old), None) => format!("URL to leave {old}"),
            (None, None) => String::new(),
        });
        let (old, new) = (old.as_ref(), new.as_ref());

        self.wait_for(
            move || async move {
                let current: String = self.dispatch_typed(Command::current_url()).await?;
                Ok(url_condition(&current, old, new))
            },
            options,
        )
        .await
    }

    /// Waits until the document has finished loading.
    ///
    /// Runs one asynchronous in-page script that races the page's `ready`
    /// callback against the timeout. The helper library is installed first
    /// when missing.
    ///
    /// The server's own script timeout ending the call first counts as
    /// "not ready", like the in-page timer. A result other than a boolean
    /// fails with [`ErrorKind::Script`].
    pub async fn wait_for_document_ready(&self, options: WaitOptions) -> Result<bool> {
        let timeout = options
            .timeout
            .unwrap_or_else(|| self.timeout(TimeoutKind::Poll));
        let options = options.describe_if_unset(|| "document ready".to_string());

        self.logged("wait_for_document_ready", "", async {
            let outcome = self
                .execute_bootstrapped(
                    assets::DOCUMENT_READY,
                    vec![json!(millis(timeout))],
                    ScriptMode::Async,
                )
                .await;
            let ready = match outcome {
                Ok(value) => {
                    debug!(ready = %value, "Document ready script finished");
                    expect_bool(&value, "document ready script")?
                }
                Err(e) if e.status_kind() == Some(Status::ScriptTimeout) => {
                    debug!("Server script timeout before document ready");
                    false
                }
                Err(e) => return Err(e),
            };
            settle(ready, timeout, options)
        })
        .await
    }

    /// Waits until a script returns a truthy value.
    ///
    /// The script's result is read from the raw envelope, so an empty
    /// object counts as truthy.
    ///
    /// # Example
    ///
    /// ```ignore
    /// driver
    ///     .wait_for_script("return window.appReady === true;", vec![], WaitOptions::new())
    ///     .await?;
    /// ```
    pub async fn wait_for_script(
        &self,
        script: &str,
        args: Vec<Value>,
        options: WaitOptions,
    ) -> Result<bool> {
        let options = options.describe_if_unset(|| format!("script {script}"));
        let args = &args;
        self.wait_for(
            move || async move {
                let value = self
                    .dispatch(Command::execute(script, args.clone()).raw())
                    .await?
                    .into_value();
                Ok(is_truthy(&value))
            },
            options,
        )
        .await
    }
}

/// Maps a finished poll to the caller-facing outcome.
fn settle(met: bool, timeout: Duration, options: WaitOptions) -> Result<bool> {
    if met {
        Ok(true)
    } else if options.no_error {
        Ok(false)
    } else {
        Err(Error::timeout(millis(timeout), options.description))
    }
}

/// Script-side truthiness of a JSON value.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

// ============================================================================
// URL Patterns
// ============================================================================

/// Expected URL: exact text or a regular expression.
#[derive(Debug, Clone)]
pub enum UrlPattern {
    /// Equal to this URL once query strings are removed.
    Exact(String),
    /// Matches anywhere in the URL without its query string.
    Regex(Regex),
}

impl UrlPattern {
    /// Returns `true` if `url` (already stripped) matches.
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::Exact(expected) => strip_query(expected) == url,
            Self::Regex(pattern) => pattern.is_match(url),
        }
    }

    fn is_empty(&self) -> bool {
        matches!(self, Self::Exact(s) if s.is_empty())
    }
}

impl std::fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact(url) => f.write_str(url),
            Self::Regex(pattern) => write!(f, "/{pattern}/"),
        }
    }
}

impl From<&str> for UrlPattern {
    fn from(url: &str) -> Self {
        Self::Exact(url.to_string())
    }
}

impl From<String> for UrlPattern {
    fn from(url: String) -> Self {
        Self::Exact(url)
    }
}

impl From<Regex> for UrlPattern {
    fn from(pattern: Regex) -> Self {
        Self::Regex(pattern)
    }
}

fn strip_query(url: &str) -> &str {
    url.split_once('?').map_or(url, |(base, _)| base)
}

/// `current` has left `old` (if given) and reached `new` (if given).
pub(crate) fn url_condition(
    current: &str,
    old: Option<&UrlPattern>,
    new: Option<&UrlPattern>,
) -> bool {
    let current = strip_query(current);
    old.is_none_or(|old| !old.matches(current)) && new.is_none_or(|new| new.matches(current))
}

// ============================================================================
// Tests
// ============================================================================
