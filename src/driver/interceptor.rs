//! Call logging around public operations.
//!
//! Every public [`Driver`] and [`Element`](crate::Element) operation runs
//! through [`CallLog::intercept`]. When enabled it records the operation
//! name, its subject (selector, URL, element id) and the elapsed time.

use std::future::Future;
use std::time::Instant;

use tracing::{debug, warn};

use crate::error::Result;

use super::Driver;

// ============================================================================
// CallLog
// ============================================================================

/// Interceptor wrapping each public operation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CallLog {
    enabled: bool,
}

impl CallLog {
    pub(crate) fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Runs `operation`, logging entry, completion and failure.
    pub(crate) async fn intercept<T, F>(
        &self,
        operation: &'static str,
        subject: &str,
        future: F,
    ) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if !self.enabled {
            return future.await;
        }

        debug!(operation, subject, "Call started");
        let started = Instant::now();
        let result = future.await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match &result {
            Ok(_) => debug!(operation, subject, elapsed_ms, "Call finished"),
            Err(e) => warn!(operation, subject, elapsed_ms, error = %e, "Call failed"),
        }

        result
    }
}

impl Driver {
    /// Runs a driver operation through the call log.
    pub(crate) async fn logged<T, F>(
        &self,
        operation: &'static str,
        subject: &str,
        future: F,
    ) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.inner.calls.intercept(operation, subject, future).await
    }
}

// ============================================================================
// Tests
// ============================================================================
