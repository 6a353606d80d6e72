//! Timeout categories and the per-driver timeout table.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::{Error, Result};
use crate::protocol::Command;

use super::Driver;

// ============================================================================
// TimeoutKind
// ============================================================================

/// Timeout category.
///
/// The first three are enforced by the remote end; [`TimeoutKind::Poll`]
/// bounds the client's wait operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeoutKind {
    /// Page navigation.
    PageLoad,
    /// Asynchronous script execution.
    Script,
    /// Implicit wait applied by the server to element lookups.
    Implicit,
    /// Client-side wait operations.
    Poll,
}

impl TimeoutKind {
    /// All categories.
    pub const ALL: [TimeoutKind; 4] = [Self::PageLoad, Self::Script, Self::Implicit, Self::Poll];

    /// Returns the category name as sent on the wire.
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PageLoad => "page load",
            Self::Script => "script",
            Self::Implicit => "implicit",
            Self::Poll => "poll",
        }
    }

    /// Returns `true` if the server enforces this category.
    #[inline]
    #[must_use]
    pub fn is_server_enforced(self) -> bool {
        !matches!(self, Self::Poll)
    }

    /// Returns the value used until one is set.
    #[must_use]
    pub fn default_duration(self) -> Duration {
        match self {
            Self::PageLoad => Duration::from_millis(300_000),
            Self::Script => Duration::from_millis(30_000),
            Self::Implicit => Duration::ZERO,
            Self::Poll => Duration::from_millis(10_000),
        }
    }
}

impl fmt::Display for TimeoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeoutKind {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "page load" | "pageLoad" => Ok(Self::PageLoad),
            "script" => Ok(Self::Script),
            "implicit" => Ok(Self::Implicit),
            "poll" => Ok(Self::Poll),
            other => Err(Error::config(format!("unknown timeout category: {other}"))),
        }
    }
}

// ============================================================================
// TimeoutTable
// ============================================================================

/// Current duration per category.
#[derive(Debug, Clone)]
pub(crate) struct TimeoutTable(FxHashMap<TimeoutKind, Duration>);

impl Default for TimeoutTable {
    fn default() -> Self {
        Self(
            TimeoutKind::ALL
                .into_iter()
                .map(|kind| (kind, kind.default_duration()))
                .collect(),
        )
    }
}

impl TimeoutTable {
    pub(crate) fn get(&self, kind: TimeoutKind) -> Duration {
        self.0
            .get(&kind)
            .copied()
            .unwrap_or_else(|| kind.default_duration())
    }

    pub(crate) fn set(&mut self, kind: TimeoutKind, duration: Duration) {
        self.0.insert(kind, duration);
    }
}

/// Converts a duration to whole milliseconds, saturating.
pub(crate) fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// ============================================================================
// Driver - Timeouts
// ============================================================================

impl Driver {
    /// Sets a timeout.
    ///
    /// Server-enforced categories are sent to the remote end first; the
    /// local table only changes once the server accepted the value.
    pub async fn set_timeout(&self, kind: TimeoutKind, duration: Duration) -> Result<()> {
        self.logged("set_timeout", kind.as_str(), async {
            if kind.is_server_enforced() {
                self.dispatch(Command::set_timeout(kind.as_str(), millis(duration)))
                    .await?;
            }
            self.inner.timeouts.lock().set(kind, duration);
            debug!(kind = %kind, ms = millis(duration), "Timeout updated");
            Ok(())
        })
        .await
    }

    /// Returns the current value of a timeout.
    #[must_use]
    pub fn timeout(&self, kind: TimeoutKind) -> Duration {
        self.inner.timeouts.lock().get(kind)
    }
}

// ============================================================================
// Tests
// ============================================================================
