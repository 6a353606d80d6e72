//! Session facade and its lifecycle.
//!
//! The [`Driver`] owns exactly one remote session. It moves through three
//! states and never returns to an earlier one:
//!
//! ```text
//! Pending ──init()──► Active{id, base} ──delete_session()──► Deleted
//! ```
//!
//! While `Active`, every command path is prefixed with
//! `{prefix}/session/{id}`. Issuing a session command in any other state
//! fails with [`ErrorKind::NoSession`](crate::error::ErrorKind::NoSession).
//!
//! # Example
//!
//! ```no_run
//! use wire_webdriver::Driver;
//!
//! # async fn example() -> wire_webdriver::Result<()> {
//! let driver = Driver::builder().host("127.0.0.1").port(4444).connect().await?;
//! driver.url("https://example.com").await?;
//! println!("{}", driver.title().await?);
//! driver.delete_session().await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tracing::info;

use crate::error::{Error, Result};
use crate::identifiers::SessionId;
use crate::protocol::{Command, Reply};
use crate::transport::Transport;

use super::builder::DriverBuilder;
use super::interceptor::CallLog;
use super::options::DriverOptions;
use super::strategy::StrategyRegistry;
use super::timeouts::TimeoutTable;

// ============================================================================
// Types
// ============================================================================

/// Lifecycle of the driver's session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SessionState {
    /// `init` has not completed.
    Pending,
    /// Commands are scoped under `base`.
    Active {
        /// Server-issued id.
        id: SessionId,
        /// `{prefix}/session/{id}`.
        base: String,
    },
    /// `delete_session` completed; the driver cannot be reused.
    Deleted,
}

impl SessionState {
    /// Base path for session commands.
    pub(crate) fn base_path(&self) -> Result<String> {
        match self {
            Self::Active { base, .. } => Ok(base.clone()),
            Self::Pending => Err(Error::no_session("call init() before issuing commands")),
            Self::Deleted => Err(Error::no_session("session was deleted")),
        }
    }

    pub(crate) fn id(&self) -> Option<&SessionId> {
        match self {
            Self::Active { id, .. } => Some(id),
            _ => None,
        }
    }
}

/// Internal shared state for the driver.
pub(crate) struct DriverInner {
    /// HTTP transport to the remote end.
    pub transport: Arc<dyn Transport>,

    /// Validated configuration.
    pub options: DriverOptions,

    /// Session lifecycle.
    pub session: RwLock<SessionState>,

    /// Current timeout values.
    pub timeouts: Mutex<TimeoutTable>,

    /// Call logging interceptor.
    pub calls: CallLog,

    /// Registered custom selection strategies.
    pub strategies: StrategyRegistry,
}

// ============================================================================
// Driver
// ============================================================================

/// Client for one remote browser session.
///
/// Cloning is cheap; clones share the same session.
#[derive(Clone)]
pub struct Driver {
    /// Shared inner state.
    pub(crate) inner: Arc<DriverInner>,
}

impl fmt::Debug for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver")
            .field("origin", &self.inner.options.origin.as_str())
            .field("session", &*self.inner.session.read())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Driver - Construction
// ============================================================================

impl Driver {
    /// Creates a configuration builder for the driver.
    #[inline]
    #[must_use]
    pub fn builder() -> DriverBuilder {
        DriverBuilder::new()
    }

    pub(crate) fn from_parts(transport: Arc<dyn Transport>, options: DriverOptions) -> Self {
        let mut timeouts = TimeoutTable::default();
        for (kind, duration) in &options.timeouts {
            timeouts.set(*kind, *duration);
        }

        Self {
            inner: Arc::new(DriverInner {
                transport,
                calls: CallLog::new(options.log_calls),
                options,
                session: RwLock::new(SessionState::Pending),
                timeouts: Mutex::new(timeouts),
                strategies: StrategyRegistry::with_builtin(),
            }),
        }
    }

    /// Returns the resolved configuration.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &DriverOptions {
        &self.inner.options
    }

    /// Returns the session id while a session is active.
    #[must_use]
    pub fn session_id(&self) -> Option<SessionId> {
        self.inner.session.read().id().cloned()
    }
}

// ============================================================================
// Driver - Session Lifecycle
// ============================================================================

impl Driver {
    /// Creates the remote session.
    ///
    /// The id is read from the response body's `sessionId`, or from the last
    /// segment of the `Location` header when the body carries none. Builder
    /// timeouts for server-enforced categories are pushed afterwards.
    pub async fn init(&self) -> Result<SessionId> {
        let prefix = self.inner.options.path_prefix.clone();
        self.logged("init", &prefix, async {
            let state = self.inner.session.read().clone();
            match state {
                SessionState::Pending => {}
                SessionState::Active { id, .. } => {
                    return Err(Error::config(format!("session {id} is already active")));
                }
                SessionState::Deleted => {
                    return Err(Error::no_session("session was deleted"));
                }
            }

            let command = Command::new_session(self.inner.options.capabilities.clone());
            let envelope = match self.send(&prefix, command).await? {
                Reply::Raw(envelope) => envelope,
                _ => return Err(Error::session_not_created("expected the raw envelope")),
            };

            let id = envelope.resolve_session_id().map(SessionId::new).ok_or_else(|| {
                Error::session_not_created("response carried neither sessionId nor Location")
            })?;

            *self.inner.session.write() = SessionState::Active {
                base: format!("{prefix}/session/{}", urlencoding::encode(id.as_str())),
                id: id.clone(),
            };
            info!(session_id = %id, "Session created");

            let pending: Vec<_> = self.inner.options.server_timeouts().collect();
            for (kind, duration) in pending {
                self.set_timeout(kind, duration).await?;
            }

            Ok(id)
        })
        .await
    }

    /// Deletes the remote session. The driver cannot be used afterwards.
    pub async fn delete_session(&self) -> Result<()> {
        self.logged("delete_session", "", async {
            self.dispatch(Command::delete_session()).await?;
            let previous =
                std::mem::replace(&mut *self.inner.session.write(), SessionState::Deleted);
            if let Some(id) = previous.id() {
                info!(session_id = %id, "Session deleted");
            }
            Ok(())
        })
        .await
    }

    /// Server status. Does not require a session.
    pub async fn status(&self) -> Result<Value> {
        self.logged("status", "", async {
            Ok(self.dispatch_root(Command::status()).await?.into_value())
        })
        .await
    }

    /// Capabilities the session was created with.
    pub async fn capabilities(&self) -> Result<Value> {
        self.logged("capabilities", "", async {
            Ok(self.dispatch(Command::capabilities()).await?.into_value())
        })
        .await
    }
}

// ============================================================================
// Tests
// ============================================================================
