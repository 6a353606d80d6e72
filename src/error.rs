//! Error types for the wire-protocol client.
//!
//! Every fallible operation returns [`Result<T>`] which uses [`Error`].
//! An [`Error`] pairs an [`ErrorKind`] with an appendable [`Context`], so
//! an error raised deep inside the dispatcher can later be decorated with
//! the selector or strategy known only to its caller.
//!
//! # Usage
//!
//! ```ignore
//! use wire_webdriver::{Result, Error};
//!
//! async fn example(driver: &Driver) -> Result<()> {
//!     let element = driver.element("#submit").await?;
//!     element.click().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`ErrorKind::Config`] |
//! | Transport | [`ErrorKind::Http`], [`ErrorKind::Connection`] |
//! | Protocol | [`ErrorKind::Protocol`], [`ErrorKind::Status`] |
//! | Session | [`ErrorKind::NoSession`], [`ErrorKind::SessionNotCreated`] |
//! | Local | [`ErrorKind::InvalidParent`], [`ErrorKind::UnknownChainOperation`], [`ErrorKind::MissingUrl`], [`ErrorKind::Bootstrap`] |
//! | Execution | [`ErrorKind::Script`], [`ErrorKind::InvalidResponse`], [`ErrorKind::Timeout`] |
//! | External | [`ErrorKind::Io`], [`ErrorKind::Json`], [`ErrorKind::Base64`], [`ErrorKind::Url`] |

// ============================================================================
// Imports
// ============================================================================

use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;
use std::io::Error as IoError;
use std::result::Result as StdResult;

use base64::DecodeError;
use thiserror::Error;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`struct@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Status
// ============================================================================

/// Protocol status code carried by a response envelope.
///
/// `0` is success and never becomes an error; every other code selects
/// exactly one variant, with [`Status::Unknown`] as the catch-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// 6: session does not exist.
    NoSuchDriver,
    /// 7: selector matched nothing.
    NoSuchElement,
    /// 8: frame does not exist.
    NoSuchFrame,
    /// 9: command not implemented by the server.
    UnknownCommand,
    /// 10: element is no longer attached to the DOM.
    StaleElementReference,
    /// 11: element is not visible.
    ElementNotVisible,
    /// 12: element is in a state that forbids the action.
    InvalidElementState,
    /// 13: generic server failure.
    UnknownError,
    /// 15: element cannot be selected.
    ElementIsNotSelectable,
    /// 17: script raised an exception.
    JavaScriptError,
    /// 19: xpath could not be evaluated.
    XPathLookupError,
    /// 21: server-side timeout.
    Timeout,
    /// 23: window does not exist.
    NoSuchWindow,
    /// 24: cookie domain rejected.
    InvalidCookieDomain,
    /// 25: cookie could not be set.
    UnableToSetCookie,
    /// 26: a modal dialog blocks the command.
    UnexpectedAlertOpen,
    /// 27: no modal dialog is open.
    NoAlertOpenError,
    /// 28: async script did not finish in time.
    ScriptTimeout,
    /// 29: coordinates are invalid.
    InvalidElementCoordinates,
    /// 30: IME is not available.
    ImeNotAvailable,
    /// 31: IME engine could not be activated.
    ImeEngineActivationFailed,
    /// 32: selector is malformed.
    InvalidSelector,
    /// 33: new session could not be created.
    SessionNotCreatedException,
    /// 34: pointer target lies outside the viewport.
    MoveTargetOutOfBounds,
    /// Any code outside the fixed table.
    Unknown(u64),
}

impl Status {
    /// Every status in the fixed table, in code order.
    pub const ALL: [Status; 24] = [
        Self::NoSuchDriver,
        Self::NoSuchElement,
        Self::NoSuchFrame,
        Self::UnknownCommand,
        Self::StaleElementReference,
        Self::ElementNotVisible,
        Self::InvalidElementState,
        Self::UnknownError,
        Self::ElementIsNotSelectable,
        Self::JavaScriptError,
        Self::XPathLookupError,
        Self::Timeout,
        Self::NoSuchWindow,
        Self::InvalidCookieDomain,
        Self::UnableToSetCookie,
        Self::UnexpectedAlertOpen,
        Self::NoAlertOpenError,
        Self::ScriptTimeout,
        Self::InvalidElementCoordinates,
        Self::ImeNotAvailable,
        Self::ImeEngineActivationFailed,
        Self::InvalidSelector,
        Self::SessionNotCreatedException,
        Self::MoveTargetOutOfBounds,
    ];

    /// Maps a non-zero protocol code to its status.
    #[must_use]
    pub fn from_code(code: u64) -> Self {
        match code {
            6 => Self::NoSuchDriver,
            7 => Self::NoSuchElement,
            8 => Self::NoSuchFrame,
            9 => Self::UnknownCommand,
            10 => Self::StaleElementReference,
            11 => Self::ElementNotVisible,
            12 => Self::InvalidElementState,
            13 => Self::UnknownError,
            15 => Self::ElementIsNotSelectable,
            17 => Self::JavaScriptError,
            19 => Self::XPathLookupError,
            21 => Self::Timeout,
            23 => Self::NoSuchWindow,
            24 => Self::InvalidCookieDomain,
            25 => Self::UnableToSetCookie,
            26 => Self::UnexpectedAlertOpen,
            27 => Self::NoAlertOpenError,
            28 => Self::ScriptTimeout,
            29 => Self::InvalidElementCoordinates,
            30 => Self::ImeNotAvailable,
            31 => Self::ImeEngineActivationFailed,
            32 => Self::InvalidSelector,
            33 => Self::SessionNotCreatedException,
            34 => Self::MoveTargetOutOfBounds,
            other => Self::Unknown(other),
        }
    }

    /// Returns the numeric protocol code.
    #[must_use]
    pub fn code(&self) -> u64 {
        match self {
            Self::NoSuchDriver => 6,
            Self::NoSuchElement => 7,
            Self::NoSuchFrame => 8,
            Self::UnknownCommand => 9,
            Self::StaleElementReference => 10,
            Self::ElementNotVisible => 11,
            Self::InvalidElementState => 12,
            Self::UnknownError => 13,
            Self::ElementIsNotSelectable => 15,
            Self::JavaScriptError => 17,
            Self::XPathLookupError => 19,
            Self::Timeout => 21,
            Self::NoSuchWindow => 23,
            Self::InvalidCookieDomain => 24,
            Self::UnableToSetCookie => 25,
            Self::UnexpectedAlertOpen => 26,
            Self::NoAlertOpenError => 27,
            Self::ScriptTimeout => 28,
            Self::InvalidElementCoordinates => 29,
            Self::ImeNotAvailable => 30,
            Self::ImeEngineActivationFailed => 31,
            Self::InvalidSelector => 32,
            Self::SessionNotCreatedException => 33,
            Self::MoveTargetOutOfBounds => 34,
            Self::Unknown(code) => *code,
        }
    }

    /// Returns the human-readable summary for this status.
    #[must_use]
    pub fn summary(&self) -> &'static str {
        match self {
            Self::NoSuchDriver => "no such driver",
            Self::NoSuchElement => "no such element",
            Self::NoSuchFrame => "no such frame",
            Self::UnknownCommand => "unknown command",
            Self::StaleElementReference => "stale element reference",
            Self::ElementNotVisible => "element not visible",
            Self::InvalidElementState => "invalid element state",
            Self::UnknownError => "unknown error",
            Self::ElementIsNotSelectable => "element is not selectable",
            Self::JavaScriptError => "javascript error",
            Self::XPathLookupError => "xpath lookup error",
            Self::Timeout => "timeout",
            Self::NoSuchWindow => "no such window",
            Self::InvalidCookieDomain => "invalid cookie domain",
            Self::UnableToSetCookie => "unable to set cookie",
            Self::UnexpectedAlertOpen => "unexpected alert open",
            Self::NoAlertOpenError => "no alert open",
            Self::ScriptTimeout => "script timeout",
            Self::InvalidElementCoordinates => "invalid element coordinates",
            Self::ImeNotAvailable => "ime not available",
            Self::ImeEngineActivationFailed => "ime engine activation failed",
            Self::InvalidSelector => "invalid selector",
            Self::SessionNotCreatedException => "session not created",
            Self::MoveTargetOutOfBounds => "move target out of bounds",
            Self::Unknown(_) => "unrecognized status",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.summary(), self.code())
    }
}

// ============================================================================
// ErrorKind
// ============================================================================

/// What went wrong, independent of the caller's context.
#[derive(Error, Debug)]
pub enum ErrorKind {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Driver configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Transport Errors
    // ========================================================================
    /// HTTP transport failure, surfaced unmodified.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Connection-level failure reported by a non-HTTP transport.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// Response body was not a JSON envelope.
    #[error("Protocol error on {path}: {reason} (body: {body:?})")]
    Protocol {
        /// Request path that produced the body.
        path: String,
        /// Raw body text after sanitization.
        body: String,
        /// Parse failure reason.
        reason: String,
    },

    /// Non-zero protocol status.
    #[error("{status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Status {
        /// The status selected by the response code.
        status: Status,
        /// Server-supplied message, when present.
        message: Option<String>,
    },

    // ========================================================================
    // Session Errors
    // ========================================================================
    /// Command issued outside the `init`..`delete_session` window.
    #[error("No active session: {message}")]
    NoSession {
        /// Why no session is available.
        message: String,
    },

    /// Session creation returned neither a session id nor a location.
    #[error("Session not created: {message}")]
    SessionNotCreated {
        /// Description of the failure.
        message: String,
    },

    // ========================================================================
    // Local Programming Errors
    // ========================================================================
    /// Query parent does not belong to this session.
    #[error("Invalid parent element: {message}")]
    InvalidParent {
        /// Why the parent was rejected.
        message: String,
    },

    /// Chained traversal named an operation the strategy does not know.
    #[error("Unknown chain operation: {name}")]
    UnknownChainOperation {
        /// The rejected operation name.
        name: String,
    },

    /// URL-change wait given neither an old nor a new URL.
    #[error("Either an old or a new URL is required")]
    MissingUrl,

    /// Script bootstrap still reported a missing piece after installing all of them.
    #[error("Script bootstrap failed: {missing} still missing")]
    Bootstrap {
        /// The piece the page still reports missing.
        missing: String,
    },

    // ========================================================================
    // Execution Errors
    // ========================================================================
    /// In-page script returned something the client cannot interpret.
    #[error("Script error: {message}")]
    Script {
        /// Description of the unexpected result.
        message: String,
    },

    /// Successful reply whose value has the wrong shape.
    #[error("Invalid response: {message}")]
    InvalidResponse {
        /// What was expected.
        message: String,
    },

    /// Polling deadline elapsed before the condition held.
    #[error("Timeout after {timeout_ms}ms{}", .description.as_deref().map(|d| format!(" waiting for {d}")).unwrap_or_default())]
    Timeout {
        /// Configured timeout in milliseconds.
        timeout_ms: u64,
        /// What was being awaited.
        description: Option<String>,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Base64 decoding error.
    #[error("Base64 error: {0}")]
    Base64(#[from] DecodeError),

    /// URL parse error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

// ============================================================================
// Context
// ============================================================================

/// Key/value context attached to an error after construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context(BTreeMap<String, String>);

impl Context {
    /// Returns the value recorded for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Returns `true` if no context was recorded.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates the recorded pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return Ok(());
        }
        f.write_str(" [")?;
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}={value:?}")?;
        }
        f.write_str("]")
    }
}

// ============================================================================
// Error
// ============================================================================

/// Main error type for the crate.
pub struct Error {
    kind: ErrorKind,
    context: Context,
}

impl Error {
    /// Wraps a kind with empty context.
    #[inline]
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: Context::default(),
        }
    }

    /// Returns what went wrong.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Consumes the error, returning its kind.
    #[inline]
    #[must_use]
    pub fn into_kind(self) -> ErrorKind {
        self.kind
    }

    /// Returns the attached context.
    #[inline]
    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Records context pairs on this error.
    ///
    /// Existing keys are overwritten, so applying the same context twice
    /// leaves the error unchanged.
    ///
    /// ```
    /// use wire_webdriver::Error;
    ///
    /// let err = Error::no_such_element().parametrize([("element", "#a"), ("using", "css selector")]);
    /// assert_eq!(err.context().get("element"), Some("#a"));
    /// ```
    #[must_use]
    pub fn parametrize<I, K, V>(mut self, context: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in context {
            self.context.0.insert(key.into(), value.into());
        }
        self
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("context", &self.context)
            .finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind, self.context)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.kind.source()
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::new(ErrorKind::Http(err))
    }
}

impl From<IoError> for Error {
    fn from(err: IoError) -> Self {
        Self::new(ErrorKind::Io(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::new(ErrorKind::Json(err))
    }
}

impl From<DecodeError> for Error {
    fn from(err: DecodeError) -> Self {
        Self::new(ErrorKind::Base64(err))
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::new(ErrorKind::Url(err))
    }
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        ErrorKind::Config {
            message: message.into(),
        }
        .into()
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        ErrorKind::Connection {
            message: message.into(),
        }
        .into()
    }

    /// Creates a malformed-response protocol error.
    #[inline]
    pub fn protocol(
        path: impl Into<String>,
        body: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ErrorKind::Protocol {
            path: path.into(),
            body: body.into(),
            reason: reason.into(),
        }
        .into()
    }

    /// Creates the error for a non-zero status code.
    #[inline]
    pub fn status(code: u64, message: Option<String>) -> Self {
        ErrorKind::Status {
            status: Status::from_code(code),
            message,
        }
        .into()
    }

    /// Creates a "no such element" error raised locally.
    #[inline]
    pub fn no_such_element() -> Self {
        ErrorKind::Status {
            status: Status::NoSuchElement,
            message: None,
        }
        .into()
    }

    /// Creates a no-session error.
    #[inline]
    pub fn no_session(message: impl Into<String>) -> Self {
        ErrorKind::NoSession {
            message: message.into(),
        }
        .into()
    }

    /// Creates a session-not-created error.
    #[inline]
    pub fn session_not_created(message: impl Into<String>) -> Self {
        ErrorKind::SessionNotCreated {
            message: message.into(),
        }
        .into()
    }

    /// Creates an invalid parent error.
    #[inline]
    pub fn invalid_parent(message: impl Into<String>) -> Self {
        ErrorKind::InvalidParent {
            message: message.into(),
        }
        .into()
    }

    /// Creates an unknown chain operation error.
    #[inline]
    pub fn unknown_chain_operation(name: impl Into<String>) -> Self {
        ErrorKind::UnknownChainOperation { name: name.into() }.into()
    }

    /// Creates a bootstrap failure error.
    #[inline]
    pub fn bootstrap(missing: impl Into<String>) -> Self {
        ErrorKind::Bootstrap {
            missing: missing.into(),
        }
        .into()
    }

    /// Creates a script error.
    #[inline]
    pub fn script(message: impl Into<String>) -> Self {
        ErrorKind::Script {
            message: message.into(),
        }
        .into()
    }

    /// Creates an invalid response error.
    #[inline]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        ErrorKind::InvalidResponse {
            message: message.into(),
        }
        .into()
    }

    /// Creates a polling timeout error.
    #[inline]
    pub fn timeout(timeout_ms: u64, description: Option<String>) -> Self {
        ErrorKind::Timeout {
            timeout_ms,
            description,
        }
        .into()
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns the protocol status if this error came from a status code.
    #[inline]
    #[must_use]
    pub fn status_kind(&self) -> Option<Status> {
        match &self.kind {
            ErrorKind::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if the server reported "no such element".
    #[inline]
    #[must_use]
    pub fn is_no_such_element(&self) -> bool {
        self.status_kind() == Some(Status::NoSuchElement)
    }

    /// Returns `true` if the server reported a stale element reference.
    #[inline]
    #[must_use]
    pub fn is_stale_element(&self) -> bool {
        self.status_kind() == Some(Status::StaleElementReference)
    }

    /// Returns `true` for either element-lookup failure.
    #[inline]
    #[must_use]
    pub fn is_element_error(&self) -> bool {
        self.is_no_such_element() || self.is_stale_element()
    }

    /// Returns `true` if this is a polling or server-side timeout.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, ErrorKind::Timeout { .. })
            || matches!(
                self.status_kind(),
                Some(Status::Timeout | Status::ScriptTimeout)
            )
    }

    /// Returns `true` if the request never produced a response.
    #[inline]
    #[must_use]
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Http(_) | ErrorKind::Connection { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
