//! Session types: what the app believes about the current user.
//!
//! A [`Session`] is a plain value. The [`SessionStore`](crate::SessionStore)
//! owns the live one and hands out clones ("snapshots"), so a view or the
//! route guard can look at it without holding any lock.

use std::fmt;

use shaadi_protocol::{Identity, Role};

// ---------------------------------------------------------------------------
// SessionStatus
// ---------------------------------------------------------------------------

/// Where the session is in its lifecycle.
///
/// ```text
///            recover / login / register
///   Idle ───────────────→ Loading ──(ok)──→ Ready
///                            │                ↑
///                            └──(err)──→ Failed │
///                                             │
///   any state ──────────(logout)──────────────┘
/// ```
///
/// - **Idle**: nothing has been attempted yet (app just started).
/// - **Loading**: a network call is in flight.
/// - **Ready**: resolved. Either someone is logged in, or we know for sure
///   that nobody is ("empty but resolved").
/// - **Failed**: session recovery failed; the reason is in
///   [`Session::last_error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Loading => write!(f, "Loading"),
            Self::Ready => write!(f, "Ready"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// ErrorInfo
// ---------------------------------------------------------------------------

/// What went wrong, coarsely, so views can pick a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The backend couldn't be reached or answered with garbage.
    NetworkError,
    /// Login was refused.
    InvalidCredentials,
    /// The stored token was refused (or unreadable) during recovery.
    AuthExpired,
    /// Registration was refused, or the form failed local checks.
    ValidationError,
    /// The token couldn't be persisted after a successful login/register.
    Storage,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NetworkError => "NetworkError",
            Self::InvalidCredentials => "InvalidCredentials",
            Self::AuthExpired => "AuthExpired",
            Self::ValidationError => "ValidationError",
            Self::Storage => "Storage",
        };
        f.write_str(name)
    }
}

/// The last failure, kept on the session for views to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    /// Human-readable reason, usually the backend's own message.
    pub message: String,
}

impl ErrorInfo {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A snapshot of the client's belief about who is logged in.
///
/// Invariant (maintained by the store): `identity` is only `Some` while
/// `status` is `Ready` or `Loading` (a login on top of an existing
/// session keeps showing the old identity), and never without a persisted
/// token behind it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    pub identity: Option<Identity>,
    pub status: SessionStatus,
    pub last_error: Option<ErrorInfo>,
}

impl Session {
    /// Resolved, nobody logged in, nothing to report.
    pub fn signed_out() -> Self {
        Self {
            identity: None,
            status: SessionStatus::Ready,
            last_error: None,
        }
    }

    /// Resolved with a logged-in user.
    pub fn signed_in(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
            status: SessionStatus::Ready,
            last_error: None,
        }
    }

    /// Recovery failed; nobody is logged in and `error` says why.
    pub fn failed(error: ErrorInfo) -> Self {
        Self {
            identity: None,
            status: SessionStatus::Failed,
            last_error: Some(error),
        }
    }

    /// `true` when the session is resolved with a user.
    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Ready && self.identity.is_some()
    }

    /// The current user's role, if anyone is logged in.
    pub fn role(&self) -> Option<Role> {
        self.identity.as_ref().map(|identity| identity.role)
    }
}
