//! Error types for the session layer.

use shaadi_protocol::ProtocolError;

/// Errors raised by token persistence.
///
/// These never escape [`SessionStore`](crate::SessionStore) operations:
/// the store turns them into an [`ErrorInfo`](crate::ErrorInfo) on the
/// session or a log line. They are public because [`TokenStore`]
/// implementations outside this crate return them.
///
/// [`TokenStore`]: crate::TokenStore
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Reading, writing, or deleting the token record failed at the OS
    /// level (permissions, full disk, read-only filesystem).
    #[error("token storage failed: {0}")]
    Storage(#[from] std::io::Error),

    /// The token record exists but can't be understood: hand-edited,
    /// truncated by a crash, or written by an incompatible version.
    #[error("stored token is corrupt: {0}")]
    Corrupt(#[source] ProtocolError),
}
