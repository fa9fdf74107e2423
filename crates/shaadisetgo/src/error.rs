//! Unified error type for the ShaadiSetGo client.

use shaadi_guard::RouteError;
use shaadi_protocol::ProtocolError;
use shaadi_session::SessionError;
use shaadi_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// Session operations never return errors (they record them on the
/// session instead), so in practice this comes from building a client
/// and from navigating to paths the route table doesn't know.
#[derive(Debug, thiserror::Error)]
pub enum ShaadiError {
    /// The backend client couldn't be built (bad base URL, TLS setup).
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Token storage failed outside a session operation.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Unknown path, or a bad route table.
    #[error(transparent)]
    Route(#[from] RouteError),

    /// An environment variable held something unusable.
    #[error("invalid configuration: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::InvalidConfig("no host".into());
        let shaadi_err: ShaadiError = err.into();
        assert!(matches!(shaadi_err, ShaadiError::Transport(_)));
        assert!(shaadi_err.to_string().contains("no host"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let shaadi_err: ShaadiError = err.into();
        assert!(matches!(shaadi_err, ShaadiError::Protocol(_)));
    }

    #[test]
    fn test_from_session_error() {
        let err = SessionError::Storage(std::io::Error::other("disk full"));
        let shaadi_err: ShaadiError = err.into();
        assert!(matches!(shaadi_err, ShaadiError::Session(_)));
    }

    #[test]
    fn test_from_route_error() {
        let err = RouteError::NotFound("/nowhere".into());
        let shaadi_err: ShaadiError = err.into();
        assert!(matches!(shaadi_err, ShaadiError::Route(_)));
        assert_eq!(shaadi_err.to_string(), "no route matches /nowhere");
    }
}
