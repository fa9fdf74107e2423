//! Error types for the guard layer.

use shaadi_protocol::ProtocolError;

/// Errors raised while building or querying a [`RouteTable`](crate::RouteTable).
///
/// The guard decision itself can't fail; these only come from paths the
/// table doesn't know and from bad table definitions.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// No pattern in the table matches the path.
    #[error("no route matches {0}")]
    NotFound(String),

    /// A pattern is not of the form `/segment/:param/...`.
    #[error("invalid route pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Two patterns match exactly the same paths.
    #[error("route {0} is defined twice")]
    Duplicate(String),

    /// A route table file couldn't be read.
    #[error("could not read route table: {0}")]
    Io(#[from] std::io::Error),

    /// A route table file isn't valid JSON of the expected shape.
    #[error("could not parse route table: {0}")]
    Parse(#[from] ProtocolError),
}
