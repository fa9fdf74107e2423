use shaadi_protocol::ProtocolError;

/// Errors that can occur while talking to the backend.
///
/// The session layer only needs to know one thing about a failure: did
/// the backend *say no* ([`Rejected`](Self::Rejected)), or could we not get
/// a usable answer at all (everything else)?
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request never got an HTTP answer: DNS, refused connection,
    /// TLS failure, or timeout.
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered with a 4xx: wrong password, expired token,
    /// duplicate email, etc.
    #[error("rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The backend answered with a 5xx.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// A 2xx answer whose body couldn't be decoded or was unusable.
    #[error("malformed response: {0}")]
    Malformed(#[from] ProtocolError),

    /// The client was configured with something unusable (bad base URL).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl TransportError {
    /// Classifies a non-2xx HTTP status.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if (400..500).contains(&status) {
            Self::Rejected { status, message }
        } else {
            Self::Server { status, message }
        }
    }

    /// Returns `true` if the backend explicitly refused the request.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    /// The HTTP status, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } | Self::Server { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}
