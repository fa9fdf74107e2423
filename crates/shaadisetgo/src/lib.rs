//! # ShaadiSetGo client
//!
//! Client-side authentication session and role-based route guard for the
//! ShaadiSetGo wedding marketplace.
//!
//! The client answers two questions for the app: who is logged in
//! ([`SessionStore`](shaadi_session::SessionStore)), and what should be
//! shown for a given page ([`RouteTable`](shaadi_guard::RouteTable) plus
//! [`decide`](shaadi_guard::decide)). The session survives restarts via a
//! persisted bearer token and is checked against the backend on boot.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shaadisetgo::prelude::*;
//!
//! # async fn run() -> Result<(), ShaadiError> {
//! init_tracing();
//! let config = ClientConfig::from_env()?;
//! let client = ShaadiClient::builder().build_http(&config)?;
//!
//! client.boot().await;
//! let nav = client.navigate("/bookings")?;
//! if let Some(target) = nav.redirect {
//!     println!("redirect to {target}");
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod telemetry;

pub use client::{Navigation, RouteWatch, ShaadiClient, ShaadiClientBuilder};
pub use config::{
    ClientConfig, ENV_API_URL, ENV_HTTP_TIMEOUT_SECS, ENV_ROUTES_FILE, ENV_TOKEN_PATH,
};
pub use error::ShaadiError;
pub use telemetry::{init_tracing, DEFAULT_LOG_FILTER};

pub use shaadi_guard as guard;
pub use shaadi_protocol as protocol;
pub use shaadi_session as session;
pub use shaadi_transport as transport;

/// Everything an app usually needs, in one import.
pub mod prelude {
    pub use crate::{
        init_tracing, ClientConfig, Navigation, RouteWatch, ShaadiClient,
        ShaadiClientBuilder, ShaadiError,
    };
    pub use shaadi_guard::{decide, Access, Decision, RoleSet, RouteError, RouteTable};
    pub use shaadi_protocol::{Identity, RegistrationProfile, Role, UserId};
    pub use shaadi_session::{
        ErrorInfo, ErrorKind, FileTokenStore, MemoryTokenStore, Session, SessionStatus,
        SessionStore, TokenStore,
    };
    #[cfg(feature = "http")]
    pub use shaadi_transport::HttpAuthApi;
    pub use shaadi_transport::{ApiConfig, AuthApi, InMemoryAuthApi, TransportError};
}
