//! Backend auth API abstraction for ShaadiSetGo.
//!
//! The marketplace backend exposes three auth endpoints the client cares
//! about: identity verification, login, and registration. This crate
//! provides the [`AuthApi`] trait that abstracts over how those endpoints
//! are reached, plus two implementations:
//!
//! - [`HttpAuthApi`]: the real thing, JSON over HTTP via `reqwest`
//!   (feature `http`, on by default).
//! - [`InMemoryAuthApi`]: an in-process backend with accounts and issued
//!   tokens, for demos and tests.
//!
//! # Feature Flags
//!
//! - `http` (default): [`HttpAuthApi`] via `reqwest` with rustls.

#![allow(async_fn_in_trait)]

mod config;
mod error;
#[cfg(feature = "http")]
mod http;
mod memory;

pub use config::ApiConfig;
pub use error::TransportError;
#[cfg(feature = "http")]
pub use http::HttpAuthApi;
pub use memory::InMemoryAuthApi;

use std::future::Future;
use std::sync::Arc;

use shaadi_protocol::{AuthGrant, Credentials, Identity, RegistrationProfile};

/// The three backend calls the session layer depends on.
///
/// # Trait bounds
///
/// - `Send + Sync` → one API client is shared by every task that touches
///   the session store.
/// - `'static` → it lives as long as the client application.
///
/// Each method returns `impl Future + Send` so the session store's own
/// futures stay `Send` and can be handed to `tokio::spawn`. Implementors
/// can still write plain `async fn` bodies.
pub trait AuthApi: Send + Sync + 'static {
    /// Verifies a bearer token and returns the identity it belongs to.
    ///
    /// # Errors
    /// [`TransportError::Rejected`] when the token is unknown or expired,
    /// any other variant when the backend couldn't be asked.
    fn verify(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Identity, TransportError>> + Send;

    /// Exchanges email + password for a token and identity.
    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<AuthGrant, TransportError>> + Send;

    /// Creates an account and returns a token for it (auto-login).
    fn register(
        &self,
        profile: &RegistrationProfile,
    ) -> impl Future<Output = Result<AuthGrant, TransportError>> + Send;
}

/// Lets callers keep a handle on a backend they also gave to a session
/// store (tests inspect the in-memory backend this way).
impl<T: AuthApi> AuthApi for Arc<T> {
    fn verify(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Identity, TransportError>> + Send {
        (**self).verify(token)
    }

    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<AuthGrant, TransportError>> + Send {
        (**self).login(credentials)
    }

    fn register(
        &self,
        profile: &RegistrationProfile,
    ) -> impl Future<Output = Result<AuthGrant, TransportError>> + Send {
        (**self).register(profile)
    }
}
