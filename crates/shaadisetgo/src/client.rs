//! `ShaadiClient` builder and navigation.
//!
//! This is what an app embeds. It ties the layers together: a
//! [`SessionStore`] over some backend and token storage, plus the
//! [`RouteTable`] the guard consults on every navigation.

use std::sync::Arc;

use shaadi_guard::{Access, Decision, RouteTable};
use shaadi_protocol::RegistrationProfile;
use shaadi_session::{Session, SessionStore, TokenStore};
use shaadi_transport::AuthApi;
use tokio::sync::watch;

use crate::ShaadiError;
#[cfg(feature = "http")]
use crate::ClientConfig;
#[cfg(feature = "http")]
use shaadi_session::FileTokenStore;
#[cfg(feature = "http")]
use shaadi_transport::HttpAuthApi;

/// Builder for configuring a [`ShaadiClient`].
///
/// # Example
///
/// ```rust
/// use shaadisetgo::prelude::*;
///
/// let client = ShaadiClient::builder()
///     .build(InMemoryAuthApi::new(), MemoryTokenStore::new());
/// assert_eq!(client.routes().login_path(), "/login");
/// ```
pub struct ShaadiClientBuilder {
    routes: RouteTable,
}

impl ShaadiClientBuilder {
    /// Creates a builder with the marketplace's built-in routes.
    pub fn new() -> Self {
        Self {
            routes: RouteTable::shaadisetgo(),
        }
    }

    /// Replaces the route table.
    pub fn routes(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }

    /// Builds a client over any backend and token storage.
    pub fn build<A: AuthApi, T: TokenStore>(self, api: A, tokens: T) -> ShaadiClient<A, T> {
        ShaadiClient {
            session: Arc::new(SessionStore::new(api, tokens)),
            routes: Arc::new(self.routes),
        }
    }

    /// Builds a client that talks HTTP to `config.api` and keeps its
    /// token at `config.token_path`. If `config.routes_file` is set, that
    /// table replaces the builder's.
    ///
    /// # Errors
    /// - [`ShaadiError::Transport`] for an unusable API configuration
    /// - [`ShaadiError::Route`] if the routes file can't be loaded
    #[cfg(feature = "http")]
    pub fn build_http(
        self,
        config: &ClientConfig,
    ) -> Result<ShaadiClient<HttpAuthApi, FileTokenStore>, ShaadiError> {
        let api = HttpAuthApi::new(config.api.clone())?;
        let routes = match &config.routes_file {
            Some(path) => RouteTable::load(path)?,
            None => self.routes,
        };
        tracing::debug!(
            base_url = %config.api.base_url,
            token_path = %config.token_path.display(),
            routes = routes.len(),
            "http client configured"
        );
        Ok(Self { routes }.build(api, FileTokenStore::new(&config.token_path)))
    }
}

impl Default for ShaadiClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The guard's verdict for one path, with the redirect resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// The path as requested.
    pub path: String,
    /// The route pattern it matched.
    pub pattern: String,
    pub access: Access,
    pub decision: Decision,
    /// Where to go instead, for redirect decisions.
    pub redirect: Option<String>,
}

impl Navigation {
    fn evaluate(routes: &RouteTable, path: &str, session: &Session) -> Result<Self, ShaadiError> {
        let hit = routes.resolve(path)?;
        let decision = hit.access.decide(session);
        Ok(Self {
            path: path.to_owned(),
            pattern: hit.pattern.to_owned(),
            access: hit.access,
            redirect: routes.redirect_target(&decision).map(str::to_owned),
            decision,
        })
    }
}

/// An authenticated-session client: session lifecycle plus route guard.
///
/// Cheap to clone; clones share the same session.
pub struct ShaadiClient<A, T> {
    session: Arc<SessionStore<A, T>>,
    routes: Arc<RouteTable>,
}

impl<A, T> Clone for ShaadiClient<A, T> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            routes: Arc::clone(&self.routes),
        }
    }
}

impl ShaadiClient<(), ()> {
    /// Creates a new builder.
    pub fn builder() -> ShaadiClientBuilder {
        ShaadiClientBuilder::new()
    }
}

impl<A: AuthApi, T: TokenStore> ShaadiClient<A, T> {
    /// The underlying session store.
    pub fn session(&self) -> &SessionStore<A, T> {
        &self.session
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Restores the previous session, if any. Call once at startup,
    /// before the first navigation.
    pub async fn boot(&self) -> Session {
        let session = self.session.recover_session().await;
        match &session.identity {
            Some(identity) => {
                tracing::info!(user = %identity.id, role = %identity.role, "client booted signed in")
            }
            None => tracing::info!(status = %session.status, "client booted signed out"),
        }
        session
    }

    /// See [`SessionStore::login`].
    pub async fn login(&self, email: &str, password: &str) -> bool {
        self.session.login(email, password).await
    }

    /// See [`SessionStore::register`].
    pub async fn register(&self, profile: RegistrationProfile) -> bool {
        self.session.register(profile).await
    }

    /// See [`SessionStore::logout`].
    pub fn logout(&self) {
        self.session.logout();
    }

    /// Decides what to show for `path` right now.
    ///
    /// # Errors
    /// [`ShaadiError::Route`] if no route matches `path`.
    pub fn navigate(&self, path: &str) -> Result<Navigation, ShaadiError> {
        let navigation = Navigation::evaluate(&self.routes, path, &self.session.snapshot())?;
        tracing::debug!(path, decision = ?navigation.decision, "navigated");
        Ok(navigation)
    }

    /// Like [`navigate`](Self::navigate), but keeps re-deciding as the
    /// session changes.
    pub fn watch(&self, path: &str) -> Result<RouteWatch, ShaadiError> {
        let mut sessions = self.session.subscribe();
        let current = Navigation::evaluate(&self.routes, path, &sessions.borrow_and_update())?;
        Ok(RouteWatch {
            routes: Arc::clone(&self.routes),
            sessions,
            current,
        })
    }
}

/// A page's guard decision that follows the session.
///
/// Created by [`ShaadiClient::watch`].
pub struct RouteWatch {
    routes: Arc<RouteTable>,
    sessions: watch::Receiver<Session>,
    current: Navigation,
}

impl RouteWatch {
    /// The latest decision.
    pub fn current(&self) -> &Navigation {
        &self.current
    }

    /// Waits until the session changes in a way that changes the
    /// decision, and returns the new one.
    ///
    /// Returns `None` once the client (and its session) is gone.
    pub async fn changed(&mut self) -> Option<Navigation> {
        loop {
            self.sessions.changed().await.ok()?;
            let session = self.sessions.borrow_and_update().clone();
            // The path resolved when the watch was created and the table
            // is immutable, so this can't fail.
            let next = Navigation::evaluate(&self.routes, &self.current.path, &session).ok()?;
            if next.decision != self.current.decision {
                self.current = next.clone();
                return Some(next);
            }
        }
    }
}
