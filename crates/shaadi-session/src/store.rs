//! The session store: the one place that decides who is logged in.
//!
//! # Overlapping calls
//!
//! Every operation takes a ticket from a monotonically increasing
//! generation counter when it starts. When a network call comes back, its
//! result is committed only if no newer operation has started since.
//! Commits (including the token writes) happen while the counter's lock is
//! held, so a `logout` can never land in the middle of a `login` commit.
//!
//! ```text
//!   login ──gen 1──→ [network ........] ──→ commit? gen is 2, dropped
//!   logout ─────gen 2──→ cleared
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

use shaadi_protocol::{AuthGrant, Credentials, RegistrationProfile};
use shaadi_transport::{AuthApi, TransportError};
use tokio::sync::watch;

use crate::{ErrorInfo, ErrorKind, Session, SessionStatus, TokenStore};

/// Handed out when an operation starts; checked when it finishes.
#[derive(Debug, Clone, Copy)]
struct Ticket {
    generation: u64,
    /// Status before the operation flipped it to `Loading`, already
    /// settled (a superseded `Loading` counts as `Ready`).
    prior: SessionStatus,
}

/// Owns the current [`Session`] and the persisted credential token.
///
/// Generic over the backend ([`AuthApi`]) and the token storage
/// ([`TokenStore`]) so tests can plug in fakes. Share it with `Arc`: all
/// operations take `&self`.
///
/// None of the operations return errors. Failures are recorded on the
/// session as [`ErrorInfo`] and the boolean results say whether a
/// login/registration took effect.
pub struct SessionStore<A, T> {
    api: A,
    tokens: T,
    state: watch::Sender<Session>,
    generation: Mutex<u64>,
}

impl<A: AuthApi, T: TokenStore> SessionStore<A, T> {
    /// Creates a store with an `Idle`, empty session. Nothing is loaded
    /// until [`recover_session`](Self::recover_session) is called.
    pub fn new(api: A, tokens: T) -> Self {
        let (state, _) = watch::channel(Session::default());
        Self {
            api,
            tokens,
            state,
            generation: Mutex::new(0),
        }
    }

    /// A copy of the current session.
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    /// A receiver that is notified whenever the session changes.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// The backend this store talks to.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// The storage holding the credential token.
    pub fn tokens(&self) -> &T {
        &self.tokens
    }

    // -----------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------

    /// Restores the session from the persisted token, typically once at
    /// startup. Returns the resulting snapshot.
    ///
    /// - No token: `Ready` and signed out, without touching the network.
    /// - Token verified: `Ready` with the identity the backend returned.
    /// - Anything else (rejected, unreachable, garbled, unreadable
    ///   storage): the token is deleted and the session is `Failed` with
    ///   [`ErrorKind::AuthExpired`].
    pub async fn recover_session(&self) -> Session {
        let (ticket, token) = {
            let mut generation = self.lock_generation();
            *generation += 1;
            let ticket_generation = *generation;

            match self.tokens.load() {
                Ok(None) => {
                    tracing::debug!("no stored token, starting signed out");
                    self.update(|session| *session = Session::signed_out());
                    return self.snapshot();
                }
                Err(e) => {
                    tracing::warn!(error = %e, "stored token unreadable, discarding");
                    self.discard_token();
                    self.update(|session| {
                        *session = Session::failed(ErrorInfo::new(
                            ErrorKind::AuthExpired,
                            e.to_string(),
                        ))
                    });
                    return self.snapshot();
                }
                Ok(Some(token)) => {
                    let prior = self.mark_loading();
                    let ticket = Ticket {
                        generation: ticket_generation,
                        prior,
                    };
                    (ticket, token)
                }
            }
        };

        let result = self.api.verify(&token).await;

        let generation = self.lock_generation();
        if *generation != ticket.generation {
            tracing::debug!(ticket = ticket.generation, "recovery superseded, result dropped");
            return self.snapshot();
        }
        match result {
            Ok(identity) => {
                tracing::info!(user = %identity.id, role = %identity.role, "session recovered");
                self.update(|session| *session = Session::signed_in(identity));
            }
            Err(e) => {
                tracing::info!(error = %e, "stored token refused, signing out");
                self.discard_token();
                self.update(|session| {
                    *session = Session::failed(ErrorInfo::new(
                        ErrorKind::AuthExpired,
                        describe(&e),
                    ))
                });
            }
        }
        drop(generation);
        self.snapshot()
    }

    /// Logs in with an email and password.
    ///
    /// Returns `true` if the session is now signed in as the returned
    /// user. On `false` the previous identity is kept and `last_error`
    /// says why, unless a newer operation superseded this one, in which
    /// case nothing at all changed.
    pub async fn login(&self, email: &str, password: &str) -> bool {
        let credentials = Credentials::new(email, password);
        if credentials.is_incomplete() {
            self.reject_locally(ErrorInfo::new(
                ErrorKind::InvalidCredentials,
                "Email and password are required",
            ));
            return false;
        }

        let ticket = self.begin();
        let result = self.api.login(&credentials).await;
        self.finish("login", ticket, result, ErrorKind::InvalidCredentials)
    }

    /// Creates an account and signs in as it.
    ///
    /// Same contract as [`login`](Self::login). Refusals are reported as
    /// [`ErrorKind::ValidationError`]; a profile that fails the local
    /// checks never reaches the backend.
    pub async fn register(&self, profile: RegistrationProfile) -> bool {
        if let Err(e) = profile.validate() {
            self.reject_locally(ErrorInfo::new(ErrorKind::ValidationError, e.to_string()));
            return false;
        }

        let ticket = self.begin();
        let result = self.api.register(&profile).await;
        self.finish("register", ticket, result, ErrorKind::ValidationError)
    }

    /// Signs out: deletes the token and clears the identity.
    ///
    /// Always succeeds. Any login, registration, or recovery still in
    /// flight is superseded and will not touch the session when it
    /// returns. A storage failure while deleting the token is logged.
    pub fn logout(&self) {
        let mut generation = self.lock_generation();
        *generation += 1;

        self.discard_token();
        self.update(|session| *session = Session::signed_out());
        tracing::info!("logged out");
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    fn lock_generation(&self) -> MutexGuard<'_, u64> {
        self.generation.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies `change` and notifies subscribers if it changed anything.
    fn update(&self, change: impl FnOnce(&mut Session)) {
        self.state.send_if_modified(|session| {
            let before = session.clone();
            change(session);
            *session != before
        });
    }

    /// Sets `Loading` and returns the settled prior status.
    fn mark_loading(&self) -> SessionStatus {
        let mut prior = SessionStatus::Idle;
        self.update(|session| {
            prior = settle(session.status);
            session.status = SessionStatus::Loading;
        });
        prior
    }

    /// Starts a login/registration: new generation, status `Loading`.
    fn begin(&self) -> Ticket {
        let mut generation = self.lock_generation();
        *generation += 1;
        Ticket {
            generation: *generation,
            prior: self.mark_loading(),
        }
    }

    /// Records a failure that was caught before any network call.
    fn reject_locally(&self, error: ErrorInfo) {
        let mut generation = self.lock_generation();
        *generation += 1;

        tracing::debug!(%error, "request rejected before sending");
        self.update(|session| {
            session.status = settle(session.status);
            session.last_error = Some(error);
        });
    }

    /// Commits the outcome of a login or registration.
    fn finish(
        &self,
        action: &'static str,
        ticket: Ticket,
        result: Result<AuthGrant, TransportError>,
        refused: ErrorKind,
    ) -> bool {
        let generation = self.lock_generation();
        if *generation != ticket.generation {
            tracing::debug!(action, ticket = ticket.generation, "superseded, result dropped");
            return false;
        }

        let grant = match result {
            Ok(grant) => grant,
            Err(e) => {
                let kind = if e.is_rejection() {
                    refused
                } else {
                    ErrorKind::NetworkError
                };
                tracing::info!(action, error = %e, "auth request failed");
                self.restore(ticket, ErrorInfo::new(kind, describe(&e)));
                return false;
            }
        };

        if let Err(e) = self.tokens.save(&grant.token) {
            tracing::warn!(action, error = %e, "could not persist token");
            self.restore(ticket, ErrorInfo::new(ErrorKind::Storage, e.to_string()));
            return false;
        }

        tracing::info!(
            action,
            user = %grant.identity.id,
            role = %grant.identity.role,
            "signed in"
        );
        self.update(|session| *session = Session::signed_in(grant.identity));
        drop(generation);
        true
    }

    /// Puts the pre-call status back and records `error`. The identity
    /// was never touched while loading, so it is already the prior one.
    fn restore(&self, ticket: Ticket, error: ErrorInfo) {
        self.update(|session| {
            session.status = ticket.prior;
            session.last_error = Some(error);
        });
    }

    fn discard_token(&self) {
        if let Err(e) = self.tokens.clear() {
            tracing::warn!(error = %e, "could not delete stored token");
        }
    }
}

/// A `Loading` left behind by a superseded call is treated as resolved.
fn settle(status: SessionStatus) -> SessionStatus {
    match status {
        SessionStatus::Loading => SessionStatus::Ready,
        other => other,
    }
}

/// The user-facing reason for a transport failure.
fn describe(error: &TransportError) -> String {
    match error {
        TransportError::Rejected { message, .. } | TransportError::Server { message, .. } => {
            message.clone()
        }
        TransportError::Network(_) => "Could not reach the server".to_owned(),
        TransportError::Malformed(_) => "The server sent an unexpected response".to_owned(),
        TransportError::InvalidConfig(reason) => reason.clone(),
    }
}
