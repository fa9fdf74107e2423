//! An in-process stand-in for the marketplace backend.
//!
//! [`InMemoryAuthApi`] keeps accounts and issued tokens in a `HashMap` and
//! answers the three auth calls the way the real backend does, including
//! its status codes. It can also pretend to be slow or unreachable, and it
//! counts calls so tests can assert that no request was made.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rand::Rng;
use shaadi_protocol::{
    AuthGrant, Credentials, Identity, RegistrationProfile, Role, UserId,
};

use crate::{AuthApi, TransportError};

struct Account {
    password: String,
    identity: Identity,
}

#[derive(Default)]
struct Directory {
    /// Accounts keyed by lowercased email.
    accounts: HashMap<String, Account>,
    /// Issued bearer tokens → lowercased email of the owner.
    tokens: HashMap<String, String>,
    next_id: u64,
}

impl Directory {
    fn insert(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Identity {
        self.next_id += 1;
        let identity = Identity {
            id: UserId::new(format!("u-{}", self.next_id)),
            display_name: name.to_owned(),
            role,
            email: email.to_owned(),
        };
        self.accounts.insert(
            email.to_ascii_lowercase(),
            Account {
                password: password.to_owned(),
                identity: identity.clone(),
            },
        );
        identity
    }

    fn grant_for(&mut self, email_key: &str) -> Option<AuthGrant> {
        let identity = self.accounts.get(email_key)?.identity.clone();
        let token = generate_token();
        self.tokens.insert(token.clone(), email_key.to_owned());
        Some(AuthGrant { token, identity })
    }
}

#[derive(Default)]
struct CallCounts {
    verify: AtomicUsize,
    login: AtomicUsize,
    register: AtomicUsize,
}

/// An [`AuthApi`] backed by process memory.
///
/// ```rust
/// use shaadi_protocol::Role;
/// use shaadi_transport::InMemoryAuthApi;
///
/// let backend = InMemoryAuthApi::new()
///     .with_account("Asha", "asha@example.com", "pw", Role::Vendor);
///
/// // Pretend Asha logged in on a previous visit.
/// let token = backend.issue_token("asha@example.com");
/// assert!(token.is_some());
/// assert_eq!(backend.login_calls(), 0);
/// ```
#[derive(Default)]
pub struct InMemoryAuthApi {
    directory: Mutex<Directory>,
    latency: Duration,
    offline: AtomicBool,
    calls: CallCounts,
}

impl InMemoryAuthApi {
    /// An empty backend that answers immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every answer by `latency`, like a slow mobile connection.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Builder form of [`add_account`](Self::add_account).
    pub fn with_account(
        self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Self {
        self.add_account(name, email, password, role);
        self
    }

    /// Creates an account (overwriting any with the same email) and
    /// returns its identity.
    pub fn add_account(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Identity {
        self.directory().insert(name, email, password, role)
    }

    /// Issues a fresh token for an existing account, as if the user had
    /// logged in on an earlier visit. Returns `None` for unknown emails.
    pub fn issue_token(&self, email: &str) -> Option<String> {
        self.directory()
            .grant_for(&email.to_ascii_lowercase())
            .map(|grant| grant.token)
    }

    /// Invalidates one token (server-side logout, password change...).
    pub fn revoke(&self, token: &str) {
        self.directory().tokens.remove(token);
    }

    /// Invalidates every issued token.
    pub fn revoke_all(&self) {
        self.directory().tokens.clear();
    }

    /// While offline, every call fails with [`TransportError::Network`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// How many times `verify` was called.
    pub fn verify_calls(&self) -> usize {
        self.calls.verify.load(Ordering::SeqCst)
    }

    /// How many times `login` was called.
    pub fn login_calls(&self) -> usize {
        self.calls.login.load(Ordering::SeqCst)
    }

    /// How many times `register` was called.
    pub fn register_calls(&self) -> usize {
        self.calls.register.load(Ordering::SeqCst)
    }

    fn directory(&self) -> MutexGuard<'_, Directory> {
        self.directory.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Simulated round-trip: wait out the latency, then fail if offline.
    async fn round_trip(&self) -> Result<(), TransportError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(TransportError::Network(
                "backend unreachable".into(),
            ));
        }
        Ok(())
    }
}

impl AuthApi for InMemoryAuthApi {
    async fn verify(&self, token: &str) -> Result<Identity, TransportError> {
        self.calls.verify.fetch_add(1, Ordering::SeqCst);
        self.round_trip().await?;

        let directory = self.directory();
        directory
            .tokens
            .get(token)
            .and_then(|email| directory.accounts.get(email))
            .map(|account| account.identity.clone())
            .ok_or_else(|| {
                TransportError::from_status(401, "Invalid or expired token")
            })
    }

    async fn login(
        &self,
        credentials: &Credentials,
    ) -> Result<AuthGrant, TransportError> {
        self.calls.login.fetch_add(1, Ordering::SeqCst);
        self.round_trip().await?;

        let key = credentials.email.to_ascii_lowercase();
        let mut directory = self.directory();
        let password_ok = directory
            .accounts
            .get(&key)
            .is_some_and(|account| account.password == credentials.password);
        if !password_ok {
            return Err(TransportError::from_status(
                401,
                "Invalid email or password",
            ));
        }
        directory.grant_for(&key).ok_or_else(|| {
            TransportError::from_status(401, "Invalid email or password")
        })
    }

    async fn register(
        &self,
        profile: &RegistrationProfile,
    ) -> Result<AuthGrant, TransportError> {
        self.calls.register.fetch_add(1, Ordering::SeqCst);
        self.round_trip().await?;

        if let Err(e) = profile.validate() {
            return Err(TransportError::from_status(422, e.to_string()));
        }
        let key = profile.email.to_ascii_lowercase();
        let mut directory = self.directory();
        if directory.accounts.contains_key(&key) {
            return Err(TransportError::from_status(
                409,
                "Email already registered",
            ));
        }
        directory.insert(
            &profile.name,
            &profile.email,
            &profile.password,
            profile.role,
        );
        tracing::debug!(email = %profile.email, role = %profile.role, "account registered");
        directory.grant_for(&key).ok_or_else(|| {
            TransportError::from_status(500, "account vanished after insert")
        })
    }
}

/// Generates a random 32-character hex token (128 bits of entropy).
///
/// `{:02x}` formats each byte as two lowercase, zero-padded hex digits.
fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
