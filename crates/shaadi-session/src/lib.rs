//! Client session management for ShaadiSetGo.
//!
//! This crate answers one question for the rest of the app: **who is
//! logged in right now?** It handles:
//!
//! 1. **Persistence**: keeping the bearer token across restarts
//!    ([`TokenStore`], [`MemoryTokenStore`], [`FileTokenStore`])
//! 2. **Session state**: the snapshot views read ([`Session`],
//!    [`SessionStatus`], [`ErrorInfo`])
//! 3. **Lifecycle**: recovering, logging in, registering, and logging
//!    out, with subscribers notified of every change ([`SessionStore`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Guard Layer (above)  ← reads Session snapshots to decide what to render
//!     ↕
//! Session Layer (this crate)  ← owns the identity and the persisted token
//!     ↕
//! Transport Layer (below)  ← AuthApi: verify / login / register
//! ```

mod error;
mod session;
mod store;
mod token;

pub use error::SessionError;
pub use session::{ErrorInfo, ErrorKind, Session, SessionStatus};
pub use store::SessionStore;
pub use token::{FileTokenStore, MemoryTokenStore, TokenStore};
