//! Wire protocol for the ShaadiSetGo auth API.
//!
//! This crate defines the "language" that the client speaks with the
//! marketplace backend's auth endpoints:
//!
//! - **Types** ([`Identity`], [`Role`], [`Credentials`], [`AuthGrant`], etc.):
//!   the request/response bodies that travel over HTTP.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those bodies are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits below the transport (which moves the bytes) and
//! the session layer (which decides what an identity means for the app).
//! It knows nothing about HTTP or token storage.
//!
//! ```text
//! Transport (HTTP bytes) → Protocol (AuthGrant, Identity) → Session (who is logged in)
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod codec;
mod error;
mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

// `pub use` makes items from submodules available at the crate root, so
// users write `use shaadi_protocol::Identity` instead of
// `use shaadi_protocol::types::Identity`.

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ApiErrorBody, AuthGrant, Credentials, Identity, IdentityResponse,
    RegistrationProfile, Role, UserId,
};
