//! Route guarding for ShaadiSetGo.
//!
//! Given a [`Session`](shaadi_session::Session) snapshot and what a page
//! requires, decide what the app should show. Nothing in this crate does
//! I/O or keeps state; the facade re-runs the decision whenever the
//! session changes.
//!
//! # Key types
//!
//! - [`RoleSet`]: which roles may see a page, usable in `const` items
//! - [`decide`] / [`Decision`]: the guard itself
//! - [`RouteTable`] / [`Access`]: path patterns and their access rules,
//!   with the marketplace's own table built in

mod decision;
mod error;
mod roles;
mod routes;

pub use decision::{decide, Decision};
pub use error::RouteError;
pub use roles::RoleSet;
pub use routes::{Access, RouteMatch, RouteTable};
