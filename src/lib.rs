//! Session and authorization core for a student-forum client.
//!
//! The crate owns how a client establishes identity, persists and
//! revalidates a bearer credential, reacts to its expiry, and gates
//! content by role:
//!
//! - [`auth::store`] persists the single bearer credential.
//! - [`auth::validator`] asks the remote authority whether a stored
//!   credential is still accepted, keeping explicit rejection and
//!   transport failure apart.
//! - [`auth::session`] is the state machine that owns the identity and
//!   serializes every transition.
//! - [`auth::gate`] is the pure authorization decision for protected
//!   content.
//! - [`admin`] is the privileged role-management flow behind the gate.
//!
//! Everything else the forum does (threads, replies, profiles) lives
//! behind the remote API and is out of scope here.

pub mod admin;
pub mod api;
pub mod auth;
pub mod cli;
pub mod error;

pub use admin::{RoleAdmin, Roster};
pub use api::ForumApi;
pub use auth::gate::{guard, Decision};
pub use auth::session::{AuthSession, EmailDomain, Resumed};
pub use auth::store::CredentialStore;
pub use auth::types::{AuthState, Identity, Permissions, RegistrationOutcome, Role};
pub use error::{Error, Result};
