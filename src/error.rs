//! Error kinds for the session and authorization core. The variants keep
//! user-action failures, authorization outcomes, and transport problems
//! distinguishable: a flaky network must never be reported as a rejected
//! session.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The remote service rejected the email/password pair.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The account exists but its email address has not been verified yet.
    #[error("email address has not been verified")]
    EmailUnverified,

    /// Registration was refused because the address is already taken.
    #[error("email address is already registered")]
    DuplicateRegistration,

    /// The verification token was not accepted.
    #[error("verification token is invalid or expired")]
    InvalidVerification,

    /// The caller's role does not satisfy the requirement.
    #[error("not allowed with the current role")]
    Forbidden,

    /// The remote authority explicitly rejected a stored credential.
    #[error("stored session is no longer accepted")]
    SessionExpired,

    /// Client-side guard: the address is outside the institutional namespace.
    #[error("email address must belong to {0}")]
    InvalidEmailDomain(String),

    /// A sign-in/registration was attempted while already signed in.
    #[error("already signed in, log out first")]
    SessionActive,

    /// A second authentication attempt was issued before the first resolved.
    #[error("another authentication attempt is in progress")]
    AttemptInProgress,

    /// The attempt completed after the session had already moved on; its
    /// result was discarded.
    #[error("attempt superseded by a later session change")]
    Aborted,

    /// Network-level failure, outcome unknown.
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a status the client does not know how to map.
    #[error("unexpected response ({status}): {message}")]
    Unexpected { status: u16, message: String },

    /// The response body did not match the expected shape.
    #[error("malformed response: {0}")]
    Decode(String),

    /// The credential file could not be read or written.
    #[error("credential storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}
