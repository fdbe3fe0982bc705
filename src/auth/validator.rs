//! Asks the remote authority whether a stored credential is still accepted.
//! The one correctness-critical distinction lives here: an explicit
//! rejection clears a session, a transport failure never does. Called at
//! most once per resume, never retried, never polled.

use crate::api::ForumApi;
use secrecy::SecretString;
use tracing::warn;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Validation {
    /// The credential is still accepted.
    Accepted,
    /// The authority explicitly rejected the credential; the session must
    /// be torn down.
    Rejected,
    /// Outcome unknown (network failure or a server error). Prior state
    /// must be left untouched.
    Inconclusive,
}

pub async fn validate(api: &ForumApi, token: &SecretString) -> Validation {
    match api.validate_token(token).await {
        Ok(true) => Validation::Accepted,
        Ok(false) => Validation::Rejected,
        Err(err) => {
            warn!("token validation inconclusive: {err}");
            Validation::Inconclusive
        }
    }
}
