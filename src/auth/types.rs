//! Identity and state types owned by the auth session. Readers receive
//! cloned snapshots; only the session itself mutates them.

use crate::api::types::AccountUser;
use crate::error::{Error, Result};

pub use crate::api::types::{Permissions, Role};

/// The authenticated user's profile plus role, held only while a session
/// is valid. The role is always the structured record; role checks compare
/// `role.name` and nothing else.
#[derive(Clone, Debug, PartialEq)]
pub struct Identity {
    pub user_id: u64,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl Identity {
    pub(crate) fn from_account(account: AccountUser) -> Result<Self> {
        let role = account
            .role
            .ok_or_else(|| Error::Decode("account record is missing a role".to_string()))?;

        Ok(Self {
            user_id: account.id,
            name: account.name,
            email: account.email,
            role,
        })
    }
}

/// Transient outcome of a registration, alive only until verification.
/// `verify_token` is present when the server surfaces the token directly
/// instead of sending mail; that is a workflow state, not an error.
#[derive(Clone, Debug, PartialEq)]
pub struct RegistrationOutcome {
    pub message: String,
    pub verify_token: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum AuthState {
    #[default]
    Anonymous,
    Authenticating,
    Authenticated(Identity),
    PendingVerification(RegistrationOutcome),
}

impl AuthState {
    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}
