//! Role administration: list roles, list users, reassign a role, and patch
//! the in-memory roster with the server's updated record. Authorization is
//! the access gate's job at the call boundary; nothing here re-checks it.

use crate::api::types::{Role, User};
use crate::api::ForumApi;
use crate::error::Result;
use secrecy::SecretString;
use tracing::{debug, warn};

/// The admin user roster: fetched once, then patched in place after each
/// successful role change. Never silently re-fetched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Roster {
    users: Vec<User>,
}

impl Roster {
    #[must_use]
    pub fn new(users: Vec<User>) -> Self {
        Self { users }
    }

    #[must_use]
    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Replaces exactly the entry matching `updated.id` with the record the
    /// server returned, preserving order and every other entry. Returns
    /// `false` (and changes nothing) when the id is not in the roster.
    pub fn apply(&mut self, updated: User) -> bool {
        match self.users.iter_mut().find(|user| user.id == updated.id) {
            Some(entry) => {
                *entry = updated;
                true
            }
            None => {
                warn!(user_id = updated.id, "role update for unknown roster entry");
                false
            }
        }
    }
}

/// Privileged role-management operations. Callers must have passed the
/// access gate with an `admin` requirement before constructing one.
pub struct RoleAdmin<'a> {
    api: &'a ForumApi,
    token: &'a SecretString,
}

impl<'a> RoleAdmin<'a> {
    #[must_use]
    pub fn new(api: &'a ForumApi, token: &'a SecretString) -> Self {
        Self { api, token }
    }

    /// # Errors
    /// `SessionExpired`, `Forbidden`, or `Transport` from the remote call.
    pub async fn list_roles(&self) -> Result<Vec<Role>> {
        self.api.roles(self.token).await
    }

    /// # Errors
    /// `SessionExpired`, `Forbidden`, or `Transport` from the remote call.
    pub async fn list_users(&self) -> Result<Roster> {
        Ok(Roster::new(self.api.users(self.token).await?))
    }

    /// Reassigns a user's role and patches the roster with the
    /// server-returned record, never a locally reconstructed one, so the
    /// displayed role matches server truth even when local role metadata
    /// is stale.
    ///
    /// # Errors
    /// `SessionExpired`, `Forbidden`, or `Transport` from the remote call.
    pub async fn reassign(
        &self,
        roster: &mut Roster,
        user_id: u64,
        role_id: u64,
    ) -> Result<User> {
        let response = self.api.update_user_role(self.token, user_id, role_id).await?;
        debug!("{}", response.message);

        let updated = response.user.clone();
        roster.apply(response.user);
        Ok(updated)
    }
}
