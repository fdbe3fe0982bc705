//! Wire types for the forum API. Role and user records are shared between
//! the session core and the admin roster; response envelopes stay private to
//! the crate's request plumbing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Permission flags keyed by permission name, as stored on the server.
pub type Permissions = HashMap<String, bool>;

/// A named permission bundle assignable to a user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub permissions: Permissions,
}

/// The signed-in account as returned by login and profile endpoints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccountUser {
    pub id: u64,
    pub email: String,
    pub name: String,
    pub role: Option<Role>,
    #[serde(default)]
    pub verified: bool,
}

/// A roster entry in the admin view. `role` may be absent for users that
/// have not been assigned one; callers must render that state, not fail.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<Role>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: AccountUser,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    #[serde(default)]
    pub verify_token: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RoleChangeResponse {
    pub message: String,
    pub user: User,
}
