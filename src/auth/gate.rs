//! Declarative access gate for protected content. A pure function of the
//! identity snapshot and an optional role requirement; no I/O, no side
//! effects. Call sites gate independently, so one page may nest several
//! gates with different requirements.

use crate::auth::types::Identity;

/// What a protected region should render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Render the protected content.
    Allow,
    /// No identity: render the sign-in prompt.
    PromptLogin,
    /// Signed in but the role does not satisfy the requirement: render the
    /// denial view. Never raised as an error.
    Forbidden,
}

impl Decision {
    #[must_use]
    pub fn is_allowed(self) -> bool {
        self == Self::Allow
    }
}

/// Decides whether `identity` may see content guarded by `required` roles.
/// `None` for `required` means any signed-in user is allowed. Role checks
/// compare the canonical `role.name` only.
#[must_use]
pub fn guard(identity: Option<&Identity>, required: Option<&[&str]>) -> Decision {
    let Some(identity) = identity else {
        return Decision::PromptLogin;
    };

    match required {
        None => Decision::Allow,
        Some(roles) if roles.iter().any(|role| *role == identity.role.name) => Decision::Allow,
        Some(_) => Decision::Forbidden,
    }
}
