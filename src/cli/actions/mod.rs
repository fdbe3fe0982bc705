pub mod admin;
pub mod session;

use secrecy::SecretString;

#[derive(Debug)]
pub enum Action {
    Login {
        email: String,
        password: SecretString,
    },
    Register {
        email: String,
        password: SecretString,
        name: String,
    },
    Verify {
        token: String,
    },
    Logout,
    Whoami,
    Roles,
    Users,
    Assign {
        user: u64,
        role: u64,
    },
}

impl Action {
    /// Whether the action goes through the admin gate.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Roles | Self::Users | Self::Assign { .. })
    }
}
