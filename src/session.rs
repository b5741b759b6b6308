//! Session identities, as handed out by the auth provider

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// The identity the auth provider assigned to an account.
/// The app never inspects it; it only keys the planner document.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.0)
    }
}

/// What the auth provider currently knows about this client.
///
/// The provider owns the session; this is only a reference to the current identity, valid until sign-out or token invalidation.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionState {
    SignedOut,
    SignedIn(UserId),
}

impl Default for SessionState {
    fn default() -> Self {
        Self::SignedOut
    }
}

impl SessionState {
    pub fn is_signed_in(&self) -> bool {
        match self {
            SessionState::SignedIn(_) => true,
            _ => false,
        }
    }
}
