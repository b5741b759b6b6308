//! Error taxonomies for the two provider seams

use std::error::Error;
use std::fmt::{Display, Formatter};

/// A failed call to the auth provider.
///
/// These are shown to the user verbatim as a blocking message on the auth screen. A submission is attempted exactly once: no retry, no backoff.
#[derive(Clone, Debug, PartialEq)]
pub enum AuthError {
    /// Unknown account, or wrong password
    InvalidCredentials,
    /// The provider refused the password at account creation
    WeakPassword,
    /// An account already exists for this email
    EmailTaken,
    /// Any other provider message, passed through as-is
    Provider(String),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            AuthError::InvalidCredentials => write!(f, "Invalid email or password"),
            AuthError::WeakPassword => write!(f, "Password should be at least 6 characters"),
            AuthError::EmailTaken => write!(f, "An account already exists for this email"),
            AuthError::Provider(message) => write!(f, "{}", message),
        }
    }
}

impl Error for AuthError {}

/// A failed call to the document store.
///
/// No distinction is made between transient (network) and permanent (permission) failures; both carry the provider's message and propagate identically. Callers log them and surface a non-blocking notice rather than fail silently.
#[derive(Clone, Debug, PartialEq)]
pub enum StorageError {
    Read(String),
    Write(String),
    Subscribe(String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            StorageError::Read(message) => write!(f, "Reading the planner failed: {}", message),
            StorageError::Write(message) => write!(f, "Saving the planner failed: {}", message),
            StorageError::Subscribe(message) => write!(f, "Watching the planner failed: {}", message),
        }
    }
}

impl Error for StorageError {}
