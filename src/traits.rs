use std::fmt::{Display, Formatter};

use async_trait::async_trait;
use tokio::sync::watch;

use crate::document::PlannerDocument;
use crate::error::{AuthError, StorageError};
use crate::session::{SessionState, UserId};

/// A provider that authenticates users
#[async_trait]
pub trait AuthSource: Send + Sync {
    /// Create an account and sign it in.
    /// Errors surface to the user as-is; the caller must not retry on its own.
    async fn create_account(&self, email: &str, password: &str) -> Result<UserId, AuthError>;

    /// Sign an existing account in
    async fn sign_in(&self, email: &str, password: &str) -> Result<UserId, AuthError>;

    /// End the current session. Observers see a `SignedOut` state afterwards.
    async fn sign_out(&self);

    /// Observe the session state.
    /// The receiver starts out holding the current state, and is notified on every sign-in and sign-out.
    fn session_states(&self) -> watch::Receiver<SessionState>;
}

/// A store that persists one [`PlannerDocument`] per user
///
/// Writes are whole-document overwrites; the store's atomic single-document write is the only consistency boundary. Two concurrent writers are resolved last-write-wins.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Fetch the current document, or `None` when this user has never saved one
    async fn read_document(&self, user: &UserId) -> Result<Option<PlannerDocument>, StorageError>;

    /// Overwrite the whole document
    async fn write_document(&self, user: &UserId, document: &PlannerDocument) -> Result<(), StorageError>;

    /// Start watching the document for changes.
    /// Every subscription acquired here must be released with [`unsubscribe`](Self::unsubscribe) when the session ends, otherwise the source keeps feeding a listener nobody reads.
    async fn subscribe(&self, user: &UserId) -> Result<DocumentSubscription, StorageError>;

    /// Release a subscription acquired with [`subscribe`](Self::subscribe)
    async fn unsubscribe(&self, subscription: SubscriptionId);
}

/// Identifies one live subscription to a [`DocumentSource`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(uuid::Uuid);

impl SubscriptionId {
    /// Generate a random SubscriptionId
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Display for SubscriptionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.0)
    }
}

/// A live feed of document changes, handed out by [`DocumentSource::subscribe`]
///
/// `updates` holds the latest pushed document; `None` means the document does not exist (yet).
pub struct DocumentSubscription {
    id: SubscriptionId,
    /// The channel the source pushes document snapshots through
    pub updates: watch::Receiver<Option<PlannerDocument>>,
}

impl DocumentSubscription {
    pub fn new(id: SubscriptionId, updates: watch::Receiver<Option<PlannerDocument>>) -> Self {
        Self { id, updates }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}
