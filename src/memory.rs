//! An in-process planner backend
//!
//! This implements both provider seams entirely in memory. Integration tests use it in the role of the hosted provider; the demo binary runs against it so no real project is needed. Under the `failure_injection` feature, a [`MockBehaviour`](crate::mock_behaviour::MockBehaviour) can make chosen operations fail on demand.

use std::collections::HashMap;
use std::sync::Mutex;
#[cfg(feature = "failure_injection")]
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::document::PlannerDocument;
use crate::error::{AuthError, StorageError};
#[cfg(feature = "failure_injection")]
use crate::mock_behaviour::MockBehaviour;
use crate::session::{SessionState, UserId};
use crate::traits::{AuthSource, DocumentSource, DocumentSubscription, SubscriptionId};

struct Account {
    password: String,
    user: UserId,
}

struct Watcher {
    user: UserId,
    sender: watch::Sender<Option<PlannerDocument>>,
}

/// A planner backend that lives in process memory
pub struct MemoryRemote {
    accounts: Mutex<HashMap<String, Account>>,
    documents: Mutex<HashMap<UserId, PlannerDocument>>,
    watchers: Mutex<HashMap<SubscriptionId, Watcher>>,
    session_tx: watch::Sender<SessionState>,

    #[cfg(feature = "failure_injection")]
    mock_behaviour: Arc<Mutex<MockBehaviour>>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        let (session_tx, _) = watch::channel(SessionState::SignedOut);
        Self {
            accounts: Mutex::new(HashMap::new()),
            documents: Mutex::new(HashMap::new()),
            watchers: Mutex::new(HashMap::new()),
            session_tx,
            #[cfg(feature = "failure_injection")]
            mock_behaviour: Arc::new(Mutex::new(MockBehaviour::new())),
        }
    }

    #[cfg(feature = "failure_injection")]
    pub fn set_mock_behaviour(&self, behaviour: MockBehaviour) {
        *self.mock_behaviour.lock().unwrap() = behaviour;
    }

    /// How many live subscriptions this backend is currently feeding
    pub fn active_watchers(&self) -> usize {
        self.watchers.lock().unwrap().len()
    }

    /// The providers refuse short passwords at account creation
    const MIN_PASSWORD_LEN: usize = 6;
}

impl Default for MemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthSource for MemoryRemote {
    async fn create_account(&self, email: &str, password: &str) -> Result<UserId, AuthError> {
        #[cfg(feature = "failure_injection")]
        self.mock_behaviour.lock().unwrap().can_create_account().map_err(AuthError::Provider)?;

        if password.len() < Self::MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword);
        }

        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(email) {
            return Err(AuthError::EmailTaken);
        }

        let user = UserId::from(uuid::Uuid::new_v4().to_hyphenated().to_string());
        accounts.insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                user: user.clone(),
            },
        );
        drop(accounts);

        log::debug!("Created an account for {}", email);
        let _ = self.session_tx.send(SessionState::SignedIn(user.clone()));
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<UserId, AuthError> {
        #[cfg(feature = "failure_injection")]
        self.mock_behaviour.lock().unwrap().can_sign_in().map_err(AuthError::Provider)?;

        let user = {
            let accounts = self.accounts.lock().unwrap();
            match accounts.get(email) {
                Some(account) if account.password == password => account.user.clone(),
                _ => return Err(AuthError::InvalidCredentials),
            }
        };

        let _ = self.session_tx.send(SessionState::SignedIn(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) {
        let _ = self.session_tx.send(SessionState::SignedOut);
    }

    fn session_states(&self) -> watch::Receiver<SessionState> {
        self.session_tx.subscribe()
    }
}

#[async_trait]
impl DocumentSource for MemoryRemote {
    async fn read_document(&self, user: &UserId) -> Result<Option<PlannerDocument>, StorageError> {
        #[cfg(feature = "failure_injection")]
        self.mock_behaviour.lock().unwrap().can_read_document().map_err(StorageError::Read)?;

        Ok(self.documents.lock().unwrap().get(user).cloned())
    }

    async fn write_document(&self, user: &UserId, document: &PlannerDocument) -> Result<(), StorageError> {
        #[cfg(feature = "failure_injection")]
        self.mock_behaviour.lock().unwrap().can_write_document().map_err(StorageError::Write)?;

        self.documents
            .lock()
            .unwrap()
            .insert(user.clone(), document.clone());

        // Fan the new snapshot out to every subscription on this user
        for watcher in self.watchers.lock().unwrap().values() {
            if &watcher.user == user {
                let _ = watcher.sender.send(Some(document.clone()));
            }
        }

        Ok(())
    }

    async fn subscribe(&self, user: &UserId) -> Result<DocumentSubscription, StorageError> {
        #[cfg(feature = "failure_injection")]
        self.mock_behaviour.lock().unwrap().can_subscribe().map_err(StorageError::Subscribe)?;

        let current = self.documents.lock().unwrap().get(user).cloned();
        let (sender, updates) = watch::channel(current);
        let id = SubscriptionId::random();

        self.watchers.lock().unwrap().insert(
            id,
            Watcher {
                user: user.clone(),
                sender,
            },
        );

        log::debug!("Subscribed to the planner of {} as {}", user, id);
        Ok(DocumentSubscription::new(id, updates))
    }

    async fn unsubscribe(&self, subscription: SubscriptionId) {
        if self.watchers.lock().unwrap().remove(&subscription).is_none() {
            log::warn!("No subscription {} to release", subscription);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn duplicate_emails_are_refused() {
        let remote = MemoryRemote::new();
        remote.create_account("ada@example.com", "hunter22").await.unwrap();

        let err = remote.create_account("ada@example.com", "other-password").await;
        assert_eq!(err, Err(AuthError::EmailTaken));
    }

    #[tokio::test]
    async fn short_passwords_are_refused() {
        let remote = MemoryRemote::new();
        let err = remote.create_account("ada@example.com", "abc").await;
        assert_eq!(err, Err(AuthError::WeakPassword));
    }

    #[tokio::test]
    async fn wrong_credentials_are_refused() {
        let remote = MemoryRemote::new();
        remote.create_account("ada@example.com", "hunter22").await.unwrap();

        assert_eq!(
            remote.sign_in("ada@example.com", "wrong").await,
            Err(AuthError::InvalidCredentials)
        );
        assert_eq!(
            remote.sign_in("nobody@example.com", "hunter22").await,
            Err(AuthError::InvalidCredentials)
        );
        assert!(remote.sign_in("ada@example.com", "hunter22").await.is_ok());
    }

    #[tokio::test]
    async fn signing_in_twice_keeps_the_same_identity() {
        let remote = MemoryRemote::new();
        let created = remote.create_account("ada@example.com", "hunter22").await.unwrap();
        let signed_in = remote.sign_in("ada@example.com", "hunter22").await.unwrap();
        assert_eq!(created, signed_in);
    }

    #[tokio::test]
    async fn writes_reach_subscribers() {
        let remote = MemoryRemote::new();
        let user = UserId::from("some-student");

        let mut subscription = remote.subscribe(&user).await.unwrap();
        assert!(subscription.updates.borrow().is_none());

        let mut document = PlannerDocument::default();
        document.push_task(crate::Task::new(
            "Finish essay".to_string(),
            chrono::NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        ));
        remote.write_document(&user, &document).await.unwrap();

        subscription.updates.changed().await.unwrap();
        let received = subscription.updates.borrow().clone().unwrap();
        assert!(received.has_same_content_as(&document));
    }

    #[tokio::test]
    async fn unsubscribing_releases_the_watcher() {
        let remote = MemoryRemote::new();
        let user = UserId::from("some-student");

        let subscription = remote.subscribe(&user).await.unwrap();
        assert_eq!(remote.active_watchers(), 1);

        remote.unsubscribe(subscription.id()).await;
        assert_eq!(remote.active_watchers(), 0);
    }

    #[tokio::test]
    async fn writes_do_not_cross_users() {
        let remote = MemoryRemote::new();
        let ada = UserId::from("ada");
        let brian = UserId::from("brian");

        let subscription = remote.subscribe(&ada).await.unwrap();
        remote
            .write_document(&brian, &PlannerDocument::default())
            .await
            .unwrap();

        // Ada's channel still holds its initial empty snapshot
        assert!(subscription.updates.borrow().is_none());
        assert!(remote.read_document(&ada).await.unwrap().is_none());
    }
}
