//! The in-memory mirror of one user's planner document

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::document::PlannerDocument;
use crate::session::UserId;
use crate::task::{Task, TaskId};
use crate::traits::DocumentSource;

/// See [`notice_channel`]
pub type NoticeSender = watch::Sender<Option<String>>;
/// See [`notice_channel`]
pub type NoticeReceiver = watch::Receiver<Option<String>>;

/// Create a notice channel. The store posts a short, non-blocking message here whenever a background write or read against the remote store fails.
pub fn notice_channel() -> (NoticeSender, NoticeReceiver) {
    watch::channel(None)
}

/// One user's planner, mirrored in memory.
///
/// Every mutation updates the mirror synchronously and then overwrites the whole remote document in the background: callers never wait for the network, and the store gives them no success feedback (failures are logged and posted as a notice). A write racing an incoming remote update has no ordering guarantee: whichever resolves last wins. Under concurrent multi-device edits this can silently drop the earlier edit. This is a known limitation of the whole-document model, not something callers need to guard against.
pub struct PlannerStore {
    user: UserId,
    remote: Arc<dyn DocumentSource>,
    document: PlannerDocument,
    selected_date: NaiveDate,
    notices: NoticeSender,
    pending_writes: Vec<JoinHandle<()>>,
}

impl PlannerStore {
    /// Create a store with an empty mirror, looking at today (in the local time zone)
    pub fn new(user: UserId, remote: Arc<dyn DocumentSource>, notices: NoticeSender) -> Self {
        Self {
            user,
            remote,
            document: PlannerDocument::default(),
            selected_date: crate::utils::today_local(),
            notices,
            pending_writes: Vec::new(),
        }
    }

    pub fn user(&self) -> &UserId {
        &self.user
    }

    /// The current mirror. Always a full copy of the last-seen remote document or the last local edit.
    pub fn document(&self) -> &PlannerDocument {
        &self.document
    }

    pub fn selected_date(&self) -> NaiveDate {
        self.selected_date
    }

    /// Change the day the planner is looking at. This is a pure view concern: nothing is written to the remote store.
    pub fn select_date(&mut self, date: NaiveDate) {
        self.selected_date = date;
    }

    /// Add a task on the selected day.
    /// Whitespace-only text is rejected and nothing happens. Returns whether a task was added.
    pub fn add_task(&mut self, text: &str) -> bool {
        if text.trim().is_empty() {
            log::debug!("Ignoring an empty task");
            return false;
        }

        let task = Task::new(text.to_string(), self.selected_date);
        log::debug!("Adding task {} on {}", task.id(), task.date());
        self.document.push_task(task);
        self.push_to_remote();
        true
    }

    /// Flip the completion flag of the first task carrying this id.
    /// Returns whether a task matched; unknown ids change nothing.
    pub fn toggle_task(&mut self, id: TaskId) -> bool {
        if self.document.toggle_task(id) == false {
            log::debug!("No task {} to toggle", id);
            return false;
        }
        self.push_to_remote();
        true
    }

    /// Delete every task carrying this id (see [`TaskId`] about uniqueness).
    /// Deleting an id that matches nothing is a no-op, so deleting twice is safe.
    pub fn delete_task(&mut self, id: TaskId) -> bool {
        if self.document.remove_task(id) == false {
            log::debug!("No task {} to delete", id);
            return false;
        }
        self.push_to_remote();
        true
    }

    /// Overwrite the whole mirror with a document that arrived from the remote store.
    /// This never writes back: the update is already what the remote store holds.
    pub fn replace_from_remote(&mut self, document: PlannerDocument) {
        self.document = document;
    }

    /// Overwrite the remote document with the current mirror, in the background.
    ///
    /// The caller goes on immediately. A failure is logged and posted on the notice channel; the mirror is not rolled back.
    fn push_to_remote(&mut self) {
        self.document.touch();

        let user = self.user.clone();
        let document = self.document.clone();
        let remote = Arc::clone(&self.remote);
        let notices = self.notices.clone();

        let handle = tokio::spawn(async move {
            if let Err(err) = remote.write_document(&user, &document).await {
                log::warn!("Unable to save the planner of {}: {}", user, err);
                let _ = notices.send(Some(err.to_string()));
            }
        });

        self.pending_writes.retain(|write| write.is_finished() == false);
        self.pending_writes.push(handle);
    }

    /// Wait until every background write issued so far has resolved.
    /// Mutations never need this; it exists for shutdown paths and tests.
    pub async fn flush(&mut self) {
        for write in self.pending_writes.drain(..) {
            let _ = write.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::memory::MemoryRemote;
    use crate::traits::DocumentSource;

    fn test_store(remote: &Arc<MemoryRemote>) -> PlannerStore {
        let (notices, _) = notice_channel();
        let source: Arc<dyn DocumentSource> = remote.clone();
        PlannerStore::new(UserId::from("some-student"), source, notices)
    }

    #[tokio::test]
    async fn adding_a_task_shows_up_today() {
        let remote = Arc::new(MemoryRemote::new());
        let mut store = test_store(&remote);

        assert_eq!(store.add_task("Finish essay"), true);
        let today = store.selected_date();
        assert_eq!(store.document().tasks_on(today).len(), 1);
        assert_eq!(store.document().tasks().len(), 1);
        assert_eq!(store.document().completed_count(), 0);
    }

    #[tokio::test]
    async fn whitespace_only_text_is_a_no_op() {
        let remote = Arc::new(MemoryRemote::new());
        let mut store = test_store(&remote);

        assert_eq!(store.add_task("   "), false);
        assert_eq!(store.add_task(""), false);
        store.flush().await;

        assert_eq!(store.document().tasks().len(), 0);
        // Nothing was written either
        let stored = remote.read_document(store.user()).await.unwrap();
        assert!(stored.is_none());
    }

    #[tokio::test]
    async fn mutations_write_through_to_the_remote_store() {
        let remote = Arc::new(MemoryRemote::new());
        let mut store = test_store(&remote);

        store.add_task("Finish essay");
        store.flush().await;

        let stored = remote.read_document(store.user()).await.unwrap().unwrap();
        assert_eq!(stored.tasks(), store.document().tasks());
    }

    #[tokio::test]
    async fn toggle_and_delete_round_trip() {
        let remote = Arc::new(MemoryRemote::new());
        let mut store = test_store(&remote);

        store.add_task("Finish essay");
        let id = store.document().tasks()[0].id();

        assert_eq!(store.toggle_task(id), true);
        assert_eq!(store.document().completed_count(), 1);
        assert_eq!(store.toggle_task(id), true);
        assert_eq!(store.document().completed_count(), 0);

        assert_eq!(store.delete_task(id), true);
        assert_eq!(store.delete_task(id), false);
        store.flush().await;

        let stored = remote.read_document(store.user()).await.unwrap().unwrap();
        assert_eq!(stored.tasks().len(), 0);
    }

    #[tokio::test]
    async fn replacing_from_remote_does_not_write_back() {
        let remote = Arc::new(MemoryRemote::new());
        let mut store = test_store(&remote);

        let mut incoming = PlannerDocument::default();
        incoming.push_task(Task::new("pushed from another device".to_string(), store.selected_date()));
        store.replace_from_remote(incoming.clone());
        store.flush().await;

        assert!(store.document().has_same_content_as(&incoming));
        // The remote store never saw a write
        let stored = remote.read_document(store.user()).await.unwrap();
        assert!(stored.is_none());
    }
}
