//! The per-user planner document

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::event::Event;
use crate::link::CustomLink;
use crate::task::{Task, TaskId};

/// The whole planner of one user, as the remote store persists it.
///
/// The backend writes and reads this as a single atomic unit. There is no per-field access: a local mirror always holds a full replacement copy of the last-seen remote document (or of the last local edit), never a partial update.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlannerDocument {
    tasks: Vec<Task>,
    events: Vec<Event>,
    #[serde(rename = "customLinks")]
    custom_links: Vec<CustomLink>,
    #[serde(rename = "updatedAt")]
    updated_at: DateTime<Utc>,
}

impl Default for PlannerDocument {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            events: Vec::new(),
            custom_links: Vec::new(),
            updated_at: Utc::now(),
        }
    }
}

impl PlannerDocument {
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn custom_links(&self) -> &[CustomLink] {
        &self.custom_links
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Append a task. Insertion order is the only ordering the document maintains.
    pub fn push_task(&mut self, task: Task) {
        self.tasks.push(task);
    }

    /// Flip the completion flag of the first task carrying this id.
    /// Returns false when no task matches.
    pub fn toggle_task(&mut self, id: TaskId) -> bool {
        match self.tasks.iter_mut().find(|task| task.id() == id) {
            None => false,
            Some(task) => {
                task.toggle();
                true
            }
        }
    }

    /// Remove every task carrying this id (ids are "usually" unique, see [`TaskId`]).
    /// Returns false when no task matches, so deleting twice is a no-op.
    pub fn remove_task(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id() != id);
        self.tasks.len() != before
    }

    /// The tasks scheduled on the given calendar day, in insertion order
    pub fn tasks_on(&self, date: NaiveDate) -> Vec<&Task> {
        self.tasks.iter().filter(|task| task.date() == date).collect()
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|task| task.completed()).count()
    }

    /// Refresh the `updatedAt` stamp. Done on every outbound write.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Compares the actual planner contents, ignoring the `updatedAt` stamp
    /// (two documents written at different times can still hold the same planner)
    pub fn has_same_content_as(&self, other: &Self) -> bool {
        self.tasks == other.tasks
            && self.events == other.events
            && self.custom_links == other.custom_links
    }
}
