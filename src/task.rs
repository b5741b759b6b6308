//! To-do tasks, the only planner entries the current screens render

use std::fmt::{Display, Formatter};

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The identifier of a [`Task`]: its creation time, in milliseconds since the Unix epoch.
///
/// This is how the hosted documents already key their tasks, so it is kept as-is.
/// Two clients creating a task in the very same millisecond would collide; ids are "usually" unique, not guaranteed unique.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(i64);

impl TaskId {
    /// Generate an id for a task created right now
    pub fn stamp_now() -> Self {
        Self(Utc::now().timestamp_millis())
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }
}

impl From<i64> for TaskId {
    fn from(millis: i64) -> Self {
        Self(millis)
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.0)
    }
}

/// A to-do task
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// See [`TaskId`]
    id: TaskId,

    /// The display text of the task
    text: String,

    /// Whether the task has been checked off
    completed: bool,

    /// The calendar day this task belongs to (serialized as an ISO-8601 date string)
    date: NaiveDate,
}

impl Task {
    /// Create a brand new task for the given day.
    /// This stamps the task id with the current time.
    pub fn new(text: String, date: NaiveDate) -> Self {
        Self {
            id: TaskId::stamp_now(),
            text,
            completed: false,
            date,
        }
    }

    /// Create a task instance that may already exist on the server
    pub fn new_with_parameters(id: TaskId, text: String, completed: bool, date: NaiveDate) -> Self {
        Self { id, text, completed, date }
    }

    pub fn id(&self) -> TaskId { self.id }
    pub fn text(&self) -> &str { &self.text }
    pub fn completed(&self) -> bool { self.completed }
    pub fn date(&self) -> NaiveDate { self.date }

    pub fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
    }

    /// Flip the completion flag
    pub fn toggle(&mut self) {
        self.completed = !self.completed;
    }
}
