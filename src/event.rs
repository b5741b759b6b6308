//! Planner events

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// TODO: render events once a calendar screen exists.
/// Hosted documents already reserve an `events` array, so this type is serialized and kept in the mirror, but no current screen populates or displays it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    title: String,
    date: NaiveDate,
}

impl Event {
    pub fn new(title: String, date: NaiveDate) -> Self {
        Self { title, date }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }
}
