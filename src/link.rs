//! Custom links students can pin to their planner

use serde::{Deserialize, Serialize};
use url::Url;

/// A bookmark stored alongside the tasks (course portal, shared notes...).
/// Like [`Event`](crate::Event), this is persisted in the planner document but not rendered by any current screen.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CustomLink {
    label: String,
    url: Url,
}

impl CustomLink {
    pub fn new(label: String, url: Url) -> Self {
        Self { label, url }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}
