//! The data each screen renders
//!
//! Markup and styling are the embedding app's business; this crate only publishes plain values describing what should be on screen. Every published [`Screen`] is rebuilt from scratch (a full re-render, never a patch).

use chrono::NaiveDate;
use tokio::sync::watch;

use crate::document::PlannerDocument;
use crate::task::TaskId;

/// Which of the two mutually exclusive auth forms is visible.
/// Toggling is an explicit user action; the two forms are never shown together.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AuthForm {
    SignIn,
    SignUp,
}

/// The signed-out screen: one of the two auth forms, plus the blocking error message of the last failed submission (shown verbatim)
#[derive(Clone, Debug, PartialEq)]
pub struct AuthView {
    pub form: AuthForm,
    pub error: Option<String>,
}

/// One line of the task list
#[derive(Clone, Debug, PartialEq)]
pub struct TaskLine {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
}

/// The signed-in screen
#[derive(Clone, Debug, PartialEq)]
pub struct PlannerView {
    /// The day the list is filtered on
    pub selected_date: NaiveDate,
    /// Tasks whose date equals the selected date, in insertion order
    pub today: Vec<TaskLine>,
    /// All tasks, whatever their date (the footer counter)
    pub total_count: usize,
    /// Completed tasks, whatever their date
    pub completed_count: usize,
    /// A non-blocking message about a failed background read or write, if any
    pub notice: Option<String>,
}

impl PlannerView {
    /// Build the whole view from the current mirror
    pub fn of(document: &PlannerDocument, selected_date: NaiveDate, notice: Option<String>) -> Self {
        let today = document
            .tasks_on(selected_date)
            .into_iter()
            .map(|task| TaskLine {
                id: task.id(),
                text: task.text().to_string(),
                completed: task.completed(),
            })
            .collect();

        Self {
            selected_date,
            today,
            total_count: document.tasks().len(),
            completed_count: document.completed_count(),
            notice,
        }
    }
}

/// Everything visible at one moment. The session gate swaps the variant on every session-state change.
#[derive(Clone, Debug, PartialEq)]
pub enum Screen {
    Auth(AuthView),
    Planner(PlannerView),
}

impl Default for Screen {
    fn default() -> Self {
        Self::Auth(AuthView {
            form: AuthForm::SignIn,
            error: None,
        })
    }
}

/// See [`view_channel`]
pub type ViewSender = watch::Sender<Screen>;
/// See [`view_channel`]
pub type ViewReceiver = watch::Receiver<Screen>;

/// Create a view channel. The gate publishes a fresh [`Screen`] here after every event it handles; the receiver always holds the latest one.
pub fn view_channel() -> (ViewSender, ViewReceiver) {
    watch::channel(Screen::default())
}
