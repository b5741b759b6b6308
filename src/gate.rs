//! The session gate: decides which screen is visible and wires the planner to the providers
//!
//! This is the single owner of all mutable planner state. UI event handlers do not mutate anything themselves: they send a [`Command`] down an mpsc channel, and the gate applies it, re-renders, and lets the background write-through run its course.

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::mpsc;

use crate::document::PlannerDocument;
use crate::error::AuthError;
use crate::session::SessionState;
use crate::store::{notice_channel, NoticeReceiver, NoticeSender, PlannerStore};
use crate::task::TaskId;
use crate::traits::{AuthSource, DocumentSource, DocumentSubscription};
use crate::view::{AuthForm, AuthView, PlannerView, Screen, ViewSender};

/// Everything a user can do, as an explicit message.
/// Bind these to your UI event handlers; there are no ambient entry points.
#[derive(Clone, Debug)]
pub enum Command {
    /// Show the sign-in form (and hide the sign-up form)
    ShowSignIn,
    /// Show the sign-up form (and hide the sign-in form)
    ShowSignUp,
    /// Submit the sign-in form. Attempted exactly once; a failure becomes a blocking message on the auth screen.
    SubmitSignIn { email: String, password: String },
    /// Submit the sign-up form. Same single-attempt rule as sign-in.
    SubmitSignUp { email: String, password: String },
    /// End the session. The gate releases the live subscription and falls back to the auth screen.
    SignOut,
    /// Add a task on the selected day. Whitespace-only text does nothing.
    AddTask { text: String },
    /// Check or uncheck a task
    ToggleTask { id: TaskId },
    /// Remove a task. Unknown ids do nothing.
    DeleteTask { id: TaskId },
    /// Look at another day
    SelectDate { date: NaiveDate },
}

/// What woke the gate's loop up
enum GateEvent {
    SessionChanged,
    RemoteUpdate(Option<PlannerDocument>),
    RemoteClosed,
    Notice,
    Command(Command),
    CommandsClosed,
}

/// Observes the session state and owns the visible screen.
///
/// Signed out, it shows one of the two auth forms. On sign-in it loads the user's document, acquires a live subscription, and shows the planner. On sign-out it releases the subscription and drops the planner state. Every handled event ends with a full rebuild of the published [`Screen`].
pub struct SessionGate {
    auth: Arc<dyn AuthSource>,
    remote: Arc<dyn DocumentSource>,
    view: ViewSender,

    form: AuthForm,
    auth_error: Option<AuthError>,
    notice: Option<String>,
    notice_tx: NoticeSender,
    notice_rx: NoticeReceiver,

    store: Option<PlannerStore>,
    subscription: Option<DocumentSubscription>,
}

impl SessionGate {
    pub fn new(auth: Arc<dyn AuthSource>, remote: Arc<dyn DocumentSource>, view: ViewSender) -> Self {
        let (notice_tx, notice_rx) = notice_channel();
        Self {
            auth,
            remote,
            view,
            form: AuthForm::SignIn,
            auth_error: None,
            notice: None,
            notice_tx,
            notice_rx,
            store: None,
            subscription: None,
        }
    }

    /// Drive the gate until the command channel closes.
    ///
    /// This is one cooperative loop over session changes, subscription updates, store notices and user commands. The published view is never blocked on the network: renders happen before remote writes resolve.
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        let mut sessions = self.auth.session_states();
        let mut notices = self.notice_rx.clone();

        let initial = sessions.borrow_and_update().clone();
        self.apply_session(initial).await;
        self.render();

        loop {
            let event = {
                let remote = async {
                    match self.subscription.as_mut() {
                        None => std::future::pending().await,
                        Some(subscription) => match subscription.updates.changed().await {
                            Ok(()) => {
                                GateEvent::RemoteUpdate(subscription.updates.borrow_and_update().clone())
                            }
                            Err(_) => GateEvent::RemoteClosed,
                        },
                    }
                };
                tokio::pin!(remote);

                tokio::select! {
                    changed = sessions.changed() => match changed {
                        Ok(()) => GateEvent::SessionChanged,
                        Err(_) => break,
                    },
                    changed = notices.changed() => match changed {
                        Ok(()) => GateEvent::Notice,
                        Err(_) => break,
                    },
                    event = &mut remote => event,
                    command = commands.recv() => match command {
                        Some(command) => GateEvent::Command(command),
                        None => GateEvent::CommandsClosed,
                    },
                }
            };

            match event {
                GateEvent::SessionChanged => {
                    let state = sessions.borrow_and_update().clone();
                    self.apply_session(state).await;
                }
                GateEvent::RemoteUpdate(Some(document)) => {
                    log::debug!("The remote document changed, replacing the mirror");
                    match self.store.as_mut() {
                        None => log::warn!("Dropping a remote update that arrived while signed out"),
                        Some(store) => store.replace_from_remote(document),
                    }
                }
                GateEvent::RemoteUpdate(None) => {
                    log::debug!("The remote document does not exist yet, keeping the mirror");
                }
                GateEvent::RemoteClosed => {
                    log::warn!("The live subscription ended on the remote side");
                    self.subscription = None;
                }
                GateEvent::Notice => {
                    self.notice = notices.borrow_and_update().clone();
                }
                GateEvent::Command(command) => self.dispatch(command).await,
                GateEvent::CommandsClosed => break,
            }

            self.render();
        }
    }

    /// Apply one user command.
    /// Auth submissions are single attempts: an error is kept for the auth screen, never retried here.
    async fn dispatch(&mut self, command: Command) {
        match command {
            Command::ShowSignIn => {
                self.form = AuthForm::SignIn;
                self.auth_error = None;
            }
            Command::ShowSignUp => {
                self.form = AuthForm::SignUp;
                self.auth_error = None;
            }
            Command::SubmitSignIn { email, password } => {
                match self.auth.sign_in(&email, &password).await {
                    Ok(user) => {
                        log::info!("Signed in as {}", user);
                        self.auth_error = None;
                    }
                    Err(err) => {
                        log::info!("Sign-in refused: {}", err);
                        self.auth_error = Some(err);
                    }
                }
            }
            Command::SubmitSignUp { email, password } => {
                match self.auth.create_account(&email, &password).await {
                    Ok(user) => {
                        log::info!("Created an account for {}", user);
                        self.auth_error = None;
                    }
                    Err(err) => {
                        log::info!("Sign-up refused: {}", err);
                        self.auth_error = Some(err);
                    }
                }
            }
            Command::SignOut => self.auth.sign_out().await,
            Command::AddTask { text } => self.with_store(|store| {
                store.add_task(&text);
            }),
            Command::ToggleTask { id } => self.with_store(|store| {
                store.toggle_task(id);
            }),
            Command::DeleteTask { id } => self.with_store(|store| {
                store.delete_task(id);
            }),
            Command::SelectDate { date } => self.with_store(|store| {
                store.select_date(date);
            }),
        }
    }

    fn with_store(&mut self, apply: impl FnOnce(&mut PlannerStore)) {
        match self.store.as_mut() {
            None => log::warn!("Ignoring a planner command while signed out"),
            Some(store) => apply(store),
        }
    }

    /// Switch the whole visible state over to the new session.
    /// The subscription lifecycle is paired with the session: acquired on sign-in, released on sign-out.
    async fn apply_session(&mut self, state: SessionState) {
        if let Some(subscription) = self.subscription.take() {
            log::debug!("Releasing the document subscription {}", subscription.id());
            self.remote.unsubscribe(subscription.id()).await;
        }

        match state {
            SessionState::SignedOut => {
                self.store = None;
                self.notice = None;
                self.form = AuthForm::SignIn;
            }
            SessionState::SignedIn(user) => {
                log::info!("Session opened for {}", user);
                self.auth_error = None;
                self.notice = None;

                let mut store =
                    PlannerStore::new(user.clone(), Arc::clone(&self.remote), self.notice_tx.clone());

                match self.remote.read_document(&user).await {
                    Ok(Some(document)) => store.replace_from_remote(document),
                    Ok(None) => log::info!("{} has no planner document yet", user),
                    Err(err) => {
                        log::warn!("Unable to load the planner of {}: {}", user, err);
                        self.notice = Some(err.to_string());
                    }
                }

                match self.remote.subscribe(&user).await {
                    Ok(subscription) => self.subscription = Some(subscription),
                    Err(err) => {
                        log::warn!("Unable to watch the planner of {}: {}", user, err);
                        self.notice = Some(err.to_string());
                    }
                }

                self.store = Some(store);
            }
        }
    }

    /// Publish a freshly built screen. Always a full replacement.
    fn render(&self) {
        let screen = match &self.store {
            None => Screen::Auth(AuthView {
                form: self.form,
                error: self.auth_error.as_ref().map(|err| err.to_string()),
            }),
            Some(store) => Screen::Planner(PlannerView::of(
                store.document(),
                store.selected_date(),
                self.notice.clone(),
            )),
        };

        if self.view.send(screen).is_err() {
            log::debug!("Nobody is watching the screen");
        }
    }
}
