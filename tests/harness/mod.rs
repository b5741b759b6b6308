//! Helpers shared by the integration tests: a gate wired to an in-memory backend, and a way to wait for a screen

// Not every test file uses every helper
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use corkboard::memory::MemoryRemote;
use corkboard::traits::{AuthSource, DocumentSource};
use corkboard::view::{view_channel, Screen, ViewReceiver};
use corkboard::{Command, SessionGate};

pub const EMAIL: &str = "ada@example.com";
pub const PASSWORD: &str = "hunter22";

/// Spawn a gate over the given backend. Returns the command sender, the screen receiver, and the running gate.
pub fn start_gate(
    remote: &Arc<MemoryRemote>,
) -> (mpsc::Sender<Command>, ViewReceiver, JoinHandle<()>) {
    let auth: Arc<dyn AuthSource> = remote.clone();
    let documents: Arc<dyn DocumentSource> = remote.clone();

    let (view_tx, view_rx) = view_channel();
    let (command_tx, command_rx) = mpsc::channel(16);
    let gate = SessionGate::new(auth, documents, view_tx);
    let running = tokio::spawn(gate.run(command_rx));

    (command_tx, view_rx, running)
}

/// Wait (bounded) until the published screen satisfies the predicate, and return it
pub async fn wait_for<F>(view: &mut ViewReceiver, descr: &str, predicate: F) -> Screen
where
    F: Fn(&Screen) -> bool,
{
    let result = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if predicate(&view.borrow()) {
                return view.borrow().clone();
            }
            view.changed()
                .await
                .expect("the gate stopped publishing screens");
        }
    })
    .await;

    match result {
        Ok(screen) => screen,
        Err(_) => panic!("Timed out waiting for: {}", descr),
    }
}

/// Create the test account through the gate and wait for the planner screen
pub async fn sign_up(commands: &mpsc::Sender<Command>, view: &mut ViewReceiver) {
    commands.send(Command::ShowSignUp).await.unwrap();
    commands
        .send(Command::SubmitSignUp {
            email: EMAIL.to_string(),
            password: PASSWORD.to_string(),
        })
        .await
        .unwrap();

    wait_for(view, "the planner screen after sign-up", |screen| {
        matches!(screen, Screen::Planner(_))
    })
    .await;
}
