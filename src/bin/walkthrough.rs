//! This is an example of how corkboard can be used
//!
//! It runs against the in-process [`MemoryRemote`](corkboard::memory::MemoryRemote) backend, so there is nothing to configure. To talk to a hosted project instead, build a [`client::Client`](corkboard::client::Client) from your [`ProjectResource`](corkboard::resource::ProjectResource) and hand that to the gate; everything below stays the same.

use std::sync::Arc;

use tokio::sync::mpsc;

use corkboard::memory::MemoryRemote;
use corkboard::traits::{AuthSource, DocumentSource};
use corkboard::utils::{pause, print_screen};
use corkboard::view::view_channel;
use corkboard::{Command, PlannerDocument, SessionGate, Task};

async fn show(view: &tokio::sync::watch::Receiver<corkboard::view::Screen>) {
    // Give the gate a beat to process what we just sent
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    print_screen(&view.borrow());
}

#[tokio::main]
async fn main() {
    env_logger::init();

    println!("This example shows a whole planner session against an in-memory backend.");
    println!("You can set the RUST_LOG environment variable to display more info about what the gate does.");
    println!();
    pause();

    let remote = Arc::new(MemoryRemote::new());
    let auth: Arc<dyn AuthSource> = remote.clone();
    let store: Arc<dyn DocumentSource> = remote.clone();

    let (view_tx, view_rx) = view_channel();
    let (commands, commands_rx) = mpsc::channel(16);
    let gate = SessionGate::new(auth, store, view_tx);
    let gate_task = tokio::spawn(gate.run(commands_rx));

    println!("\nSigning in before creating an account fails, and the message is shown on the auth screen:");
    commands
        .send(Command::SubmitSignIn {
            email: "ada@example.com".to_string(),
            password: "hunter22".to_string(),
        })
        .await
        .unwrap();
    show(&view_rx).await;
    pause();

    println!("\nSo we switch to the sign-up form and create the account:");
    commands.send(Command::ShowSignUp).await.unwrap();
    commands
        .send(Command::SubmitSignUp {
            email: "ada@example.com".to_string(),
            password: "hunter22".to_string(),
        })
        .await
        .unwrap();
    show(&view_rx).await;
    pause();

    println!("\nNow, we'll add a task and check it off.");
    commands
        .send(Command::AddTask {
            text: "Finish essay".to_string(),
        })
        .await
        .unwrap();
    show(&view_rx).await;

    let task_id = match &*view_rx.borrow() {
        corkboard::view::Screen::Planner(planner) => planner.today[0].id,
        _ => unreachable!("we are signed in"),
    };
    commands.send(Command::ToggleTask { id: task_id }).await.unwrap();
    show(&view_rx).await;
    pause();

    println!("\nA write from another device overwrites the whole document, and the live subscription picks it up:");
    let user = remote.sign_in("ada@example.com", "hunter22").await.unwrap();
    let mut other_device = PlannerDocument::default();
    other_device.push_task(Task::new(
        "Pushed from the library computer".to_string(),
        corkboard::utils::today_local(),
    ));
    other_device.touch();
    remote.write_document(&user, &other_device).await.unwrap();
    show(&view_rx).await;
    pause();

    println!("\nSigning out releases the subscription and brings the auth screen back:");
    commands.send(Command::SignOut).await.unwrap();
    show(&view_rx).await;
    println!("Active watchers left on the backend: {}", remote.active_watchers());

    drop(commands);
    let _ = gate_task.await;
    println!("Done.");
}
