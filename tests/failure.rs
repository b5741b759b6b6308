//! Tests of how storage failures surface, using mocked provider failures
#![cfg(feature = "failure_injection")]

mod harness;

use std::sync::Arc;

use corkboard::memory::MemoryRemote;
use corkboard::mock_behaviour::MockBehaviour;
use corkboard::view::Screen;
use corkboard::Command;

use harness::{sign_up, start_gate, wait_for};

#[tokio::test]
async fn a_failed_write_surfaces_a_notice_and_keeps_the_mirror() {
    let _ = env_logger::builder().is_test(true).try_init();

    let remote = Arc::new(MemoryRemote::new());
    let (commands, mut view, _running) = start_gate(&remote);
    sign_up(&commands, &mut view).await;

    remote.set_mock_behaviour(MockBehaviour {
        write_document_behaviour: (0, 1),
        ..MockBehaviour::default()
    });

    commands
        .send(Command::AddTask { text: "will not reach the server".to_string() })
        .await
        .unwrap();

    // The task is on screen immediately, and the failed background write becomes a notice
    let screen = wait_for(&mut view, "a notice about the failed save", |screen| {
        matches!(screen, Screen::Planner(planner)
            if planner.total_count == 1 && planner.notice.is_some())
    })
    .await;

    match screen {
        Screen::Planner(planner) => {
            let notice = planner.notice.unwrap();
            assert!(notice.contains("Saving the planner failed"), "got: {}", notice);
        }
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn a_failed_initial_read_still_shows_an_empty_planner() {
    let _ = env_logger::builder().is_test(true).try_init();

    let remote = Arc::new(MemoryRemote::new());
    remote.set_mock_behaviour(MockBehaviour {
        read_document_behaviour: (0, 1),
        ..MockBehaviour::default()
    });

    let (commands, mut view, _running) = start_gate(&remote);
    sign_up(&commands, &mut view).await;

    let screen = wait_for(&mut view, "the planner with a read notice", |screen| {
        matches!(screen, Screen::Planner(planner) if planner.notice.is_some())
    })
    .await;

    match screen {
        Screen::Planner(planner) => {
            assert_eq!(planner.total_count, 0);
            let notice = planner.notice.unwrap();
            assert!(notice.contains("Reading the planner failed"), "got: {}", notice);
        }
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn a_failed_subscribe_leaves_no_watcher_behind() {
    let _ = env_logger::builder().is_test(true).try_init();

    let remote = Arc::new(MemoryRemote::new());
    remote.set_mock_behaviour(MockBehaviour {
        subscribe_behaviour: (0, 1),
        ..MockBehaviour::default()
    });

    let (commands, mut view, _running) = start_gate(&remote);
    sign_up(&commands, &mut view).await;

    wait_for(&mut view, "the planner with a subscribe notice", |screen| {
        matches!(screen, Screen::Planner(planner) if planner.notice.is_some())
    })
    .await;
    assert_eq!(remote.active_watchers(), 0);
}
