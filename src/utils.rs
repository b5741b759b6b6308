///! Some utility functions

use std::io::{stdin, stdout, Read, Write};

use chrono::{Local, NaiveDate};

use crate::view::{PlannerView, Screen, TaskLine};

/// Today, in the invoking process's local time zone.
/// The "today" filter compares plain calendar dates, so this is the only place the time zone matters.
pub fn today_local() -> NaiveDate {
    Local::now().date_naive()
}

/// A debug utility that pretty-prints the current screen
pub fn print_screen(screen: &Screen) {
    match screen {
        Screen::Auth(auth) => {
            println!("AUTH {:?} form", auth.form);
            if let Some(error) = &auth.error {
                println!("    ! {}", error);
            }
        }
        Screen::Planner(planner) => print_planner(planner),
    }
}

/// A debug utility that pretty-prints the planner screen
pub fn print_planner(planner: &PlannerView) {
    println!(
        "PLANNER {} ({} total, {} completed)",
        planner.selected_date, planner.total_count, planner.completed_count
    );
    for line in &planner.today {
        print_task(line);
    }
    if let Some(notice) = &planner.notice {
        println!("    ! {}", notice);
    }
}

pub fn print_task(line: &TaskLine) {
    let completion = if line.completed { "✓" } else { " " };
    println!("    {} {}\t{}", completion, line.text, line.id);
}

/// Wait for the user to press enter
pub fn pause() {
    let mut stdout = stdout();
    stdout.write_all(b"Press Enter to continue...").unwrap();
    stdout.flush().unwrap();
    stdin().read_exact(&mut [0]).unwrap();
}
