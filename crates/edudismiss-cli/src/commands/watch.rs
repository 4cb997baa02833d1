use std::collections::HashSet;

use edudismiss_core::models::{Locale, StudentId};
use edudismiss_core::roster::{
    called_ids, find_by_id, gate_filter, newly_called, ClassroomFilter, GateQuery,
};
use edudismiss_core::{BoardSnapshot, Clock, SystemClock};

use crate::commands::common::{
    format_board_header, format_student_lines, load_session, open_board,
};
use crate::error::CliError;

const CLEAR_SCREEN: &str = "\x1B[2J\x1B[H";

/// Run the sync loop and redraw the gate board after every cycle.
pub async fn run_watch(endpoint: Option<String>, query: GateQuery) -> Result<(), CliError> {
    let session = load_session()?;
    let board = open_board(endpoint, &session)?;
    let mut cycles = board.subscribe();

    board.start().await;
    // Students already called at startup do not alert.
    let mut called: HashSet<StudentId> = called_ids(
        &board.snapshot().await.roster,
        &ClassroomFilter::default(),
        true,
    );
    loop {
        let snapshot = board.snapshot().await;
        let current = called_ids(&snapshot.roster, &ClassroomFilter::default(), true);
        let fresh = newly_called(&called, &current);
        print!("{CLEAR_SCREEN}");
        for line in render_watch(&snapshot, &query, session.locale, &fresh) {
            println!("{line}");
        }
        called = current;

        tokio::select! {
            changed = cycles.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    board.stop();
    Ok(())
}

pub fn render_watch(
    snapshot: &BoardSnapshot,
    query: &GateQuery,
    locale: Locale,
    fresh: &[StudentId],
) -> Vec<String> {
    let mut lines = format_board_header(snapshot);
    if !fresh.is_empty() {
        let names = fresh
            .iter()
            .filter_map(|id| find_by_id(&snapshot.roster, id.as_str()))
            .map(|student| student.display_name(locale).to_string())
            .collect::<Vec<_>>();
        lines.push(format!("\x07Newly called: {}", names.join(", ")));
    }
    lines.push(String::new());

    let students = gate_filter(&snapshot.roster, query);
    if students.is_empty() {
        lines.push("No students match the current filter.".to_string());
    }
    lines.extend(format_student_lines(&students, locale, SystemClock.now()));
    lines.push(String::new());
    lines.push("Press Ctrl-C to stop.".to_string());
    lines
}
