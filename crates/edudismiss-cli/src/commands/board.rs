use edudismiss_core::{Clock, SystemClock};

use crate::commands::common::{
    format_board_header, format_student_lines, load_session, synced_board,
};
use crate::error::CliError;

pub async fn run_board(endpoint: Option<String>, as_json: bool) -> Result<(), CliError> {
    let session = load_session()?;
    let board = synced_board(endpoint, &session).await?;
    let snapshot = board.snapshot().await;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    for line in format_board_header(&snapshot) {
        println!("{line}");
    }
    println!();
    let students = snapshot.roster.iter().collect::<Vec<_>>();
    if students.is_empty() {
        println!("No students on the roster.");
    }
    for line in format_student_lines(&students, session.locale, SystemClock.now()) {
        println!("{line}");
    }
    Ok(())
}
