use edudismiss_core::roster::RosterStats;

use crate::commands::common::{ensure_delivered, load_session, open_board, require_admin};
use crate::error::CliError;

pub async fn run_reset_all(endpoint: Option<String>) -> Result<(), CliError> {
    let session = load_session()?;
    require_admin(&session)?;

    let board = open_board(endpoint, &session)?;
    let (delivery, _) = board.reset_all().await;
    ensure_delivered(delivery)?;

    let stats = RosterStats::from_roster(&board.snapshot().await.roster);
    println!(
        "Reset complete: {} of {} students in class",
        stats.in_class, stats.total
    );
    Ok(())
}
