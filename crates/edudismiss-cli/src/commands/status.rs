use edudismiss_core::models::StudentStatus;
use edudismiss_core::roster::find_by_id;

use crate::commands::common::{ensure_delivered, load_session, synced_board};
use crate::error::CliError;

pub async fn run_status(
    endpoint: Option<String>,
    id: &str,
    status: StudentStatus,
) -> Result<(), CliError> {
    let session = load_session()?;
    let board = synced_board(endpoint, &session).await?;

    let snapshot = board.snapshot().await;
    let student = find_by_id(&snapshot.roster, id)
        .cloned()
        .ok_or_else(|| CliError::StudentNotFound(id.trim().to_string()))?;

    let pending = board.request_status_change(&student.id, status).await?;
    ensure_delivered(pending.wait().await)?;

    println!(
        "{} ({}) is now {}",
        student.display_name(session.locale),
        student.id,
        status
    );
    Ok(())
}
