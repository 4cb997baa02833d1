use std::path::Path;

use crate::commands::common::{load_session, require_admin, synced_board};
use crate::error::CliError;

pub async fn run_upload_logo(endpoint: Option<String>, path: &Path) -> Result<(), CliError> {
    let session = load_session()?;
    require_admin(&session)?;

    let bytes = tokio::fs::read(path).await?;
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| CliError::InvalidArgument(format!("{} has no file name", path.display())))?;

    let board = synced_board(endpoint, &session).await?;
    if board.snapshot().await.settings.drive_folder_id.is_empty() {
        tracing::warn!("No drive folder configured; the remote store picks its default folder");
    }

    let url = board
        .upload_logo(&bytes, filename)
        .await
        .ok_or(CliError::UploadFailed)?;
    println!("{url}");
    Ok(())
}
