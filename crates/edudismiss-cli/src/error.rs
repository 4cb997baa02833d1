use std::io;

use edudismiss_core::auth::AuthError;
use edudismiss_core::CommandError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] edudismiss_core::Error),
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Student not found: {0}")]
    StudentNotFound(String),
    #[error("This command requires an admin session. Run `edudismiss login` first.")]
    AdminRequired,
    #[error("Remote store did not accept the change: {0}")]
    NotDelivered(String),
    #[error("Logo upload failed")]
    UploadFailed,
}
