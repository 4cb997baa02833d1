//! EduDismiss CLI - School dismissal board from the terminal
//!
//! Gate staff follow the live board and move students through dismissal;
//! admins also manage the board settings.

mod cli;
mod commands;
mod error;
mod session_store;

use clap::Parser;
use edudismiss_core::models::StudentStatus;
use edudismiss_core::roster::GateQuery;

use crate::cli::{Cli, Commands};
use crate::commands::auth::{run_login, run_logout};
use crate::commands::board::run_board;
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::reset::run_reset_all;
use crate::commands::settings::run_settings;
use crate::commands::status::run_status;
use crate::commands::upload::run_upload_logo;
use crate::commands::watch::run_watch;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("edudismiss=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let endpoint = cli.endpoint;

    match cli.command {
        Commands::Watch {
            section,
            status,
            search,
        } => {
            let query = GateQuery {
                search,
                section: section.map(Into::into),
                status: status.map(Into::into),
            };
            run_watch(endpoint, query).await?;
        }
        Commands::Board { json } => run_board(endpoint, json).await?,
        Commands::Call { id } => run_status(endpoint, &id, StudentStatus::Called).await?,
        Commands::OnTheWay { id } => run_status(endpoint, &id, StudentStatus::OnTheWay).await?,
        Commands::Dismiss { id } => run_status(endpoint, &id, StudentStatus::Dismissed).await?,
        Commands::ResetStatus { id } => run_status(endpoint, &id, StudentStatus::InClass).await?,
        Commands::Login { username, password } => {
            run_login(endpoint, &username, &password).await?;
        }
        Commands::Logout => run_logout()?,
        Commands::Settings { command } => run_settings(endpoint, command).await?,
        Commands::UploadLogo { path } => run_upload_logo(endpoint, &path).await?,
        Commands::ResetAll => run_reset_all(endpoint).await?,
        Commands::Config { command } => run_config(command).await?,
        Commands::Completions { shell, output } => {
            run_completions(shell, output.as_deref())?;
        }
    }

    Ok(())
}
