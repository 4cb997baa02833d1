use edudismiss_core::models::Locale;
use edudismiss_core::util::normalize_endpoint;
use edudismiss_core::{CycleOutcome, SyncSource};

use crate::cli::ConfigCommands;
use crate::commands::common::{load_session, open_board, save_session};
use crate::error::CliError;

pub async fn run_config(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::SetEndpoint { url } => run_set_endpoint(&url).await,
        ConfigCommands::SetLocale { locale } => run_set_locale(locale.into()),
    }
}

/// Save the endpoint, then point a board at it and sync once to check it.
pub async fn run_set_endpoint(url: &str) -> Result<(), CliError> {
    let endpoint = normalize_endpoint(url)?;
    let mut session = load_session()?;
    let board = open_board(None, &session)?;

    session.endpoint_url = Some(endpoint.clone());
    save_session(&session)?;
    println!("Endpoint saved: {endpoint}");

    match board.set_endpoint(&endpoint).await? {
        CycleOutcome::Finished(report) if report.source == SyncSource::Live => {
            println!("Remote store reachable");
        }
        _ => eprintln!("Warning: remote store did not answer; the endpoint was saved anyway"),
    }
    Ok(())
}

pub fn run_set_locale(locale: Locale) -> Result<(), CliError> {
    let mut session = load_session()?;
    session.locale = locale;
    save_session(&session)?;
    println!("Locale set to {}", locale_label(locale));
    Ok(())
}

pub const fn locale_label(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "English",
        Locale::Ar => "Arabic",
    }
}
