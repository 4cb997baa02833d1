use edudismiss_core::models::{BrandingUpdate, DaySchedule, SettingField};

use crate::cli::SettingsCommands;
use crate::commands::common::{
    ensure_delivered, format_settings_lines, load_session, normalize_required,
    normalize_url_argument, parse_day, require_admin, synced_board, Board,
};
use crate::error::CliError;

pub async fn run_settings(
    endpoint: Option<String>,
    command: SettingsCommands,
) -> Result<(), CliError> {
    let session = load_session()?;
    if !matches!(command, SettingsCommands::Show { .. }) {
        require_admin(&session)?;
    }
    let board = synced_board(endpoint, &session).await?;

    match command {
        SettingsCommands::Show { json } => {
            let settings = board.snapshot().await.settings;
            if json {
                println!("{}", serde_json::to_string_pretty(&settings)?);
            } else {
                for line in format_settings_lines(&settings) {
                    println!("{line}");
                }
            }
        }
        SettingsCommands::ExamMode { state } => {
            ensure_delivered(board.set_exam_mode(state.is_on()).await.wait().await)?;
            println!(
                "Exam mode {}",
                if state.is_on() { "enabled" } else { "disabled" }
            );
        }
        SettingsCommands::SchoolName { name } => {
            let name = normalize_required(name, "School name")?;
            apply_branding(
                &board,
                SettingField::SchoolName,
                BrandingUpdate {
                    school_name: Some(name),
                    ..BrandingUpdate::default()
                },
            )
            .await?;
        }
        SettingsCommands::LogoUrl { url } => {
            let url = normalize_url_argument(&url)?;
            apply_branding(
                &board,
                SettingField::LogoUrl,
                BrandingUpdate {
                    logo_url: Some(url),
                    ..BrandingUpdate::default()
                },
            )
            .await?;
        }
        SettingsCommands::DriveFolder { folder_id } => {
            let folder_id = normalize_required(folder_id, "Drive folder id")?;
            apply_branding(
                &board,
                SettingField::DriveFolderId,
                BrandingUpdate {
                    drive_folder_id: Some(folder_id),
                    ..BrandingUpdate::default()
                },
            )
            .await?;
        }
        SettingsCommands::Schedule {
            day,
            start,
            end,
            state,
        } => {
            let day = parse_day(&day)?;
            let schedule = board.snapshot().await.settings.schedule.with_day(DaySchedule::new(
                day,
                start.trim(),
                end.trim(),
                state.is_on(),
            ));
            ensure_delivered(board.update_schedule(schedule).await?.wait().await)?;
            for line in format_settings_lines(&board.snapshot().await.settings)
                .into_iter()
                .skip_while(|line| line != "Schedule:")
            {
                println!("{line}");
            }
        }
    }

    Ok(())
}

async fn apply_branding(
    board: &Board,
    field: SettingField,
    update: BrandingUpdate,
) -> Result<(), CliError> {
    ensure_delivered(board.update_branding(update).await.wait().await)?;
    println!("Updated {field}");
    Ok(())
}
