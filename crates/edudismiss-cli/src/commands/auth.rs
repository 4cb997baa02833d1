use edudismiss_core::auth::authenticate;
use edudismiss_core::models::UserRole;

use crate::commands::common::{load_session, open_store, save_session};
use crate::error::CliError;

pub async fn run_login(
    endpoint: Option<String>,
    username: &str,
    password: &str,
) -> Result<(), CliError> {
    let mut session = load_session()?;
    let (store, _) = open_store(endpoint, &session)?;

    let user = authenticate(&store, username, password).await?;
    session.sign_in(&user);
    save_session(&session)?;

    let role = match user.role {
        UserRole::Admin => "admin",
        UserRole::User => "user",
    };
    println!("Signed in as {} ({role})", user.username);
    Ok(())
}

pub fn run_logout() -> Result<(), CliError> {
    let mut session = load_session()?;
    match session.sign_out() {
        Some(user) => {
            save_session(&session)?;
            println!("Signed out {}", user.username);
        }
        None => println!("No user is signed in."),
    }
    Ok(())
}
