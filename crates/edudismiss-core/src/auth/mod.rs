//! Board login check against the remote user list.

use thiserror::Error;

use crate::models::AuthorizedUser;
use crate::store::RemoteStore;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Username and password must not be empty")]
    MissingCredentials,
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Check credentials against the store's user list.
///
/// The built-in credential is accepted first without touching the network,
/// so the board stays reachable when the user list is not.
pub async fn authenticate<S: RemoteStore>(
    store: &S,
    username: &str,
    password: &str,
) -> AuthResult<AuthorizedUser> {
    if username.trim().is_empty() || password.trim().is_empty() {
        return Err(AuthError::MissingCredentials);
    }

    let fallback = AuthorizedUser::fallback();
    if fallback.matches(username, password) {
        tracing::info!("Signed in with the built-in admin credential");
        return Ok(fallback);
    }

    store
        .list_authorized_users()
        .await
        .into_iter()
        .find(|user| user.matches(username, password))
        .inspect(|user| tracing::info!(username = %user.username, role = ?user.role, "Signed in"))
        .ok_or(AuthError::InvalidCredentials)
}
