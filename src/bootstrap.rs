use tracing::info;

use crate::error::AppError;
use crate::state::AppState;
use crate::users::repo::User;
use crate::users::services::{register_user, NewUser};
use crate::users::{ROLE_ADMIN, ROLE_USER};

/// Seeds the default admin and demo accounts from the configured
/// credentials, skipping any account that already exists or whose
/// credentials are unset.
pub async fn seed_default_users(state: &AppState) -> anyhow::Result<()> {
    let bootstrap = &state.config.bootstrap;

    if let (Some(username), Some(password)) = (
        bootstrap.admin_username.as_deref(),
        bootstrap.admin_password.as_deref(),
    ) {
        seed_user(
            state,
            username,
            password,
            "Admin",
            vec![ROLE_ADMIN.to_string(), ROLE_USER.to_string()],
        )
        .await?;
    }

    if let (Some(username), Some(password)) = (
        bootstrap.demo_username.as_deref(),
        bootstrap.demo_password.as_deref(),
    ) {
        seed_user(state, username, password, "User", vec![ROLE_USER.to_string()]).await?;
    }

    Ok(())
}

async fn seed_user(
    state: &AppState,
    username: &str,
    password: &str,
    display_name: &str,
    roles: Vec<String>,
) -> anyhow::Result<()> {
    if User::find_by_username(&state.db, username).await?.is_some() {
        return Ok(());
    }

    info!(%username, "seeding default account");
    let candidate = NewUser {
        username: username.to_string(),
        password: password.to_string(),
        email: None,
        first_name: Some(display_name.to_string()),
        last_name: Some(display_name.to_string()),
        roles,
    };
    match register_user(&state.db, candidate).await {
        Ok(_) => Ok(()),
        // Another instance seeded the same account first.
        Err(AppError::UsernameConflict) => Ok(()),
        Err(e) => Err(anyhow::anyhow!(e)),
    }
}
