use lazy_static::lazy_static;
use regex::Regex;
use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::password::hash_password;
use crate::error::{is_unique_violation, AppError};
use crate::users::dto::UpdateProfileRequest;
use crate::users::repo::User;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// A registration candidate. Handlers build this from [`RegisterRequest`]
/// with the default role; bootstrap seeding supplies its own role set.
#[derive(Debug)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub roles: Vec<String>,
}

/// Registers a new user: username must be free, the password is hashed
/// before anything touches the database. Returns the stored record
/// un-projected; callers sanitize before exposure.
pub async fn register_user(db: &PgPool, candidate: NewUser) -> Result<User, AppError> {
    let username = candidate.username.trim().to_string();
    if username.is_empty() {
        return Err(AppError::Validation("Username must not be empty".into()));
    }
    if candidate.password.len() < 8 {
        return Err(AppError::Validation("Password too short".into()));
    }
    let email = non_empty(candidate.email);
    if let Some(email) = email.as_deref() {
        if !is_valid_email(email) {
            return Err(AppError::Validation("Invalid email".into()));
        }
    }

    // Fast-path duplicate check; the unique index on username catches the
    // race where two registrations pass this simultaneously.
    if User::find_by_username(db, &username).await?.is_some() {
        warn!(username = %username, "username already exists");
        return Err(AppError::UsernameConflict);
    }

    let now = OffsetDateTime::now_utc();
    let user = User {
        id: Uuid::new_v4(),
        username,
        email,
        password_hash: hash_password(&candidate.password)?,
        first_name: non_empty(candidate.first_name),
        last_name: non_empty(candidate.last_name),
        roles: candidate.roles,
        food_item_ids: vec![],
        nutrition_log_ids: vec![],
        created_at: now,
        updated_at: now,
    };

    let stored = User::insert(db, &user).await.map_err(map_insert_error)?;

    info!(user_id = %stored.id, username = %stored.username, "user registered");
    Ok(stored)
}

/// Loads a user for profile display; the caller runs the result through
/// the sanitizer.
pub async fn get_user_profile(db: &PgPool, username: &str) -> Result<User, AppError> {
    User::find_by_username(db, username)
        .await?
        .ok_or_else(|| AppError::UserNotFound(username.to_string()))
}

/// Updates the profile of an existing user. Empty or absent patch fields
/// keep the stored values; a supplied password is re-hashed.
pub async fn update_profile(
    db: &PgPool,
    username: &str,
    patch: UpdateProfileRequest,
) -> Result<User, AppError> {
    let mut user = User::find_by_username(db, username)
        .await?
        .ok_or_else(|| {
            warn!(username = %username, "profile update for unknown user");
            AppError::UserNotFound(username.to_string())
        })?;

    if let Some(email) = patch.email.as_deref() {
        if !email.trim().is_empty() && !is_valid_email(email) {
            return Err(AppError::Validation("Invalid email".into()));
        }
    }

    let password_hash = match non_empty(patch.password.clone()) {
        Some(plain) => {
            if plain.len() < 8 {
                return Err(AppError::Validation("Password too short".into()));
            }
            Some(hash_password(&plain)?)
        }
        None => None,
    };

    apply_profile_patch(&mut user, patch, password_hash);
    user.updated_at = OffsetDateTime::now_utc();

    let stored = User::save_profile(db, &user).await?;
    info!(user_id = %stored.id, username = %stored.username, "profile updated");
    Ok(stored)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// A registration that lost the insert race still reports the duplicate
/// username; any other database failure passes through.
fn map_insert_error(e: sqlx::Error) -> AppError {
    if is_unique_violation(&e) {
        AppError::UsernameConflict
    } else {
        AppError::Database(e)
    }
}

/// Applies the non-empty fields of a profile patch onto the stored record.
fn apply_profile_patch(user: &mut User, patch: UpdateProfileRequest, password_hash: Option<String>) {
    if let Some(email) = non_empty(patch.email) {
        user.email = Some(email);
    }
    if let Some(first_name) = non_empty(patch.first_name) {
        user.first_name = Some(first_name);
    }
    if let Some(last_name) = non_empty(patch.last_name) {
        user.last_name = Some(last_name);
    }
    if let Some(hash) = password_hash {
        user.password_hash = hash;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::ROLE_USER;

    fn stored_user() -> User {
        let now = OffsetDateTime::now_utc();
        User {
            id: Uuid::new_v4(),
            username: "alice".into(),
            email: Some("alice@example.com".into()),
            password_hash: "old-hash".into(),
            first_name: Some("Alice".into()),
            last_name: Some("Example".into()),
            roles: vec![ROLE_USER.into()],
            food_item_ids: vec![],
            nutrition_log_ids: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn patch_applies_only_supplied_fields() {
        let mut user = stored_user();
        let patch = UpdateProfileRequest {
            email: Some("new@example.com".into()),
            first_name: None,
            last_name: None,
            password: None,
        };
        apply_profile_patch(&mut user, patch, None);
        assert_eq!(user.email.as_deref(), Some("new@example.com"));
        assert_eq!(user.first_name.as_deref(), Some("Alice"));
        assert_eq!(user.last_name.as_deref(), Some("Example"));
        assert_eq!(user.password_hash, "old-hash");
    }

    #[test]
    fn empty_strings_keep_stored_values() {
        let mut user = stored_user();
        let patch = UpdateProfileRequest {
            email: Some("".into()),
            first_name: Some("  ".into()),
            last_name: Some("Changed".into()),
            password: None,
        };
        apply_profile_patch(&mut user, patch, None);
        assert_eq!(user.email.as_deref(), Some("alice@example.com"));
        assert_eq!(user.first_name.as_deref(), Some("Alice"));
        assert_eq!(user.last_name.as_deref(), Some("Changed"));
    }

    #[test]
    fn supplied_password_hash_replaces_old_one() {
        let mut user = stored_user();
        apply_profile_patch(
            &mut user,
            UpdateProfileRequest::default(),
            Some("new-hash".into()),
        );
        assert_eq!(user.password_hash, "new-hash");
    }

    #[test]
    fn duplicate_username_insert_maps_to_conflict() {
        // Both registration paths end here: the pre-check catches an
        // existing username, and the unique index reports the race where
        // two concurrent registrations pass the pre-check together.
        let err = map_insert_error(crate::error::stub_db_error("23505"));
        assert!(matches!(err, AppError::UsernameConflict));
        assert_eq!(err.to_string(), "Username already exists");
    }

    #[test]
    fn other_insert_failures_are_not_conflicts() {
        let err = map_insert_error(crate::error::stub_db_error("42P01"));
        assert!(matches!(err, AppError::Database(_)));
    }

    #[test]
    fn email_validation_accepts_plausible_addresses() {
        assert!(is_valid_email("user@example.com"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a b@example.com"));
    }
}
