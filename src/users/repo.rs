use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database. `password_hash` is never serialized; the
/// role-aware projection in [`crate::users::sanitize`] is still required
/// before a record leaves the service.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub roles: Vec<String>,
    pub food_item_ids: Vec<Uuid>,
    pub nutrition_log_ids: Vec<Uuid>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

const USER_COLUMNS: &str = "id, username, email, password_hash, first_name, last_name, \
     roles, food_item_ids, nutrition_log_ids, created_at, updated_at";

impl User {
    /// Find a user by exact username match.
    pub async fn find_by_username(db: &PgPool, username: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(db)
        .await
    }

    /// Insert a new user row. Raw sqlx error is kept so callers can map a
    /// unique violation on `username` to the conflict error.
    pub async fn insert(db: &PgPool, user: &User) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users
                (id, username, email, password_hash, first_name, last_name,
                 roles, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.roles)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(db)
        .await
    }

    /// Persist the mutable profile fields of an existing user.
    pub async fn save_profile(db: &PgPool, user: &User) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET email = $2, first_name = $3, last_name = $4,
                password_hash = $5, updated_at = $6
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(user.updated_at)
        .fetch_one(db)
        .await
    }

    /// Record a food-item back-reference on its creator.
    pub async fn append_food_item_ref(
        db: &PgPool,
        user_id: Uuid,
        item_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET food_item_ids = array_append(food_item_ids, $2) WHERE id = $1",
        )
        .bind(user_id)
        .bind(item_id)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Drop a food-item back-reference wherever it appears.
    pub async fn remove_food_item_ref(db: &PgPool, item_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET food_item_ids = array_remove(food_item_ids, $1) \
             WHERE $1 = ANY(food_item_ids)",
        )
        .bind(item_id)
        .execute(db)
        .await?;
        Ok(())
    }
}
