use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::food_items::sort::SortDirection;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Carbohydrates {
    pub sugar: f64,
    pub fiber: f64,
    pub carbs_total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nutrients {
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbohydrates: Carbohydrates,
}

/// Food item in the catalog. `name` is a natural secondary key: at most
/// one item exists per case-insensitive name. `owner_id` is a
/// back-reference to the user who added the item, not ownership.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FoodItem {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Option<Uuid>,
    pub nutrients: Json<Nutrients>,
    pub created_at: OffsetDateTime,
}

const ITEM_COLUMNS: &str = "id, name, owner_id, nutrients, created_at";

impl FoodItem {
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<FoodItem>, sqlx::Error> {
        sqlx::query_as::<_, FoodItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM food_items WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// Find an item whose name matches case-insensitively, so "Banana"
    /// and "banana" address the same record.
    pub async fn find_by_name_ci(db: &PgPool, name: &str) -> Result<Option<FoodItem>, sqlx::Error> {
        sqlx::query_as::<_, FoodItem>(&find_by_name_ci_sql())
            .bind(name)
            .fetch_optional(db)
            .await
    }

    /// Insert a new item. The raw sqlx error is kept so the service can map
    /// a lower(name) unique violation from a concurrent upsert.
    pub async fn insert(db: &PgPool, item: &FoodItem) -> Result<FoodItem, sqlx::Error> {
        sqlx::query_as::<_, FoodItem>(&format!(
            r#"
            INSERT INTO food_items (id, name, owner_id, nutrients, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(item.id)
        .bind(&item.name)
        .bind(item.owner_id)
        .bind(&item.nutrients)
        .bind(item.created_at)
        .fetch_one(db)
        .await
    }

    /// Persist name and nutrients of an existing item.
    pub async fn save(db: &PgPool, item: &FoodItem) -> Result<FoodItem, sqlx::Error> {
        sqlx::query_as::<_, FoodItem>(&format!(
            r#"
            UPDATE food_items
            SET name = $2, nutrients = $3
            WHERE id = $1
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(item.id)
        .bind(&item.name)
        .bind(&item.nutrients)
        .fetch_one(db)
        .await
    }

    /// Delete by id; true when a row was removed.
    pub async fn delete(db: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM food_items WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Case-insensitive substring search on name. Result order is
    /// unspecified.
    pub async fn search(db: &PgPool, term: &str) -> Result<Vec<FoodItem>, sqlx::Error> {
        let pattern = format!("%{}%", escape_like(term));
        sqlx::query_as::<_, FoodItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM food_items WHERE name ILIKE $1"
        ))
        .bind(pattern)
        .fetch_all(db)
        .await
    }

    /// List all items ordered by a resolved sort expression. `order_expr`
    /// must come from [`crate::food_items::sort::resolve`]; it is spliced
    /// into the statement and therefore never user-controlled.
    pub async fn list_sorted(
        db: &PgPool,
        order_expr: &str,
        direction: SortDirection,
    ) -> Result<Vec<FoodItem>, sqlx::Error> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM food_items ORDER BY {order_expr} {}",
            direction.as_sql()
        );
        sqlx::query_as::<_, FoodItem>(&sql).fetch_all(db).await
    }
}

/// The merge-key lookup. Folds case on both sides so the match agrees
/// with the case-insensitive unique index backing it.
fn find_by_name_ci_sql() -> String {
    format!("SELECT {ITEM_COLUMNS} FROM food_items WHERE lower(name) = lower($1)")
}

/// Escapes LIKE metacharacters so search terms match literally.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_lookup_folds_case_on_both_sides() {
        // Upserting "Banana" after "banana" must address the stored
        // record, not create a second one.
        let sql = find_by_name_ci_sql();
        assert!(sql.contains("lower(name) = lower($1)"), "sql was: {sql}");
    }

    #[test]
    fn name_uniqueness_backstop_folds_case() {
        // The index that catches concurrent upserts of the same new name
        // must fold case the same way the lookup does.
        let migration = include_str!("../../migrations/0002_create_food_items.sql");
        assert!(migration.contains("CREATE UNIQUE INDEX"));
        assert!(migration.contains("(lower(name))"));
    }

    #[test]
    fn escape_like_neutralizes_metacharacters() {
        assert_eq!(escape_like("oa"), "oa");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like(r"c\d"), r"c\\d");
    }

    #[test]
    fn food_item_serializes_camel_case_with_flat_nutrients() {
        let item = FoodItem {
            id: Uuid::new_v4(),
            name: "Oats".into(),
            owner_id: None,
            nutrients: Json(Nutrients {
                calories: 389.0,
                protein: 16.9,
                fat: 6.9,
                carbohydrates: Carbohydrates {
                    sugar: 0.0,
                    fiber: 10.6,
                    carbs_total: 66.3,
                },
            }),
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["name"], "Oats");
        assert_eq!(json["nutrients"]["calories"], 389.0);
        assert_eq!(json["nutrients"]["carbohydrates"]["carbsTotal"], 66.3);
        assert!(json["ownerId"].is_null());
    }
}
