use sqlx::{types::Json, PgPool};
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::error::{is_unique_violation, AppError};
use crate::food_items::dto::{FoodItemPatch, UpsertFoodItemRequest};
use crate::food_items::repo::{FoodItem, Nutrients};
use crate::food_items::sort::{self, SortDirection};
use crate::users::repo::User;

/// Creates a food item, or updates the one already stored under the same
/// case-insensitive name. An update replaces only the nutrients; identity,
/// stored name casing and the owner back-reference are preserved.
pub async fn upsert(
    db: &PgPool,
    creator_id: Uuid,
    req: UpsertFoodItemRequest,
) -> Result<FoodItem, AppError> {
    req.validate()?;
    info!(name = %req.name, "creating or updating food item");

    if let Some(existing) = FoodItem::find_by_name_ci(db, &req.name).await? {
        info!(name = %req.name, id = %existing.id, "food item already exists, updating");
        let merged = merge_into(existing, req.nutrients);
        return Ok(FoodItem::save(db, &merged).await?);
    }

    let candidate = FoodItem {
        id: Uuid::new_v4(),
        name: req.name,
        owner_id: Some(creator_id),
        nutrients: Json(req.nutrients),
        created_at: OffsetDateTime::now_utc(),
    };
    match FoodItem::insert(db, &candidate).await {
        Ok(stored) => {
            User::append_food_item_ref(db, creator_id, stored.id).await?;
            Ok(stored)
        }
        // A concurrent upsert with the same new name won the insert race.
        Err(e) if is_unique_violation(&e) => Err(AppError::Conflict(
            "Food item with this name already exists".into(),
        )),
        Err(e) => Err(e.into()),
    }
}

/// Applies [`upsert`] to each item in order. Items are independent: a
/// failure aborts the remainder but earlier items stay committed.
pub async fn upsert_bulk(
    db: &PgPool,
    creator_id: Uuid,
    requests: Vec<UpsertFoodItemRequest>,
) -> Result<Vec<FoodItem>, AppError> {
    let mut stored = Vec::with_capacity(requests.len());
    for req in requests {
        stored.push(upsert(db, creator_id, req).await?);
    }
    Ok(stored)
}

pub async fn get_food_item(db: &PgPool, id: Uuid) -> Result<FoodItem, AppError> {
    FoodItem::find_by_id(db, id)
        .await?
        .ok_or(AppError::FoodItemNotFound(id))
}

/// Id-addressed partial update: name and nutrients each overwrite the
/// stored value only when the patch supplies them.
pub async fn update_by_id(
    db: &PgPool,
    id: Uuid,
    patch: FoodItemPatch,
) -> Result<FoodItem, AppError> {
    patch.validate()?;
    let mut item = FoodItem::find_by_id(db, id)
        .await?
        .ok_or(AppError::FoodItemNotFound(id))?;
    apply_patch(&mut item, patch);
    info!(id = %item.id, name = %item.name, "updating food item");
    match FoodItem::save(db, &item).await {
        Ok(stored) => Ok(stored),
        // Renaming onto another item's name trips the lower(name) index.
        Err(e) if is_unique_violation(&e) => Err(AppError::Conflict(
            "Food item with this name already exists".into(),
        )),
        Err(e) => Err(e.into()),
    }
}

pub async fn delete_by_id(db: &PgPool, id: Uuid) -> Result<(), AppError> {
    let removed = FoodItem::delete(db, id).await?;
    if !removed {
        return Err(AppError::FoodItemNotFound(id));
    }
    User::remove_food_item_ref(db, id).await?;
    info!(%id, "deleted food item");
    Ok(())
}

pub async fn search(db: &PgPool, term: &str) -> Result<Vec<FoodItem>, AppError> {
    Ok(FoodItem::search(db, term).await?)
}

pub async fn list_sorted(
    db: &PgPool,
    sort_by: &str,
    direction: SortDirection,
) -> Result<Vec<FoodItem>, AppError> {
    let order_expr = sort::resolve(sort_by)?;
    Ok(FoodItem::list_sorted(db, order_expr, direction).await?)
}

/// Merge decision for the name-keyed upsert: keep the existing record's
/// identity and fields, replace the nutrient profile.
fn merge_into(existing: FoodItem, nutrients: Nutrients) -> FoodItem {
    FoodItem {
        nutrients: Json(nutrients),
        ..existing
    }
}

fn apply_patch(item: &mut FoodItem, patch: FoodItemPatch) {
    if let Some(name) = patch.name {
        item.name = name;
    }
    if let Some(nutrients) = patch.nutrients {
        item.nutrients = Json(nutrients);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::food_items::repo::Carbohydrates;

    fn nutrients(calories: f64) -> Nutrients {
        Nutrients {
            calories,
            protein: 16.9,
            fat: 6.9,
            carbohydrates: Carbohydrates {
                sugar: 0.0,
                fiber: 10.6,
                carbs_total: 66.3,
            },
        }
    }

    fn stored_item() -> FoodItem {
        FoodItem {
            id: Uuid::new_v4(),
            name: "Oats".into(),
            owner_id: Some(Uuid::new_v4()),
            nutrients: Json(nutrients(389.0)),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn merge_reuses_identity_and_replaces_nutrients() {
        let existing = stored_item();
        let id = existing.id;
        let owner = existing.owner_id;

        let merged = merge_into(existing, nutrients(400.0));

        assert_eq!(merged.id, id);
        assert_eq!(merged.name, "Oats");
        assert_eq!(merged.owner_id, owner);
        assert_eq!(merged.nutrients.calories, 400.0);
    }

    #[test]
    fn patch_with_only_nutrients_keeps_name() {
        let mut item = stored_item();
        apply_patch(
            &mut item,
            FoodItemPatch {
                name: None,
                nutrients: Some(nutrients(500.0)),
            },
        );
        assert_eq!(item.name, "Oats");
        assert_eq!(item.nutrients.calories, 500.0);
    }

    #[test]
    fn patch_with_only_name_keeps_nutrients() {
        let mut item = stored_item();
        apply_patch(
            &mut item,
            FoodItemPatch {
                name: Some("Rolled Oats".into()),
                nutrients: None,
            },
        );
        assert_eq!(item.name, "Rolled Oats");
        assert_eq!(item.nutrients.calories, 389.0);
    }

    #[test]
    fn empty_patch_changes_nothing() {
        let mut item = stored_item();
        let before = item.clone();
        apply_patch(&mut item, FoodItemPatch::default());
        assert_eq!(item.name, before.name);
        assert_eq!(*item.nutrients, *before.nutrients);
    }
}
