//! Nutrition-log storage models. Logs are recorded one per user and day;
//! the `nutrition_logs` migration enforces the `(user_id, log_date)`
//! uniqueness. Aggregation over these records is out of scope; the models
//! exist so log back-references on users stay meaningful.

use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use time::Date;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodItemEntry {
    pub food_item_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalCarbohydrates {
    pub total_sugar: f64,
    pub total_fiber: f64,
    pub total_carbs: f64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct NutritionLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub log_date: Date,
    pub entries: Json<Vec<FoodItemEntry>>,
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_fat: f64,
    pub total_carbs: Json<TotalCarbohydrates>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn log_serializes_camel_case() {
        let log = NutritionLog {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            log_date: date!(2024 - 03 - 01),
            entries: Json(vec![FoodItemEntry {
                food_item_id: Uuid::new_v4(),
                quantity: 2,
            }]),
            total_calories: 778.0,
            total_protein: 33.8,
            total_fat: 13.8,
            total_carbs: Json(TotalCarbohydrates {
                total_sugar: 0.0,
                total_fiber: 21.2,
                total_carbs: 132.6,
            }),
            notes: Some("porridge day".into()),
        };
        let json = serde_json::to_value(&log).unwrap();
        assert_eq!(json["entries"][0]["quantity"], 2);
        assert_eq!(json["totalCarbs"]["totalFiber"], 21.2);
        assert_eq!(json["notes"], "porridge day");
    }
}
