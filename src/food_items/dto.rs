use serde::Deserialize;

use crate::error::AppError;
use crate::food_items::repo::Nutrients;
use crate::food_items::sort::SortDirection;

/// Body for the create-or-update endpoints. The name is the merge key.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertFoodItemRequest {
    pub name: String,
    pub nutrients: Nutrients,
}

impl UpsertFoodItemRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("Food item name must not be empty".into()));
        }
        validate_nutrients(&self.nutrients)
    }
}

/// Partial update addressed by id; absent fields keep the stored values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodItemPatch {
    pub name: Option<String>,
    pub nutrients: Option<Nutrients>,
}

impl FoodItemPatch {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(AppError::Validation("Food item name must not be empty".into()));
            }
        }
        if let Some(nutrients) = &self.nutrients {
            validate_nutrients(nutrients)?;
        }
        Ok(())
    }
}

fn validate_nutrients(n: &Nutrients) -> Result<(), AppError> {
    let values = [
        ("calories", n.calories),
        ("protein", n.protein),
        ("fat", n.fat),
        ("sugar", n.carbohydrates.sugar),
        ("fiber", n.carbohydrates.fiber),
        ("carbsTotal", n.carbohydrates.carbs_total),
    ];
    for (field, value) in values {
        if !value.is_finite() || value < 0.0 {
            return Err(AppError::Validation(format!(
                "Nutrient value for {field} must be a non-negative number"
            )));
        }
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    #[serde(default)]
    pub direction: SortDirection,
}

fn default_sort_by() -> String {
    "name".into()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub search_term: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::food_items::repo::Carbohydrates;

    fn nutrients() -> Nutrients {
        Nutrients {
            calories: 389.0,
            protein: 16.9,
            fat: 6.9,
            carbohydrates: Carbohydrates {
                sugar: 0.0,
                fiber: 10.6,
                carbs_total: 66.3,
            },
        }
    }

    #[test]
    fn valid_request_passes() {
        let req = UpsertFoodItemRequest {
            name: "Oats".into(),
            nutrients: nutrients(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn blank_name_is_rejected() {
        let req = UpsertFoodItemRequest {
            name: "   ".into(),
            nutrients: nutrients(),
        };
        assert!(matches!(req.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn negative_nutrient_is_rejected() {
        let mut n = nutrients();
        n.carbohydrates.fiber = -1.0;
        let req = UpsertFoodItemRequest {
            name: "Oats".into(),
            nutrients: n,
        };
        assert!(matches!(req.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn non_finite_nutrient_is_rejected() {
        let mut n = nutrients();
        n.calories = f64::NAN;
        let req = UpsertFoodItemRequest {
            name: "Oats".into(),
            nutrients: n,
        };
        assert!(matches!(req.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn empty_patch_is_valid() {
        assert!(FoodItemPatch::default().validate().is_ok());
    }

    #[test]
    fn patch_with_blank_name_is_rejected() {
        let patch = FoodItemPatch {
            name: Some("".into()),
            nutrients: None,
        };
        assert!(matches!(patch.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn list_query_defaults() {
        let q: ListQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.sort_by, "name");
        assert_eq!(q.direction, SortDirection::Asc);
    }

    #[test]
    fn search_query_uses_camel_case_param() {
        let q: SearchQuery = serde_json::from_str(r#"{"searchTerm":"oa"}"#).unwrap();
        assert_eq!(q.search_term, "oa");
    }
}
