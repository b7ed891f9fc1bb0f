use serde::Deserialize;

use crate::error::AppError;

/// Maps a public sort field name to the expression the query layer orders
/// by. Carbohydrate fields live one level deeper in the nutrient document,
/// so `fiber`, `sugar` and `carbsTotal` are aliases into that sub-path;
/// `name` is a bare column. Unknown fields are rejected instead of
/// silently producing an empty sort key.
pub fn resolve(field: &str) -> Result<&'static str, AppError> {
    match field {
        "name" => Ok("name"),
        "fiber" => Ok("nutrients->'carbohydrates'->'fiber'"),
        "sugar" => Ok("nutrients->'carbohydrates'->'sugar'"),
        "carbsTotal" => Ok("nutrients->'carbohydrates'->'carbsTotal'"),
        "calories" => Ok("nutrients->'calories'"),
        "protein" => Ok("nutrients->'protein'"),
        "fat" => Ok("nutrients->'fat'"),
        other => Err(AppError::Validation(format!(
            "Unknown sort field: {other}"
        ))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum SortDirection {
    #[default]
    #[serde(rename = "ASC", alias = "asc")]
    Asc,
    #[serde(rename = "DESC", alias = "desc")]
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carbohydrate_aliases_resolve_under_the_sub_path() {
        assert_eq!(resolve("fiber").unwrap(), "nutrients->'carbohydrates'->'fiber'");
        assert_eq!(resolve("sugar").unwrap(), "nutrients->'carbohydrates'->'sugar'");
        assert_eq!(
            resolve("carbsTotal").unwrap(),
            "nutrients->'carbohydrates'->'carbsTotal'"
        );
    }

    #[test]
    fn name_is_the_bare_field() {
        assert_eq!(resolve("name").unwrap(), "name");
    }

    #[test]
    fn scalar_nutrients_resolve_under_the_nutrient_prefix() {
        assert_eq!(resolve("protein").unwrap(), "nutrients->'protein'");
        assert_eq!(resolve("calories").unwrap(), "nutrients->'calories'");
        assert_eq!(resolve("fat").unwrap(), "nutrients->'fat'");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = resolve("vitamins").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn direction_defaults_to_ascending() {
        assert_eq!(SortDirection::default(), SortDirection::Asc);
        assert_eq!(SortDirection::Asc.as_sql(), "ASC");
        assert_eq!(SortDirection::Desc.as_sql(), "DESC");
    }

    #[test]
    fn direction_parses_query_values() {
        #[derive(Deserialize)]
        struct Q {
            direction: SortDirection,
        }
        let q: Q = serde_json::from_str(r#"{"direction":"DESC"}"#).unwrap();
        assert_eq!(q.direction, SortDirection::Desc);
        let q: Q = serde_json::from_str(r#"{"direction":"asc"}"#).unwrap();
        assert_eq!(q.direction, SortDirection::Asc);
    }
}
