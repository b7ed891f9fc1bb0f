use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

/// Domain errors raised by the service layer and translated to HTTP
/// status codes at the boundary.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Food item with id {0} not found")]
    FoodItemNotFound(Uuid),

    #[error("User not found with username {0}")]
    UserNotFound(String),

    #[error("Username already exists")]
    UsernameConflict,

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("Access denied")]
    Forbidden,

    #[error("database error")]
    Database(#[from] sqlx::Error),

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::FoodItemNotFound(_) | AppError::UserNotFound(_) => StatusCode::NOT_FOUND,
            AppError::UsernameConflict | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "internal error");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, body).into_response()
    }
}

/// True for Postgres unique-constraint violations (SQLSTATE 23505); the
/// storage-level backstop behind the check-then-write uniqueness pattern.
pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(
        e,
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505")
    )
}

/// Builds a database error carrying the given SQLSTATE code, standing in
/// for a driver error in tests.
#[cfg(test)]
pub(crate) fn stub_db_error(code: &'static str) -> sqlx::Error {
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;

    #[derive(Debug)]
    struct StubDbError(&'static str);

    impl std::fmt::Display for StubDbError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "database error with SQLSTATE {}", self.0)
        }
    }

    impl std::error::Error for StubDbError {}

    impl DatabaseError for StubDbError {
        fn message(&self) -> &str {
            "constraint violation"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(self.0))
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            if self.0 == "23505" {
                ErrorKind::UniqueViolation
            } else {
                ErrorKind::Other
            }
        }
    }

    sqlx::Error::Database(Box::new(StubDbError(code)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_detects_sqlstate_23505() {
        assert!(is_unique_violation(&stub_db_error("23505")));
        assert!(!is_unique_violation(&stub_db_error("23503")));
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }

    #[test]
    fn username_conflict_message() {
        assert_eq!(AppError::UsernameConflict.to_string(), "Username already exists");
    }

    #[test]
    fn not_found_maps_to_404() {
        let resp = AppError::UserNotFound("ghost".into()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn conflict_maps_to_409() {
        let resp = AppError::UsernameConflict.into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn internal_is_opaque() {
        let resp = AppError::Internal(anyhow::anyhow!("secret detail")).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
