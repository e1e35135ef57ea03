use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use sea_orm::sqlx::postgres::PgDatabaseError;
use sea_orm::{DbErr, RuntimeErr, SqlErr};
use thiserror::Error;

/// Message returned for failures whose detail stays in the server log
pub const INTERNAL_ERROR_MESSAGE: &str = "Unexpected error, check server logs for more details";

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("{0}")]
    NotFound(String),

    /// Unique constraint violation, carrying the database's detail
    #[error("{0}")]
    Conflict(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ProductResult<T> = Result<T, ProductError>;

impl ProductError {
    pub fn not_found_term(term: &str) -> Self {
        ProductError::NotFound(format!("Product with term {} not found", term))
    }

    pub fn not_found_id(id: uuid::Uuid) -> Self {
        ProductError::NotFound(format!("Product with id {} not found", id))
    }
}

/// DETAIL field of a Postgres error, e.g. `Key (title)=(Tee) already exists.`
fn pg_detail(err: &DbErr) -> Option<String> {
    let (DbErr::Exec(RuntimeErr::SqlxError(e)) | DbErr::Query(RuntimeErr::SqlxError(e))) = err
    else {
        return None;
    };

    e.as_database_error()?
        .try_downcast_ref::<PgDatabaseError>()?
        .detail()
        .map(str::to_string)
}

impl From<DbErr> for ProductError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(message)) => {
                ProductError::Conflict(pg_detail(&err).unwrap_or(message))
            }
            _ => ProductError::Database(err.to_string()),
        }
    }
}

/// Convert ProductError to AppError for standardized error responses
impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound(msg) => AppError::NotFound(msg),
            ProductError::Conflict(detail) => AppError::Conflict(detail),
            ProductError::Validation(msg) => AppError::BadRequest(msg),
            ProductError::Database(_) | ProductError::Internal(_) => {
                AppError::InternalServerError(INTERNAL_ERROR_MESSAGE.to_string())
            }
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_not_found_messages() {
        assert_eq!(
            ProductError::not_found_term("red-shirt").to_string(),
            "Product with term red-shirt not found"
        );
        let id = uuid::Uuid::nil();
        assert_eq!(
            ProductError::not_found_id(id).to_string(),
            format!("Product with id {} not found", id)
        );
    }

    #[test]
    fn test_plain_db_error_is_masked() {
        let err = ProductError::from(DbErr::Custom("relation does not exist".into()));
        assert!(matches!(err, ProductError::Database(ref m) if m.contains("relation")));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_detail_only_read_from_driver_errors() {
        assert_eq!(pg_detail(&DbErr::Custom("boom".into())), None);
        assert_eq!(pg_detail(&DbErr::RecordNotUpdated), None);
    }

    #[test]
    fn test_conflict_maps_to_409() {
        let response = ProductError::Conflict("Key (title)=(Tee) already exists.".into())
            .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_internal_message_is_generic() {
        match AppError::from(ProductError::Internal("pool timed out".into())) {
            AppError::InternalServerError(msg) => assert_eq!(msg, INTERNAL_ERROR_MESSAGE),
            other => panic!("unexpected {:?}", other),
        }
    }
}
