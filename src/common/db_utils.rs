// src/common/db_utils.rs

use crate::common::error::AppError;

/// Converte violações de restrição que o cliente da API consegue provocar em
/// erros de domínio. O resto continua como `DatabaseError`.
pub(crate) fn map_constraint_error(
    e: sqlx::Error,
    on_unique: Option<AppError>,
    on_foreign_key: Option<AppError>,
) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            if let Some(err) = on_unique {
                return err;
            }
        }
        if db_err.is_foreign_key_violation() {
            if let Some(err) = on_foreign_key {
                return err;
            }
        }
    }
    AppError::DatabaseError(e)
}
