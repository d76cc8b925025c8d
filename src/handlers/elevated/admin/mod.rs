// handlers/elevated/admin/mod.rs - admin dashboard handlers

pub mod creators;
pub mod music;
pub mod stats;
pub mod taxonomy;
pub mod users;
pub mod videos;

use serde_json::json;

use crate::database::execute;
use crate::error::ApiError;
use crate::filter::SqlResult;

/// Physical delete by id. `table` is always a literal from this module.
pub(crate) async fn delete_row(pool: &sqlx::PgPool, table: &str, id: i64, what: &str) -> Result<(), ApiError> {
    let sql = SqlResult::new(format!("DELETE FROM {} WHERE id = $1", table), vec![json!(id)]);
    match execute(pool, &sql).await? {
        0 => Err(ApiError::not_found(format!("{} not found", what))),
        _ => {
            tracing::info!("Admin deleted {} {}", table, id);
            Ok(())
        }
    }
}
