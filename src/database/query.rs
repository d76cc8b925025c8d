//! Executes composed [`SqlResult`]s.
//!
//! Resource documents are read as `row_to_json` so handlers can return them
//! unchanged. Every helper takes any executor: a pool or `&mut *tx`.

use serde_json::Value;
use sqlx::postgres::PgArguments;
use sqlx::{Arguments, Executor, Postgres};

use super::manager::DatabaseError;
use crate::filter::SqlResult;
use crate::update::PartialUpdate;

/// Bind each JSON parameter as its natural Postgres type
pub fn bind_params(params: &[Value]) -> PgArguments {
    let mut args = PgArguments::default();
    for value in params {
        match value {
            // Untyped: placeholders for non-text nullable columns need a cast
            Value::Null => args.add(Option::<String>::None),
            Value::Bool(b) => args.add(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    args.add(i)
                } else if let Some(f) = n.as_f64() {
                    args.add(f)
                } else {
                    args.add(n.to_string())
                }
            }
            Value::String(s) => args.add(s.clone()),
            Value::Array(_) | Value::Object(_) => args.add(sqlx::types::Json(value.clone())),
        }
    }
    args
}

fn as_documents(sql: &SqlResult) -> String {
    format!("SELECT row_to_json(t) AS doc FROM ({}) t", sql.query)
}

pub async fn fetch_all_json<'c, E>(executor: E, sql: &SqlResult) -> Result<Vec<Value>, DatabaseError>
where
    E: Executor<'c, Database = Postgres>,
{
    tracing::debug!(query = %sql.query, params = ?sql.params, "fetch_all");
    let query = as_documents(sql);
    let rows = sqlx::query_scalar_with::<_, Value, _>(&query, bind_params(&sql.params))
        .fetch_all(executor)
        .await?;
    Ok(rows)
}

pub async fn fetch_optional_json<'c, E>(executor: E, sql: &SqlResult) -> Result<Option<Value>, DatabaseError>
where
    E: Executor<'c, Database = Postgres>,
{
    tracing::debug!(query = %sql.query, params = ?sql.params, "fetch_optional");
    let query = as_documents(sql);
    let row = sqlx::query_scalar_with::<_, Value, _>(&query, bind_params(&sql.params))
        .fetch_optional(executor)
        .await?;
    Ok(row)
}

/// Like [`fetch_optional_json`], but a missing row is `NotFound(what)`
pub async fn fetch_one_json<'c, E>(executor: E, sql: &SqlResult, what: &str) -> Result<Value, DatabaseError>
where
    E: Executor<'c, Database = Postgres>,
{
    fetch_optional_json(executor, sql)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("{} not found", what)))
}

/// Single-column result, e.g. `COUNT(*)` or `RETURNING id`
pub async fn fetch_scalar<'c, E, T>(executor: E, sql: &SqlResult) -> Result<Option<T>, DatabaseError>
where
    E: Executor<'c, Database = Postgres>,
    T: Send + Unpin,
    (T,): for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow>,
{
    tracing::debug!(query = %sql.query, params = ?sql.params, "fetch_scalar");
    let value = sqlx::query_scalar_with::<_, T, _>(&sql.query, bind_params(&sql.params))
        .fetch_optional(executor)
        .await?;
    Ok(value)
}

pub async fn count<'c, E>(executor: E, sql: &SqlResult) -> Result<i64, DatabaseError>
where
    E: Executor<'c, Database = Postgres>,
{
    Ok(fetch_scalar::<_, i64>(executor, sql).await?.unwrap_or(0))
}

/// Runs a statement, returning rows affected
pub async fn execute<'c, E>(executor: E, sql: &SqlResult) -> Result<u64, DatabaseError>
where
    E: Executor<'c, Database = Postgres>,
{
    tracing::debug!(query = %sql.query, params = ?sql.params, "execute");
    let result = sqlx::query_with(&sql.query, bind_params(&sql.params))
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

/// Outcome of applying a sparse update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Nothing recognized in the body; no statement was issued
    NoChanges,
    Updated(u64),
}

/// Apply a patch to the row keyed by `key`. An empty patch issues no write;
/// a null for a NOT NULL column is refused before anything is sent.
pub async fn apply_update<'c, E, P>(executor: E, patch: &P, key: i64) -> Result<UpdateOutcome, DatabaseError>
where
    E: Executor<'c, Database = Postgres>,
    P: PartialUpdate,
{
    if let Some(column) = patch.cleared_required() {
        return Err(DatabaseError::RequiredField(column));
    }
    match patch.compose(key) {
        None => {
            tracing::debug!("No recognized fields for {} {}, skipping update", P::TABLE, key);
            Ok(UpdateOutcome::NoChanges)
        }
        Some(sql) => Ok(UpdateOutcome::Updated(execute(executor, &sql).await?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wraps_queries_as_documents() {
        let sql = SqlResult::new("SELECT * FROM videos v WHERE v.id = $1", vec![json!(1)]);
        assert_eq!(
            as_documents(&sql),
            "SELECT row_to_json(t) AS doc FROM (SELECT * FROM videos v WHERE v.id = $1) t"
        );
    }
}
