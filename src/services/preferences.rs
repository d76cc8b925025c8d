use serde_json::{json, Value};
use sqlx::PgPool;

use super::ServiceError;
use crate::database::{apply_update, execute, fetch_one_json, fetch_scalar, UpdateOutcome};
use crate::filter::SqlResult;
use crate::update::PreferencesPatch;

fn ensure_sql(user_id: i64) -> SqlResult {
    SqlResult::new(
        "INSERT INTO user_preferences (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING",
        vec![json!(user_id)],
    )
}

pub struct PreferenceService {
    pool: PgPool,
}

impl PreferenceService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Stored row, created with defaults on first access
    pub async fn get(&self, user_id: i64) -> Result<Value, ServiceError> {
        execute(&self.pool, &ensure_sql(user_id)).await?;
        let sql = SqlResult::new("SELECT * FROM user_preferences WHERE user_id = $1", vec![json!(user_id)]);
        Ok(fetch_one_json(&self.pool, &sql, "Preferences").await?)
    }

    pub async fn update(&self, user_id: i64, patch: &PreferencesPatch) -> Result<UpdateOutcome, ServiceError> {
        let mut tx = self.pool.begin().await?;
        execute(&mut *tx, &ensure_sql(user_id)).await?;
        let outcome = apply_update(&mut *tx, patch, user_id).await?;
        tx.commit().await?;
        Ok(outcome)
    }

    /// Language used to narrow the default catalog listing, if any
    pub async fn content_language(&self, user_id: i64) -> Result<Option<String>, ServiceError> {
        let sql = SqlResult::new(
            "SELECT content_language FROM user_preferences WHERE user_id = $1",
            vec![json!(user_id)],
        );
        Ok(fetch_scalar::<_, Option<String>>(&self.pool, &sql).await?.flatten())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_is_insert_if_absent() {
        let sql = ensure_sql(5);
        assert!(sql.query.ends_with("ON CONFLICT (user_id) DO NOTHING"));
        assert_eq!(sql.params, vec![json!(5)]);
    }
}
