use serde_json::{json, Value};
use sqlx::{PgConnection, PgPool};

use super::ServiceError;
use crate::database::{apply_update, execute, fetch_all_json, fetch_optional_json, fetch_scalar, UpdateOutcome};
use crate::filter::SqlResult;
use crate::update::CreatorProfilePatch;

/// Share granted to creators promoted by an admin
pub const DEFAULT_MONETIZATION_PERCENTAGE: f64 = 70.0;

fn profile_sql(user_id: i64) -> SqlResult {
    SqlResult::new("SELECT * FROM creator_profiles WHERE user_id = $1", vec![json!(user_id)])
}

fn default_profile_sql(user_id: i64, popular_name: &str) -> SqlResult {
    SqlResult::new(
        "INSERT INTO creator_profiles (user_id, popular_name, monetization_percentage) \
         VALUES ($1, $2, $3) ON CONFLICT (user_id) DO NOTHING",
        vec![json!(user_id), json!(popular_name), json!(DEFAULT_MONETIZATION_PERCENTAGE)],
    )
}

fn display_name(full_name: Option<&str>) -> &str {
    full_name.map(str::trim).filter(|n| !n.is_empty()).unwrap_or("Creator")
}

pub struct CreatorService {
    pool: PgPool,
}

impl CreatorService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A user becomes a creator by registering a public name
    pub async fn create_profile(&self, user_id: i64, popular_name: &str, bio: Option<&str>) -> Result<Value, ServiceError> {
        let popular_name = popular_name.trim();
        if popular_name.is_empty() {
            return Err(ServiceError::Invalid("Popular name is required".to_string()));
        }

        let mut tx = self.pool.begin().await?;

        let insert = SqlResult::new(
            "INSERT INTO creator_profiles (user_id, popular_name, bio) VALUES ($1, $2, $3) \
             ON CONFLICT (user_id) DO NOTHING",
            vec![json!(user_id), json!(popular_name), json!(bio.unwrap_or(""))],
        );
        if execute(&mut *tx, &insert).await? == 0 {
            return Err(ServiceError::Conflict("Creator profile already exists".to_string()));
        }

        let promote = SqlResult::new(
            "UPDATE users SET is_creator = 1, updated_at = NOW() WHERE id = $1",
            vec![json!(user_id)],
        );
        execute(&mut *tx, &promote).await?;

        let profile = fetch_optional_json(&mut *tx, &profile_sql(user_id))
            .await?
            .ok_or_else(|| ServiceError::NotFound("Creator profile not found".to_string()))?;

        tx.commit().await?;
        tracing::info!("User {} registered as creator {:?}", user_id, popular_name);
        Ok(profile)
    }

    pub async fn profile(&self, user_id: i64) -> Result<Option<Value>, ServiceError> {
        Ok(fetch_optional_json(&self.pool, &profile_sql(user_id)).await?)
    }

    pub async fn update_profile(&self, user_id: i64, patch: &CreatorProfilePatch) -> Result<UpdateOutcome, ServiceError> {
        match apply_update(&self.pool, patch, user_id).await? {
            UpdateOutcome::Updated(0) => Err(ServiceError::NotFound("Creator profile not found".to_string())),
            outcome => Ok(outcome),
        }
    }

    /// Gives a newly promoted creator a profile unless one exists. Runs on
    /// the caller's connection so it joins the promotion's transaction.
    pub async fn ensure_default_profile(conn: &mut PgConnection, user_id: i64) -> Result<bool, ServiceError> {
        let name = SqlResult::new("SELECT full_name FROM users WHERE id = $1", vec![json!(user_id)]);
        let full_name = fetch_scalar::<_, Option<String>>(&mut *conn, &name)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;

        let created = execute(&mut *conn, &default_profile_sql(user_id, display_name(full_name.as_deref()))).await?;
        if created > 0 {
            tracing::info!("Created default creator profile for user {}", user_id);
        }
        Ok(created > 0)
    }

    /// Most recent creators with their avatar
    pub async fn top(&self, limit: i64) -> Result<Vec<Value>, ServiceError> {
        let sql = SqlResult::new(
            "SELECT cp.*, u.profile_image, u.full_name \
             FROM creator_profiles cp JOIN users u ON cp.user_id = u.id \
             ORDER BY cp.created_at DESC LIMIT $1",
            vec![json!(limit)],
        );
        Ok(fetch_all_json(&self.pool, &sql).await?)
    }
}
