use serde_json::{json, Value};
use sqlx::PgPool;

use super::ServiceError;
use crate::database::{execute, fetch_all_json, fetch_scalar};
use crate::filter::SqlResult;

fn followers_sql(user_id: i64) -> SqlResult {
    SqlResult::new(
        "SELECT u.id, u.full_name, u.profile_image, u.is_creator \
         FROM follows f JOIN users u ON f.follower_id = u.id \
         WHERE f.following_id = $1 ORDER BY f.created_at DESC",
        vec![json!(user_id)],
    )
}

fn following_sql(user_id: i64) -> SqlResult {
    SqlResult::new(
        "SELECT u.id, u.full_name, u.profile_image, u.is_creator \
         FROM follows f JOIN users u ON f.following_id = u.id \
         WHERE f.follower_id = $1 ORDER BY f.created_at DESC",
        vec![json!(user_id)],
    )
}

pub struct SocialService {
    pool: PgPool,
}

impl SocialService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn follow(&self, follower_id: i64, target_id: i64) -> Result<(), ServiceError> {
        if follower_id == target_id {
            return Err(ServiceError::Invalid("Cannot follow yourself".to_string()));
        }

        let exists = SqlResult::new("SELECT id FROM users WHERE id = $1", vec![json!(target_id)]);
        if fetch_scalar::<_, i64>(&self.pool, &exists).await?.is_none() {
            return Err(ServiceError::NotFound("User not found".to_string()));
        }

        let insert = SqlResult::new(
            "INSERT INTO follows (follower_id, following_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            vec![json!(follower_id), json!(target_id)],
        );
        if execute(&self.pool, &insert).await? == 0 {
            return Err(ServiceError::Conflict("Already following".to_string()));
        }

        tracing::info!("User {} followed {}", follower_id, target_id);
        Ok(())
    }

    /// Succeeds whether or not the follow existed
    pub async fn unfollow(&self, follower_id: i64, target_id: i64) -> Result<bool, ServiceError> {
        let delete = SqlResult::new(
            "DELETE FROM follows WHERE follower_id = $1 AND following_id = $2",
            vec![json!(follower_id), json!(target_id)],
        );
        Ok(execute(&self.pool, &delete).await? > 0)
    }

    pub async fn followers(&self, user_id: i64) -> Result<Vec<Value>, ServiceError> {
        Ok(fetch_all_json(&self.pool, &followers_sql(user_id)).await?)
    }

    pub async fn following(&self, user_id: i64) -> Result<Vec<Value>, ServiceError> {
        Ok(fetch_all_json(&self.pool, &following_sql(user_id)).await?)
    }
}
