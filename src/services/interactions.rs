//! Likes, views, shares, plays and comments.
//!
//! Each operation pairs the interaction row with its counter in one
//! transaction. A counter moves only when the row write actually changed
//! something, so repeated likes and stray unlikes leave it untouched.

use serde_json::{json, Value};
use sqlx::PgPool;

use super::{ServiceError, Toggle};
use crate::database::{execute, fetch_one_json, fetch_scalar, Counter};
use crate::filter::SqlResult;

/// Pair table for an insert-if-absent interaction
#[derive(Debug, Clone, Copy)]
enum Like {
    Video,
    Song,
}

impl Like {
    fn table(&self) -> &'static str {
        match self {
            Like::Video => "video_likes",
            Like::Song => "song_likes",
        }
    }

    fn target_column(&self) -> &'static str {
        match self {
            Like::Video => "video_id",
            Like::Song => "song_id",
        }
    }

    fn counter(&self) -> Counter {
        match self {
            Like::Video => Counter::VideoLikes,
            Like::Song => Counter::SongLikes,
        }
    }

    fn insert_sql(&self, user_id: i64, target_id: i64) -> SqlResult {
        SqlResult::new(
            format!(
                "INSERT INTO {} (user_id, {}) VALUES ($1, $2) ON CONFLICT DO NOTHING",
                self.table(),
                self.target_column()
            ),
            vec![json!(user_id), json!(target_id)],
        )
    }

    fn delete_sql(&self, user_id: i64, target_id: i64) -> SqlResult {
        SqlResult::new(
            format!("DELETE FROM {} WHERE user_id = $1 AND {} = $2", self.table(), self.target_column()),
            vec![json!(user_id), json!(target_id)],
        )
    }
}

fn comment_document_sql(comment_id: i64) -> SqlResult {
    SqlResult::new(
        "SELECT c.id, c.video_id, c.user_id, c.parent_id AS \"parentId\", c.text AS comment, c.created_at, \
         u.full_name AS user_name, u.profile_image AS user_avatar, 0 AS likes_count, FALSE AS is_liked \
         FROM comments c JOIN users u ON c.user_id = u.id WHERE c.id = $1",
        vec![json!(comment_id)],
    )
}

pub fn comments_for_video_sql(video_id: i64) -> SqlResult {
    SqlResult::new(
        "SELECT c.id, c.video_id, c.user_id, c.parent_id AS \"parentId\", c.text AS comment, c.created_at, \
         u.full_name AS user_name, u.profile_image AS user_avatar, 0 AS likes_count, FALSE AS is_liked \
         FROM comments c JOIN users u ON c.user_id = u.id WHERE c.video_id = $1 ORDER BY c.created_at DESC",
        vec![json!(video_id)],
    )
}

pub struct InteractionService {
    pool: PgPool,
}

impl InteractionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn like(&self, kind: Like, user_id: i64, target_id: i64) -> Result<Toggle, ServiceError> {
        let counter = kind.counter();
        let mut tx = self.pool.begin().await?;

        // Missing target is a 404, not a foreign-key failure
        counter.current(&mut *tx, target_id).await?;

        let inserted = execute(&mut *tx, &kind.insert_sql(user_id, target_id)).await?;
        let count = if inserted > 0 {
            counter.increment(&mut *tx, target_id, 1).await?
        } else {
            counter.current(&mut *tx, target_id).await?
        };

        tx.commit().await?;
        Ok(Toggle { changed: inserted > 0, count })
    }

    async fn unlike(&self, kind: Like, user_id: i64, target_id: i64) -> Result<Toggle, ServiceError> {
        let counter = kind.counter();
        let mut tx = self.pool.begin().await?;

        let removed = execute(&mut *tx, &kind.delete_sql(user_id, target_id)).await?;
        let count = if removed > 0 {
            Some(counter.decrement(&mut *tx, target_id, removed as i64).await?)
        } else {
            fetch_scalar::<_, i64>(&mut *tx, &counter.read_sql(target_id)).await?
        };

        tx.commit().await?;
        Ok(Toggle { changed: removed > 0, count: count.unwrap_or(0) })
    }

    pub async fn like_video(&self, user_id: i64, video_id: i64) -> Result<Toggle, ServiceError> {
        self.like(Like::Video, user_id, video_id).await
    }

    /// Never-liked pairs and unknown videos are a no-op
    pub async fn unlike_video(&self, user_id: i64, video_id: i64) -> Result<Toggle, ServiceError> {
        self.unlike(Like::Video, user_id, video_id).await
    }

    pub async fn like_song(&self, user_id: i64, song_id: i64) -> Result<Toggle, ServiceError> {
        self.like(Like::Song, user_id, song_id).await
    }

    pub async fn unlike_song(&self, user_id: i64, song_id: i64) -> Result<Toggle, ServiceError> {
        self.unlike(Like::Song, user_id, song_id).await
    }

    /// Every call counts. An identified viewer also gets their single
    /// history row created or refreshed.
    pub async fn record_view(&self, viewer: Option<i64>, video_id: i64) -> Result<i64, ServiceError> {
        let mut tx = self.pool.begin().await?;
        let views = Counter::VideoViews.increment(&mut *tx, video_id, 1).await?;

        if let Some(user_id) = viewer {
            let upsert = SqlResult::new(
                "INSERT INTO video_views (user_id, video_id) VALUES ($1, $2) \
                 ON CONFLICT (user_id, video_id) DO UPDATE SET updated_at = NOW()",
                vec![json!(user_id), json!(video_id)],
            );
            execute(&mut *tx, &upsert).await?;
        }

        tx.commit().await?;
        Ok(views)
    }

    /// Upserts the viewer's current position; does not count as a view
    pub async fn save_progress(&self, user_id: i64, video_id: i64, position: f64) -> Result<(), ServiceError> {
        if !position.is_finite() || position < 0.0 {
            return Err(ServiceError::Invalid("Position must be a non-negative number".to_string()));
        }

        Counter::VideoViews.current(&self.pool, video_id).await?;
        let upsert = SqlResult::new(
            "INSERT INTO video_views (user_id, video_id, last_position) VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, video_id) DO UPDATE SET last_position = EXCLUDED.last_position, updated_at = NOW()",
            vec![json!(user_id), json!(video_id), json!(position)],
        );
        execute(&self.pool, &upsert).await?;
        Ok(())
    }

    pub async fn share_video(&self, video_id: i64) -> Result<i64, ServiceError> {
        Ok(Counter::VideoShares.increment(&self.pool, video_id, 1).await?)
    }

    pub async fn play_song(&self, song_id: i64) -> Result<i64, ServiceError> {
        Ok(Counter::SongPlays.increment(&self.pool, song_id, 1).await?)
    }

    /// Replies may only target a top-level comment on the same video
    pub async fn add_comment(
        &self,
        user_id: i64,
        video_id: i64,
        text: &str,
        parent_id: Option<i64>,
    ) -> Result<Value, ServiceError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ServiceError::Invalid("Comment text is required".to_string()));
        }

        let mut tx = self.pool.begin().await?;
        Counter::VideoComments.current(&mut *tx, video_id).await?;

        if let Some(parent_id) = parent_id {
            let parent = SqlResult::new(
                "SELECT parent_id IS NULL FROM comments WHERE id = $1 AND video_id = $2",
                vec![json!(parent_id), json!(video_id)],
            );
            match fetch_scalar::<_, bool>(&mut *tx, &parent).await? {
                None => return Err(ServiceError::Invalid("Parent comment not found on this video".to_string())),
                Some(false) => return Err(ServiceError::Invalid("Replies cannot be nested".to_string())),
                Some(true) => {}
            }
        }

        let comment_id = fetch_scalar::<_, i64>(&mut *tx, &comment_insert_sql(video_id, user_id, text, parent_id))
            .await?
            .ok_or_else(|| ServiceError::Invalid("Comment was not created".to_string()))?;

        Counter::VideoComments.increment(&mut *tx, video_id, 1).await?;
        let comment = fetch_one_json(&mut *tx, &comment_document_sql(comment_id), "Comment").await?;

        tx.commit().await?;
        Ok(comment)
    }

    /// Removes a comment and its replies; returns how many rows went
    pub async fn delete_comment(&self, comment_id: i64) -> Result<u64, ServiceError> {
        let mut tx = self.pool.begin().await?;

        let video = SqlResult::new("SELECT video_id FROM comments WHERE id = $1", vec![json!(comment_id)]);
        let video_id = fetch_scalar::<_, i64>(&mut *tx, &video)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Comment not found".to_string()))?;

        let delete = SqlResult::new(
            "DELETE FROM comments WHERE id = $1 OR parent_id = $1",
            vec![json!(comment_id)],
        );
        let removed = execute(&mut *tx, &delete).await?;
        if removed > 0 {
            Counter::VideoComments.decrement(&mut *tx, video_id, removed as i64).await?;
        }

        tx.commit().await?;
        Ok(removed)
    }
}

/// The parent is cast so a top-level comment's untyped null binds as bigint
fn comment_insert_sql(video_id: i64, user_id: i64, text: &str, parent_id: Option<i64>) -> SqlResult {
    SqlResult::new(
        "INSERT INTO comments (video_id, user_id, text, parent_id) VALUES ($1, $2, $3, $4::bigint) RETURNING id",
        vec![json!(video_id), json!(user_id), json!(text), json!(parent_id)],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn likes_insert_if_absent() {
        let sql = Like::Video.insert_sql(3, 9);
        assert_eq!(
            sql.query,
            "INSERT INTO video_likes (user_id, video_id) VALUES ($1, $2) ON CONFLICT DO NOTHING"
        );
        assert_eq!(sql.params, vec![json!(3), json!(9)]);
    }

    #[test]
    fn song_unlike_targets_song_likes() {
        let sql = Like::Song.delete_sql(3, 9);
        assert_eq!(sql.query, "DELETE FROM song_likes WHERE user_id = $1 AND song_id = $2");
        assert_eq!(Like::Song.counter(), Counter::SongLikes);
    }

    #[test]
    fn top_level_comment_binds_typed_null_parent() {
        let sql = comment_insert_sql(1, 2, "hi", None);
        assert!(sql.query.contains("VALUES ($1, $2, $3, $4::bigint)"));
        assert_eq!(sql.params, vec![json!(1), json!(2), json!("hi"), Value::Null]);
    }

    #[test]
    fn reply_binds_parent_id() {
        let sql = comment_insert_sql(1, 2, "hi", Some(5));
        assert_eq!(sql.query, comment_insert_sql(1, 2, "hi", None).query);
        assert_eq!(sql.params[3], json!(5));
    }
}
