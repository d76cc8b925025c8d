//! Denormalized counters on videos and songs.
//!
//! Increments and decrements are single atomic statements; decrements are
//! clamped at zero. Callers pair them with the interaction write inside one
//! transaction (see `services::interactions`).

use serde_json::json;
use sqlx::{Executor, Postgres};

use super::manager::DatabaseError;
use super::query::fetch_scalar;
use crate::filter::SqlResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    VideoViews,
    VideoLikes,
    VideoComments,
    VideoShares,
    SongPlays,
    SongLikes,
}

impl Counter {
    pub fn table(&self) -> &'static str {
        match self {
            Counter::VideoViews | Counter::VideoLikes | Counter::VideoComments | Counter::VideoShares => "videos",
            Counter::SongPlays | Counter::SongLikes => "songs",
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Counter::VideoViews => "views_count",
            Counter::VideoLikes | Counter::SongLikes => "likes_count",
            Counter::VideoComments => "comments_count",
            Counter::VideoShares => "shares_count",
            Counter::SongPlays => "plays_count",
        }
    }

    pub fn increment_sql(&self, id: i64, by: i64) -> SqlResult {
        let query = format!(
            "UPDATE \"{table}\" SET \"{col}\" = \"{col}\" + $1 WHERE id = $2 RETURNING \"{col}\"",
            table = self.table(),
            col = self.column()
        );
        SqlResult::new(query, vec![json!(by), json!(id)])
    }

    pub fn decrement_sql(&self, id: i64, by: i64) -> SqlResult {
        let query = format!(
            "UPDATE \"{table}\" SET \"{col}\" = GREATEST(\"{col}\" - $1, 0) WHERE id = $2 RETURNING \"{col}\"",
            table = self.table(),
            col = self.column()
        );
        SqlResult::new(query, vec![json!(by), json!(id)])
    }

    pub fn read_sql(&self, id: i64) -> SqlResult {
        let query = format!(
            "SELECT \"{}\" FROM \"{}\" WHERE id = $1",
            self.column(),
            self.table()
        );
        SqlResult::new(query, vec![json!(id)])
    }

    /// New value, or `NotFound` when the row is missing
    pub async fn increment<'c, E>(&self, executor: E, id: i64, by: i64) -> Result<i64, DatabaseError>
    where
        E: Executor<'c, Database = Postgres>,
    {
        fetch_scalar::<_, i64>(executor, &self.increment_sql(id, by))
            .await?
            .ok_or_else(|| self.missing(id))
    }

    pub async fn decrement<'c, E>(&self, executor: E, id: i64, by: i64) -> Result<i64, DatabaseError>
    where
        E: Executor<'c, Database = Postgres>,
    {
        fetch_scalar::<_, i64>(executor, &self.decrement_sql(id, by))
            .await?
            .ok_or_else(|| self.missing(id))
    }

    pub async fn current<'c, E>(&self, executor: E, id: i64) -> Result<i64, DatabaseError>
    where
        E: Executor<'c, Database = Postgres>,
    {
        fetch_scalar::<_, i64>(executor, &self.read_sql(id))
            .await?
            .ok_or_else(|| self.missing(id))
    }

    fn missing(&self, id: i64) -> DatabaseError {
        let what = match self.table() {
            "songs" => "Song",
            _ => "Video",
        };
        DatabaseError::NotFound(format!("{} {} not found", what, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decrement_is_clamped_at_zero() {
        let sql = Counter::VideoLikes.decrement_sql(4, 1);
        assert_eq!(
            sql.query,
            "UPDATE \"videos\" SET \"likes_count\" = GREATEST(\"likes_count\" - $1, 0) WHERE id = $2 RETURNING \"likes_count\""
        );
        assert_eq!(sql.params, vec![json!(1), json!(4)]);
    }

    #[test]
    fn song_counters_target_songs() {
        assert_eq!(Counter::SongPlays.table(), "songs");
        assert_eq!(Counter::SongPlays.column(), "plays_count");
        assert!(Counter::SongLikes.increment_sql(2, 1).query.starts_with("UPDATE \"songs\""));
    }

    #[test]
    fn comment_removal_decrements_by_count() {
        let sql = Counter::VideoComments.decrement_sql(9, 3);
        assert_eq!(sql.params[0], json!(3));
    }
}
