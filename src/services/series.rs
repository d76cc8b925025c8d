use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::PgPool;

use super::ServiceError;
use crate::database::{execute, fetch_all_json, fetch_one_json, fetch_scalar};
use crate::filter::SqlResult;
use crate::update::{Flag, InsertSet, Int};

/// Body for creating a series; unknown keys are ignored
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewSeries {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "thumbnailUrl")]
    pub thumbnail_url: Option<String>,
    #[serde(alias = "coverImageUrl")]
    pub cover_image_url: Option<String>,
    #[serde(alias = "categoryId")]
    pub category_id: Option<Int>,
    #[serde(alias = "isActive")]
    pub is_active: Option<Flag>,
    #[serde(alias = "isFeatured")]
    pub is_featured: Option<Flag>,
    /// Honored for admins only
    #[serde(alias = "creatorId")]
    pub creator_id: Option<Int>,
}

impl NewSeries {
    fn insert_sql(&self, creator_id: i64) -> Result<SqlResult, ServiceError> {
        let title = self
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ServiceError::Invalid("Title is required".to_string()))?;

        let mut insert = InsertSet::new("series");
        insert
            .value("title", Some(&title.to_string()))
            .value("creator_id", Some(&Int(creator_id)))
            .value("is_active", Some(&self.is_active.unwrap_or(Flag(true))))
            .value("is_featured", Some(&self.is_featured.unwrap_or(Flag(false))))
            .value("description", self.description.as_ref())
            .value("thumbnail_url", self.thumbnail_url.as_ref())
            .value("cover_image_url", self.cover_image_url.as_ref())
            .value("category_id", self.category_id.as_ref());
        Ok(insert.finish())
    }
}

pub struct SeriesService {
    pool: PgPool,
}

impl SeriesService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, creator_id: i64, body: &NewSeries) -> Result<i64, ServiceError> {
        let sql = body.insert_sql(creator_id)?;
        let id = fetch_scalar::<_, i64>(&self.pool, &sql)
            .await?
            .ok_or_else(|| ServiceError::Invalid("Series was not created".to_string()))?;
        tracing::info!("Series {} created by user {}", id, creator_id);
        Ok(id)
    }

    /// Series document with its active episodes in viewing order
    pub async fn get_with_episodes(&self, series_id: i64) -> Result<Value, ServiceError> {
        let series = SqlResult::new(
            "SELECT s.*, c.name AS category_name, u.full_name AS creator_name \
             FROM series s \
             LEFT JOIN video_categories c ON s.category_id = c.id \
             LEFT JOIN users u ON s.creator_id = u.id \
             WHERE s.id = $1",
            vec![json!(series_id)],
        );
        let mut document = fetch_one_json(&self.pool, &series, "Series").await?;

        let episodes = SqlResult::new(
            "SELECT * FROM videos WHERE series_id = $1 AND is_active = 1 \
             ORDER BY season_number ASC NULLS LAST, episode_number ASC NULLS LAST, created_at ASC",
            vec![json!(series_id)],
        );
        let episodes = fetch_all_json(&self.pool, &episodes).await?;
        document["episodes"] = Value::Array(episodes);
        Ok(document)
    }

    /// Unlinks member videos, then removes the series. Both or neither.
    pub async fn delete(&self, series_id: i64) -> Result<u64, ServiceError> {
        let mut tx = self.pool.begin().await?;

        let unlink = SqlResult::new(
            "UPDATE videos SET series_id = NULL WHERE series_id = $1",
            vec![json!(series_id)],
        );
        let unlinked = execute(&mut *tx, &unlink).await?;

        let delete = SqlResult::new("DELETE FROM series WHERE id = $1", vec![json!(series_id)]);
        if execute(&mut *tx, &delete).await? == 0 {
            tx.rollback().await?;
            return Err(ServiceError::NotFound("Series not found".to_string()));
        }

        tx.commit().await?;
        tracing::info!("Series {} deleted, {} videos unlinked", series_id, unlinked);
        Ok(unlinked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_series_defaults_to_active() {
        let body: NewSeries = serde_json::from_value(json!({ "title": "Mithila Tales" })).unwrap();
        let sql = body.insert_sql(3).unwrap();
        assert_eq!(
            sql.query,
            "INSERT INTO \"series\" (\"title\", \"creator_id\", \"is_active\", \"is_featured\") VALUES ($1, $2, $3, $4) RETURNING id"
        );
        assert_eq!(sql.params, vec![json!("Mithila Tales"), json!(3), json!(1), json!(0)]);
    }

    #[test]
    fn new_series_accepts_camel_case_and_optional_columns() {
        let body: NewSeries = serde_json::from_value(json!({
            "title": "Tales",
            "categoryId": "4",
            "isActive": false,
            "coverImageUrl": "https://cdn/c.jpg"
        }))
        .unwrap();
        let sql = body.insert_sql(3).unwrap();
        assert!(sql.query.contains("\"is_featured\", \"cover_image_url\", \"category_id\")"));
        assert_eq!(sql.params[2], json!(0));
        assert_eq!(sql.params[5], json!(4));
    }

    #[test]
    fn blank_title_is_rejected() {
        let body: NewSeries = serde_json::from_value(json!({ "title": "  " })).unwrap();
        assert!(matches!(body.insert_sql(1), Err(ServiceError::Invalid(_))));
    }
}
