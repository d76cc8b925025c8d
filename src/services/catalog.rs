//! Video catalog reads and writes that span more than one statement:
//! detail pages, SEO read-back and creation of uploaded videos.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::PgPool;

use super::ServiceError;
use crate::config::SeoConfig;
use crate::database::{execute, fetch_one_json, fetch_optional_json, fetch_scalar};
use crate::filter::SqlResult;
use crate::seo::{string_list, SeoFields, VideoMeta};
use crate::types::VideoType;
use crate::update::{Flag, Float, InsertSet, Int, JsonField};

/// Language recorded on uploads that do not name one
const DEFAULT_UPLOAD_LANGUAGE: &str = "Hindi";
const DEFAULT_CONTENT_RATING: &str = "U";

/// Fields accepted when a creator uploads a video. Media URLs are filled
/// in by the upload handler once files are stored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewVideo {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub video_type: Option<String>,
    #[serde(alias = "categoryId")]
    pub category_id: Option<Int>,
    #[serde(alias = "genreId")]
    pub genre_id: Option<Int>,
    #[serde(alias = "seriesId")]
    pub series_id: Option<Int>,
    #[serde(alias = "seasonNumber")]
    pub season_number: Option<Int>,
    #[serde(alias = "episodeNumber")]
    pub episode_number: Option<Int>,
    pub language: Option<String>,
    #[serde(alias = "contentRating")]
    pub content_rating: Option<String>,
    #[serde(alias = "isActive")]
    pub is_active: Option<Flag>,
    #[serde(alias = "isFeatured")]
    pub is_featured: Option<Flag>,
    #[serde(alias = "isTrending")]
    pub is_trending: Option<Flag>,
    #[serde(alias = "videoUrl")]
    pub video_url: Option<String>,
    #[serde(alias = "thumbnailUrl")]
    pub thumbnail_url: Option<String>,
    #[serde(alias = "fileSize")]
    pub file_size: Option<Int>,
    pub duration: Option<Int>,
    #[serde(alias = "releaseDate")]
    pub release_date: Option<NaiveDate>,
    #[serde(alias = "releaseYear")]
    pub release_year: Option<Int>,
    #[serde(alias = "videoQuality")]
    pub video_quality: Option<String>,
    pub director: Option<String>,
    #[serde(alias = "productionCompany")]
    pub production_company: Option<String>,
    pub rating: Option<Float>,
    pub cast: Option<JsonField>,
    pub crew: Option<JsonField>,
    pub tags: Option<JsonField>,
    pub subtitles: Option<JsonField>,
    #[serde(alias = "audioLanguages")]
    pub audio_languages: Option<JsonField>,
    pub slug: Option<String>,
    #[serde(alias = "seoTitle")]
    pub seo_title: Option<String>,
    #[serde(alias = "seoDescription")]
    pub seo_description: Option<String>,
    #[serde(alias = "ogTitle")]
    pub og_title: Option<String>,
    #[serde(alias = "ogDescription")]
    pub og_description: Option<String>,
    #[serde(alias = "ogImage")]
    pub og_image: Option<String>,
    #[serde(alias = "structuredData")]
    pub structured_data: Option<JsonField>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn json_list(field: &Option<JsonField>) -> Vec<String> {
    string_list(field.as_ref().and_then(JsonField::parsed))
}

impl NewVideo {
    fn meta<'a>(&'a self, title: &'a str) -> VideoMeta<'a> {
        VideoMeta {
            title,
            description: non_blank(&self.description),
            video_type: self.kind(),
            release_year: self.release_year.map(|y| y.0),
            release_date: self.release_date,
            video_quality: non_blank(&self.video_quality),
            director: non_blank(&self.director),
            production_company: non_blank(&self.production_company),
            language: non_blank(&self.language),
            cast: json_list(&self.cast),
            tags: json_list(&self.tags),
            audio_languages: json_list(&self.audio_languages),
            thumbnail_url: non_blank(&self.thumbnail_url),
            duration: self.duration.map(|d| d.0),
            rating: self.rating.map(|r| r.0),
            views_count: 0,
            slug: None,
            created_at: Some(Utc::now()),
        }
    }

    fn kind(&self) -> VideoType {
        self.video_type.as_deref().and_then(VideoType::parse).unwrap_or_default()
    }

    /// SEO columns as supplied, with the gaps synthesized
    pub fn seo_fields(&self, title: &str, site: &SeoConfig) -> SeoFields {
        SeoFields {
            slug: self.slug.clone(),
            seo_title: self.seo_title.clone(),
            seo_description: self.seo_description.clone(),
            og_title: self.og_title.clone(),
            og_description: self.og_description.clone(),
            og_image: self.og_image.clone(),
            structured_data: self.structured_data.as_ref().and_then(JsonField::parsed).cloned(),
        }
        .derive_missing(&self.meta(title), site)
    }

    pub fn insert_sql(&self, creator_id: i64, site: &SeoConfig) -> Result<SqlResult, ServiceError> {
        let title = non_blank(&self.title)
            .ok_or_else(|| ServiceError::Invalid("Title is required".to_string()))?
            .to_string();
        let video_url = non_blank(&self.video_url)
            .ok_or_else(|| ServiceError::Invalid("Video file or URL is required".to_string()))?
            .to_string();
        let seo = self.seo_fields(&title, site);
        let structured_data = seo.structured_data.clone().map(JsonField::Parsed);

        let mut insert = InsertSet::new("videos");
        insert
            .value("title", Some(&title))
            .value("creator_id", Some(&Int(creator_id)))
            .value("type", Some(&self.kind().as_str().to_string()))
            .value("video_url", Some(&video_url))
            .value(
                "language",
                Some(&non_blank(&self.language).unwrap_or(DEFAULT_UPLOAD_LANGUAGE).to_string()),
            )
            .value(
                "content_rating",
                Some(&non_blank(&self.content_rating).unwrap_or(DEFAULT_CONTENT_RATING).to_string()),
            )
            .value("is_active", Some(&self.is_active.unwrap_or(Flag(true))))
            .value("is_featured", Some(&self.is_featured.unwrap_or(Flag(false))))
            .value("is_trending", Some(&self.is_trending.unwrap_or(Flag(false))))
            .value("description", self.description.as_ref())
            .value("thumbnail_url", self.thumbnail_url.as_ref())
            .value("category_id", self.category_id.as_ref())
            .value("genre_id", self.genre_id.as_ref())
            .value("series_id", self.series_id.as_ref())
            .value("season_number", self.season_number.as_ref())
            .value("episode_number", self.episode_number.as_ref())
            .value("file_size", self.file_size.as_ref())
            .value("duration", self.duration.as_ref())
            .value("release_date", self.release_date.as_ref())
            .value("release_year", self.release_year.as_ref())
            .value("video_quality", self.video_quality.as_ref())
            .value("director", self.director.as_ref())
            .value("production_company", self.production_company.as_ref())
            .value("rating", self.rating.as_ref())
            .value("cast", self.cast.as_ref())
            .value("crew", self.crew.as_ref())
            .value("tags", self.tags.as_ref())
            .value("subtitles", self.subtitles.as_ref())
            .value("audio_languages", self.audio_languages.as_ref())
            .value("slug", seo.slug.as_ref())
            .value("seo_title", seo.seo_title.as_ref())
            .value("seo_description", seo.seo_description.as_ref())
            .value("og_title", seo.og_title.as_ref())
            .value("og_description", seo.og_description.as_ref())
            .value("og_image", seo.og_image.as_ref())
            .value("structured_data", structured_data.as_ref());
        Ok(insert.finish())
    }
}

fn text<'a>(row: &'a Value, key: &str) -> Option<&'a str> {
    row.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Synthesizer inputs read back from a stored `videos` row
pub fn meta_from_row(row: &Value) -> VideoMeta<'_> {
    VideoMeta {
        title: text(row, "title").unwrap_or_default(),
        description: text(row, "description"),
        video_type: text(row, "type").and_then(VideoType::parse).unwrap_or_default(),
        release_year: row.get("release_year").and_then(Value::as_i64),
        release_date: text(row, "release_date").and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()),
        video_quality: text(row, "video_quality"),
        director: text(row, "director"),
        production_company: text(row, "production_company"),
        language: text(row, "language"),
        cast: string_list(row.get("cast")),
        tags: string_list(row.get("tags")),
        audio_languages: string_list(row.get("audio_languages")),
        thumbnail_url: text(row, "thumbnail_url"),
        duration: row.get("duration").and_then(Value::as_i64),
        rating: row.get("rating").and_then(Value::as_f64),
        views_count: row.get("views_count").and_then(Value::as_i64).unwrap_or(0),
        slug: text(row, "slug"),
        created_at: text(row, "created_at")
            .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
            .map(|t| t.with_timezone(&Utc)),
    }
}

/// Stored SEO columns of a row, gaps synthesized from the row itself
pub fn seo_document(row: &Value, site: &SeoConfig) -> Value {
    let stored = |key: &str| text(row, key).map(str::to_string);
    let fields = SeoFields {
        slug: stored("slug"),
        seo_title: stored("seo_title"),
        seo_description: stored("seo_description"),
        og_title: stored("og_title"),
        og_description: stored("og_description"),
        og_image: stored("og_image"),
        structured_data: row.get("structured_data").filter(|v| !v.is_null()).cloned(),
    }
    .derive_missing(&meta_from_row(row), site);

    json!({
        "id": row.get("id"),
        "slug": fields.slug,
        "seo_title": fields.seo_title,
        "seo_description": fields.seo_description,
        "og_title": fields.og_title,
        "og_description": fields.og_description,
        "og_image": fields.og_image,
        "structured_data": fields.structured_data,
    })
}

fn detail_sql(video_id: i64) -> SqlResult {
    SqlResult::new(
        "SELECT v.*, u.full_name AS creator_name, u.profile_image AS creator_image \
         FROM videos v LEFT JOIN users u ON v.creator_id = u.id \
         WHERE v.id = $1",
        vec![json!(video_id)],
    )
}

fn viewer_state_sql(viewer_id: i64, video_id: i64) -> SqlResult {
    SqlResult::new(
        "SELECT EXISTS(SELECT 1 FROM video_likes WHERE user_id = $1 AND video_id = $2) AS is_liked, \
         EXISTS(SELECT 1 FROM watchlist WHERE user_id = $1 AND video_id = $2) AS is_in_watchlist, \
         COALESCE((SELECT last_position FROM video_views WHERE user_id = $1 AND video_id = $2), 0) AS last_position",
        vec![json!(viewer_id), json!(video_id)],
    )
}

fn next_episode_sql(series_id: i64, episode_number: i64) -> SqlResult {
    SqlResult::new(
        "SELECT id FROM videos WHERE series_id = $1 AND episode_number = $2 AND is_active = 1 \
         ORDER BY season_number ASC NULLS LAST LIMIT 1",
        vec![json!(series_id), json!(episode_number + 1)],
    )
}

pub struct CatalogService {
    pool: PgPool,
}

impl CatalogService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Video with its creator, the viewer's state and the next episode
    pub async fn video_detail(&self, video_id: i64, viewer: Option<i64>) -> Result<Value, ServiceError> {
        let mut video = fetch_one_json(&self.pool, &detail_sql(video_id), "Video").await?;

        let state = match viewer {
            Some(viewer_id) => fetch_optional_json(&self.pool, &viewer_state_sql(viewer_id, video_id)).await?,
            None => None,
        };
        video["is_liked"] = state.as_ref().and_then(|s| s.get("is_liked")).cloned().unwrap_or(json!(false));
        video["is_in_watchlist"] = state
            .as_ref()
            .and_then(|s| s.get("is_in_watchlist"))
            .cloned()
            .unwrap_or(json!(false));
        video["last_position"] = state.as_ref().and_then(|s| s.get("last_position")).cloned().unwrap_or(json!(0));

        let series = video.get("series_id").and_then(Value::as_i64);
        let episode = video.get("episode_number").and_then(Value::as_i64);
        let next = match (series, episode) {
            (Some(series_id), Some(episode_number)) => {
                fetch_scalar::<_, i64>(&self.pool, &next_episode_sql(series_id, episode_number)).await?
            }
            _ => None,
        };
        video["next_video_id"] = json!(next);
        Ok(video)
    }

    pub async fn video_seo(&self, video_id: i64, site: &SeoConfig) -> Result<Value, ServiceError> {
        let sql = SqlResult::new("SELECT * FROM videos WHERE id = $1", vec![json!(video_id)]);
        let row = fetch_one_json(&self.pool, &sql, "Video").await?;
        Ok(seo_document(&row, site))
    }

    pub async fn create_video(&self, creator_id: i64, video: &NewVideo, site: &SeoConfig) -> Result<i64, ServiceError> {
        let sql = video.insert_sql(creator_id, site)?;
        let id = fetch_scalar::<_, i64>(&self.pool, &sql)
            .await?
            .ok_or_else(|| ServiceError::Invalid("Video was not created".to_string()))?;
        tracing::info!("Video {} uploaded by user {}", id, creator_id);
        Ok(id)
    }

    /// Physical delete; likes, views, comments and watchlist rows cascade
    pub async fn delete_video(&self, video_id: i64) -> Result<(), ServiceError> {
        let sql = SqlResult::new("DELETE FROM videos WHERE id = $1", vec![json!(video_id)]);
        match execute(&self.pool, &sql).await? {
            0 => Err(ServiceError::NotFound("Video not found".to_string())),
            _ => {
                tracing::info!("Video {} deleted", video_id);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SeoConfig {
        SeoConfig::default()
    }

    #[test]
    fn upload_requires_title_and_media() {
        let video: NewVideo = serde_json::from_value(json!({ "title": "Sintel" })).unwrap();
        match video.insert_sql(1, &site()) {
            Err(ServiceError::Invalid(msg)) => assert_eq!(msg, "Video file or URL is required"),
            other => panic!("unexpected: {:?}", other),
        }

        let video: NewVideo = serde_json::from_value(json!({ "video_url": "https://cdn/v.mp4" })).unwrap();
        assert!(matches!(video.insert_sql(1, &site()), Err(ServiceError::Invalid(_))));
    }

    #[test]
    fn upload_defaults_and_synthesized_seo() {
        let video: NewVideo = serde_json::from_value(json!({
            "title": "Sintel",
            "video_url": "https://cdn/v.mp4",
            "thumbnail_url": "https://cdn/t.jpg",
            "release_year": "2010",
            "category_id": "2"
        }))
        .unwrap();
        let sql = video.insert_sql(7, &site()).unwrap();

        assert!(sql.query.starts_with(
            "INSERT INTO \"videos\" (\"title\", \"creator_id\", \"type\", \"video_url\", \"language\", \
             \"content_rating\", \"is_active\", \"is_featured\", \"is_trending\""
        ));
        assert!(sql.query.contains("\"structured_data\") VALUES"));
        assert!(sql.query.contains("::jsonb"));
        assert_eq!(sql.params[0], json!("Sintel"));
        assert_eq!(sql.params[1], json!(7));
        assert_eq!(sql.params[2], json!("VIDEO"));
        assert_eq!(sql.params[4], json!("Hindi"));
        assert_eq!(sql.params[5], json!("U"));
        assert_eq!(&sql.params[6..9], &[json!(1), json!(0), json!(0)]);
        assert!(sql.params.contains(&json!("sintel-2010")));
    }

    #[test]
    fn supplied_seo_fields_are_kept() {
        let video: NewVideo = serde_json::from_value(json!({
            "title": "Sintel",
            "videoUrl": "https://cdn/v.mp4",
            "slug": "custom-slug",
            "ogTitle": "Watch Sintel"
        }))
        .unwrap();
        let seo = video.seo_fields("Sintel", &site());
        assert_eq!(seo.slug.as_deref(), Some("custom-slug"));
        assert_eq!(seo.og_title.as_deref(), Some("Watch Sintel"));
        assert_eq!(seo.og_description, seo.seo_description);
    }

    #[test]
    fn seo_document_falls_back_to_synthesized_fields() {
        let row = json!({
            "id": 4,
            "title": "Sintel",
            "type": "VIDEO",
            "release_year": 2010,
            "slug": "sintel-special",
            "views_count": 12,
            "created_at": "2024-05-01T10:00:00.123456+00:00"
        });
        let doc = seo_document(&row, &site());
        assert_eq!(doc["slug"], "sintel-special");
        assert_eq!(doc["seo_title"], "Sintel (2010) Movie | Tirhuta");
        assert_eq!(doc["og_title"], doc["seo_title"]);
        assert!(doc["structured_data"].is_object());
    }

    #[test]
    fn row_metadata_reads_json_lists() {
        let row = json!({ "title": "Sintel", "cast": ["A", "B"], "tags": "not a list", "rating": 4.5 });
        let meta = meta_from_row(&row);
        assert_eq!(meta.cast, vec!["A".to_string(), "B".to_string()]);
        assert!(meta.tags.is_empty());
        assert_eq!(meta.rating, Some(4.5));
    }
}
