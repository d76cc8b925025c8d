//! Per-resource listing filters.
//!
//! Each filter is parsed leniently from [`FilterParams`] and composes a full
//! parameterized SELECT. Composition is pure: callers fetch anything it needs
//! (caller id, stored language preference) beforehand.

use serde_json::Value;

use super::error::FilterError;
use super::filter_where::FilterWhere;
use super::pagination::Pagination;
use super::types::{FilterParams, SqlResult};
use crate::types::VideoType;

/// Public video/reel catalog listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoFilter {
    pub video_type: VideoType,
    pub category_id: Option<i64>,
    pub genre_id: Option<i64>,
    pub series_id: Option<i64>,
    pub exclude_series: bool,
    pub search: Option<String>,
    pub is_featured: Option<bool>,
    pub is_trending: Option<bool>,
}

impl VideoFilter {
    pub fn from_params(params: &FilterParams) -> Self {
        Self {
            video_type: params
                .text("type")
                .and_then(VideoType::parse)
                .unwrap_or_default(),
            category_id: params.int("category_id"),
            genre_id: params.int("genre_id"),
            series_id: params.int("series_id"),
            exclude_series: params.flag("exclude_series").unwrap_or(false),
            search: params.text("search").map(str::to_string),
            is_featured: params.flag("is_featured"),
            is_trending: params.flag("is_trending"),
        }
    }

    /// The caller's content-language preference only narrows the default
    /// listing; any explicit category, genre, search or flag filter turns it off.
    pub fn uses_language_preference(&self) -> bool {
        self.category_id.is_none()
            && self.genre_id.is_none()
            && self.search.is_none()
            && self.is_featured.is_none()
            && self.is_trending.is_none()
    }

    pub fn where_clause(&self, starting_param_index: usize, preference: Option<&str>) -> Result<SqlResult, FilterError> {
        let mut w = FilterWhere::new(starting_param_index);
        w.raw("v.is_active = 1");
        w.eq("v.type", self.video_type.as_str())?;
        w.eq_opt("v.category_id", self.category_id)?;
        w.eq_opt("v.genre_id", self.genre_id)?;
        w.eq_opt("v.series_id", self.series_id)?;
        if self.exclude_series {
            w.is_null("v.series_id")?;
        }
        if let Some(search) = &self.search {
            w.ilike_any(&["v.title", "v.description", "u.full_name"], search)?;
        }
        w.flag_opt("v.is_featured", self.is_featured)?;
        w.flag_opt("v.is_trending", self.is_trending)?;

        if self.uses_language_preference() {
            let preference = preference.map(str::trim).filter(|p| !p.is_empty());
            w.eq_opt("v.language", preference)?;
        }

        Ok(w.build())
    }

    /// Listing rows carry creator/category names plus `is_liked` and
    /// `is_following` for the caller (`$1` when present).
    pub fn to_sql(&self, caller: Option<i64>, preference: Option<&str>, page: &Pagination) -> Result<SqlResult, FilterError> {
        let (start, is_liked, is_following) = match caller {
            Some(_) => (
                1,
                "EXISTS(SELECT 1 FROM video_likes vl WHERE vl.video_id = v.id AND vl.user_id = $1)",
                "EXISTS(SELECT 1 FROM follows f WHERE f.follower_id = $1 AND f.following_id = v.creator_id)",
            ),
            None => (0, "FALSE", "FALSE"),
        };

        let where_result = self.where_clause(start, preference)?;
        let query = format!(
            "SELECT v.*, u.full_name AS creator_name, u.profile_image AS creator_image, \
             c.name AS category_name, {} AS is_liked, {} AS is_following \
             FROM videos v \
             LEFT JOIN users u ON v.creator_id = u.id \
             LEFT JOIN video_categories c ON v.category_id = c.id \
             WHERE {} ORDER BY v.created_at DESC {}",
            is_liked,
            is_following,
            where_result.query,
            page.to_sql()
        );

        let mut params = Vec::with_capacity(where_result.params.len() + 1);
        if let Some(id) = caller {
            params.push(Value::from(id));
        }
        params.extend(where_result.params);
        Ok(SqlResult::new(query, params))
    }
}

/// A creator's own uploads, any status
#[derive(Debug, Clone, Default)]
pub struct CreatorContentFilter {
    pub video_type: Option<VideoType>,
}

impl CreatorContentFilter {
    pub fn from_params(params: &FilterParams) -> Self {
        Self {
            video_type: params.text("type").and_then(VideoType::parse),
        }
    }

    pub fn to_sql(&self, creator_id: i64) -> Result<SqlResult, FilterError> {
        let mut w = FilterWhere::new(0);
        w.eq("v.creator_id", creator_id)?;
        w.eq_opt("v.type", self.video_type.map(|t| t.as_str()))?;
        let where_result = w.build();

        let query = format!(
            "SELECT v.*, c.name AS category_name \
             FROM videos v \
             LEFT JOIN video_categories c ON v.category_id = c.id \
             WHERE {} ORDER BY v.created_at DESC",
            where_result.query
        );
        Ok(SqlResult::new(query, where_result.params))
    }
}

/// Admin catalog view: one type, active and inactive
#[derive(Debug, Clone, Default)]
pub struct AdminVideoFilter {
    pub video_type: VideoType,
}

impl AdminVideoFilter {
    pub fn from_params(params: &FilterParams) -> Self {
        Self {
            video_type: params.text("type").and_then(VideoType::parse).unwrap_or_default(),
        }
    }

    pub fn to_sql(&self) -> Result<SqlResult, FilterError> {
        let mut w = FilterWhere::new(0);
        w.eq("v.type", self.video_type.as_str())?;
        let where_result = w.build();

        let query = format!(
            "SELECT v.id, v.title, v.description, v.video_url, v.thumbnail_url, v.views_count, \
             v.is_active, v.created_at, c.name AS category_name, u.full_name AS creator_name \
             FROM videos v \
             LEFT JOIN video_categories c ON v.category_id = c.id \
             LEFT JOIN users u ON v.creator_id = u.id \
             WHERE {} ORDER BY v.created_at DESC",
            where_result.query
        );
        Ok(SqlResult::new(query, where_result.params))
    }
}

/// Music catalog listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SongFilter {
    pub genre_id: Option<i64>,
    pub search: Option<String>,
    pub is_trending: Option<bool>,
    pub is_featured: Option<bool>,
}

impl SongFilter {
    pub fn from_params(params: &FilterParams) -> Self {
        Self {
            genre_id: params.int("genre_id"),
            search: params.text("search").map(str::to_string),
            is_trending: params.flag("is_trending"),
            is_featured: params.flag("is_featured"),
        }
    }

    pub fn to_sql(&self, page: &Pagination) -> Result<SqlResult, FilterError> {
        let mut w = FilterWhere::new(0);
        w.raw("s.is_active = 1");
        w.eq_opt("s.genre_id", self.genre_id)?;
        if let Some(search) = &self.search {
            w.ilike_any(&["s.title"], search)?;
        }
        w.flag_opt("s.is_trending", self.is_trending)?;
        w.flag_opt("s.is_featured", self.is_featured)?;
        let where_result = w.build();

        let query = format!(
            "SELECT s.*, g.name AS genre_name \
             FROM songs s \
             LEFT JOIN music_genres g ON s.genre_id = g.id \
             WHERE {} ORDER BY s.created_at DESC {}",
            where_result.query,
            page.to_sql()
        );
        Ok(SqlResult::new(query, where_result.params))
    }
}

/// Series listing with episode count and summed views
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesFilter {
    pub category_id: Option<i64>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
}

impl SeriesFilter {
    pub fn from_params(params: &FilterParams) -> Self {
        Self {
            category_id: params.int("category_id"),
            is_active: params.flag("is_active"),
            is_featured: params.flag("is_featured"),
        }
    }

    pub fn to_sql(&self, page: &Pagination) -> Result<SqlResult, FilterError> {
        let mut w = FilterWhere::new(0);
        w.eq_opt("s.category_id", self.category_id)?;
        w.flag_opt("s.is_active", self.is_active)?;
        w.flag_opt("s.is_featured", self.is_featured)?;
        let where_result = w.build();

        let query = format!(
            "SELECT s.*, c.name AS category_name, u.full_name AS creator_name, \
             (SELECT COUNT(*) FROM videos WHERE series_id = s.id) AS episode_count, \
             (SELECT COALESCE(SUM(views_count), 0) FROM videos WHERE series_id = s.id) AS total_views \
             FROM series s \
             LEFT JOIN video_categories c ON s.category_id = c.id \
             LEFT JOIN users u ON s.creator_id = u.id \
             WHERE {} ORDER BY s.created_at DESC {}",
            where_result.query,
            page.to_sql()
        );
        Ok(SqlResult::new(query, where_result.params))
    }
}

/// Playlists visible to a viewer: public ones, plus the viewer's own
#[derive(Debug, Clone, Default)]
pub struct PlaylistFilter {
    pub user_id: Option<i64>,
}

impl PlaylistFilter {
    pub fn from_params(params: &FilterParams) -> Self {
        Self {
            user_id: params.int("user_id"),
        }
    }

    pub fn to_sql(&self) -> Result<SqlResult, FilterError> {
        let mut w = FilterWhere::new(0);
        match self.user_id {
            Some(user_id) => {
                w.either_or_eq("p.is_public = 1", "p.user_id", user_id)?;
            }
            None => {
                w.raw("p.is_public = 1");
            }
        }
        let where_result = w.build();

        let query = format!(
            "SELECT p.* FROM playlists p WHERE {} ORDER BY p.created_at DESC",
            where_result.query
        );
        Ok(SqlResult::new(query, where_result.params))
    }
}

/// Admin user directory search over name, email and mobile number
#[derive(Debug, Clone, Default)]
pub struct UserSearch {
    pub search: Option<String>,
}

impl UserSearch {
    pub fn from_params(params: &FilterParams) -> Self {
        Self {
            search: params.text("search").map(str::to_string),
        }
    }

    fn where_clause(&self) -> Result<SqlResult, FilterError> {
        let mut w = FilterWhere::new(0);
        if let Some(search) = &self.search {
            w.ilike_any(&["full_name", "email", "mobile_number"], search)?;
        }
        Ok(w.build())
    }

    pub fn to_sql(&self, page: &Pagination) -> Result<SqlResult, FilterError> {
        let where_result = self.where_clause()?;
        let query = format!(
            "SELECT id, full_name, email, mobile_number, is_creator, is_verified, role, created_at, profile_image \
             FROM users WHERE {} ORDER BY created_at DESC {}",
            where_result.query,
            page.to_sql()
        );
        Ok(SqlResult::new(query, where_result.params))
    }

    pub fn to_count_sql(&self) -> Result<SqlResult, FilterError> {
        let where_result = self.where_clause()?;
        let query = format!("SELECT COUNT(*) AS count FROM users WHERE {}", where_result.query);
        Ok(SqlResult::new(query, where_result.params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page() -> Pagination {
        Pagination::new(None, None, 20, 100)
    }

    #[test]
    fn default_video_listing_filters_on_type_only() {
        let filter = VideoFilter::from_params(&FilterParams::new());
        let sql = filter.where_clause(0, None).unwrap();
        assert_eq!(sql.query, "v.is_active = 1 AND v.type = $1");
        assert_eq!(sql.params, vec![json!("VIDEO")]);
    }

    #[test]
    fn language_preference_applies_to_unfiltered_listing() {
        let filter = VideoFilter::from_params(&FilterParams::new());
        let sql = filter.to_sql(Some(42), Some("Maithili"), &page()).unwrap();

        assert!(sql.query.contains("v.language = $3"));
        assert_eq!(sql.params, vec![json!(42), json!("VIDEO"), json!("Maithili")]);
    }

    #[test]
    fn explicit_filter_suppresses_language_preference() {
        let params = FilterParams::new().with("category_id", "3");
        let filter = VideoFilter::from_params(&params);
        let sql = filter.to_sql(Some(42), Some("Maithili"), &page()).unwrap();

        assert!(!sql.query.contains("v.language"));
        assert!(sql.query.contains("v.category_id = $3"));
        assert_eq!(sql.params, vec![json!(42), json!("VIDEO"), json!(3)]);
    }

    #[test]
    fn flag_filter_set_to_false_still_suppresses_preference() {
        let params = FilterParams::new().with("is_featured", "false");
        let filter = VideoFilter::from_params(&params);
        assert!(!filter.uses_language_preference());

        let sql = filter.where_clause(0, Some("Maithili")).unwrap();
        assert_eq!(sql.query, "v.is_active = 1 AND v.type = $1 AND v.is_featured = $2");
        assert_eq!(sql.params, vec![json!("VIDEO"), json!(0)]);
    }

    #[test]
    fn series_id_does_not_suppress_preference() {
        let params = FilterParams::new().with("series_id", "9");
        let filter = VideoFilter::from_params(&params);
        let sql = filter.where_clause(0, Some("Hindi")).unwrap();
        assert!(sql.query.ends_with("v.series_id = $2 AND v.language = $3"));
    }

    #[test]
    fn malformed_numbers_are_ignored() {
        let params = FilterParams::new()
            .with("category_id", "abc")
            .with("genre_id", "")
            .with("type", "documentary");
        let filter = VideoFilter::from_params(&params);
        assert_eq!(filter, VideoFilter::default());
    }

    #[test]
    fn video_search_spans_title_description_and_creator() {
        let params = FilterParams::new().with("search", "dream").with("type", "reel");
        let filter = VideoFilter::from_params(&params);
        let sql = filter.to_sql(None, None, &page()).unwrap();

        assert!(sql.query.contains("FALSE AS is_liked"));
        assert!(sql
            .query
            .contains("(v.title ILIKE $2 OR v.description ILIKE $3 OR u.full_name ILIKE $4)"));
        assert_eq!(sql.params.len(), 4);
        assert_eq!(sql.params[0], json!("REEL"));
        assert_eq!(sql.params[1], json!("%dream%"));
    }

    #[test]
    fn exclude_series_adds_null_check() {
        let params = FilterParams::new().with("exclude_series", "1");
        let sql = VideoFilter::from_params(&params).where_clause(0, None).unwrap();
        assert!(sql.query.contains("v.series_id IS NULL"));
    }

    #[test]
    fn anonymous_listing_ignores_caller_subselects() {
        let sql = VideoFilter::default().to_sql(None, None, &page()).unwrap();
        assert!(!sql.query.contains("vl.user_id"));
        assert!(sql.query.ends_with("ORDER BY v.created_at DESC LIMIT 20 OFFSET 0"));
    }

    #[test]
    fn song_filter_combines_flags_and_title_search() {
        let params = FilterParams::new()
            .with("genre_id", "2")
            .with("search", "raga")
            .with("is_trending", true);
        let sql = SongFilter::from_params(&params)
            .to_sql(&Pagination::new(None, None, 50, 100))
            .unwrap();

        assert!(sql.query.contains(
            "WHERE s.is_active = 1 AND s.genre_id = $1 AND (s.title ILIKE $2) AND s.is_trending = $3"
        ));
        assert!(sql.query.ends_with("LIMIT 50 OFFSET 0"));
        assert_eq!(sql.params, vec![json!(2), json!("%raga%"), json!(1)]);
    }

    #[test]
    fn series_filter_without_params_is_unfiltered() {
        let sql = SeriesFilter::from_params(&FilterParams::new()).to_sql(&page()).unwrap();
        assert!(sql.query.contains("WHERE 1=1"));
        assert!(sql.params.is_empty());
    }

    #[test]
    fn series_filter_flags() {
        let params = FilterParams::new().with("is_active", "true").with("is_featured", "0");
        let sql = SeriesFilter::from_params(&params).to_sql(&page()).unwrap();
        assert!(sql.query.contains("s.is_active = $1 AND s.is_featured = $2"));
        assert_eq!(sql.params, vec![json!(1), json!(0)]);
    }

    #[test]
    fn playlist_visibility_includes_owned() {
        let sql = PlaylistFilter { user_id: Some(5) }.to_sql().unwrap();
        assert!(sql.query.contains("(p.is_public = 1 OR p.user_id = $1)"));
        assert_eq!(sql.params, vec![json!(5)]);

        let sql = PlaylistFilter::default().to_sql().unwrap();
        assert!(sql.query.contains("WHERE p.is_public = 1"));
    }

    #[test]
    fn user_search_shares_predicate_with_count() {
        let params = FilterParams::new().with("search", "ram");
        let search = UserSearch::from_params(&params);
        let list = search.to_sql(&Pagination::new(None, None, 10, 100)).unwrap();
        let count = search.to_count_sql().unwrap();

        let predicate = "(full_name ILIKE $1 OR email ILIKE $2 OR mobile_number ILIKE $3)";
        assert!(list.query.contains(predicate));
        assert!(count.query.contains(predicate));
        assert_eq!(list.params, count.params);
    }

    #[test]
    fn creator_content_type_is_optional() {
        let sql = CreatorContentFilter::default().to_sql(7).unwrap();
        assert!(sql.query.contains("WHERE v.creator_id = $1 ORDER BY"));

        let params = FilterParams::new().with("type", "REEL");
        let sql = CreatorContentFilter::from_params(&params).to_sql(7).unwrap();
        assert!(sql.query.contains("v.creator_id = $1 AND v.type = $2"));
    }
}
