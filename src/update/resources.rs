//! Mutable-field allow-lists per resource.
//!
//! Clients send both snake_case and camelCase keys; both are accepted.
//! Unknown keys are ignored.

use chrono::NaiveDate;
use serde::Deserialize;

use super::patch::{Flag, Float, Int, JsonField, Patch};
use super::{PartialUpdate, UpdateSet};
use crate::types::Role;

/// Owner/admin edit of a video. Replacement uploads land in `video_url`,
/// `file_size` and `thumbnail_url`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VideoPatch {
    pub title: Patch<String>,
    pub description: Patch<String>,
    #[serde(alias = "categoryId")]
    pub category_id: Patch<Int>,
    #[serde(alias = "genreId")]
    pub genre_id: Patch<Int>,
    #[serde(alias = "seriesId")]
    pub series_id: Patch<Int>,
    #[serde(alias = "seasonNumber")]
    pub season_number: Patch<Int>,
    #[serde(alias = "episodeNumber")]
    pub episode_number: Patch<Int>,
    pub language: Patch<String>,
    #[serde(alias = "contentRating")]
    pub content_rating: Patch<String>,
    #[serde(alias = "isActive")]
    pub is_active: Patch<Flag>,
    #[serde(alias = "isFeatured")]
    pub is_featured: Patch<Flag>,
    #[serde(alias = "isTrending")]
    pub is_trending: Patch<Flag>,
    #[serde(alias = "videoUrl")]
    pub video_url: Patch<String>,
    #[serde(alias = "thumbnailUrl")]
    pub thumbnail_url: Patch<String>,
    #[serde(alias = "fileSize")]
    pub file_size: Patch<Int>,
    pub duration: Patch<Int>,
    #[serde(alias = "releaseDate")]
    pub release_date: Patch<NaiveDate>,
    #[serde(alias = "releaseYear")]
    pub release_year: Patch<Int>,
    #[serde(alias = "videoQuality")]
    pub video_quality: Patch<String>,
    pub director: Patch<String>,
    #[serde(alias = "productionCompany")]
    pub production_company: Patch<String>,
    pub rating: Patch<Float>,
    pub cast: Patch<JsonField>,
    pub crew: Patch<JsonField>,
    pub tags: Patch<JsonField>,
    pub subtitles: Patch<JsonField>,
    #[serde(alias = "audioLanguages")]
    pub audio_languages: Patch<JsonField>,
    pub slug: Patch<String>,
    #[serde(alias = "seoTitle")]
    pub seo_title: Patch<String>,
    #[serde(alias = "seoDescription")]
    pub seo_description: Patch<String>,
    #[serde(alias = "ogTitle")]
    pub og_title: Patch<String>,
    #[serde(alias = "ogDescription")]
    pub og_description: Patch<String>,
    #[serde(alias = "ogImage")]
    pub og_image: Patch<String>,
    #[serde(alias = "structuredData")]
    pub structured_data: Patch<JsonField>,
}

impl PartialUpdate for VideoPatch {
    const TABLE: &'static str = "videos";

    fn assign(&self, set: &mut UpdateSet) {
        set.require("title", &self.title)
            .set("description", &self.description)
            .set("category_id", &self.category_id)
            .set("genre_id", &self.genre_id)
            .set("series_id", &self.series_id)
            .set("season_number", &self.season_number)
            .set("episode_number", &self.episode_number)
            .set("language", &self.language)
            .set("content_rating", &self.content_rating)
            .set("is_active", &self.is_active)
            .set("is_featured", &self.is_featured)
            .set("is_trending", &self.is_trending)
            .require("video_url", &self.video_url)
            .set("thumbnail_url", &self.thumbnail_url)
            .set("file_size", &self.file_size)
            .set("duration", &self.duration)
            .set("release_date", &self.release_date)
            .set("release_year", &self.release_year)
            .set("video_quality", &self.video_quality)
            .set("director", &self.director)
            .set("production_company", &self.production_company)
            .set("rating", &self.rating)
            .set("cast", &self.cast)
            .set("crew", &self.crew)
            .set("tags", &self.tags)
            .set("subtitles", &self.subtitles)
            .set("audio_languages", &self.audio_languages)
            .set("slug", &self.slug)
            .set("seo_title", &self.seo_title)
            .set("seo_description", &self.seo_description)
            .set("og_title", &self.og_title)
            .set("og_description", &self.og_description)
            .set("og_image", &self.og_image)
            .set("structured_data", &self.structured_data);
    }
}

/// `PATCH /videos/:id/status` and the admin toggle
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VideoStatusPatch {
    #[serde(alias = "isActive")]
    pub is_active: Patch<Flag>,
}

impl PartialUpdate for VideoStatusPatch {
    const TABLE: &'static str = "videos";

    fn assign(&self, set: &mut UpdateSet) {
        set.set("is_active", &self.is_active);
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SeriesPatch {
    pub title: Patch<String>,
    pub description: Patch<String>,
    #[serde(alias = "categoryId")]
    pub category_id: Patch<Int>,
    #[serde(alias = "isActive")]
    pub is_active: Patch<Flag>,
    #[serde(alias = "isFeatured")]
    pub is_featured: Patch<Flag>,
    #[serde(alias = "thumbnailUrl")]
    pub thumbnail_url: Patch<String>,
    #[serde(alias = "coverImageUrl")]
    pub cover_image_url: Patch<String>,
}

impl PartialUpdate for SeriesPatch {
    const TABLE: &'static str = "series";

    fn assign(&self, set: &mut UpdateSet) {
        set.require("title", &self.title)
            .set("description", &self.description)
            .set("category_id", &self.category_id)
            .set("is_active", &self.is_active)
            .set("is_featured", &self.is_featured)
            .set("thumbnail_url", &self.thumbnail_url)
            .set("cover_image_url", &self.cover_image_url);
    }
}

/// Admin edit of account flags and role
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserStatusPatch {
    #[serde(alias = "isCreator")]
    pub is_creator: Patch<Flag>,
    #[serde(alias = "isVerified")]
    pub is_verified: Patch<Flag>,
    pub role: Patch<Role>,
}

impl UserStatusPatch {
    /// Promoting to creator also needs a creator profile
    pub fn grants_creator(&self) -> bool {
        matches!(self.is_creator, Patch::Value(Flag(true)))
    }
}

impl PartialUpdate for UserStatusPatch {
    const TABLE: &'static str = "users";

    fn assign(&self, set: &mut UpdateSet) {
        set.set("is_creator", &self.is_creator)
            .set("is_verified", &self.is_verified)
            .set("role", &self.role);
    }
}

/// Keyed by `user_id`; the row is ensured before the update runs
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PreferencesPatch {
    #[serde(alias = "contentLanguage")]
    pub content_language: Patch<String>,
    #[serde(alias = "appLanguage")]
    pub app_language: Patch<String>,
    #[serde(alias = "notificationEnabled")]
    pub notification_enabled: Patch<Flag>,
    #[serde(alias = "autoPlay")]
    pub auto_play: Patch<Flag>,
    #[serde(alias = "videoQuality")]
    pub video_quality: Patch<String>,
}

impl PartialUpdate for PreferencesPatch {
    const TABLE: &'static str = "user_preferences";
    const KEY_COLUMN: &'static str = "user_id";

    fn assign(&self, set: &mut UpdateSet) {
        set.set("content_language", &self.content_language)
            .set("app_language", &self.app_language)
            .set("notification_enabled", &self.notification_enabled)
            .set("auto_play", &self.auto_play)
            .set("video_quality", &self.video_quality);
    }
}

/// Creator's own payout details, keyed by `user_id`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreatorProfilePatch {
    #[serde(alias = "popularName")]
    pub popular_name: Patch<String>,
    pub bio: Patch<String>,
    #[serde(alias = "panCard")]
    pub pan_card: Patch<String>,
    #[serde(alias = "bankName")]
    pub bank_name: Patch<String>,
    #[serde(alias = "accountNumber")]
    pub account_number: Patch<String>,
    #[serde(alias = "ifscCode")]
    pub ifsc_code: Patch<String>,
    #[serde(alias = "accountHolderName")]
    pub account_holder_name: Patch<String>,
    #[serde(alias = "upiId")]
    pub upi_id: Patch<String>,
}

impl PartialUpdate for CreatorProfilePatch {
    const TABLE: &'static str = "creator_profiles";
    const KEY_COLUMN: &'static str = "user_id";

    fn assign(&self, set: &mut UpdateSet) {
        set.require("popular_name", &self.popular_name)
            .set("bio", &self.bio)
            .set("pan_card", &self.pan_card)
            .set("bank_name", &self.bank_name)
            .set("account_number", &self.account_number)
            .set("ifsc_code", &self.ifsc_code)
            .set("account_holder_name", &self.account_holder_name)
            .set("upi_id", &self.upi_id);
    }
}

/// Admin monetization switch, keyed by creator profile id
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MonetizationPatch {
    #[serde(alias = "enabled", alias = "isMonetizationEnabled")]
    pub is_monetization_enabled: Patch<Flag>,
    #[serde(alias = "monetizationPercentage")]
    pub monetization_percentage: Patch<Float>,
}

impl PartialUpdate for MonetizationPatch {
    const TABLE: &'static str = "creator_profiles";

    fn assign(&self, set: &mut UpdateSet) {
        set.set("is_monetization_enabled", &self.is_monetization_enabled)
            .require("monetization_percentage", &self.monetization_percentage);
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SongStatusPatch {
    #[serde(alias = "isActive")]
    pub is_active: Patch<Flag>,
    #[serde(alias = "isTrending")]
    pub is_trending: Patch<Flag>,
    #[serde(alias = "isFeatured")]
    pub is_featured: Patch<Flag>,
}

impl PartialUpdate for SongStatusPatch {
    const TABLE: &'static str = "songs";

    fn assign(&self, set: &mut UpdateSet) {
        set.set("is_active", &self.is_active)
            .set("is_trending", &self.is_trending)
            .set("is_featured", &self.is_featured);
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlaylistPatch {
    pub name: Patch<String>,
    pub description: Patch<String>,
    #[serde(alias = "isPublic")]
    pub is_public: Patch<Flag>,
    #[serde(alias = "coverImageUrl")]
    pub cover_image_url: Patch<String>,
}

impl PartialUpdate for PlaylistPatch {
    const TABLE: &'static str = "playlists";

    fn assign(&self, set: &mut UpdateSet) {
        set.require("name", &self.name)
            .set("description", &self.description)
            .set("is_public", &self.is_public)
            .set("cover_image_url", &self.cover_image_url);
    }
}
