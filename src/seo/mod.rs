//! Search/social metadata derived from a video's own fields.
//!
//! Everything here is pure. Missing inputs are omitted from the output
//! rather than rendered as empty placeholders.

use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::config::SeoConfig;
use crate::types::VideoType;

const SLUG_MAX_CHARS: usize = 200;
const TITLE_MAX_CHARS: usize = 60;
const DESCRIPTION_MAX_CHARS: usize = 160;

/// Quality tier that is not worth advertising in titles
const BASELINE_QUALITY: &str = "SD";

// Unicode `\w`: Devanagari titles keep their letters and vowel signs
static NON_SLUG_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s-]").expect("valid regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static HYPHENS: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").expect("valid regex"));

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

/// Stable, counter-free URL slug. Uniqueness is the caller's concern.
pub fn slug(title: &str, year: Option<i64>) -> String {
    let lowered = title.to_lowercase();
    let stripped = NON_SLUG_CHARS.replace_all(lowered.trim(), "");
    let hyphenated = WHITESPACE.replace_all(&stripped, "-");
    let collapsed = HYPHENS.replace_all(&hyphenated, "-");

    let mut slug = truncate(&collapsed, SLUG_MAX_CHARS);
    if let Some(year) = year {
        slug.push_str(&format!("-{}", year));
    }
    slug
}

pub fn seo_title(title: &str, year: Option<i64>, quality: Option<&str>, video_type: VideoType, site: &SeoConfig) -> String {
    let mut out = title.to_string();
    if let Some(year) = year {
        out.push_str(&format!(" ({})", year));
    }
    if let Some(quality) = quality.filter(|q| !q.is_empty() && *q != BASELINE_QUALITY) {
        out.push_str(&format!(" Watch in {}", quality));
    }
    let kind = match video_type {
        VideoType::Reel => "Reel",
        VideoType::Video => "Movie",
    };
    out.push_str(&format!(" {} | {}", kind, site.site_name));
    truncate(&out, TITLE_MAX_CHARS)
}

/// Inputs for description and structured-data synthesis
#[derive(Debug, Clone, Default)]
pub struct VideoMeta<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub video_type: VideoType,
    pub release_year: Option<i64>,
    pub release_date: Option<NaiveDate>,
    pub video_quality: Option<&'a str>,
    pub director: Option<&'a str>,
    pub production_company: Option<&'a str>,
    pub language: Option<&'a str>,
    pub cast: Vec<String>,
    pub tags: Vec<String>,
    pub audio_languages: Vec<String>,
    pub thumbnail_url: Option<&'a str>,
    pub duration: Option<i64>,
    pub rating: Option<f64>,
    pub views_count: i64,
    pub slug: Option<&'a str>,
    pub created_at: Option<DateTime<Utc>>,
}

/// String entries of a JSON list; anything else yields nothing
pub fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => vec![],
    }
}

pub fn seo_description(meta: &VideoMeta<'_>, site: &SeoConfig) -> String {
    let mut out = format!("Watch {}", meta.title);
    if let Some(year) = meta.release_year {
        out.push_str(&format!(" ({})", year));
    }
    if let Some(director) = meta.director.filter(|d| !d.is_empty()) {
        out.push_str(&format!(" directed by {}", director));
    }
    if !meta.cast.is_empty() {
        let leads: Vec<&str> = meta.cast.iter().take(2).map(String::as_str).collect();
        out.push_str(&format!(" starring {}", leads.join(", ")));
    }
    if let Some(quality) = meta.video_quality.filter(|q| !q.is_empty()) {
        out.push_str(&format!(" in {}", quality));
    }
    if !meta.audio_languages.is_empty() {
        out.push_str(&format!(" with {} audio", meta.audio_languages.join(", ")));
    }
    out.push_str(&format!(" on {}", site.site_name));
    truncate(&out, DESCRIPTION_MAX_CHARS)
}

#[derive(Debug, Clone, Serialize)]
pub struct Person {
    #[serde(rename = "@type")]
    kind: &'static str,
    name: String,
}

impl Person {
    fn person(name: &str) -> Self {
        Self { kind: "Person", name: name.to_string() }
    }

    fn organization(name: &str) -> Self {
        Self { kind: "Organization", name: name.to_string() }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRating {
    #[serde(rename = "@type")]
    kind: &'static str,
    rating_value: f64,
    best_rating: &'static str,
    worst_rating: &'static str,
    rating_count: i64,
}

/// schema.org `VideoObject`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredData {
    #[serde(rename = "@context")]
    context: &'static str,
    #[serde(rename = "@type")]
    kind: &'static str,
    pub name: String,
    pub description: String,
    pub thumbnail_url: String,
    pub upload_date: String,
    pub content_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregate_rating: Option<AggregateRating>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub director: Option<Person>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<Vec<Person>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production_company: Option<Person>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_quality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_published: Option<String>,
}

/// Seconds as `PT{m}M{s}S`
pub fn iso_duration(seconds: i64) -> String {
    format!("PT{}M{}S", seconds / 60, seconds % 60)
}

pub fn structured_data(meta: &VideoMeta<'_>, site: &SeoConfig) -> StructuredData {
    let base = site.base_url.trim_end_matches('/');
    let non_empty = |s: Option<&str>| s.filter(|v| !v.is_empty()).map(str::to_string);

    StructuredData {
        context: "https://schema.org",
        kind: "VideoObject",
        name: meta.title.to_string(),
        description: non_empty(meta.description).unwrap_or_else(|| meta.title.to_string()),
        thumbnail_url: non_empty(meta.thumbnail_url).unwrap_or_else(|| format!("{}/default-thumbnail.jpg", base)),
        upload_date: meta.created_at.unwrap_or_else(Utc::now).to_rfc3339(),
        content_url: match meta.slug.filter(|s| !s.is_empty()) {
            Some(slug) => format!("{}/watch/{}", base, slug),
            None => base.to_string(),
        },
        duration: meta.duration.filter(|d| *d > 0).map(iso_duration),
        aggregate_rating: meta.rating.filter(|r| *r > 0.0).map(|rating| AggregateRating {
            kind: "AggregateRating",
            rating_value: rating,
            best_rating: "10",
            worst_rating: "1",
            rating_count: meta.views_count.max(1),
        }),
        director: meta.director.filter(|d| !d.is_empty()).map(Person::person),
        actor: Some(meta.cast.iter().map(|name| Person::person(name)).collect::<Vec<_>>()).filter(|a| !a.is_empty()),
        keywords: Some(meta.tags.join(", ")).filter(|_| !meta.tags.is_empty()),
        production_company: meta.production_company.filter(|p| !p.is_empty()).map(Person::organization),
        video_quality: non_empty(meta.video_quality),
        in_language: non_empty(meta.language),
        date_published: meta
            .release_date
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc().to_rfc3339()),
    }
}

/// SEO columns written alongside a new video
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeoFields {
    pub slug: Option<String>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub og_image: Option<String>,
    pub structured_data: Option<Value>,
}

impl SeoFields {
    /// Fill every field the caller left empty. Open Graph fields fall back
    /// to the SEO title/description and the thumbnail.
    pub fn derive_missing(mut self, meta: &VideoMeta<'_>, site: &SeoConfig) -> Self {
        fn blank(field: &Option<String>) -> bool {
            field.as_deref().map(str::trim).map_or(true, str::is_empty)
        }

        if blank(&self.slug) {
            self.slug = Some(slug(meta.title, meta.release_year));
        }
        if blank(&self.seo_title) {
            self.seo_title = Some(seo_title(
                meta.title,
                meta.release_year,
                meta.video_quality,
                meta.video_type,
                site,
            ));
        }
        if blank(&self.seo_description) {
            self.seo_description = Some(seo_description(meta, site));
        }
        if blank(&self.og_title) {
            self.og_title = self.seo_title.clone();
        }
        if blank(&self.og_description) {
            self.og_description = self.seo_description.clone();
        }
        if blank(&self.og_image) {
            self.og_image = meta.thumbnail_url.map(str::to_string);
        }
        if self.structured_data.as_ref().map_or(true, Value::is_null) {
            let meta = VideoMeta { slug: self.slug.as_deref(), ..meta.clone() };
            self.structured_data = serde_json::to_value(structured_data(&meta, site)).ok();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SeoConfig {
        SeoConfig::default()
    }

    #[test]
    fn slug_strips_punctuation_and_appends_year() {
        assert_eq!(slug("Elephants Dream!", Some(2006)), "elephants-dream-2006");
        assert_eq!(slug("  Big   Buck -- Bunny ", None), "big-buck-bunny");
    }

    #[test]
    fn slug_is_stable_and_bounded() {
        let long = "a".repeat(500);
        assert_eq!(slug(&long, None).chars().count(), 200);
        assert_eq!(slug("Sintel", Some(2010)), slug("Sintel", Some(2010)));
    }

    #[test]
    fn slug_keeps_devanagari_letters() {
        assert_eq!(slug("मैथिली गीत", None), "मैथिली-गीत");
        assert_eq!(slug("गीत! (Live)", Some(2024)), "गीत-live-2024");
    }

    #[test]
    fn seo_title_for_sintel() {
        let title = seo_title("Sintel", Some(2010), Some("HD"), VideoType::Video, &site());
        assert!(title.contains("Sintel (2010)"));
        assert!(title.contains("HD"));
        assert!(title.ends_with("Movie | Tirhuta"));
        assert!(title.chars().count() <= 60);
    }

    #[test]
    fn seo_title_skips_baseline_quality_and_truncates() {
        let title = seo_title("Clip", None, Some("SD"), VideoType::Reel, &site());
        assert_eq!(title, "Clip Reel | Tirhuta");

        let long = seo_title(&"x".repeat(80), Some(2020), Some("4K"), VideoType::Video, &site());
        assert_eq!(long.chars().count(), 60);
    }

    #[test]
    fn description_omits_absent_fields() {
        let meta = VideoMeta { title: "Sintel", ..Default::default() };
        assert_eq!(seo_description(&meta, &site()), "Watch Sintel on Tirhuta");
    }

    #[test]
    fn description_uses_first_two_cast_members() {
        let meta = VideoMeta {
            title: "Sintel",
            release_year: Some(2010),
            director: Some("Colin Levy"),
            cast: vec!["Halina Reijn".into(), "Thom Hoffman".into(), "Extra".into()],
            video_quality: Some("HD"),
            audio_languages: vec!["English".into(), "Maithili".into()],
            ..Default::default()
        };
        assert_eq!(
            seo_description(&meta, &site()),
            "Watch Sintel (2010) directed by Colin Levy starring Halina Reijn, Thom Hoffman \
             in HD with English, Maithili audio on Tirhuta"
        );
    }

    #[test]
    fn structured_data_minimal_fields() {
        let meta = VideoMeta { title: "Sintel", ..Default::default() };
        let data = serde_json::to_value(structured_data(&meta, &site())).unwrap();

        assert_eq!(data["@context"], "https://schema.org");
        assert_eq!(data["@type"], "VideoObject");
        assert_eq!(data["description"], "Sintel");
        assert_eq!(data["thumbnailUrl"], "https://tirhuta.com/default-thumbnail.jpg");
        assert_eq!(data["contentUrl"], "https://tirhuta.com");
        assert!(data["uploadDate"].is_string());
        assert!(data.get("duration").is_none());
        assert!(data.get("aggregateRating").is_none());
        assert!(data.get("actor").is_none());
    }

    #[test]
    fn structured_data_optional_blocks() {
        let meta = VideoMeta {
            title: "Sintel",
            slug: Some("sintel-2010"),
            duration: Some(888),
            rating: Some(8.5),
            views_count: 0,
            cast: vec!["Halina Reijn".into()],
            tags: vec!["fantasy".into(), "dragon".into()],
            production_company: Some("Blender Institute"),
            release_date: NaiveDate::from_ymd_opt(2010, 9, 30),
            ..Default::default()
        };
        let data = serde_json::to_value(structured_data(&meta, &site())).unwrap();

        assert_eq!(data["contentUrl"], "https://tirhuta.com/watch/sintel-2010");
        assert_eq!(data["duration"], "PT14M48S");
        assert_eq!(data["aggregateRating"]["ratingCount"], 1);
        assert_eq!(data["aggregateRating"]["bestRating"], "10");
        assert_eq!(data["actor"][0]["@type"], "Person");
        assert_eq!(data["keywords"], "fantasy, dragon");
        assert_eq!(data["productionCompany"]["@type"], "Organization");
        assert!(data["datePublished"].as_str().unwrap().starts_with("2010-09-30T00:00:00"));
    }

    #[test]
    fn derive_missing_keeps_supplied_values() {
        let meta = VideoMeta {
            title: "Sintel",
            release_year: Some(2010),
            thumbnail_url: Some("https://cdn.example/sintel.jpg"),
            ..Default::default()
        };
        let supplied = SeoFields { slug: Some("custom".into()), ..Default::default() };
        let fields = supplied.derive_missing(&meta, &site());

        assert_eq!(fields.slug.as_deref(), Some("custom"));
        assert_eq!(fields.og_title, fields.seo_title);
        assert_eq!(fields.og_image.as_deref(), Some("https://cdn.example/sintel.jpg"));
        let data = fields.structured_data.unwrap();
        assert_eq!(data["contentUrl"], "https://tirhuta.com/watch/custom");
    }
}
