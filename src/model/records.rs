//! Persisted record types
//!
//! `NovelRecord` serializes to `<slug>/metadata.json`, `GenreRecord` into
//! the shared `genres.json` array. Chapters are persisted as plain-text
//! artifacts only, so `ChapterRecord` stays a plain in-memory struct.
//! Date fields use the `{"$date": "..."}` wire format of the downstream
//! content service importer.

use chrono::NaiveDateTime;
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::text::{chapter_body, safe_filename};

/// Class marker the downstream importer expects on novel documents
pub const NOVEL_CLASS: &str = "com.content.content_service.models.NovelEntity";

/// Class marker the downstream importer expects on genre documents
pub const GENRE_CLASS: &str = "com.content.content_service.models.GenreEntity";

/// Placeholder account id attached to every scraped novel
pub const DEFAULT_AUTHOR_ID: &str = "ACC0000125";

const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// A timestamp serialized as `{"$date": "2023-04-01T10:20:30.000Z"}`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JsonDate(pub NaiveDateTime);

impl Serialize for JsonDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("$date", &self.0.format(DATE_FORMAT).to_string())?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for JsonDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Wire {
            #[serde(rename = "$date")]
            date: String,
        }
        let wire = Wire::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&wire.date, DATE_FORMAT)
            .map(JsonDate)
            .map_err(D::Error::custom)
    }
}

/// Full metadata for one novel, rewritten in full on every save
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NovelRecord {
    pub novel_id: String,
    pub title: String,
    pub alt_title: String,
    pub slug: String,
    pub cover_art: String,
    pub author_name: String,
    pub author_id: String,
    pub description: String,
    pub source: String,
    pub language: String,
    pub status: String,
    pub scraped_status: String,
    pub approved: bool,
    pub target_audience: String,
    pub genre_list: Vec<String>,
    pub chapter_list: Vec<String>,
    pub chapter_count: u64,
    pub word_count: u64,
    #[serde(flatten)]
    pub metrics: NovelMetrics,
    #[serde(rename = "_class")]
    pub class: String,
}

/// Synthesized engagement metrics and timestamps for a novel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NovelMetrics {
    pub rating_average: f64,
    pub total_rating: u64,
    pub total_likes: u64,
    pub total_views: u64,
    pub total_comments: u64,
    pub total_upvotes: u64,
    pub total_follow: u64,
    pub views_today: u64,
    pub views_this_week: u64,
    pub views_this_month: u64,
    pub views_this_year: u64,
    pub publication_date: JsonDate,
    pub created: JsonDate,
    pub updated: JsonDate,
}

/// One discovered chapter. Created and persisted exactly once; the
/// sequence `number` is the 1-based position in the probe sequence, not
/// whatever number the source page happens to print.
#[derive(Debug, Clone)]
pub struct ChapterRecord {
    pub id: String,
    pub novel_id: String,
    pub number: u32,
    pub title: String,
    pub content: String,
    pub plain_text: Option<String>,
    pub word_count: u64,
}

impl ChapterRecord {
    /// Artifact filename: `<seq:03d> - <id> - <safe title>.txt`
    pub fn artifact_name(&self) -> String {
        format!(
            "{:03} - {} - {}.txt",
            self.number,
            self.id,
            safe_filename(&self.title)
        )
    }

    /// Artifact body: stored plain text, else tag-stripped content
    pub fn body(&self) -> String {
        chapter_body(self.plain_text.as_deref(), &self.content)
    }
}

/// One deduplicated taxonomy term
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenreRecord {
    pub genre_id: String,
    pub name: String,
    pub description: String,
    pub slug: String,
    pub is_active: bool,
    pub created: JsonDate,
    pub updated: JsonDate,
    #[serde(rename = "_class")]
    pub class: String,
}
