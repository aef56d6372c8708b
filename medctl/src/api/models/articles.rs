//! API request/response models for health resource articles.

use crate::db::models::articles::ArticleDBResponse;
use crate::types::ArticleId;
use crate::validation::{FieldSpec, Format, parse_timestamp};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};
use utoipa::ToSchema;

/// Article categories. Hyphenated spellings are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum ArticleCategory {
    #[serde(rename = "nutrition")]
    Nutrition,
    #[serde(rename = "mental health", alias = "mental-health")]
    MentalHealth,
    #[serde(rename = "disease prevention", alias = "disease-prevention")]
    DiseasePrevention,
}

impl ArticleCategory {
    /// Every spelling accepted on input
    pub const ACCEPTED: &'static [&'static str] = &[
        "nutrition",
        "mental health",
        "disease prevention",
        "mental-health",
        "disease-prevention",
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleCategory::Nutrition => "nutrition",
            ArticleCategory::MentalHealth => "mental health",
            ArticleCategory::DiseasePrevention => "disease prevention",
        }
    }
}

/// Request body for publishing an article, also used to fully replace one.
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
pub struct ArticleCreate {
    /// Image URL or path
    #[schema(example = "https://cdn.example.com/images/hydration.jpg")]
    pub image: String,
    #[schema(example = "Staying hydrated in hot weather")]
    pub title: String,
    pub category: ArticleCategory,
    #[schema(example = "Dr. A. Fernando")]
    pub author: String,
    /// RFC 3339 timestamp or `YYYY-MM-DD`; defaults to the creation time
    #[serde(default, deserialize_with = "deserialize_publish_date")]
    #[schema(value_type = Option<String>, example = "2025-03-14")]
    pub publish_date: Option<DateTime<Utc>>,
    pub content: String,
}

pub type ArticleUpdate = ArticleCreate;

impl ArticleCreate {
    pub const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::truthy("image"),
        FieldSpec::truthy("title"),
        FieldSpec::truthy("category").with(&[Format::OneOf(ArticleCategory::ACCEPTED)]),
        FieldSpec::truthy("author"),
        FieldSpec::optional("publish_date").with(&[Format::Timestamp]),
        FieldSpec::truthy("content"),
    ];
}

fn deserialize_publish_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|raw| parse_timestamp(&raw).ok_or_else(|| de::Error::custom(format!("invalid publish_date: {raw}"))))
        .transpose()
}

/// A stored article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArticleResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: ArticleId,
    pub image: String,
    pub title: String,
    pub category: ArticleCategory,
    pub author: String,
    #[serde(rename = "publish_date")]
    pub publish_date: DateTime<Utc>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ArticleDBResponse> for ArticleResponse {
    fn from(db: ArticleDBResponse) -> Self {
        Self {
            id: db.id,
            image: db.data.image,
            title: db.data.title,
            category: db.data.category,
            author: db.data.author,
            publish_date: db.data.publish_date,
            content: db.data.content,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// Number of articles in a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategoryCount {
    #[schema(example = "nutrition")]
    pub category: String,
    #[schema(example = 4)]
    pub count: i64,
}
