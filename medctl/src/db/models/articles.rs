//! Database models for health resource articles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Record;
use crate::api::models::articles::{ArticleCategory, ArticleCreate};

/// Stored body of an article document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub image: String,
    pub title: String,
    pub category: ArticleCategory,
    pub author: String,
    pub publish_date: DateTime<Utc>,
    pub content: String,
}

/// Database request for creating or replacing an article. A missing publish
/// date defaults to now on create and keeps the stored date on replace.
#[derive(Debug, Clone)]
pub struct ArticleWriteDBRequest {
    pub image: String,
    pub title: String,
    pub category: ArticleCategory,
    pub author: String,
    pub publish_date: Option<DateTime<Utc>>,
    pub content: String,
}

impl From<ArticleCreate> for ArticleWriteDBRequest {
    fn from(api: ArticleCreate) -> Self {
        Self {
            image: api.image,
            title: api.title.trim().to_string(),
            category: api.category,
            author: api.author,
            publish_date: api.publish_date,
            content: api.content,
        }
    }
}

impl ArticleWriteDBRequest {
    pub fn into_article(self, default_publish_date: DateTime<Utc>) -> Article {
        Article {
            image: self.image,
            title: self.title,
            category: self.category,
            author: self.author,
            publish_date: self.publish_date.unwrap_or(default_publish_date),
            content: self.content,
        }
    }
}

pub type ArticleDBResponse = Record<Article>;
