use serde::{Deserialize, Serialize};

use crate::sources::SourceId;

/// One normalized article, whatever portal it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    pub source: SourceId,
    pub title: String,
    /// Always absolute.
    pub url: String,
    /// Heading as printed on the article page, when the page was scraped.
    pub heading: String,
    pub summary: Option<String>,
    pub category: Option<String>,
    /// RFC 3339 UTC, empty when unknown.
    pub published_at: String,
    /// Absolute, empty when no image was found.
    pub image_url: String,
    /// Paragraphs joined by a blank line.
    pub body_text: String,
}

impl Article {
    pub fn new(source: SourceId, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            source,
            title: title.into(),
            url: url.into(),
            heading: String::new(),
            summary: None,
            category: None,
            published_at: String::new(),
            image_url: String::new(),
            body_text: String::new(),
        }
    }
}

/// A (title, url) pair found on a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub title: String,
    pub url: String,
}

/// Fields scraped from a single article page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleDetail {
    pub heading: String,
    pub published_at: String,
    pub image_url: String,
    pub body_text: String,
}

impl ArticleDetail {
    /// Record returned when the page could not be fetched or parsed.
    pub fn failed(reason: impl std::fmt::Display) -> Self {
        Self {
            body_text: format!("Error fetching article: {}", reason),
            ..Self::default()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LatestQuery {
    pub limit: Option<usize>,
}
