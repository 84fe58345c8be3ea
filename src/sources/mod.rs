//! Per-portal adapters.
//!
//! Every portal is reached differently, but each one answers the same two
//! questions: which articles are current ([`NewsSource::discover`]) and what
//! is on each article's page ([`NewsSource::enrich`]).
//!
//! | Source | Module | Discovery | Image |
//! |--------|--------|-----------|-------|
//! | The Daily Star | [`daily_star`] | HTML listing page | picked from the article page |
//! | Prothom Alo | [`prothom_alo`] | paged JSON API | CDN key in the JSON |
//! | Ittefaq | [`ittefaq`] | JSON carrying an HTML fragment | JSON blob in a `data-ari` attribute |

pub mod daily_star;
pub mod ittefaq;
pub mod prothom_alo;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::FetchError;
use crate::http::HttpClient;
use crate::models::{Article, ArticleDetail};

pub use daily_star::DailyStar;
pub use ittefaq::Ittefaq;
pub use prothom_alo::ProthomAlo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceId {
    DailyStar,
    ProthomAlo,
    Ittefaq,
}

impl SourceId {
    pub const ALL: [SourceId; 3] = [SourceId::DailyStar, SourceId::ProthomAlo, SourceId::Ittefaq];

    pub fn as_str(self) -> &'static str {
        match self {
            SourceId::DailyStar => "daily-star",
            SourceId::ProthomAlo => "prothom-alo",
            SourceId::Ittefaq => "ittefaq",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            SourceId::DailyStar => "The Daily Star",
            SourceId::ProthomAlo => "Prothom Alo",
            SourceId::Ittefaq => "Ittefaq",
        }
    }

    /// Limit applied when the caller gives none. `None` means everything
    /// the upstream listing returned.
    pub fn default_limit(self) -> Option<usize> {
        match self {
            SourceId::DailyStar | SourceId::ProthomAlo => Some(10),
            SourceId::Ittefaq => None,
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown source '{0}'")]
pub struct UnknownSource(pub String);

impl FromStr for SourceId {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily-star" | "dailystar" => Ok(SourceId::DailyStar),
            "prothom-alo" | "prothomalo" => Ok(SourceId::ProthomAlo),
            "ittefaq" => Ok(SourceId::Ittefaq),
            _ => Err(UnknownSource(s.to_string())),
        }
    }
}

#[async_trait]
pub trait NewsSource: Send + Sync {
    fn id(&self) -> SourceId;

    /// Ordered, de-duplicated articles with whatever the listing carries.
    /// Fails only when the listing itself cannot be fetched or read.
    async fn discover(&self, limit: Option<usize>) -> Result<Vec<Article>, FetchError>;

    /// Fill in what only the article page has. Never fails; a broken page
    /// leaves an explanatory note in `body_text`.
    async fn enrich(&self, article: &mut Article);
}

/// Merge scraped page fields into a listed article. Listing data wins where
/// both have a value.
///
/// A failed page fetch still keeps what the listing supplied (image, time,
/// section); only `heading` and `body_text` come from the failed detail.
pub(crate) fn apply_detail(article: &mut Article, detail: ArticleDetail) {
    article.heading = detail.heading;
    article.body_text = detail.body_text;
    if article.published_at.is_empty() {
        article.published_at = detail.published_at;
    }
    if article.image_url.is_empty() {
        article.image_url = detail.image_url;
    }
}

/// The three adapters, constructed once and looked up by id.
pub struct Sources {
    daily_star: DailyStar,
    prothom_alo: ProthomAlo,
    ittefaq: Ittefaq,
}

impl Sources {
    pub fn new(http: HttpClient) -> Self {
        Self {
            daily_star: DailyStar::new(http.clone()),
            prothom_alo: ProthomAlo::new(http.clone()),
            ittefaq: Ittefaq::new(http),
        }
    }

    pub fn get(&self, id: SourceId) -> &dyn NewsSource {
        match id {
            SourceId::DailyStar => &self.daily_star,
            SourceId::ProthomAlo => &self.prothom_alo,
            SourceId::Ittefaq => &self.ittefaq,
        }
    }
}
