use futures::stream::{self, StreamExt};
use tracing::{info, instrument};

use crate::error::FetchError;
use crate::models::Article;
use crate::sources::{NewsSource, SourceId, Sources};

/// Drives discovery and per-article enrichment for any source.
pub struct Pipeline {
    sources: Sources,
    concurrency: usize,
}

impl Pipeline {
    pub fn new(sources: Sources, concurrency: usize) -> Self {
        Self {
            sources,
            concurrency: concurrency.max(1),
        }
    }

    /// Latest articles of one source, in discovery order. Only a failed
    /// listing is an error; broken article pages degrade their own item.
    pub async fn fetch_latest(
        &self,
        id: SourceId,
        limit: Option<usize>,
    ) -> Result<Vec<Article>, FetchError> {
        run(self.sources.get(id), limit, self.concurrency).await
    }
}

#[instrument(level = "info", skip(source), fields(source = %source.id()))]
pub async fn run(
    source: &dyn NewsSource,
    limit: Option<usize>,
    concurrency: usize,
) -> Result<Vec<Article>, FetchError> {
    let discovered = source.discover(limit).await?;
    let total = discovered.len();

    // `buffered` yields in input order whatever the completion order.
    let articles: Vec<Article> = stream::iter(discovered)
        .map(|mut article| async move {
            source.enrich(&mut article).await;
            article
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let degraded = articles
        .iter()
        .filter(|a| a.body_text.starts_with("Error fetching article:"))
        .count();
    info!(total, degraded, "Fetched article details");
    Ok(articles)
}
