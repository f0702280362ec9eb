//! Search result harvesting
//!
//! A [`Harvester`] turns a keyword into ranked [`SearchResult`]s: it builds
//! the search URL, fetches the page (through the proxy or directly), and
//! runs the [`ResultExtractor`]. Results can then be pushed into a
//! [`DedupBuffer`] or published as linked content items.

pub mod fetcher;
pub mod headers;
pub mod proxy;

pub use fetcher::SerpFetcher;
pub use proxy::ProxyGateway;

use serde_json::json;
use url::Url;

use crate::config::ScraperConfig;
use crate::error::Result;
use crate::models::{ContentId, NewContent, Relation, RelationContext, SearchResult};
use crate::parser::serp::ResultExtractor;
use crate::storage::{DedupBuffer, SinkRecord};
use crate::wp::{ContentClient, RelationClient};

/// Outcome of one harvest run
#[derive(Debug, Clone)]
pub struct HarvestReport {
    pub keyword: String,
    /// Everything extracted, in rank order
    pub results: Vec<SearchResult>,
    /// Records accepted by the buffer
    pub added: usize,
    /// Records the buffer had already seen
    pub duplicates: usize,
}

/// Outcome of publishing one result as a content item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOutcome {
    pub link: String,
    /// Created item, if creation got that far
    pub item: Option<ContentId>,
    pub result: std::result::Result<(), String>,
}

/// Per-result outcomes of [`Harvester::publish_sources`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub parent_id: ContentId,
    pub outcomes: Vec<PublishOutcome>,
}

impl PublishReport {
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    pub fn linked(&self) -> Vec<ContentId> {
        self.outcomes
            .iter()
            .filter(|o| o.result.is_ok())
            .filter_map(|o| o.item)
            .collect()
    }
}

/// Keyword -> search results pipeline
pub struct Harvester {
    fetcher: SerpFetcher,
    extractor: ResultExtractor,
    search_url: String,
    language: String,
    top_n: usize,
}

impl Harvester {
    /// Create a harvester from configuration
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        Ok(Self::with_parts(
            SerpFetcher::new(config)?,
            ResultExtractor::new().with_format(config.extraction),
            &config.search_url,
            &config.language,
            config.top_n,
        ))
    }

    pub fn with_parts(
        fetcher: SerpFetcher,
        extractor: ResultExtractor,
        search_url: &str,
        language: &str,
        top_n: usize,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            search_url: search_url.to_string(),
            language: language.to_string(),
            top_n,
        }
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    /// Search engine URL for `keyword`
    pub fn search_url(&self, keyword: &str) -> Result<Url> {
        let num = self.top_n.to_string();
        let url = Url::parse_with_params(
            &self.search_url,
            &[
                ("q", keyword),
                ("num", num.as_str()),
                ("hl", self.language.as_str()),
            ],
        )?;
        Ok(url)
    }

    /// Top results for `keyword`, ranked from 1
    ///
    /// A blank keyword returns no results without sending a request. A page
    /// with no recognisable results is also an empty list, not an error.
    pub async fn search(&self, keyword: &str) -> Result<Vec<SearchResult>> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            tracing::warn!("Empty keyword, nothing to search");
            return Ok(Vec::new());
        }

        let url = self.search_url(keyword)?;
        let html = self.fetcher.fetch(url.as_str()).await?;
        let links = self.extractor.extract(&html, self.top_n);

        let results: Vec<SearchResult> = links
            .into_iter()
            .enumerate()
            .map(|(i, extracted)| {
                let title = extracted.title.as_deref().unwrap_or(&extracted.link);
                SearchResult::new(keyword, title, &extracted.link, i + 1)
            })
            .collect();

        if results.is_empty() {
            tracing::warn!(keyword, "No results extracted (blocked page or unknown markup?)");
        } else {
            tracing::info!(keyword, count = results.len(), "Search results extracted");
        }

        Ok(results)
    }

    /// Search and feed every result into `buffer`
    pub async fn harvest<R>(&self, keyword: &str, buffer: &mut DedupBuffer<R>) -> Result<HarvestReport>
    where
        R: SinkRecord + for<'a> From<&'a SearchResult>,
    {
        let results = self.search(keyword).await?;

        let mut added = 0;
        let mut duplicates = 0;
        for result in &results {
            if buffer.add(R::from(result))? {
                added += 1;
            } else {
                duplicates += 1;
            }
        }

        tracing::info!(keyword, added, duplicates, "Harvested into buffer");

        Ok(HarvestReport {
            keyword: keyword.trim().to_string(),
            results,
            added,
            duplicates,
        })
    }

    /// Create one `source_type` item per result and link it under `parent_id`
    ///
    /// Each result is handled independently; a failure is recorded and the
    /// next result is processed.
    pub async fn publish_sources(
        results: &[SearchResult],
        parent_id: ContentId,
        source_type: &str,
        content: &ContentClient,
        relations: &RelationClient,
    ) -> PublishReport {
        let mut outcomes = Vec::with_capacity(results.len());

        for result in results {
            let item = NewContent::new(result.title.clone(), "draft")
                .with_field("meta", json!({ "source_url": result.link }));

            let outcome = match content.create(source_type, &item).await {
                Ok(created) => {
                    let relation = Relation::new(parent_id, created.id, RelationContext::Child);
                    PublishOutcome {
                        link: result.link.clone(),
                        item: Some(created.id),
                        result: relations
                            .try_create_relation(&relation)
                            .await
                            .map_err(|e| e.user_message()),
                    }
                }
                Err(e) => PublishOutcome {
                    link: result.link.clone(),
                    item: None,
                    result: Err(e.user_message()),
                },
            };

            if let Err(msg) = &outcome.result {
                tracing::error!(link = %outcome.link, error = %msg, "Failed to publish source");
            }
            outcomes.push(outcome);
        }

        PublishReport {
            parent_id,
            outcomes,
        }
    }
}
