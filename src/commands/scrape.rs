use anyhow::Result;
use std::path::Path;

use tripdesk::app::App;
use tripdesk::config::{FetchMode, SinkLayout, StorageConfig};
use tripdesk::crawler::{HarvestReport, Harvester};
use tripdesk::models::{ContentId, SearchResult, UrlRow};
use tripdesk::parser::SerpFormat;
use tripdesk::storage::{CsvSink, DedupBuffer, SinkRecord};
use tripdesk::utils::truncate_text;

use super::report_failure;

const NO_RESULTS: &str = "⚠ No results (blocked page or unknown markup?), nothing saved";

/// Per-run overrides for a scrape
#[derive(Debug, Clone, Default)]
pub struct ScrapeOptions {
    pub keyword: String,
    pub top: Option<usize>,
    pub direct: bool,
    pub no_save: bool,
    pub format: Option<SerpFormat>,
    pub link_to: Option<ContentId>,
}

impl ScrapeOptions {
    fn overrides_config(&self) -> bool {
        self.top.is_some() || self.direct || self.format.is_some()
    }
}

pub async fn scrape(app: &App, options: ScrapeOptions) -> Result<()> {
    let keyword = options.keyword.trim();
    if keyword.is_empty() {
        println!("Enter a keyword to search");
        return Ok(());
    }

    let mut scraper = app.config.scraper.clone();
    if let Some(top) = options.top {
        scraper.top_n = top;
    }
    if options.direct {
        scraper.mode = FetchMode::Direct;
    }
    if let Some(format) = options.format {
        scraper.extraction = format;
    }

    let custom;
    let harvester = if options.overrides_config() {
        custom = Harvester::new(&scraper)?;
        &custom
    } else {
        &app.harvester
    };

    println!("Searching: {keyword}");

    let results = if options.no_save {
        match harvester.search(keyword).await {
            Ok(results) => results,
            Err(e) => {
                report_failure("search", &e);
                return Ok(());
            }
        }
    } else {
        let outcome = match app.config.storage.layout {
            SinkLayout::Rich => harvest_into::<SearchResult>(harvester, keyword, &app.config.storage).await,
            SinkLayout::Minimal => harvest_into::<UrlRow>(harvester, keyword, &app.config.storage).await,
        };
        match outcome {
            Ok(report) => {
                if let Some(line) = save_summary(&report, &app.config.storage.csv_path) {
                    println!("{line}");
                }
                report.results
            }
            Err(e) => {
                report_failure("scrape", &e);
                return Ok(());
            }
        }
    };

    if results.is_empty() {
        println!("{NO_RESULTS}");
        return Ok(());
    }

    print_results(&results);

    if let Some(parent_id) = options.link_to {
        let report = Harvester::publish_sources(
            &results,
            parent_id,
            &scraper.source_type,
            &app.content,
            &app.relations,
        )
        .await;

        for outcome in &report.outcomes {
            match (&outcome.result, outcome.item) {
                (Ok(()), Some(item)) => println!("✓ {} -> {item} linked to {parent_id}", outcome.link),
                (Ok(()), None) => println!("✓ {}", outcome.link),
                (Err(msg), _) => println!("✗ {}: {msg}", outcome.link),
            }
        }
    }

    Ok(())
}

/// Line reporting what reached the sink; `None` when nothing was extracted
fn save_summary(report: &HarvestReport, path: &Path) -> Option<String> {
    if report.results.is_empty() {
        return None;
    }
    Some(format!(
        "✓ saved to {} ({} new, {} already seen)",
        path.display(),
        report.added,
        report.duplicates
    ))
}

async fn harvest_into<R>(
    harvester: &Harvester,
    keyword: &str,
    storage: &StorageConfig,
) -> tripdesk::error::Result<HarvestReport>
where
    R: SinkRecord + for<'a> From<&'a SearchResult>,
{
    let mut buffer: DedupBuffer<R> =
        DedupBuffer::new(CsvSink::new(&storage.csv_path), storage.flush_threshold);
    if storage.seed_seen_from_sink {
        buffer.seed_from_sink()?;
    }

    let report = harvester.harvest(keyword, &mut buffer).await?;
    buffer.close()?;
    Ok(report)
}

fn print_results(results: &[SearchResult]) {
    println!("\n{:>2}  {:<50}  link", "#", "title");
    for result in results {
        println!(
            "{:>2}  {:<50}  {}",
            result.rank,
            truncate_text(&result.title, 50),
            result.link
        );
    }
}
