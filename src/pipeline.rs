use anyhow::Result;
use tracing::{debug, info};

use crate::crawler::{CrawlOutcome, Crawler, JobRecord};
use crate::fetch::PageFetcher;
use crate::request::SearchRequest;
use crate::table::ResultTable;
use crate::terms::TermFilter;
use crate::text::normalize;

/// Crawl, then keep the postings whose description mentions the requested
/// terms. `None` when the crawl produced no records at all.
pub async fn build_jobs_table<F: PageFetcher>(
    crawler: &Crawler<F>,
    request: &SearchRequest,
) -> Result<Option<ResultTable>> {
    let outcome = crawler.run(request).await?;
    debug!(
        report = ?outcome.report,
        links = ?outcome.surviving_links().collect::<Vec<_>>(),
        "Crawl outcome"
    );
    let CrawlOutcome { records, .. } = outcome;
    if records.is_empty() {
        return Ok(None);
    }

    let Some(terms) = request.terms() else {
        return Ok(Some(ResultTable::new(records)));
    };

    let filter = TermFilter::new(terms, request.require_all_terms())?;
    let total = records.len();
    let kept = filter_records(records, &filter);
    info!(
        "{} of {} postings match {:?} ({})",
        kept.len(),
        total,
        terms,
        if request.require_all_terms() { "all terms" } else { "any term" }
    );

    Ok(Some(ResultTable::new(kept)))
}

fn filter_records(records: Vec<JobRecord>, filter: &TermFilter) -> Vec<JobRecord> {
    records
        .into_iter()
        .filter(|r| filter.matches(&normalize(&r.description)))
        .collect()
}

// ── Tests ──
