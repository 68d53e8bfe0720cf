use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Url;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::DetailError;
use crate::extract::{extract_details, extract_links, read_result_count};
use crate::fetch::PageFetcher;
use crate::request::SearchRequest;
use crate::schema::Site;

/// Results per search-results page on the target site.
pub const PAGE_SIZE: usize = 10;
/// Granularity of `num_jobs` ("15 recent jobs").
const JOBS_PER_BATCH: usize = 15;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobRecord {
    pub title: String,
    pub company: String,
    pub description: String,
    pub link: String,
}

/// Counters for one crawl, logged when it finishes.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CrawlReport {
    pub pages: usize,
    pub page_errors: usize,
    pub links: usize,
    pub ok: usize,
    pub fetch_errors: usize,
    pub extract_errors: usize,
}

pub struct CrawlOutcome {
    /// Every record carries the link it came from, so records and surviving
    /// links can't drift apart.
    pub records: Vec<JobRecord>,
    pub report: CrawlReport,
}

impl CrawlOutcome {
    pub fn surviving_links(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.link.as_str())
    }
}

/// `num_jobs` -> number of search results to page through.
pub fn page_budget_for(target_count: usize) -> usize {
    (target_count / JOBS_PER_BATCH) * PAGE_SIZE
}

pub struct Crawler<F> {
    fetcher: F,
    site: Site,
    progress: bool,
}

impl<F: PageFetcher> Crawler<F> {
    pub fn new(fetcher: F, site: Site) -> Self {
        Crawler {
            fetcher,
            site,
            progress: false,
        }
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub async fn run(&self, request: &SearchRequest) -> Result<CrawlOutcome> {
        let mut report = CrawlReport::default();

        let budget = self.page_budget(request).await?;
        info!("Page budget for {:?}: {} results", request.query(), budget);

        let links = self.collect_links(request, budget, &mut report).await;
        report.links = links.len();

        if links.is_empty() {
            info!("No job links found for {:?}", request.query());
            return Ok(CrawlOutcome {
                records: Vec::new(),
                report,
            });
        }

        let records = self.collect_records(&links, &mut report).await;
        info!(
            "Crawl finished: {} pages ({} failed), {} links, {} records ({} fetch errors, {} extraction errors)",
            report.pages,
            report.page_errors,
            report.links,
            report.ok,
            report.fetch_errors,
            report.extract_errors
        );

        Ok(CrawlOutcome { records, report })
    }

    /// Fixed from `num_jobs` when given, else discovered from the first
    /// results page. Discovery failure aborts the run.
    pub async fn page_budget(&self, request: &SearchRequest) -> Result<usize> {
        if let Some(n) = request.target_count() {
            return Ok(page_budget_for(n));
        }

        let url = self
            .site
            .search_url(request.query(), request.sort_order(), 0)?;
        let doc = self
            .fetcher
            .fetch_static(&url)
            .await
            .context("Failed to fetch the first results page")?;
        let total = read_result_count(&doc, &self.site.selectors)
            .context("Failed to read the total result count")?;
        info!("Site reports {} results", total);

        Ok(total - total % PAGE_SIZE)
    }

    /// Walk every results page below `budget`. Always `budget / PAGE_SIZE`
    /// fetches, whatever each page yields.
    pub async fn collect_links(
        &self,
        request: &SearchRequest,
        budget: usize,
        report: &mut CrawlReport,
    ) -> Vec<Url> {
        let pb = self.progress_bar(budget / PAGE_SIZE, "links");
        let mut links = Vec::new();
        let mut last_offset = None;

        for offset in (0..budget).step_by(PAGE_SIZE) {
            report.pages += 1;
            last_offset = Some(offset);

            match self.fetch_page_links(request, offset).await {
                Ok(found) => {
                    info!("offset {}: {} links", offset, found.len());
                    links.extend(found);
                }
                Err(e) => {
                    report.page_errors += 1;
                    warn!("Results page at offset {} failed: {:#}", offset, e);
                }
            }
            pb.inc(1);
        }
        pb.finish_and_clear();

        if budget > 0 && last_offset == Some(budget - PAGE_SIZE) {
            info!("Pagination complete: reached offset {}", budget - PAGE_SIZE);
        } else {
            warn!(
                "Pagination incomplete: last offset {:?}, budget {}",
                last_offset, budget
            );
        }

        links
    }

    async fn fetch_page_links(&self, request: &SearchRequest, offset: usize) -> Result<Vec<Url>> {
        let url = self
            .site
            .search_url(request.query(), request.sort_order(), offset)?;
        let doc = self.fetcher.fetch_rendered(&url).await?;
        Ok(extract_links(&doc, &self.site.selectors, &self.site.origin))
    }

    /// One record per link that renders and parses; the rest are logged and
    /// dropped.
    pub async fn collect_records(&self, links: &[Url], report: &mut CrawlReport) -> Vec<JobRecord> {
        let pb = self.progress_bar(links.len(), "postings");
        let mut records = Vec::with_capacity(links.len());

        for (i, link) in links.iter().enumerate() {
            match self.fetch_record(link).await {
                Ok(record) => {
                    report.ok += 1;
                    records.push(record);
                }
                Err(e) => {
                    match e {
                        DetailError::Fetch(_) => report.fetch_errors += 1,
                        DetailError::Extract(_) => report.extract_errors += 1,
                    }
                    error!("Skipping job #{} ({}): {}", i, link, e);
                }
            }
            pb.inc(1);
        }
        pb.finish_and_clear();

        records
    }

    async fn fetch_record(&self, link: &Url) -> Result<JobRecord, DetailError> {
        let doc = self.fetcher.fetch_rendered(link).await?;
        let details = extract_details(&doc, &self.site.selectors)?;
        Ok(JobRecord {
            title: details.title,
            company: details.company,
            description: details.description,
            link: link.to_string(),
        })
    }

    fn progress_bar(&self, len: usize, what: &str) -> ProgressBar {
        if !self.progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{msg:>9} [{elapsed_precise}] {bar:40} {pos}/{len} (eta {eta})")
        {
            pb.set_style(style.progress_chars("=> "));
        }
        pb.set_message(what.to_string());
        pb
    }
}

// ── Tests ──

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use scraper::Html;

    use super::*;
    use crate::error::FetchError;
    use crate::request::SortOrder;
    use crate::schema::SiteConfig;

    /// Serves fixture markup by URL and records every call.
    #[derive(Default)]
    pub(crate) struct FakeFetcher {
        pages: HashMap<String, String>,
        pub static_calls: RefCell<Vec<String>>,
        pub rendered_calls: RefCell<Vec<String>>,
    }

    impl FakeFetcher {
        pub fn page(mut self, url: &str, html: &str) -> Self {
            self.pages.insert(url.to_string(), html.to_string());
            self
        }

        fn serve(&self, url: &Url) -> Result<Html, FetchError> {
            self.pages
                .get(url.as_str())
                .map(|html| Html::parse_document(html))
                .ok_or(FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                })
        }
    }

    impl PageFetcher for &FakeFetcher {
        async fn fetch_static(&self, url: &Url) -> Result<Html, FetchError> {
            self.static_calls.borrow_mut().push(url.to_string());
            self.serve(url)
        }

        async fn fetch_rendered(&self, url: &Url) -> Result<Html, FetchError> {
            self.rendered_calls.borrow_mut().push(url.to_string());
            self.serve(url)
        }
    }

    pub(crate) fn site() -> Site {
        Site::from_config(&SiteConfig::default()).unwrap()
    }

    pub(crate) fn search(offset: usize) -> String {
        format!("https://il.indeed.com/jobs?q=rust&l=israel&sort=date&start={offset}")
    }

    pub(crate) fn results_page(ids: &[&str]) -> String {
        let items: String = ids
            .iter()
            .map(|id| format!(r#"<div class="title"><a href="/viewjob?jk={id}">{id}</a></div>"#))
            .collect();
        format!("<html><body>{items}</body></html>")
    }

    pub(crate) fn job_page(title: &str, company: &str, description: &str) -> String {
        format!(
            r#"<html><body><h3>{title}</h3><div class="icl-u-xs-mr--xs">{company}</div>
            <div class="jobsearch-jobDescriptionText">{description}</div></body></html>"#
        )
    }

    pub(crate) fn job_url(id: &str) -> String {
        format!("https://il.indeed.com/viewjob?jk={id}")
    }

    fn request(target: Option<usize>) -> SearchRequest {
        SearchRequest::new("rust", None, target, SortOrder::Date, false).unwrap()
    }

    #[test]
    fn budget_rounding() {
        assert_eq!(page_budget_for(15), 10);
        assert_eq!(page_budget_for(29), 10);
        assert_eq!(page_budget_for(30), 20);
        assert_eq!(page_budget_for(100), 60);
    }

    #[tokio::test]
    async fn fifteen_jobs_is_one_page() {
        let fetcher = FakeFetcher::default().page(&search(0), &results_page(&[]));
        let crawler = Crawler::new(&fetcher, site());
        let mut report = CrawlReport::default();

        let budget = crawler.page_budget(&request(Some(15))).await.unwrap();
        assert_eq!(budget, 10);
        crawler.collect_links(&request(Some(15)), budget, &mut report).await;

        assert_eq!(*fetcher.rendered_calls.borrow(), vec![search(0)]);
        assert!(fetcher.static_calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn pagination_never_stops_early() {
        // offset 10 is empty and offset 20 is missing entirely
        let fetcher = FakeFetcher::default()
            .page(&search(0), &results_page(&["a", "b"]))
            .page(&search(10), &results_page(&[]))
            .page(&search(30), &results_page(&["c"]));
        let crawler = Crawler::new(&fetcher, site());
        let mut report = CrawlReport::default();

        let links = crawler.collect_links(&request(Some(60)), 40, &mut report).await;

        assert_eq!(fetcher.rendered_calls.borrow().len(), 4);
        assert_eq!(report.pages, 4);
        assert_eq!(report.page_errors, 1);
        let links: Vec<String> = links.into_iter().map(String::from).collect();
        assert_eq!(links, vec![job_url("a"), job_url("b"), job_url("c")]);
    }

    #[tokio::test]
    async fn thirty_jobs_is_two_pages() {
        let fetcher = FakeFetcher::default()
            .page(&search(0), &results_page(&["a"]))
            .page(&search(10), &results_page(&["a"]))
            .page(&job_url("a"), &job_page("Dev", "Acme", "rust"));
        let crawler = Crawler::new(&fetcher, site());

        let outcome = crawler.run(&request(Some(30))).await.unwrap();

        assert_eq!(outcome.report.pages, 2);
        // duplicates are kept
        assert_eq!(outcome.report.links, 2);
        assert_eq!(outcome.records.len(), 2);
    }

    #[tokio::test]
    async fn failed_postings_are_skipped() {
        let fetcher = FakeFetcher::default()
            .page(&search(0), &results_page(&["a", "b", "c", "d"]))
            .page(&job_url("a"), &job_page("A", "Acme", "one"))
            .page(&job_url("c"), &job_page("C", "Initech", "three"))
            .page(&job_url("d"), "<html><body><h3>no company</h3></body></html>");
        let crawler = Crawler::new(&fetcher, site());

        let outcome = crawler.run(&request(Some(15))).await.unwrap();

        let titles: Vec<&str> = outcome.records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "C"]);
        let links: Vec<&str> = outcome.surviving_links().collect();
        assert_eq!(links, vec![job_url("a"), job_url("c")]);
        assert_eq!(outcome.records.len(), links.len());
        assert_eq!(outcome.report.fetch_errors, 1);
        assert_eq!(outcome.report.extract_errors, 1);
        assert_eq!(outcome.report.ok, 2);
    }

    #[tokio::test]
    async fn no_links_skips_details() {
        let fetcher = FakeFetcher::default().page(&search(0), &results_page(&[]));
        let crawler = Crawler::new(&fetcher, site());

        let outcome = crawler.run(&request(Some(15))).await.unwrap();

        assert!(outcome.records.is_empty());
        assert_eq!(fetcher.rendered_calls.borrow().len(), 1);
    }

    #[tokio::test]
    async fn budget_discovered_from_first_page() {
        let fetcher = FakeFetcher::default().page(
            &search(0),
            r#"<div id="searchCountPages">Page 1 of 37 jobs</div>"#,
        );
        let crawler = Crawler::new(&fetcher, site());

        let budget = crawler.page_budget(&request(None)).await.unwrap();

        assert_eq!(budget, 30);
        assert_eq!(*fetcher.static_calls.borrow(), vec![search(0)]);
    }

    #[tokio::test]
    async fn discovery_failure_is_fatal() {
        let fetcher = FakeFetcher::default();
        let crawler = Crawler::new(&fetcher, site());

        assert!(crawler.run(&request(None)).await.is_err());
        assert!(fetcher.rendered_calls.borrow().is_empty());
    }
}
