use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html};
use tracing::debug;

use crate::error::ExtractError;
use crate::schema::{NamedSelector, Selectors};
use crate::text::strip_non_ascii;

static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d[\d,]*").unwrap());

#[derive(Debug, Clone, PartialEq)]
pub struct JobDetails {
    pub title: String,
    pub company: String,
    pub description: String,
}

/// Absolute posting URLs on a search-results page, in document order.
pub fn extract_links(doc: &Html, selectors: &Selectors, origin: &Url) -> Vec<Url> {
    let mut links = Vec::new();

    for container in doc.select(&selectors.link_container.selector) {
        let Some(href) = container
            .select(&selectors.link_anchor.selector)
            .next()
            .and_then(|a| a.value().attr("href"))
        else {
            debug!("job container without a link, skipping");
            continue;
        };

        match origin.join(href.trim()) {
            Ok(url) => links.push(url),
            Err(e) => debug!("unresolvable job link {:?}: {}", href, e),
        }
    }

    links
}

pub fn extract_details(doc: &Html, selectors: &Selectors) -> Result<JobDetails, ExtractError> {
    let title = text_of(doc, &selectors.title)?;
    let company = text_of(doc, &selectors.company)?;
    let description = text_of(doc, &selectors.description)?;

    Ok(JobDetails {
        title: strip_non_ascii(&title),
        company: company.trim().to_string(),
        description: strip_non_ascii(description.trim()),
    })
}

/// Total hit count reported by the site, e.g. "Page 1 of 1,234 jobs" -> 1234.
pub fn read_result_count(doc: &Html, selectors: &Selectors) -> Result<usize, ExtractError> {
    let raw = text_of(doc, &selectors.result_count)?;
    let text = strip_non_ascii(&raw);

    let count = NUMBER_RE
        .find_iter(&text)
        .last()
        .and_then(|m| m.as_str().replace(',', "").parse().ok());
    count.ok_or(ExtractError::NotANumber {
        field: selectors.result_count.field,
        text,
    })
}

fn text_of(doc: &Html, named: &NamedSelector) -> Result<String, ExtractError> {
    doc.select(&named.selector)
        .next()
        .map(element_text)
        .ok_or_else(|| ExtractError::Missing {
            field: named.field,
            selector: named.css.clone(),
        })
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect()
}

// ── Tests ──
