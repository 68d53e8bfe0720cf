use reqwest::Url;
use scraper::Selector;
use serde::Deserialize;

use crate::error::SchemaError;
use crate::request::SortOrder;

/// CSS selectors describing where a job site keeps each piece of data.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PageSchema {
    /// One element per job on a search-results page.
    pub link_container: String,
    /// Anchor inside `link_container` holding the posting href.
    pub link_anchor: String,
    pub title: String,
    pub company: String,
    pub description: String,
    /// Element reporting the total number of search results.
    pub result_count: String,
}

impl Default for PageSchema {
    fn default() -> Self {
        PageSchema {
            link_container: "div.title".into(),
            link_anchor: "a".into(),
            title: "h3".into(),
            company: "div.icl-u-xs-mr--xs".into(),
            description: "div.jobsearch-jobDescriptionText".into(),
            result_count: "#searchCountPages".into(),
        }
    }
}

/// A compiled selector that remembers which field it serves and its CSS text.
#[derive(Debug, Clone)]
pub struct NamedSelector {
    pub field: &'static str,
    pub css: String,
    pub selector: Selector,
}

impl NamedSelector {
    fn parse(field: &'static str, css: &str) -> Result<Self, SchemaError> {
        let selector = Selector::parse(css).map_err(|e| SchemaError {
            field,
            selector: css.to_string(),
            message: e.to_string(),
        })?;
        Ok(NamedSelector {
            field,
            css: css.to_string(),
            selector,
        })
    }
}

/// Parsed selectors, ready to query documents with.
#[derive(Debug, Clone)]
pub struct Selectors {
    pub link_container: NamedSelector,
    pub link_anchor: NamedSelector,
    pub title: NamedSelector,
    pub company: NamedSelector,
    pub description: NamedSelector,
    pub result_count: NamedSelector,
}

impl PageSchema {
    pub fn compile(&self) -> Result<Selectors, SchemaError> {
        Ok(Selectors {
            link_container: NamedSelector::parse("link_container", &self.link_container)?,
            link_anchor: NamedSelector::parse("link_anchor", &self.link_anchor)?,
            title: NamedSelector::parse("title", &self.title)?,
            company: NamedSelector::parse("company", &self.company)?,
            description: NamedSelector::parse("description", &self.description)?,
            result_count: NamedSelector::parse("result_count", &self.result_count)?,
        })
    }
}

/// Where to search and how to read the pages.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Scheme and host; relative posting links are resolved against it.
    pub origin: String,
    pub search_path: String,
    pub location: String,
    pub schema: PageSchema,
}

impl Default for SiteConfig {
    fn default() -> Self {
        SiteConfig {
            origin: "https://il.indeed.com".into(),
            search_path: "/jobs".into(),
            location: "israel".into(),
            schema: PageSchema::default(),
        }
    }
}

/// A `SiteConfig` with its origin and selectors validated.
#[derive(Debug, Clone)]
pub struct Site {
    pub origin: Url,
    pub search_path: String,
    pub location: String,
    pub selectors: Selectors,
}

impl Site {
    pub fn from_config(cfg: &SiteConfig) -> anyhow::Result<Self> {
        let origin = Url::parse(&cfg.origin)
            .map_err(|e| anyhow::anyhow!("invalid site origin {:?}: {}", cfg.origin, e))?;
        Ok(Site {
            origin,
            search_path: cfg.search_path.clone(),
            location: cfg.location.clone(),
            selectors: cfg.schema.compile()?,
        })
    }

    /// Search-results page starting at `offset`. Date order asks for
    /// `sort=date`; relevance is the site default and sends nothing.
    pub fn search_url(&self, query: &str, sort: SortOrder, offset: usize) -> anyhow::Result<Url> {
        let mut url = self.origin.join(&self.search_path)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", query);
            pairs.append_pair("l", &self.location);
            if sort == SortOrder::Date {
                pairs.append_pair("sort", "date");
            }
            pairs.append_pair("start", &offset.to_string());
        }
        Ok(url)
    }
}

// ── Tests ──
