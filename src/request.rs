use crate::error::RequestError;

/// Smallest accepted `num_jobs`; results are paged in batches derived from it.
pub const MIN_TARGET_COUNT: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Date,
    Relevance,
}

/// Parameters of one run. Built once, read-only afterwards.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    query: String,
    terms: Option<String>,
    target_count: Option<usize>,
    sort_order: SortOrder,
    require_all_terms: bool,
}

impl SearchRequest {
    pub fn new(
        query: &str,
        terms: Option<&str>,
        target_count: Option<usize>,
        sort_order: SortOrder,
        require_all_terms: bool,
    ) -> Result<Self, RequestError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(RequestError::EmptyQuery);
        }
        if matches!(target_count, Some(n) if n < MIN_TARGET_COUNT) {
            return Err(RequestError::TooFewJobs {
                min: MIN_TARGET_COUNT,
            });
        }

        // "" or " , " filters nothing, same as no terms at all
        let terms = terms
            .filter(|t| t.split(',').any(|piece| !piece.trim().is_empty()))
            .map(str::to_string);

        Ok(SearchRequest {
            query: query.to_string(),
            terms,
            target_count,
            sort_order,
            require_all_terms,
        })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn terms(&self) -> Option<&str> {
        self.terms.as_deref()
    }

    pub fn target_count(&self) -> Option<usize> {
        self.target_count
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    pub fn require_all_terms(&self) -> bool {
        self.require_all_terms
    }
}

// ── Tests ──
