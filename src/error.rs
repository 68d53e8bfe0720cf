use thiserror::Error;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("num_jobs has to be greater or equal to {min}, try again")]
    TooFewJobs { min: usize },
    #[error("query must not be empty")]
    EmptyQuery,
}

/// A single URL could not be retrieved.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("GET {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("GET {url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("browser render of {url} failed: {source}")]
    Browser {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// The page was fetched but does not have the expected layout.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no element for {field} (selector `{selector}`)")]
    Missing { field: &'static str, selector: String },
    #[error("no number in {field} text {text:?}")]
    NotANumber { field: &'static str, text: String },
}

#[derive(Debug, Error)]
#[error("invalid selector for {field} `{selector}`: {message}")]
pub struct SchemaError {
    pub field: &'static str,
    pub selector: String,
    pub message: String,
}

/// Why one job link produced no record.
#[derive(Debug, Error)]
pub enum DetailError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("extraction failed: {0}")]
    Extract(#[from] ExtractError),
}
