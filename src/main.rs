mod crawler;
mod error;
mod extract;
mod fetch;
mod logging;
mod pipeline;
mod request;
mod schema;
mod settings;
mod table;
mod terms;
mod text;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing::{debug, info};

use crate::crawler::Crawler;
use crate::error::RequestError;
use crate::fetch::{PageFetcher, WebFetcher};
use crate::request::{SearchRequest, SortOrder};
use crate::schema::Site;
use crate::settings::Settings;
use crate::table::{output_file_name, OutputFormat, ResultTable};

#[derive(Parser, Debug)]
#[command(
    name = "jobs_notifier",
    about = "Get a table of recent jobs for a query, optionally filtered by terms in the job description"
)]
struct Cli {
    /// Query string. Example: "software engineer"
    query: String,

    /// Search terms for the job description, separated by ",".
    /// Example: "dog, cat lover, high quality"
    #[arg(short, long)]
    terms: Option<String>,

    /// Number of search results to fetch (at least 15).
    /// Default: as many as the site reports
    #[arg(short = 'n', long = "num_jobs")]
    num_jobs: Option<usize>,

    /// Sort by relevance. Default is by date
    #[arg(long = "sortby_relevance")]
    sortby_relevance: bool,

    /// All search terms must be found in the job description
    #[arg(short, long = "all_terms")]
    all_terms: bool,

    /// Output file format
    #[arg(long, value_enum, default_value_t = OutputFormat::Html)]
    format: OutputFormat,
}

impl Cli {
    fn search_request(&self) -> Result<SearchRequest, RequestError> {
        let sort = if self.sortby_relevance {
            SortOrder::Relevance
        } else {
            SortOrder::Date
        };
        SearchRequest::new(
            &self.query,
            self.terms.as_deref(),
            self.num_jobs,
            sort,
            self.all_terms,
        )
    }

    fn format_label(&self) -> &'static str {
        match self.format {
            OutputFormat::Html => "HTML",
            OutputFormat::Json => "JSON",
        }
    }
}

/// How a run ended, for the user-facing message.
#[derive(Debug)]
enum RunOutcome {
    Rejected(RequestError),
    NoResults,
    Written { path: PathBuf, rows: usize },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let t0 = Instant::now();
    let cli = Cli::parse();

    match run(&cli, |settings| WebFetcher::new(&settings.user_agent)).await? {
        RunOutcome::Rejected(e) => println!("{}", e),
        RunOutcome::NoResults => println!("No matching results were found!"),
        RunOutcome::Written { path, rows } => {
            println!(
                "{} file with {} jobs written successfully to {}",
                cli.format_label(),
                rows,
                path.display()
            );
        }
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    Ok(())
}

/// Validate, then crawl and write. The fetcher is only built once the request
/// is known to be valid, so bad input never touches settings, logs or network.
async fn run<F, C>(cli: &Cli, connect: C) -> Result<RunOutcome>
where
    F: PageFetcher,
    C: FnOnce(&Settings) -> Result<F>,
{
    let request = match cli.search_request() {
        Ok(request) => request,
        Err(e) => return Ok(RunOutcome::Rejected(e)),
    };

    let settings = Settings::load()?;
    let site = Site::from_config(&settings.site).context("Invalid site configuration")?;
    let run_log = logging::init(&settings.log_dir)?;
    info!(?request, log = %run_log.path.display(), "Starting run");

    let crawler = Crawler::new(connect(&settings)?, site).with_progress(true);

    let table = match pipeline::build_jobs_table(&crawler, &request).await? {
        Some(table) if !table.is_empty() => table,
        _ => {
            info!("No results were found");
            return Ok(RunOutcome::NoResults);
        }
    };

    let path = write_table(&table, &settings.output_dir, cli.format)?;
    info!("{} rows saved to {}", table.len(), path.display());

    Ok(RunOutcome::Written {
        path,
        rows: table.len(),
    })
}

fn write_table(table: &ResultTable, dir: &std::path::Path, format: OutputFormat) -> Result<PathBuf> {
    for row in table {
        debug!("{} | {} | {}", row.title, row.company, row.link);
    }

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    let path = dir.join(output_file_name(Local::now().date_naive(), format));
    std::fs::write(&path, table.render(format)?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

// ── Tests ──
