use askama::Template;
use chrono::NaiveDate;
use clap::ValueEnum;

use crate::crawler::JobRecord;

const COLUMNS: [&str; 4] = ["title", "company", "description", "link"];
/// Literal `\n` written for in-cell newlines, swapped for `<br/>` after rendering.
const NEWLINE_MARKER: &str = "\\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Html,
    Json,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::Json => "json",
        }
    }
}

#[derive(Template)]
#[template(path = "results.html")]
struct ResultsPage<'a> {
    columns: [&'static str; 4],
    rows: Vec<RowView<'a>>,
}

struct RowView<'a> {
    title: String,
    company: String,
    description: String,
    link: &'a str,
}

impl<'a> RowView<'a> {
    fn new(record: &'a JobRecord) -> Self {
        RowView {
            title: mark_newlines(&record.title),
            company: mark_newlines(&record.company),
            description: mark_newlines(&record.description),
            link: &record.link,
        }
    }
}

/// Final ordered set of job rows. Rows have no labels of their own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    rows: Vec<JobRecord>,
}

impl ResultTable {
    pub fn new(rows: Vec<JobRecord>) -> Self {
        ResultTable { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self, format: OutputFormat) -> anyhow::Result<String> {
        match format {
            OutputFormat::Html => self.render_html(),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&self.rows)?),
        }
    }

    /// HTML table with clickable links and in-cell line breaks.
    pub fn render_html(&self) -> anyhow::Result<String> {
        let page = ResultsPage {
            columns: COLUMNS,
            rows: self.rows.iter().map(RowView::new).collect(),
        };
        let markup = page.render()?;
        Ok(markup.replace(NEWLINE_MARKER, "<br/>"))
    }
}

impl<'a> IntoIterator for &'a ResultTable {
    type Item = &'a JobRecord;
    type IntoIter = std::slice::Iter<'a, JobRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

fn mark_newlines(text: &str) -> String {
    text.replace('\r', "").replace('\n', NEWLINE_MARKER)
}

pub fn output_file_name(date: NaiveDate, format: OutputFormat) -> String {
    format!("jobs_{}.{}", date.format("%Y-%m-%d"), format.extension())
}

// ── Tests ──
