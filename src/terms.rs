use anyhow::Result;
use regex::Regex;

/// Comma-separated keyword filter applied to normalized job descriptions.
#[derive(Debug)]
pub struct TermFilter {
    terms: Vec<(String, Regex)>,
    require_all: bool,
}

impl TermFilter {
    pub fn new(terms: &str, require_all: bool) -> Result<Self> {
        let terms = parse_terms(terms)
            .into_iter()
            .map(|term| {
                let re = Regex::new(&format!(r"\b{}\b", regex::escape(&term)))?;
                Ok((term, re))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(TermFilter { terms, require_all })
    }

    /// Terms with at least one whole-word occurrence in `text`.
    pub fn found<'a>(&'a self, text: &str) -> Vec<&'a str> {
        self.terms
            .iter()
            .filter(|(_, re)| re.is_match(text))
            .map(|(term, _)| term.as_str())
            .collect()
    }

    pub fn matches(&self, text: &str) -> bool {
        let found = self.found(text);
        if self.require_all {
            found.len() == self.terms.len()
        } else {
            !found.is_empty()
        }
    }
}

pub fn parse_terms(terms: &str) -> Vec<String> {
    terms
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

// ── Tests ──
