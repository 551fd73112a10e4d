//! Canonical data types shared across the Scholar crates.
//!
//! The wire format uses camelCase field names so the service stays
//! compatible with existing frontends consuming `/api/generate`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Sentinel value for a comparison cell no paper reported.
pub const NA: &str = "N/A";

/// The canonical result of one research generation.
///
/// Produced once per successful request, held in transient caller state
/// only, and discarded on the next submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchResult {
    /// Free-form markdown-flavored brief, newline-delimited paragraphs.
    pub research_brief: String,
    /// Ordered comparison rows, one per compared aspect.
    pub comparison_table: Vec<ComparisonRow>,
    /// Ordered, unique paper identifiers; defines column order.
    #[serde(default)]
    pub paper_keys: Vec<String>,
    /// A single block of baseline experiment code.
    pub notebook_code: String,
}

/// One labeled row of the comparison table.
///
/// Serializes flat: `{"aspect": ..., "<paper key>": ..., ...}` with cell
/// insertion order preserved, matching the historical wire shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    /// The row label (what is being compared).
    pub aspect: String,
    /// One cell per paper key, in column order.
    #[serde(flatten)]
    pub cells: IndexMap<String, String>,
}

impl ComparisonRow {
    /// Create an empty row for the given aspect.
    pub fn new(aspect: impl Into<String>) -> Self {
        Self {
            aspect: aspect.into(),
            cells: IndexMap::new(),
        }
    }

    /// Set the cell for a paper key, replacing any previous value.
    pub fn set(&mut self, paper_key: impl Into<String>, value: impl Into<String>) {
        self.cells.insert(paper_key.into(), value.into());
    }

    /// Look up the cell for a paper key.
    pub fn get(&self, paper_key: &str) -> Option<&str> {
        self.cells.get(paper_key).map(String::as_str)
    }
}

impl ResearchResult {
    /// Whether every row carries exactly one cell per paper key, in the
    /// same order. Normalized results always satisfy this.
    pub fn is_rectangular(&self) -> bool {
        self.comparison_table.iter().all(|row| {
            row.cells.len() == self.paper_keys.len()
                && row.cells.keys().zip(&self.paper_keys).all(|(a, b)| a == b)
        })
    }
}
