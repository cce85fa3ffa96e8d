//! Interaction table index.
//!
//! Loads the pairwise interaction table, precomputes a continuous severity
//! score per row, and builds a symmetric adjacency structure keyed by
//! canonical drug name for O(1) pair lookup. Multiple rows may connect the
//! same pair (multi-edge); aggregation folds them into one best alert.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::models::{InteractionRow, SeverityBucket, SourceRef};
use crate::scoring;

/// Index errors. All variants are load-time failures; lookup and
/// aggregation never fail.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("failed to read interaction table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse interaction table: {0}")]
    Csv(#[from] csv::Error),

    #[error("interaction table missing required column: {0}")]
    MissingColumn(&'static str),
}

pub type IndexResult<T> = Result<T, IndexError>;

/// Columns every interaction table must carry.
const REQUIRED_COLUMNS: &[&str] = &["drug_a", "drug_b", "severity", "description"];

/// One raw interaction table record, before normalization and scoring.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InteractionRecord {
    pub drug_a: String,
    pub drug_b: String,
    pub severity: String,
    pub description: String,
    #[serde(default)]
    pub matched_pattern: Option<String>,
    #[serde(default)]
    pub management: Option<String>,
    #[serde(default)]
    pub source_id: Option<String>,
    #[serde(default)]
    pub last_reviewed: Option<String>,
}

/// Aggregate of all rows connecting one pair, shaped for alert assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionSummary {
    /// Severity of the top-ranked representative row
    pub severity: SeverityBucket,
    /// Score of the representative row
    pub severity_score: f64,
    /// Description of the representative row
    pub description: String,
    /// Management guidance of the representative row
    pub management: String,
    /// Provenance of every contributing row, in rank order
    pub sources: Vec<SourceRef>,
    /// Contributing row ids, in the order they were passed in
    pub row_ids: Vec<usize>,
}

/// Immutable index over the loaded interaction table.
///
/// Owns the row table and the derived adjacency map for its process
/// lifetime; both are read-only after construction.
pub struct InteractionIndex {
    rows: Vec<InteractionRow>,
    /// drug → neighbor → row ids of every row linking the pair
    adjacency: HashMap<String, HashMap<String, Vec<usize>>>,
}

impl InteractionIndex {
    /// Load the interaction table from a CSV file.
    ///
    /// Requires drug_a, drug_b, severity, and description columns;
    /// matched_pattern, management, source_id, and last_reviewed are
    /// optional.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> IndexResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| IndexError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(file);

        let headers = reader.headers()?.clone();
        for required in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == *required) {
                return Err(IndexError::MissingColumn(required));
            }
        }

        let mut records = Vec::new();
        for record in reader.deserialize::<InteractionRecord>() {
            records.push(record?);
        }

        let index = Self::from_records(records);
        info!(
            "interaction table loaded from {}: {} rows, {} drugs",
            path.display(),
            index.rows.len(),
            index.adjacency.len()
        );
        Ok(index)
    }

    /// Build the index from raw records.
    ///
    /// Normalizes endpoints, computes the per-row severity bucket and
    /// continuous score, and wires every row into the adjacency map under
    /// both endpoints.
    pub fn from_records(records: Vec<InteractionRecord>) -> Self {
        let mut rows = Vec::with_capacity(records.len());
        let mut adjacency: HashMap<String, HashMap<String, Vec<usize>>> = HashMap::new();

        for (row_id, record) in records.into_iter().enumerate() {
            let drug_a = record.drug_a.trim().to_lowercase();
            let drug_b = record.drug_b.trim().to_lowercase();
            let matched_pattern = record.matched_pattern.unwrap_or_default();

            let severity = SeverityBucket::from_label(&record.severity);
            let severity_score =
                scoring::severity_score(severity, &record.description, &matched_pattern);

            let source = SourceRef {
                source_id: record
                    .source_id
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| SourceRef::DEFAULT_SOURCE_ID.to_string()),
                last_reviewed: record.last_reviewed.unwrap_or_default(),
            };

            adjacency
                .entry(drug_a.clone())
                .or_default()
                .entry(drug_b.clone())
                .or_default()
                .push(row_id);
            if drug_a != drug_b {
                adjacency
                    .entry(drug_b.clone())
                    .or_default()
                    .entry(drug_a.clone())
                    .or_default()
                    .push(row_id);
            }

            rows.push(InteractionRow {
                row_id,
                drug_a,
                drug_b,
                severity,
                severity_score,
                description: record.description,
                management: record.management.unwrap_or_default(),
                matched_pattern,
                source,
            });
        }

        Self { rows, adjacency }
    }

    /// Row ids of every row linking the pair, in load order.
    ///
    /// Inputs are trimmed and lowercased before the exact-match lookup.
    /// Absent pairs return an empty Vec, not an error.
    pub fn lookup(&self, a: &str, b: &str) -> Vec<usize> {
        let a = a.trim().to_lowercase();
        let b = b.trim().to_lowercase();
        self.adjacency
            .get(&a)
            .and_then(|neighbors| neighbors.get(&b))
            .cloned()
            .unwrap_or_default()
    }

    /// Fold a set of contributing rows into one alert-shaping aggregate.
    ///
    /// Rows are ranked by (severity rank descending, severity score
    /// descending); the top row is the representative. Returns None when
    /// `row_ids` is empty.
    pub fn aggregate(&self, row_ids: &[usize]) -> Option<InteractionSummary> {
        let mut rows: Vec<&InteractionRow> = row_ids
            .iter()
            .filter_map(|&id| self.rows.get(id))
            .collect();
        if rows.is_empty() {
            return None;
        }

        rows.sort_by(|a, b| {
            b.severity
                .rank()
                .cmp(&a.severity.rank())
                .then_with(|| {
                    b.severity_score
                        .partial_cmp(&a.severity_score)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
        });

        let best = rows[0];
        Some(InteractionSummary {
            severity: best.severity,
            severity_score: best.severity_score,
            description: best.description.clone(),
            management: best.management.clone(),
            sources: rows.iter().map(|row| row.source.clone()).collect(),
            row_ids: row_ids.to_vec(),
        })
    }

    /// A loaded row by id.
    pub fn row(&self, row_id: usize) -> Option<&InteractionRow> {
        self.rows.get(row_id)
    }

    /// Number of loaded rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of distinct drugs in the adjacency map.
    pub fn drug_count(&self) -> usize {
        self.adjacency.len()
    }
}
