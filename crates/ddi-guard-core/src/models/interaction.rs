//! Interaction table models.

use serde::{Deserialize, Serialize};

/// Canonical severity bucket for a known interaction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SeverityBucket {
    Minor,
    Moderate,
    Major,
    Contraindicated,
}

impl SeverityBucket {
    /// Map a raw severity label to a canonical bucket.
    ///
    /// Matching is a case-insensitive prefix check; unrecognized labels fall
    /// back to `Moderate` rather than failing the row.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        if label.starts_with("contra") {
            SeverityBucket::Contraindicated
        } else if label.starts_with("maj") {
            SeverityBucket::Major
        } else if label.starts_with("mod") {
            SeverityBucket::Moderate
        } else if label.starts_with("min") {
            SeverityBucket::Minor
        } else {
            SeverityBucket::Moderate
        }
    }

    /// Total rank order used everywhere alerts are sorted.
    /// Contraindicated > Major > Moderate > Minor.
    pub fn rank(&self) -> u8 {
        match self {
            SeverityBucket::Contraindicated => 3,
            SeverityBucket::Major => 2,
            SeverityBucket::Moderate => 1,
            SeverityBucket::Minor => 0,
        }
    }

    /// Display name, also used in alert id payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityBucket::Minor => "Minor",
            SeverityBucket::Moderate => "Moderate",
            SeverityBucket::Major => "Major",
            SeverityBucket::Contraindicated => "Contraindicated",
        }
    }
}

impl std::fmt::Display for SeverityBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance for a single interaction row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceRef {
    /// Identifier of the reference source ("DBI" when the table has none)
    pub source_id: String,
    /// Last clinical review date, empty when unknown
    pub last_reviewed: String,
}

impl SourceRef {
    /// Generic source tag applied to rows without explicit provenance.
    pub const DEFAULT_SOURCE_ID: &'static str = "DBI";
}

impl Default for SourceRef {
    fn default() -> Self {
        Self {
            source_id: Self::DEFAULT_SOURCE_ID.to_string(),
            last_reviewed: String::new(),
        }
    }
}

/// One loaded row of the pairwise interaction table.
///
/// Rows are undirected: a row linking A and B answers lookups for both
/// (A, B) and (B, A). Immutable after load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InteractionRow {
    /// Position in the loaded table, used as the adjacency edge id
    pub row_id: usize,
    /// First endpoint, canonical lowercase
    pub drug_a: String,
    /// Second endpoint, canonical lowercase
    pub drug_b: String,
    /// Normalized severity bucket
    pub severity: SeverityBucket,
    /// Continuous severity score, precomputed at load, within the bucket band
    pub severity_score: f64,
    /// Free-text interaction description
    pub description: String,
    /// Clinical management guidance, empty when the table has none
    pub management: String,
    /// Pattern text that matched during table curation, empty when absent
    pub matched_pattern: String,
    /// Source metadata
    pub source: SourceRef,
}
