//! Check request/response models and alert records.

use serde::{Deserialize, Serialize};

use super::interaction::{SeverityBucket, SourceRef};

/// How a free-text drug name was resolved to a canonical identifier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NormalizationMethod {
    /// Exact hit in the alias map
    Exact,
    /// Best fuzzy alias match at or above the similarity threshold
    Fuzzy,
    /// No match; the trimmed lowercase input passed through as its own canonical form
    Fallback,
}

/// Diagnostic record produced once per normalized name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizationLog {
    /// Raw input as received
    pub input: String,
    /// Resolution method
    pub method: NormalizationMethod,
    /// Match quality, 0-100 (100 for exact, 0 for fallback)
    pub score: u8,
}

/// One check request: a proposed new drug against current medications.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckRequest {
    /// Proposed new drug, free text
    pub new_drug: String,
    /// Current medications, free text
    pub current: Vec<String>,
    /// Optional patient name for the visit record
    pub patient_name: Option<String>,
    /// Optional patient age
    pub age: Option<u32>,
    /// Optional prescribing doctor for the visit record
    pub doctor_name: Option<String>,
}

impl CheckRequest {
    /// Build a request with just the drug names.
    pub fn new(new_drug: impl Into<String>, current: Vec<String>) -> Self {
        Self {
            new_drug: new_drug.into(),
            current,
            patient_name: None,
            age: None,
            doctor_name: None,
        }
    }
}

/// Audit trail attached to every alert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlertProvenance {
    /// Canonical pair the alert was derived from
    pub canonical_pair: (String, String),
    /// All contributing interaction row ids
    pub row_ids: Vec<usize>,
    /// Named scoring policy that produced the aggregate
    pub policy: String,
}

/// A severity-ranked interaction alert for one drug pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alert {
    /// Stable short hash of (pair, severity, score, policy version).
    /// Identical requests always produce identical ids.
    pub id: String,
    /// Canonical (new drug, current medication) pair
    pub pair: (String, String),
    /// Severity bucket of the representative row
    pub severity: SeverityBucket,
    /// Continuous severity score of the representative row
    pub severity_score: f64,
    /// Description from the representative row
    pub description: String,
    /// Management guidance from the representative row
    pub management: String,
    /// Provenance of every contributing row, in rank order
    pub sources: Vec<SourceRef>,
    /// Audit trail
    pub provenance: AlertProvenance,
}

/// A checked pair for which the interaction table has no data.
///
/// Reported so callers can distinguish "no interactions found" from
/// "no data for this pair".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnmatchedPair {
    /// Canonical pair that had no rows
    pub pair: (String, String),
}

/// Normalization diagnostics for one check request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizationReport {
    /// Log for the proposed new drug
    pub new: NormalizationLog,
    /// One log per current medication, in request order
    pub current: Vec<NormalizationLog>,
}

/// Result of one check request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckResponse {
    /// Alerts sorted by (severity rank desc, severity score desc), stable
    pub alerts: Vec<Alert>,
    /// Pairs absent from the interaction table
    pub not_found: Vec<UnmatchedPair>,
    /// Per-name normalization diagnostics
    pub normalization: NormalizationReport,
}

impl CheckResponse {
    /// Highest-ranked (severity, score) among the alerts, if any.
    pub fn max_severity(&self) -> Option<(SeverityBucket, f64)> {
        self.alerts
            .iter()
            .map(|a| (a.severity, a.severity_score))
            .max_by(|x, y| {
                x.0.rank()
                    .cmp(&y.0.rank())
                    .then(x.1.partial_cmp(&y.1).unwrap_or(std::cmp::Ordering::Equal))
            })
    }
}
