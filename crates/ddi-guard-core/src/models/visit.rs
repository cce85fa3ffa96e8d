//! Visit history models.

use serde::{Deserialize, Serialize};

use super::alert::{Alert, CheckRequest, CheckResponse, UnmatchedPair};
use super::interaction::SeverityBucket;

/// One persisted check: request, result, and a quick-reporting summary.
///
/// Visits are append-only; a stored visit is never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Visit {
    /// Local UUID, generated at creation
    pub visit_id: String,
    /// Creation timestamp, RFC 3339 UTC
    pub created_at: String,
    /// Patient name, if provided
    pub patient_name: Option<String>,
    /// Patient age, if provided
    pub age: Option<u32>,
    /// Prescribing doctor, if provided
    pub doctor_name: Option<String>,
    /// Proposed new drug as requested
    pub new_drug: String,
    /// Current medications as requested
    pub current: Vec<String>,
    /// Highest alert severity, None when no alerts fired
    pub max_severity: Option<SeverityBucket>,
    /// Score of the highest-ranked alert
    pub max_score: Option<f64>,
    /// Full alert payload
    pub alerts: Vec<Alert>,
    /// Pairs with no interaction data
    pub not_found: Vec<UnmatchedPair>,
}

impl Visit {
    /// Fold one request + response into a visit record.
    pub fn new(request: &CheckRequest, response: &CheckResponse) -> Self {
        let max = response.max_severity();
        Self {
            visit_id: uuid::Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            patient_name: request.patient_name.clone(),
            age: request.age,
            doctor_name: request.doctor_name.clone(),
            new_drug: request.new_drug.clone(),
            current: request.current.clone(),
            max_severity: max.map(|(severity, _)| severity),
            max_score: max.map(|(_, score)| score),
            alerts: response.alerts.clone(),
            not_found: response.not_found.clone(),
        }
    }
}
