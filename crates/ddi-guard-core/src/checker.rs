//! Interaction check orchestration.
//!
//! One check request flows: normalize every input name → look up each
//! (new, current) canonical pair → aggregate contributing rows → attach a
//! deterministic alert id and provenance → rank.

use std::sync::Arc;

use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;

use crate::index::{IndexError, InteractionIndex};
use crate::models::{
    Alert, AlertProvenance, CheckRequest, CheckResponse, NormalizationReport, SeverityBucket,
    UnmatchedPair,
};
use crate::resolver::{Normalizer, ResolverError};

/// Version tag hashed into every alert id. Bump when scoring semantics
/// change so stale client-side caches stop matching.
pub const SEVERITY_POLICY_VERSION: &str = "heuristic_v0_2025-11-03";

/// Named aggregation policy recorded on alert provenance.
pub const AGGREGATION_POLICY: &str = "max_severity_v0+cont_score_v1";

/// Alert ids are the hash truncated to this many hex characters.
const ALERT_ID_LEN: usize = 12;

/// Checker errors: composition of the two table load failures.
#[derive(Error, Debug)]
pub enum CheckerError {
    #[error("synonym table error: {0}")]
    Resolver(#[from] ResolverError),

    #[error("interaction table error: {0}")]
    Index(#[from] IndexError),
}

pub type CheckerResult<T> = Result<T, CheckerError>;

/// Facade over the loaded reference tables.
///
/// Both tables are immutable after construction and shared by `Arc`, so
/// concurrent checks need no coordination. Hot-reloading reference data
/// means building a fresh checker and swapping the whole value.
pub struct InteractionChecker {
    normalizer: Arc<Normalizer>,
    index: Arc<InteractionIndex>,
}

impl InteractionChecker {
    /// Build a checker from already-constructed tables.
    pub fn new(normalizer: Arc<Normalizer>, index: Arc<InteractionIndex>) -> Self {
        Self { normalizer, index }
    }

    /// Load both reference tables and build a checker.
    ///
    /// Fails fast: any table problem aborts construction, there is no
    /// partial or degraded service.
    pub fn load<P: AsRef<std::path::Path>>(
        synonyms_path: P,
        interactions_path: P,
    ) -> CheckerResult<Self> {
        let normalizer = Normalizer::from_csv_path(synonyms_path)?;
        let index = InteractionIndex::from_csv_path(interactions_path)?;
        Ok(Self::new(Arc::new(normalizer), Arc::new(index)))
    }

    /// Run one interaction check.
    ///
    /// Never fails: unresolved names pass through as their own canonical
    /// form, and pairs without table data land in `not_found`.
    pub fn check(&self, request: &CheckRequest) -> CheckResponse {
        let (new_canonical, new_log) = self.normalizer.normalize(&request.new_drug);

        let mut alerts = Vec::new();
        let mut not_found = Vec::new();
        let mut current_logs = Vec::with_capacity(request.current.len());

        for raw in &request.current {
            let (canonical, log) = self.normalizer.normalize(raw);
            current_logs.push(log);

            let row_ids = self.index.lookup(&new_canonical, &canonical);
            match self.index.aggregate(&row_ids) {
                Some(summary) => {
                    let id = alert_id(
                        &new_canonical,
                        &canonical,
                        summary.severity,
                        summary.severity_score,
                    );
                    alerts.push(Alert {
                        id,
                        pair: (new_canonical.clone(), canonical.clone()),
                        severity: summary.severity,
                        severity_score: summary.severity_score,
                        description: summary.description,
                        management: summary.management,
                        sources: summary.sources,
                        provenance: AlertProvenance {
                            canonical_pair: (new_canonical.clone(), canonical),
                            row_ids: summary.row_ids,
                            policy: AGGREGATION_POLICY.to_string(),
                        },
                    });
                }
                None => not_found.push(UnmatchedPair {
                    pair: (new_canonical.clone(), canonical),
                }),
            }
        }

        // Stable sort: severity rank first, score second, ties keep
        // request order
        alerts.sort_by(|a, b| {
            b.severity
                .rank()
                .cmp(&a.severity.rank())
                .then_with(|| {
                    b.severity_score
                        .partial_cmp(&a.severity_score)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
        });

        debug!(
            "check for {}: {} alerts, {} pairs without data",
            new_canonical,
            alerts.len(),
            not_found.len()
        );

        CheckResponse {
            alerts,
            not_found,
            normalization: NormalizationReport {
                new: new_log,
                current: current_logs,
            },
        }
    }

    /// Ranked autocomplete suggestions for a partial drug name.
    pub fn suggestions(&self, query: &str, limit: usize) -> Vec<String> {
        self.normalizer.suggestions(query, limit)
    }

    /// The shared normalizer.
    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// The shared interaction index.
    pub fn index(&self) -> &InteractionIndex {
        &self.index
    }
}

/// Deterministic alert identifier.
///
/// Pure function of (pair, severity, 2-decimal score, policy version):
/// identical requests always produce identical ids, enabling idempotent
/// client-side deduplication.
pub fn alert_id(a: &str, b: &str, severity: SeverityBucket, severity_score: f64) -> String {
    let payload = format!(
        "{}|{}|{}|{:.2}|{}",
        a,
        b,
        severity.as_str(),
        severity_score,
        SEVERITY_POLICY_VERSION
    );
    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    hex::encode(hasher.finalize())[..ALERT_ID_LEN].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::InteractionRecord;
    use crate::models::NormalizationMethod;

    fn record(drug_a: &str, drug_b: &str, severity: &str, description: &str) -> InteractionRecord {
        InteractionRecord {
            drug_a: drug_a.into(),
            drug_b: drug_b.into(),
            severity: severity.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    fn sample_checker() -> InteractionChecker {
        let normalizer = Normalizer::from_entries(&[
            ("coumadin", "warfarin"),
            ("warfarin", "warfarin"),
            ("diflucan", "fluconazole"),
            ("fluconazole", "fluconazole"),
            ("aspirin", "aspirin"),
            ("ibuprofen", "ibuprofen"),
            ("sertraline", "sertraline"),
        ]);
        let index = InteractionIndex::from_records(vec![
            record(
                "warfarin",
                "fluconazole",
                "Major",
                "fluconazole is a strong CYP2C9 inhibitor; marked increase in INR/bleeding risk",
            ),
            record("warfarin", "aspirin", "minor", "minor additive effect"),
            record("warfarin", "sertraline", "contraindicated", "avoid; bleeding risk"),
        ]);
        InteractionChecker::new(Arc::new(normalizer), Arc::new(index))
    }

    #[test]
    fn test_alert_id_deterministic() {
        let a = alert_id("warfarin", "fluconazole", SeverityBucket::Major, 0.95);
        let b = alert_id("warfarin", "fluconazole", SeverityBucket::Major, 0.95);
        assert_eq!(a, b);
        assert_eq!(a.len(), ALERT_ID_LEN);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_alert_id_varies_with_inputs() {
        let base = alert_id("warfarin", "fluconazole", SeverityBucket::Major, 0.95);
        assert_ne!(base, alert_id("warfarin", "aspirin", SeverityBucket::Major, 0.95));
        assert_ne!(
            base,
            alert_id("warfarin", "fluconazole", SeverityBucket::Moderate, 0.95)
        );
        assert_ne!(base, alert_id("warfarin", "fluconazole", SeverityBucket::Major, 0.94));
    }

    #[test]
    fn test_check_single_alert() {
        let checker = sample_checker();
        let request = CheckRequest::new("warfarin", vec!["fluconazole".into()]);
        let response = checker.check(&request);

        assert_eq!(response.alerts.len(), 1);
        assert!(response.not_found.is_empty());

        let alert = &response.alerts[0];
        assert_eq!(alert.pair, ("warfarin".to_string(), "fluconazole".to_string()));
        assert_eq!(alert.severity, SeverityBucket::Major);
        assert!(alert.severity_score >= 0.70 && alert.severity_score <= 0.95);
        assert_eq!(alert.provenance.policy, AGGREGATION_POLICY);
        assert_eq!(alert.provenance.row_ids, vec![0]);
    }

    #[test]
    fn test_check_resolves_aliases_before_lookup() {
        let checker = sample_checker();
        // Brand names on both sides resolve to the same canonical pair
        let request = CheckRequest::new("Coumadin", vec!["Diflucan".into()]);
        let response = checker.check(&request);

        assert_eq!(response.alerts.len(), 1);
        assert_eq!(
            response.alerts[0].pair,
            ("warfarin".to_string(), "fluconazole".to_string())
        );
        assert_eq!(response.normalization.new.method, NormalizationMethod::Exact);
    }

    #[test]
    fn test_check_idempotent_ids() {
        let checker = sample_checker();
        let request = CheckRequest::new("warfarin", vec!["fluconazole".into(), "aspirin".into()]);

        let first = checker.check(&request);
        let second = checker.check(&request);
        let first_ids: Vec<&str> = first.alerts.iter().map(|a| a.id.as_str()).collect();
        let second_ids: Vec<&str> = second.alerts.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(first_ids, second_ids);
    }

    #[test]
    fn test_check_ranks_alerts() {
        let checker = sample_checker();
        // Request order: minor pair, major pair, contraindicated pair
        let request = CheckRequest::new(
            "warfarin",
            vec!["aspirin".into(), "fluconazole".into(), "sertraline".into()],
        );
        let response = checker.check(&request);

        let severities: Vec<SeverityBucket> =
            response.alerts.iter().map(|a| a.severity).collect();
        assert_eq!(
            severities,
            vec![
                SeverityBucket::Contraindicated,
                SeverityBucket::Major,
                SeverityBucket::Minor
            ]
        );
    }

    #[test]
    fn test_check_tie_break_by_score_then_insertion_order() {
        let normalizer = Normalizer::from_entries(&[
            ("base", "base"),
            ("plain", "plain"),
            ("loaded", "loaded"),
            ("twin", "twin"),
        ]);
        let index = InteractionIndex::from_records(vec![
            record("base", "plain", "major", "possible interaction"),
            record(
                "base",
                "loaded",
                "major",
                "strong CYP3A4 inhibitor; AUC increased 5-fold; bleeding risk; avoid",
            ),
            record("base", "twin", "major", "possible interaction"),
        ]);
        let checker = InteractionChecker::new(Arc::new(normalizer), Arc::new(index));

        // plain and twin score identically; loaded scores higher
        let request = CheckRequest::new(
            "base",
            vec!["plain".into(), "loaded".into(), "twin".into()],
        );
        let response = checker.check(&request);

        let pairs: Vec<&str> = response
            .alerts
            .iter()
            .map(|a| a.pair.1.as_str())
            .collect();
        // Same bucket throughout: score decides first, equal scores keep
        // request order
        assert_eq!(pairs, vec!["loaded", "plain", "twin"]);
    }

    #[test]
    fn test_check_reports_misses() {
        let checker = sample_checker();
        let request = CheckRequest::new("warfarin", vec!["ibuprofen".into()]);
        let response = checker.check(&request);

        assert!(response.alerts.is_empty());
        assert_eq!(response.not_found.len(), 1);
        assert_eq!(
            response.not_found[0].pair,
            ("warfarin".to_string(), "ibuprofen".to_string())
        );
    }

    #[test]
    fn test_check_unknown_new_drug_still_checkable() {
        let checker = sample_checker();
        let request = CheckRequest::new(" TotallyUnknownDrug123 ", vec!["aspirin".into()]);
        let response = checker.check(&request);

        // The unresolved name passes through and the pair lands in misses,
        // distinguishable from "no interactions found"
        assert_eq!(response.normalization.new.method, NormalizationMethod::Fallback);
        assert_eq!(
            response.not_found[0].pair,
            ("totallyunknowndrug123".to_string(), "aspirin".to_string())
        );
    }

    #[test]
    fn test_check_logs_every_input() {
        let checker = sample_checker();
        let request = CheckRequest::new("coumadin", vec!["aspirin".into(), "warfarn".into()]);
        let response = checker.check(&request);

        assert_eq!(response.normalization.current.len(), 2);
        assert_eq!(
            response.normalization.current[0].method,
            NormalizationMethod::Exact
        );
        assert_eq!(
            response.normalization.current[1].method,
            NormalizationMethod::Fuzzy
        );
    }
}
