//! Visit history database operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbError, DbResult};
use crate::models::{SeverityBucket, Visit};

impl Database {
    /// Append one visit. Visits are never updated or deleted.
    pub fn insert_visit(&self, visit: &Visit) -> DbResult<()> {
        let current_json = serde_json::to_string(&visit.current)?;
        let alerts_json = serde_json::to_string(&visit.alerts)?;
        let not_found_json = serde_json::to_string(&visit.not_found)?;

        self.conn.execute(
            r#"
            INSERT INTO visits (
                visit_id, created_at, patient_name, age, doctor_name,
                new_drug, current_drugs, max_severity, max_score,
                alerts, not_found
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                visit.visit_id,
                visit.created_at,
                visit.patient_name,
                visit.age,
                visit.doctor_name,
                visit.new_drug,
                current_json,
                visit.max_severity.map(|s| s.as_str()),
                visit.max_score,
                alerts_json,
                not_found_json,
            ],
        )?;
        Ok(())
    }

    /// Get a visit by ID.
    pub fn get_visit(&self, visit_id: &str) -> DbResult<Option<Visit>> {
        self.conn
            .query_row(
                r#"
                SELECT visit_id, created_at, patient_name, age, doctor_name,
                       new_drug, current_drugs, max_severity, max_score,
                       alerts, not_found
                FROM visits
                WHERE visit_id = ?
                "#,
                [visit_id],
                map_visit_row,
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// List the most recent visits, newest first.
    pub fn list_recent_visits(&self, limit: usize) -> DbResult<Vec<Visit>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT visit_id, created_at, patient_name, age, doctor_name,
                   new_drug, current_drugs, max_severity, max_score,
                   alerts, not_found
            FROM visits
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?
            "#,
        )?;

        let rows = stmt.query_map([limit as i64], map_visit_row)?;

        let mut visits = Vec::new();
        for row in rows {
            visits.push(row?.try_into()?);
        }
        Ok(visits)
    }

    /// Total number of stored visits.
    pub fn visit_count(&self) -> DbResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM visits", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Intermediate row struct for database mapping.
struct VisitRow {
    visit_id: String,
    created_at: String,
    patient_name: Option<String>,
    age: Option<u32>,
    doctor_name: Option<String>,
    new_drug: String,
    current_drugs: String,
    max_severity: Option<String>,
    max_score: Option<f64>,
    alerts: String,
    not_found: String,
}

fn map_visit_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<VisitRow> {
    Ok(VisitRow {
        visit_id: row.get(0)?,
        created_at: row.get(1)?,
        patient_name: row.get(2)?,
        age: row.get(3)?,
        doctor_name: row.get(4)?,
        new_drug: row.get(5)?,
        current_drugs: row.get(6)?,
        max_severity: row.get(7)?,
        max_score: row.get(8)?,
        alerts: row.get(9)?,
        not_found: row.get(10)?,
    })
}

impl TryFrom<VisitRow> for Visit {
    type Error = DbError;

    fn try_from(row: VisitRow) -> Result<Self, Self::Error> {
        Ok(Visit {
            visit_id: row.visit_id,
            created_at: row.created_at,
            patient_name: row.patient_name,
            age: row.age,
            doctor_name: row.doctor_name,
            new_drug: row.new_drug,
            current: serde_json::from_str(&row.current_drugs)?,
            max_severity: row.max_severity.as_deref().map(SeverityBucket::from_label),
            max_score: row.max_score,
            alerts: serde_json::from_str(&row.alerts)?,
            not_found: serde_json::from_str(&row.not_found)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Alert, AlertProvenance, CheckRequest, CheckResponse, NormalizationLog,
        NormalizationMethod, NormalizationReport, SourceRef, UnmatchedPair,
    };

    fn make_response(alerts: Vec<Alert>) -> CheckResponse {
        CheckResponse {
            alerts,
            not_found: vec![UnmatchedPair {
                pair: ("warfarin".into(), "ibuprofen".into()),
            }],
            normalization: NormalizationReport {
                new: NormalizationLog {
                    input: "warfarin".into(),
                    method: NormalizationMethod::Exact,
                    score: 100,
                },
                current: vec![],
            },
        }
    }

    fn make_alert(severity: SeverityBucket, score: f64) -> Alert {
        Alert {
            id: "abc123def456".into(),
            pair: ("warfarin".into(), "fluconazole".into()),
            severity,
            severity_score: score,
            description: "bleeding risk".into(),
            management: "monitor INR".into(),
            sources: vec![SourceRef::default()],
            provenance: AlertProvenance {
                canonical_pair: ("warfarin".into(), "fluconazole".into()),
                row_ids: vec![0, 3],
                policy: "max_severity_v0+cont_score_v1".into(),
            },
        }
    }

    #[test]
    fn test_insert_and_get_roundtrip() {
        let db = Database::open_in_memory().unwrap();

        let mut request = CheckRequest::new("warfarin", vec!["fluconazole".into()]);
        request.patient_name = Some("Jane Doe".into());
        request.age = Some(67);
        let response = make_response(vec![make_alert(SeverityBucket::Major, 0.95)]);
        let visit = Visit::new(&request, &response);

        db.insert_visit(&visit).unwrap();

        let loaded = db.get_visit(&visit.visit_id).unwrap().unwrap();
        assert_eq!(loaded, visit);
    }

    #[test]
    fn test_get_missing_visit() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_visit("no-such-visit").unwrap().is_none());
    }

    #[test]
    fn test_summary_columns_stored() {
        let db = Database::open_in_memory().unwrap();

        let request = CheckRequest::new("warfarin", vec!["fluconazole".into()]);
        let response = make_response(vec![make_alert(SeverityBucket::Contraindicated, 0.97)]);
        let visit = Visit::new(&request, &response);
        db.insert_visit(&visit).unwrap();

        let loaded = db.get_visit(&visit.visit_id).unwrap().unwrap();
        assert_eq!(loaded.max_severity, Some(SeverityBucket::Contraindicated));
        assert_eq!(loaded.max_score, Some(0.97));
    }

    #[test]
    fn test_list_recent_visits_order_and_limit() {
        let db = Database::open_in_memory().unwrap();

        let request = CheckRequest::new("warfarin", vec![]);
        let response = make_response(vec![]);
        let mut ids = Vec::new();
        for i in 0..5 {
            let mut visit = Visit::new(&request, &response);
            // Distinct, increasing timestamps
            visit.created_at = format!("2026-01-0{}T00:00:00+00:00", i + 1);
            db.insert_visit(&visit).unwrap();
            ids.push(visit.visit_id);
        }

        let recent = db.list_recent_visits(3).unwrap();
        assert_eq!(recent.len(), 3);
        // Newest first
        assert_eq!(recent[0].visit_id, ids[4]);
        assert_eq!(recent[1].visit_id, ids[3]);
        assert_eq!(recent[2].visit_id, ids[2]);
    }

    #[test]
    fn test_visit_count() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.visit_count().unwrap(), 0);

        let visit = Visit::new(&CheckRequest::new("a", vec![]), &make_response(vec![]));
        db.insert_visit(&visit).unwrap();
        assert_eq!(db.visit_count().unwrap(), 1);
    }
}
