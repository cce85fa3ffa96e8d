//! SQLite schema definition.

/// Complete database schema for ddi-guard.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Visits (Append-Only - Immutable after creation)
-- ============================================================================

CREATE TABLE IF NOT EXISTS visits (
    visit_id TEXT PRIMARY KEY,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),

    patient_name TEXT,
    age INTEGER,
    doctor_name TEXT,

    new_drug TEXT NOT NULL,
    current_drugs TEXT NOT NULL DEFAULT '[]',     -- JSON array of strings

    -- quick-reporting summary
    max_severity TEXT,
    max_score REAL,

    -- full payloads
    alerts TEXT NOT NULL DEFAULT '[]',            -- JSON array of Alert
    not_found TEXT NOT NULL DEFAULT '[]'          -- JSON array of UnmatchedPair
);

-- Index for recency queries
CREATE INDEX IF NOT EXISTS idx_visits_created_at ON visits(created_at);
"#;
