//! DDI-Guard Core Library
//!
//! Drug-drug interaction checking with severity-ranked, explainable alerts.
//!
//! # Architecture
//!
//! ```text
//! raw drug names ──► Normalizer ──► canonical pair
//!                                        │
//!                            InteractionIndex.lookup (symmetric, O(1))
//!                                        │
//!                                   row id set
//!                                        │
//!                            InteractionIndex.aggregate
//!                         (rank: severity desc, score desc)
//!                                        │
//!                                 Alert + provenance
//!                                        │
//!                            InteractionChecker ranks and
//!                            attaches deterministic alert ids
//!                                        │
//!                         ┌──────────────┴──────────────┐
//!                         ▼                             ▼
//!                   CheckResponse                 Visit (append-only
//!                   (alerts, misses,               SQLite history)
//!                    normalization logs)
//! ```
//!
//! # Core Principle
//!
//! The reference tables are loaded once, immutable afterward, and shared by
//! `Arc` into request handling. Resolution never fails: unknown names pass
//! through as their own canonical form, and pairs without table data are
//! reported as misses so "no interactions found" and "no data for this
//! pair" stay distinguishable.
//!
//! # Modules
//!
//! - [`models`]: Domain types (Alert, CheckRequest, SeverityBucket, Visit, ...)
//! - [`scoring`]: Continuous severity scoring from categorical buckets + text
//! - [`resolver`]: Drug name normalization and autocomplete
//! - [`index`]: Symmetric pairwise interaction index
//! - [`checker`]: Per-request orchestration and alert assembly
//! - [`db`]: SQLite visit history (append-only)

pub mod checker;
pub mod db;
pub mod index;
pub mod models;
pub mod resolver;
pub mod scoring;

// Re-export commonly used types
pub use checker::{
    alert_id, CheckerError, InteractionChecker, AGGREGATION_POLICY, SEVERITY_POLICY_VERSION,
};
pub use db::Database;
pub use index::{IndexError, InteractionIndex, InteractionRecord, InteractionSummary};
pub use models::{
    Alert, AlertProvenance, CheckRequest, CheckResponse, InteractionRow, NormalizationLog,
    NormalizationMethod, NormalizationReport, SeverityBucket, SourceRef, UnmatchedPair, Visit,
};
pub use resolver::{Normalizer, ResolverError, SUGGESTION_THRESHOLD};
