//! Drug name resolution.
//!
//! Pipeline: raw text → trim/lowercase → alias lookup → (optional) fuzzy
//! match → canonical identifier. Unresolved names pass through as their own
//! canonical form so downstream lookup reports "not found" instead of
//! raising.

mod normalizer;

pub use normalizer::*;

use std::path::PathBuf;
use thiserror::Error;

/// Resolver errors. All variants are load-time failures; resolution itself
/// never fails.
#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("failed to read synonym table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse synonym table: {0}")]
    Csv(#[from] csv::Error),

    #[error("synonym table must have at least 2 columns (alias, canonical)")]
    MissingColumns,
}

pub type ResolverResult<T> = Result<T, ResolverError>;
