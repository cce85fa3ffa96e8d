//! Drug name normalizer.
//!
//! Handles:
//! - Alias expansion against a loaded synonym table (coumadin→warfarin)
//! - Fuzzy resolution of misspelled names (warfarn→warfarin)
//! - Ranked autocomplete suggestions

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use strsim::{jaro_winkler, normalized_levenshtein};
use tracing::info;

use crate::models::{NormalizationLog, NormalizationMethod};

use super::{ResolverError, ResolverResult};

/// Accepted header names for the alias column, in priority order.
const ALIAS_COLUMNS: &[&str] = &["alias", "synonym", "name", "drug", "term", "variant"];

/// Accepted header names for the canonical column, in priority order.
const CANONICAL_COLUMNS: &[&str] = &[
    "canonical",
    "preferred",
    "standard",
    "root",
    "normalized",
    "map_to",
    "canonical_name",
];

/// Minimum similarity (0-100) for a fuzzy match to count.
pub const SUGGESTION_THRESHOLD: u8 = 70;

/// Normalizer for free-text drug names.
///
/// Immutable after construction; lookups need no coordination.
pub struct Normalizer {
    /// Alias map: trimmed lowercase alias → canonical name
    alias_to_canonical: HashMap<String, String>,
    /// Sorted, de-duplicated suggestion vocabulary
    aliases: Vec<String>,
    /// When false, fuzzy matching is skipped and suggestions degrade to
    /// prefix/substring filtering
    fuzzy_enabled: bool,
}

impl Normalizer {
    /// Load a two-column alias→canonical table from a CSV file.
    ///
    /// Header names are matched against the accepted candidates for each
    /// logical column; when neither column can be recognized the file is
    /// re-read headerless and the first two columns are used. Fails when
    /// fewer than two columns exist.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> ResolverResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ResolverError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);
        let headers = reader.headers()?.clone();

        let alias_col = pick_column(&headers, ALIAS_COLUMNS);
        let canonical_col = pick_column(&headers, CANONICAL_COLUMNS);

        let mut entries: Vec<(String, String)> = Vec::new();
        match (alias_col, canonical_col) {
            (Some(alias_idx), Some(canonical_idx)) => {
                for record in reader.records() {
                    let record = record?;
                    entries.push((
                        record.get(alias_idx).unwrap_or("").to_string(),
                        record.get(canonical_idx).unwrap_or("").to_string(),
                    ));
                }
            }
            _ => {
                // No recognizable header: treat every row (including the
                // first) as data and take the first two columns
                if headers.len() < 2 {
                    return Err(ResolverError::MissingColumns);
                }
                let file = File::open(path).map_err(|source| ResolverError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                let mut reader = csv::ReaderBuilder::new()
                    .flexible(true)
                    .has_headers(false)
                    .from_reader(file);
                for record in reader.records() {
                    let record = record?;
                    entries.push((
                        record.get(0).unwrap_or("").to_string(),
                        record.get(1).unwrap_or("").to_string(),
                    ));
                }
            }
        }

        let normalizer = Self::from_entries_owned(entries);
        info!(
            "synonym table loaded from {}: {} aliases",
            path.display(),
            normalizer.aliases.len()
        );
        Ok(normalizer)
    }

    /// Build a normalizer directly from (alias, canonical) pairs.
    pub fn from_entries(entries: &[(&str, &str)]) -> Self {
        Self::from_entries_owned(
            entries
                .iter()
                .map(|(a, c)| (a.to_string(), c.to_string()))
                .collect(),
        )
    }

    fn from_entries_owned(entries: Vec<(String, String)>) -> Self {
        let mut alias_to_canonical = HashMap::new();
        for (alias, canonical) in entries {
            let alias = alias.trim().to_lowercase();
            let canonical = canonical.trim().to_lowercase();
            if alias.is_empty() || canonical.is_empty() {
                continue;
            }
            // Last write wins on duplicate aliases
            alias_to_canonical.insert(alias, canonical);
        }

        let mut aliases: Vec<String> = alias_to_canonical.keys().cloned().collect();
        aliases.sort();

        Self {
            alias_to_canonical,
            aliases,
            fuzzy_enabled: true,
        }
    }

    /// Enable or disable fuzzy matching. Disabled, `suggestions` falls back
    /// to prefix/substring filtering and `normalize` to exact-or-fallback.
    pub fn set_fuzzy_matching(&mut self, enabled: bool) {
        self.fuzzy_enabled = enabled;
    }

    /// Map a name to its canonical form.
    ///
    /// Unknown names pass through trimmed and lowercased, so every input
    /// yields a checkable canonical form.
    pub fn canonical(&self, name: &str) -> String {
        let key = name.trim().to_lowercase();
        self.alias_to_canonical
            .get(&key)
            .cloned()
            .unwrap_or(key)
    }

    /// Resolve a name to its canonical form with a diagnostic log.
    ///
    /// Exact alias hits score 100; otherwise the best fuzzy alias at or
    /// above [`SUGGESTION_THRESHOLD`] resolves with its similarity as the
    /// score; otherwise the input passes through as fallback.
    pub fn normalize(&self, name: &str) -> (String, NormalizationLog) {
        let key = name.trim().to_lowercase();

        if let Some(canonical) = self.alias_to_canonical.get(&key) {
            return (
                canonical.clone(),
                NormalizationLog {
                    input: name.to_string(),
                    method: NormalizationMethod::Exact,
                    score: 100,
                },
            );
        }

        if self.fuzzy_enabled {
            if let Some((alias, score)) = self.best_fuzzy_alias(&key) {
                if score >= SUGGESTION_THRESHOLD {
                    return (
                        self.alias_to_canonical[alias].clone(),
                        NormalizationLog {
                            input: name.to_string(),
                            method: NormalizationMethod::Fuzzy,
                            score,
                        },
                    );
                }
            }
        }

        (
            key,
            NormalizationLog {
                input: name.to_string(),
                method: NormalizationMethod::Fallback,
                score: 0,
            },
        )
    }

    /// Ranked autocomplete suggestions with the default threshold.
    pub fn suggestions(&self, query: &str, limit: usize) -> Vec<String> {
        self.suggestions_with_threshold(query, limit, SUGGESTION_THRESHOLD)
    }

    /// Ranked autocomplete suggestions.
    ///
    /// Fuzzy mode scores the query against the whole vocabulary and returns
    /// matches at or above `threshold`, best first. Degraded mode returns
    /// prefix matches when any exist, substring matches otherwise.
    pub fn suggestions_with_threshold(
        &self,
        query: &str,
        limit: usize,
        threshold: u8,
    ) -> Vec<String> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        if self.fuzzy_enabled {
            let mut scored: Vec<(&String, u8)> = self
                .aliases
                .iter()
                .map(|alias| (alias, similarity(&query, alias)))
                .filter(|(_, score)| *score >= threshold)
                .collect();
            // Stable sort: equal scores keep vocabulary order
            scored.sort_by(|a, b| b.1.cmp(&a.1));
            return scored
                .into_iter()
                .take(limit)
                .map(|(alias, _)| alias.clone())
                .collect();
        }

        // Degraded mode: prefix matches first, substring matches otherwise
        let prefixed: Vec<String> = self
            .aliases
            .iter()
            .filter(|alias| alias.starts_with(&query))
            .take(limit)
            .cloned()
            .collect();
        if !prefixed.is_empty() {
            return prefixed;
        }
        self.aliases
            .iter()
            .filter(|alias| alias.contains(&query))
            .take(limit)
            .cloned()
            .collect()
    }

    /// Number of known aliases.
    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }

    /// The suggestion vocabulary, sorted.
    pub fn vocabulary(&self) -> &[String] {
        &self.aliases
    }

    fn best_fuzzy_alias(&self, name: &str) -> Option<(&str, u8)> {
        self.aliases
            .iter()
            .map(|alias| (alias.as_str(), similarity(name, alias)))
            .max_by_key(|(_, score)| *score)
    }
}

/// Find the first candidate header present, by candidate priority.
fn pick_column(headers: &csv::StringRecord, candidates: &[&str]) -> Option<usize> {
    let lowered: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
    candidates
        .iter()
        .find_map(|candidate| lowered.iter().position(|header| header == candidate))
}

/// Combined string similarity on a 0-100 scale.
///
/// Jaro-Winkler is weighted more heavily as it is better for the
/// prefix-heavy shape of drug names; normalized Levenshtein anchors overall
/// similarity.
fn similarity(a: &str, b: &str) -> u8 {
    let jw = jaro_winkler(a, b);
    let lev = normalized_levenshtein(a, b);
    ((jw * 0.6 + lev * 0.4) * 100.0).round() as u8
}
