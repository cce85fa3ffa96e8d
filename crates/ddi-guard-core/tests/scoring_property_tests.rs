//! Property tests for scoring and normalization invariants.

use ddi_guard_core::checker::alert_id;
use ddi_guard_core::models::SeverityBucket;
use ddi_guard_core::resolver::Normalizer;
use ddi_guard_core::scoring;
use proptest::prelude::*;

fn bucket_strategy() -> impl Strategy<Value = SeverityBucket> {
    prop_oneof![
        Just(SeverityBucket::Minor),
        Just(SeverityBucket::Moderate),
        Just(SeverityBucket::Major),
        Just(SeverityBucket::Contraindicated),
    ]
}

proptest! {
    /// Whatever the text says, the score never leaves the bucket's band.
    #[test]
    fn score_stays_in_band(
        bucket in bucket_strategy(),
        description in ".*",
        pattern in ".*",
    ) {
        let score = scoring::severity_score(bucket, &description, &pattern);
        let (lo, hi) = scoring::band(bucket);
        prop_assert!(score >= lo && score <= hi, "{} outside [{}, {}]", score, lo, hi);
    }

    /// Scoring is pure: identical inputs give identical 2-decimal outputs.
    #[test]
    fn score_is_deterministic(
        bucket in bucket_strategy(),
        description in ".*",
        pattern in ".*",
    ) {
        let first = scoring::severity_score(bucket, &description, &pattern);
        let second = scoring::severity_score(bucket, &description, &pattern);
        prop_assert_eq!(first, second);
    }

    /// Scores are already rounded to 2 decimals.
    #[test]
    fn score_is_two_decimal(bucket in bucket_strategy(), description in ".*") {
        let score = scoring::severity_score(bucket, &description, "");
        prop_assert_eq!(score, (score * 100.0).round() / 100.0);
    }

    /// Unknown labels never panic and always land in some bucket's band.
    #[test]
    fn label_mapping_is_total(label in ".*") {
        let bucket = SeverityBucket::from_label(&label);
        let (lo, hi) = scoring::band(bucket);
        prop_assert!(lo < hi);
    }

    /// Canonicalization is total and always trimmed + lowercased.
    #[test]
    fn canonical_never_fails(name in "\\PC*") {
        let normalizer = Normalizer::from_entries(&[
            ("coumadin", "warfarin"),
            ("diflucan", "fluconazole"),
        ]);
        let canonical = normalizer.canonical(&name);
        prop_assert_eq!(&canonical, &canonical.trim().to_lowercase());
    }

    /// Alert ids are always fixed-length lowercase hex.
    #[test]
    fn alert_id_is_short_hex(
        a in "[a-z][a-z0-9-]{0,24}",
        b in "[a-z][a-z0-9-]{0,24}",
        bucket in bucket_strategy(),
        score in 0.0f64..=1.0f64,
    ) {
        let id = alert_id(&a, &b, bucket, score);
        prop_assert_eq!(id.len(), 12);
        prop_assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    /// Suggestions never exceed the requested limit.
    #[test]
    fn suggestions_respect_limit(query in "[a-z]{1,10}", limit in 0usize..8) {
        let normalizer = Normalizer::from_entries(&[
            ("warfarin", "warfarin"),
            ("coumadin", "warfarin"),
            ("fluconazole", "fluconazole"),
            ("fluoxetine", "fluoxetine"),
        ]);
        prop_assert!(normalizer.suggestions_with_threshold(&query, limit, 0).len() <= limit);
    }
}
