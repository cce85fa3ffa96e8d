//! Continuous severity scoring.
//!
//! Maps a categorical severity bucket plus free-text interaction evidence
//! into a score in [0, 1]. Every bucket owns an anchor value and a hard
//! clamp band, so scores stay monotonically consistent with bucket ordering
//! while textual evidence refines ranking inside the band.
//!
//! Signal weights:
//! - severe clinical outcome: 0.12
//! - avoidance/contraindication language: 0.08
//! - CYP/transporter mechanism strength: 0.08
//! - pharmacokinetic exposure change: 0.08
//! - magnitude emphasis: 0.05
//! - log-scaled distinct-signal count: 0.03
//! - explicit negation: -0.10

mod patterns;

use crate::models::SeverityBucket;

const W_OUTCOME: f64 = 0.12;
const W_ACTION: f64 = 0.08;
const W_MECHANISM: f64 = 0.08;
const W_PK_CHANGE: f64 = 0.08;
const W_MAGNITUDE: f64 = 0.05;
const W_SIGNAL_COUNT: f64 = 0.03;
const W_NEGATION: f64 = 0.10;

/// Anchor value a bucket's scores are built from.
pub fn anchor(bucket: SeverityBucket) -> f64 {
    match bucket {
        SeverityBucket::Minor => 0.25,
        SeverityBucket::Moderate => 0.60,
        SeverityBucket::Major => 0.85,
        SeverityBucket::Contraindicated => 1.00,
    }
}

/// Hard (min, max) band a bucket's final score may not leave.
pub fn band(bucket: SeverityBucket) -> (f64, f64) {
    match bucket {
        SeverityBucket::Minor => (0.10, 0.40),
        SeverityBucket::Moderate => (0.40, 0.80),
        SeverityBucket::Major => (0.70, 0.95),
        SeverityBucket::Contraindicated => (0.95, 1.00),
    }
}

/// Clamp a raw score into the bucket's band.
pub fn clamp_band(bucket: SeverityBucket, score: f64) -> f64 {
    let (lo, hi) = band(bucket);
    score.clamp(lo, hi)
}

/// Score one interaction row's textual evidence.
///
/// Pure and total: identical inputs always produce an identical score to
/// 2-decimal precision, and every branch returns a value in the bucket's
/// band.
pub fn severity_score(bucket: SeverityBucket, description: &str, matched_pattern: &str) -> f64 {
    let text = format!("{} {}", description, matched_pattern);

    let outcome = if patterns::outcome(&text) { 1.0 } else { 0.0 };
    let action = if patterns::action(&text) { 1.0 } else { 0.0 };
    let negation = if patterns::negation(&text) { 1.0 } else { 0.0 };

    let mechanism = patterns::mechanism_strength(&text);
    let pk_change = patterns::pk_change(&text);
    let magnitude = patterns::magnitude(&text);

    let signal_count = [outcome, action, mechanism, pk_change, magnitude]
        .iter()
        .filter(|s| **s > 0.0)
        .count() as f64;

    let raw = anchor(bucket)
        + W_OUTCOME * outcome
        + W_ACTION * action
        + W_MECHANISM * mechanism
        + W_PK_CHANGE * pk_change
        + W_MAGNITUDE * magnitude
        + W_SIGNAL_COUNT * signal_count.ln_1p()
        - W_NEGATION * negation;

    round2(clamp_band(bucket, raw))
}

fn round2(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}
