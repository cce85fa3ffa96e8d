//! Signal pattern set for severity scoring.
//!
//! Each detector scans interaction description text for one family of
//! evidence. Detectors are independent so the pattern set can grow without
//! touching ranking or aggregation.

use once_cell::sync::Lazy;
use regex::Regex;

static RX_OUTCOME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(bleeding|hemorrhag|haemorrhag|inr\s*(increase|elevat)|torsade|qt\s*prolong|arrhythmia|serotonin\s+syndrome|nms|rhabdomyolysis|hyperkalemi|anaphylaxis)",
    )
    .unwrap()
});

static RX_ACTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(avoid|do\s*not\s*use|contraindicat|boxed\s*warning)").unwrap());

static RX_NEGATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(does\s+not\s+(increase|decrease|affect)|no\s+clinically\s+significant)")
        .unwrap()
});

/// Build one mechanism tier pattern. Accepts both phrase orders:
/// "strong inhibitor of CYP2C9" and "strong CYP2C9 inhibitor".
fn mechanism_pattern(grade: &str) -> Regex {
    const TARGETS: &str = "cyp|p-?gp|bcrp|oatp|ugt";
    Regex::new(&format!(
        r"(?i)({grade}).{{0,8}}(inhibit|induc).{{0,12}}({TARGETS})|({grade}).{{0,8}}({TARGETS}).{{0,12}}(inhibit|induc)",
    ))
    .unwrap()
}

static RX_MECH_STRONG: Lazy<Regex> = Lazy::new(|| mechanism_pattern("strong|potent"));

static RX_MECH_MODERATE: Lazy<Regex> = Lazy::new(|| mechanism_pattern("moderate"));

static RX_MECH_WEAK: Lazy<Regex> = Lazy::new(|| mechanism_pattern("weak|mild"));

static RX_PK_INCREASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(serum\s+concentration|exposure|auc|cmax).{0,6}(increase|raised|elevat|higher|↑)")
        .unwrap()
});

static RX_PK_DECREASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(serum\s+concentration|exposure|auc|cmax).{0,6}(decrease|lower|reduc|↓)")
        .unwrap()
});

static RX_MAGNITUDE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(\b\d+(\.\d+)?-fold\b|\b\d{1,3}%|\bmarked(ly)?\b|\bsignificant(ly)?\b|\bsubstantial(ly)?\b)",
    )
    .unwrap()
});

/// Severe clinical outcome language (bleeding, QT prolongation, ...).
pub(super) fn outcome(text: &str) -> bool {
    RX_OUTCOME.is_match(text)
}

/// Explicit avoidance/contraindication language.
pub(super) fn action(text: &str) -> bool {
    RX_ACTION.is_match(text)
}

/// Language explicitly denying a clinically relevant effect.
pub(super) fn negation(text: &str) -> bool {
    RX_NEGATION.is_match(text)
}

/// CYP/transporter inhibition or induction strength.
/// Checked strong-first; the first tier that matches wins.
pub(super) fn mechanism_strength(text: &str) -> f64 {
    if RX_MECH_STRONG.is_match(text) {
        1.0
    } else if RX_MECH_MODERATE.is_match(text) {
        0.6
    } else if RX_MECH_WEAK.is_match(text) {
        0.3
    } else {
        0.0
    }
}

/// Pharmacokinetic exposure change. Increase and decrease language may
/// co-occur and their contributions sum.
pub(super) fn pk_change(text: &str) -> f64 {
    let increase = if RX_PK_INCREASE.is_match(text) { 1.0 } else { 0.0 };
    let decrease = if RX_PK_DECREASE.is_match(text) { 1.0 } else { 0.0 };
    increase * 0.8 + decrease * 0.5
}

/// Magnitude-emphasis phrase density on a log scale, capped at 1.0.
pub(super) fn magnitude(text: &str) -> f64 {
    let hits = RX_MAGNITUDE.find_iter(text).count() as f64;
    (hits.ln_1p() / 4.0_f64.ln()).min(1.0)
}
