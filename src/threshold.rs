//! Dataset-adaptive thresholding (§4.8).
//!
//! No direct teacher analogue — built from spec.md directly, structured
//! as a pure function over account summaries the way the teacher's risk
//! functions are pure over a single `Transaction`.

use crate::interner::AccountId;

/// The subset of an account's state the thresholder needs.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdInput {
    pub account: AccountId,
    pub score: f64,
    pub pattern_count: usize,
    pub has_cycle: bool,
    pub total_tx: usize,
    pub ring_linked: bool,
}

/// `true` if this account meets one of §4.8's high-confidence rule
/// combinations.
fn is_high_confidence(a: &ThresholdInput) -> bool {
    (a.has_cycle && a.total_tx >= 2 && a.score >= 45.0)
        || (a.pattern_count >= 2 && a.total_tx >= 4 && a.score >= 52.0)
        || (a.pattern_count >= 3 && a.total_tx >= 3 && a.score >= 50.0)
        || (a.pattern_count == 1 && a.total_tx >= 8 && a.score >= 68.0)
}

/// Inclusive/linear-interpolation percentile (NumPy's default method).
/// `p` in `[0, 100]`. `values` need not be sorted; a sorted copy is made.
fn percentile(values: &[f64], p: f64) -> f64 {
    assert!(!values.is_empty());
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = (p / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let frac = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// Outcome of thresholding: the final threshold value and the set of
/// accounts selected as suspicious.
#[derive(Debug, Clone)]
pub struct ThresholdOutcome {
    pub threshold: f64,
    pub suspicious: Vec<AccountId>,
}

/// Applies §4.8 end to end: primary/fallback threshold selection, the
/// precision cap, and the ring safety net. `name_of` supplies the
/// canonical string form used to break score ties ascending.
pub fn apply_thresholding(
    accounts: &[ThresholdInput],
    total_accounts: usize,
    precision_cap_fraction: f64,
    name_of: impl Fn(AccountId) -> String,
) -> ThresholdOutcome {
    let high_confidence: Vec<&ThresholdInput> =
        accounts.iter().filter(|a| is_high_confidence(a)).collect();

    let (threshold, mut suspicious): (f64, Vec<AccountId>) = if !high_confidence.is_empty() {
        let scores: Vec<f64> = high_confidence.iter().map(|a| a.score).collect();
        let threshold = percentile(&scores, 75.0).max(55.0);
        let suspicious = high_confidence
            .iter()
            .filter(|a| a.score >= threshold)
            .map(|a| a.account)
            .collect();
        (threshold, suspicious)
    } else {
        let candidates: Vec<&ThresholdInput> = accounts
            .iter()
            .filter(|a| a.pattern_count >= 1 && a.total_tx >= 3)
            .collect();
        if candidates.is_empty() {
            (100.0, Vec::new())
        } else {
            let scores: Vec<f64> = candidates.iter().map(|a| a.score).collect();
            let threshold = percentile(&scores, 90.0).max(58.0);
            let suspicious = candidates
                .iter()
                .filter(|a| a.score >= threshold)
                .map(|a| a.account)
                .collect();
            (threshold, suspicious)
        }
    };

    let max_allowed = (precision_cap_fraction * total_accounts as f64).floor().max(1.0) as usize;
    if suspicious.len() > max_allowed {
        suspicious.sort_by(|a, b| {
            let sa = accounts.iter().find(|x| x.account == *a).unwrap().score;
            let sb = accounts.iter().find(|x| x.account == *b).unwrap().score;
            sb.partial_cmp(&sa)
                .unwrap()
                .then_with(|| name_of(*a).cmp(&name_of(*b)))
        });
        suspicious.truncate(max_allowed);
    }

    if suspicious.is_empty() {
        let mut ring_linked: Vec<&ThresholdInput> = accounts
            .iter()
            .filter(|a| a.ring_linked && a.score >= 45.0)
            .collect();
        if !ring_linked.is_empty() {
            ring_linked.sort_by(|a, b| {
                b.score
                    .partial_cmp(&a.score)
                    .unwrap()
                    .then_with(|| name_of(a.account).cmp(&name_of(b.account)))
            });
            let keep = ring_linked.len().min(10).max(1);
            suspicious = ring_linked.iter().take(keep).map(|a| a.account).collect();
        }
    }

    ThresholdOutcome {
        threshold,
        suspicious,
    }
}
