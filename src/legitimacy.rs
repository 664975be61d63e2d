//! Merchant/payroll legitimacy suppression (§4.6).
//!
//! Grounded on `original_source/detection/graph_analysis.py::_is_likely_legitimate`
//! for the three-branch threshold logic, structured the way the teacher's
//! `aml_compliance.rs`/`fraud_patterns.rs` pair a `Thresholds` struct with
//! a pure predicate function.

/// Thresholds governing the legitimacy heuristic. Fixed per §4.6; exposed
/// as a struct so tests can probe boundary values directly.
#[derive(Debug, Clone, Copy)]
pub struct LegitimacyThresholds {
    pub high_volume_tx: usize,
    pub balanced_tx_floor: usize,
    pub balanced_ratio: f64,
    pub balanced_degree_floor: usize,
    pub high_value_avg: f64,
    pub high_value_tx_floor: usize,
}

impl Default for LegitimacyThresholds {
    fn default() -> Self {
        Self {
            high_volume_tx: 200,
            balanced_tx_floor: 80,
            balanced_ratio: 0.85,
            balanced_degree_floor: 15,
            high_value_avg: 50_000.0,
            high_value_tx_floor: 30,
        }
    }
}

/// Returns `true` if the account resembles a high-volume merchant or
/// payroll account and its pattern hits should be suppressed.
pub fn is_likely_legitimate(
    total_tx: usize,
    total_in: f64,
    total_out: f64,
    in_degree: usize,
    out_degree: usize,
    thresholds: &LegitimacyThresholds,
) -> bool {
    if total_tx > thresholds.high_volume_tx {
        return true;
    }

    let total_flow = total_in + total_out;
    if total_flow <= 0.0 {
        return false;
    }

    let ratio = total_in.min(total_out) / total_in.max(total_out);
    if total_tx > thresholds.balanced_tx_floor
        && ratio > thresholds.balanced_ratio
        && (in_degree + out_degree) > thresholds.balanced_degree_floor
    {
        return true;
    }

    let avg_amount = total_flow / total_tx as f64;
    if avg_amount > thresholds.high_value_avg && total_tx > thresholds.high_value_tx_floor {
        return true;
    }

    false
}
