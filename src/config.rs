//! Analysis configuration.
//!
//! Mirrors the teacher's `ValidatorConfig`/`FraudThresholds` pattern: a
//! plain struct with a `Default` impl carrying the production constants
//! from §6, overridable wholesale via `with_config`-style construction.

/// Tunables for a single `analyze` call. The only field callers are
/// expected to vary is `max_runtime_seconds`; the rest are the fixed
/// parameters named in §6 and are exposed so tests can exercise the
/// detectors at smaller scale.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Wall-clock budget for the whole call. `<= 0.0` means unbounded.
    pub max_runtime_seconds: f64,
    /// Cycle length range, inclusive.
    pub cycle_len_min: usize,
    pub cycle_len_max: usize,
    /// Maximum number of rings emitted per run.
    pub ring_cap: usize,
    /// Sliding window for smurfing detection, in hours.
    pub smurfing_window_hours: i64,
    /// Minimum distinct counterparties within the window to flag.
    pub smurfing_min_counterparties: usize,
    /// Inclusive total-transaction range for shell intermediary candidacy.
    pub shell_total_tx_min: usize,
    pub shell_total_tx_max: usize,
    /// Fraction of total accounts allowed into the suspicious set.
    pub precision_cap_fraction: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_runtime_seconds: 10.0,
            cycle_len_min: 3,
            cycle_len_max: 5,
            ring_cap: 500,
            smurfing_window_hours: 72,
            smurfing_min_counterparties: 10,
            shell_total_tx_min: 2,
            shell_total_tx_max: 3,
            precision_cap_fraction: 0.20,
        }
    }
}

impl AnalysisConfig {
    /// The sub-budget (seconds) handed to CycleDetector, per §5:
    /// `max(2, min(6, 0.6 * max_runtime))`. Only meaningful when
    /// `max_runtime_seconds > 0.0`; an unbounded overall deadline gives
    /// CycleDetector an unbounded sub-budget too (see `lib::analyze`).
    pub fn cycle_sub_budget_seconds(&self) -> f64 {
        (0.6 * self.max_runtime_seconds).clamp(2.0, 6.0)
    }
}
