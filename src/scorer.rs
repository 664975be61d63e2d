//! Per-account suspicion scoring (§4.7).
//!
//! Grounded on the teacher's additive-score-with-cap style in
//! `src/lib.rs::RiskBreakdown`/`calculate_amount_risk` (several
//! independent contributions summed, then clamped), generalized to the
//! pattern tags and `ln`-based behavioral terms §4.7 specifies.

/// Which patterns hit this account, and the ring length if it's cyclic.
#[derive(Debug, Clone, Default)]
pub struct PatternHits {
    pub cycle_length: Option<usize>,
    pub fan_in: bool,
    pub fan_out: bool,
    pub shell: bool,
}

impl PatternHits {
    fn tags(&self) -> Vec<String> {
        let mut tags = Vec::new();
        if let Some(len) = self.cycle_length {
            tags.push(format!("cycle_length_{len}"));
        }
        if self.fan_in {
            tags.push("smurfing_fan_in".to_string());
        }
        if self.fan_out {
            tags.push("smurfing_fan_out".to_string());
        }
        if self.shell {
            tags.push("layered_shell".to_string());
        }
        tags
    }

    fn count(&self) -> usize {
        self.cycle_length.is_some() as usize
            + self.fan_in as usize
            + self.fan_out as usize
            + self.shell as usize
    }
}

/// Behavioral inputs needed for the non-pattern score contribution.
#[derive(Debug, Clone, Copy)]
pub struct BehavioralInputs {
    pub in_degree: usize,
    pub out_degree: usize,
    pub total_tx: usize,
    pub total_in: f64,
    pub total_out: f64,
}

/// Result of scoring one account.
#[derive(Debug, Clone)]
pub struct ScoreResult {
    pub score: f64,
    pub patterns: Vec<String>,
}

/// Computes the final suspicion score and pattern tag list for one
/// account, per §4.7. `is_legitimate` suppresses pattern contributions
/// (tags are dropped, not just their score) and multiplies the resulting
/// score by 0.35.
pub fn score_account(hits: &PatternHits, behavior: &BehavioralInputs, is_legitimate: bool) -> ScoreResult {
    let mut score = 0.0;
    let mut patterns = Vec::new();

    if !is_legitimate {
        patterns = hits.tags();

        if let Some(len) = hits.cycle_length {
            score += if len == 3 { 50.0 } else { 46.0 };
        }
        if hits.fan_in {
            score += 20.0;
        }
        if hits.fan_out {
            score += 20.0;
        }
        if hits.shell {
            score += 16.0;
        }

        let degree = behavior.in_degree + behavior.out_degree;
        if degree > 0 {
            score += (1.2 * ((1 + degree) as f64).ln()).min(10.0);
            score += (1.4 * ((1 + behavior.total_tx) as f64).ln()).min(8.0);
            let total_flow = behavior.total_in + behavior.total_out;
            if total_flow > 0.0 {
                score += 8.0 * (behavior.total_in - behavior.total_out).abs() / total_flow;
            }
        }

        let pattern_count = hits.count();
        if pattern_count >= 2 {
            score += 6.0;
        }
        if pattern_count >= 3 {
            score += 6.0;
        }
    }

    if is_legitimate {
        score *= 0.35;
    }

    score = score.clamp(0.0, 100.0);
    score = (score * 100.0).round() / 100.0;

    ScoreResult { score, patterns }
}
