//! Final report assembly (§4.9, §6).
//!
//! Grounded on the teacher's `ValidationResult`/`to_json` pattern in
//! `src/lib.rs` (a serde-derived result struct plus a small convenience
//! method), and on `original_source/detection/graph_analysis.py::analyze_transactions`'s
//! final payload assembly for sort order, rounding, and timestamp formatting.

use serde::{Deserialize, Serialize};

use crate::cycles::RingCandidate;
use crate::graph::TransactionGraph;
use crate::interner::AccountId;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Per-account view fed into `assemble`; the account/behavioral/pattern
/// facts ReportAssembler needs are gathered by `lib::analyze` from the
/// Scorer, Thresholder, and CycleDetector outputs.
#[derive(Debug, Clone)]
pub struct NodeInput {
    pub account: AccountId,
    pub in_degree: usize,
    pub out_degree: usize,
    pub total_in_amount: f64,
    pub total_out_amount: f64,
    pub patterns: Vec<String>,
    pub ring_id: Option<String>,
    pub suspicion_score: f64,
    pub is_suspicious: bool,
}

/// A materialized per-account row (§3 `AccountScore`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountScore {
    pub account_id: String,
    pub in_degree: usize,
    pub out_degree: usize,
    pub total_in_amount: f64,
    pub total_out_amount: f64,
    pub patterns: Vec<String>,
    pub ring_id: Option<String>,
    pub suspicion_score: f64,
    pub is_suspicious: bool,
}

/// A materialized aggregate edge, as emitted in the report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EdgeView {
    pub source: String,
    pub target: String,
    pub transaction_count: usize,
    pub total_amount: f64,
    pub sample_transaction_ids: Vec<String>,
    pub first_timestamp: String,
    pub last_timestamp: String,
}

/// A materialized ring (§3).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ring {
    pub ring_id: String,
    pub member_accounts: Vec<String>,
    pub member_count: usize,
    pub risk_score: f64,
    pub pattern_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummaryStats {
    pub total_transactions: usize,
    pub total_accounts: usize,
    pub suspicious_accounts: usize,
    pub fraud_rings: usize,
    pub highest_risk_score: f64,
    pub max_suspicion_score: f64,
    pub suspicion_threshold: f64,
    pub processing_time_seconds: f64,
}

/// The final output of an `analyze` call (§6).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Report {
    pub nodes: Vec<AccountScore>,
    pub edges: Vec<EdgeView>,
    pub suspicious_accounts: Vec<AccountScore>,
    pub fraud_rings: Vec<Ring>,
    pub summary_stats: SummaryStats,
}

impl Report {
    /// Convenience serialization, mirroring the teacher's
    /// `ValidationResult::to_json`.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Assembles the final `Report` from every component's output.
/// `nodes` need not be pre-sorted; this function sorts by `suspicion_score`
/// descending with ties broken by ascending canonical account-id string.
pub fn assemble(
    graph: &TransactionGraph,
    nodes: Vec<NodeInput>,
    rings: &[RingCandidate],
    suspicion_threshold: f64,
    total_transactions: usize,
    processing_time_seconds: f64,
) -> Report {
    let name_of = |id: AccountId| graph.interner.name(id).to_string();

    let mut account_scores: Vec<AccountScore> = nodes
        .into_iter()
        .map(|n| AccountScore {
            account_id: name_of(n.account),
            in_degree: n.in_degree,
            out_degree: n.out_degree,
            total_in_amount: round2(n.total_in_amount),
            total_out_amount: round2(n.total_out_amount),
            patterns: n.patterns,
            ring_id: n.ring_id,
            suspicion_score: round2(n.suspicion_score),
            is_suspicious: n.is_suspicious,
        })
        .collect();

    account_scores.sort_by(|a, b| {
        b.suspicion_score
            .partial_cmp(&a.suspicion_score)
            .unwrap()
            .then_with(|| a.account_id.cmp(&b.account_id))
    });

    let edges: Vec<EdgeView> = graph
        .edges_in_order()
        .map(|edge| EdgeView {
            source: graph.interner.name(edge.sender).to_string(),
            target: graph.interner.name(edge.receiver).to_string(),
            transaction_count: edge.count,
            total_amount: round2(edge.total_amount),
            sample_transaction_ids: edge.transaction_ids.iter().take(5).cloned().collect(),
            first_timestamp: edge.first_timestamp.format(TIMESTAMP_FORMAT).to_string(),
            last_timestamp: edge.last_timestamp.format(TIMESTAMP_FORMAT).to_string(),
        })
        .collect();

    let suspicious_accounts: Vec<AccountScore> = account_scores
        .iter()
        .filter(|a| a.is_suspicious)
        .cloned()
        .collect();

    let fraud_rings: Vec<Ring> = rings
        .iter()
        .map(|r| Ring {
            ring_id: r.ring_id.clone(),
            member_accounts: r.member_accounts.iter().map(|&m| name_of(m)).collect(),
            member_count: r.member_accounts.len(),
            risk_score: r.risk_score,
            pattern_type: "cycle".to_string(),
        })
        .collect();

    let highest_risk_score = fraud_rings.iter().map(|r| r.risk_score).fold(0.0, f64::max);
    let max_suspicion_score = account_scores
        .iter()
        .map(|a| a.suspicion_score)
        .fold(0.0, f64::max);

    let summary_stats = SummaryStats {
        total_transactions,
        total_accounts: account_scores.len(),
        suspicious_accounts: suspicious_accounts.len(),
        fraud_rings: fraud_rings.len(),
        highest_risk_score,
        max_suspicion_score,
        suspicion_threshold: round2(suspicion_threshold),
        processing_time_seconds,
    };

    Report {
        nodes: account_scores,
        edges,
        suspicious_accounts,
        fraud_rings,
        summary_stats,
    }
}
