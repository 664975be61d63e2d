//! # Transaction Graph Analyzer
//!
//! A money-muling and coordinated-ring fraud analyzer over a batch of
//! financial transactions.
//!
//! ## Pipeline
//!
//! - **Validator**: normalizes raw rows to the canonical transaction schema.
//! - **GraphBuilder**: aggregates transactions into a directed multi-aggregate
//!   graph keyed by `(sender, receiver)`.
//! - **CycleDetector**: enumerates simple directed cycles of length 3-5 under
//!   a wall-clock deadline, emitting disjoint fraud rings.
//! - **SmurfingDetector**: sliding-window fan-in/fan-out scans over 72-hour
//!   windows.
//! - **ShellDetector**: flags low-activity layered-shell intermediaries.
//! - **LegitimacyFilter**: suppresses pattern scoring on merchant/payroll-like
//!   accounts.
//! - **Scorer**: combines pattern and behavioral signals into a per-account
//!   suspicion score.
//! - **Thresholder**: picks a dataset-adaptive suspicion threshold under a
//!   precision cap, with a ring safety net.
//! - **ReportAssembler**: produces the final node/edge/ring list and summary.
//!
//! A single [`analyze`] call is stateless across invocations: it consumes a
//! finite table of rows and an [`AnalysisConfig`], and returns a [`Report`]
//! or an [`AnalysisError`]. There is no persistence, no I/O, and no retained
//! state between calls.

pub mod config;
pub mod cycles;
pub mod error;
pub mod graph;
pub mod interner;
pub mod legitimacy;
pub mod report;
pub mod scorer;
pub mod shell;
pub mod smurfing;
pub mod threshold;
pub mod validator;

pub use config::AnalysisConfig;
pub use error::AnalysisError;
pub use interner::AccountId;
pub use report::Report;
pub use validator::{Transaction, TransactionRow};

use std::collections::HashMap;
use std::time::{Duration, Instant};

use legitimacy::{is_likely_legitimate, LegitimacyThresholds};
use report::NodeInput;
use scorer::{score_account, BehavioralInputs, PatternHits};
use threshold::ThresholdInput;

#[derive(Debug, Default, Clone, Copy)]
struct AccountFlows {
    total_tx: usize,
    total_in: f64,
    total_out: f64,
}

fn gather_flows(transactions: &[Transaction], resolve: impl Fn(&str) -> AccountId) -> HashMap<AccountId, AccountFlows> {
    let mut flows: HashMap<AccountId, AccountFlows> = HashMap::new();
    for tx in transactions {
        let sender = resolve(&tx.sender_id);
        let receiver = resolve(&tx.receiver_id);
        let out_entry = flows.entry(sender).or_default();
        out_entry.total_tx += 1;
        out_entry.total_out += tx.amount;
        let in_entry = flows.entry(receiver).or_default();
        in_entry.total_tx += 1;
        in_entry.total_in += tx.amount;
    }
    flows
}

/// Runs the full pipeline over a batch of raw rows and returns the final
/// fraud-risk report, per §2/§5/§6. Fails only on `Validator`/`GraphBuilder`
/// errors (§7); deadline exhaustion always yields a well-formed partial
/// report, never an error.
pub fn analyze(rows: &[TransactionRow], config: &AnalysisConfig) -> Result<Report, AnalysisError> {
    let start = Instant::now();

    let transactions = validator::validate(rows)?;
    let graph = graph::build_graph(&transactions)?;

    let overall_deadline = (config.max_runtime_seconds > 0.0)
        .then(|| start + Duration::from_secs_f64(config.max_runtime_seconds));
    let cycle_deadline = overall_deadline
        .map(|_| start + Duration::from_secs_f64(config.cycle_sub_budget_seconds()));

    let (rings, node_to_ring) = cycles::detect_cycles(
        &graph,
        config.cycle_len_min,
        config.cycle_len_max,
        config.ring_cap,
        cycle_deadline,
    );
    let ring_length: HashMap<String, usize> = rings
        .iter()
        .map(|r| (r.ring_id.clone(), r.member_accounts.len()))
        .collect();

    let resolve = |name: &str| graph.interner.get(name).expect("account interned during build_graph");
    let smurfing_flags = smurfing::detect_smurfing(
        &transactions,
        resolve,
        config.smurfing_window_hours,
        config.smurfing_min_counterparties,
        overall_deadline,
    );

    let flows = gather_flows(&transactions, resolve);
    let shells = shell::detect_shells(
        &graph,
        |id| flows.get(&id).map(|f| f.total_tx).unwrap_or(0),
        config.shell_total_tx_min,
        config.shell_total_tx_max,
    );

    let legitimacy_thresholds = LegitimacyThresholds::default();

    let mut node_inputs = Vec::with_capacity(graph.node_count());
    let mut threshold_inputs = Vec::with_capacity(graph.node_count());

    for account in graph.nodes() {
        let flow = flows.get(&account).copied().unwrap_or_default();
        let in_degree = graph.in_degree(account);
        let out_degree = graph.out_degree(account);

        let is_legitimate = is_likely_legitimate(
            flow.total_tx,
            flow.total_in,
            flow.total_out,
            in_degree,
            out_degree,
            &legitimacy_thresholds,
        );

        let ring_id = node_to_ring.get(&account).cloned();
        let hits = PatternHits {
            cycle_length: ring_id.as_ref().map(|r| ring_length[r]),
            fan_in: smurfing_flags.fan_in.contains(&account),
            fan_out: smurfing_flags.fan_out.contains(&account),
            shell: shells.contains(&account),
        };
        let behavior = BehavioralInputs {
            in_degree,
            out_degree,
            total_tx: flow.total_tx,
            total_in: flow.total_in,
            total_out: flow.total_out,
        };
        let result = score_account(&hits, &behavior, is_legitimate);

        threshold_inputs.push(ThresholdInput {
            account,
            score: result.score,
            pattern_count: result.patterns.len(),
            has_cycle: hits.cycle_length.is_some(),
            total_tx: flow.total_tx,
            ring_linked: ring_id.is_some(),
        });

        node_inputs.push((
            account,
            NodeInput {
                account,
                in_degree,
                out_degree,
                total_in_amount: flow.total_in,
                total_out_amount: flow.total_out,
                patterns: result.patterns,
                ring_id,
                suspicion_score: result.score,
                is_suspicious: false,
            },
        ));
    }

    let name_of = |id: AccountId| graph.interner.name(id).to_string();
    let outcome = threshold::apply_thresholding(
        &threshold_inputs,
        graph.node_count(),
        config.precision_cap_fraction,
        name_of,
    );
    let suspicious: std::collections::HashSet<AccountId> = outcome.suspicious.into_iter().collect();

    let nodes: Vec<NodeInput> = node_inputs
        .into_iter()
        .map(|(account, mut node)| {
            node.is_suspicious = suspicious.contains(&account);
            node
        })
        .collect();

    let processing_time_seconds = start.elapsed().as_secs_f64();
    Ok(report::assemble(
        &graph,
        nodes,
        &rings,
        outcome.threshold,
        transactions.len(),
        processing_time_seconds,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, sender: &str, receiver: &str, amount: &str, ts: &str) -> TransactionRow {
        TransactionRow {
            transaction_id: Some(id.to_string()),
            sender_id: Some(sender.to_string()),
            receiver_id: Some(receiver.to_string()),
            amount: Some(amount.to_string()),
            timestamp: Some(ts.to_string()),
        }
    }

    #[test]
    fn triangle_yields_one_ring_with_expected_risk_score() {
        let rows = vec![
            row("t1", "A", "B", "100", "2024-01-01 00:00:00"),
            row("t2", "B", "C", "100", "2024-01-01 01:00:00"),
            row("t3", "C", "A", "100", "2024-01-01 02:00:00"),
        ];
        let report = analyze(&rows, &AnalysisConfig::default()).unwrap();
        assert_eq!(report.fraud_rings.len(), 1);
        let ring = &report.fraud_rings[0];
        assert_eq!(ring.ring_id, "RING_001");
        assert_eq!(ring.member_accounts, vec!["A", "B", "C"]);
        assert_eq!(ring.risk_score, 92.0);
        for account in &["A", "B", "C"] {
            let node = report.nodes.iter().find(|n| &n.account_id == account).unwrap();
            assert!(node.patterns.contains(&"cycle_length_3".to_string()));
            assert!(node.suspicion_score >= 50.0);
        }
    }

    #[test]
    fn bad_timestamps_fail_before_detection() {
        let rows = vec![row("t1", "A", "B", "100", "not-a-date")];
        let err = analyze(&rows, &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::BadTimestamp(_)));
    }

    #[test]
    fn every_account_appears_in_nodes_exactly_once() {
        let rows = vec![
            row("t1", "A", "B", "10", "2024-01-01 00:00:00"),
            row("t2", "B", "C", "10", "2024-01-01 01:00:00"),
        ];
        let report = analyze(&rows, &AnalysisConfig::default()).unwrap();
        let mut ids: Vec<&str> = report.nodes.iter().map(|n| n.account_id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), report.nodes.len());
        assert_eq!(report.nodes.len(), 3);
    }

    #[test]
    fn suspicious_accounts_is_subset_of_nodes_and_matches_is_suspicious_flag() {
        let rows = vec![
            row("t1", "A", "B", "10", "2024-01-01 00:00:00"),
            row("t2", "B", "C", "10", "2024-01-01 01:00:00"),
            row("t3", "C", "A", "10", "2024-01-01 02:00:00"),
        ];
        let report = analyze(&rows, &AnalysisConfig::default()).unwrap();
        let flagged: Vec<&str> = report
            .nodes
            .iter()
            .filter(|n| n.is_suspicious)
            .map(|n| n.account_id.as_str())
            .collect();
        let listed: Vec<&str> = report
            .suspicious_accounts
            .iter()
            .map(|n| n.account_id.as_str())
            .collect();
        assert_eq!(flagged, listed);
    }

    #[test]
    fn unbounded_deadline_is_fully_deterministic_across_reruns() {
        let rows = vec![
            row("t1", "A", "B", "10", "2024-01-01 00:00:00"),
            row("t2", "B", "C", "10", "2024-01-01 01:00:00"),
            row("t3", "C", "A", "10", "2024-01-01 02:00:00"),
        ];
        let mut config = AnalysisConfig::default();
        config.max_runtime_seconds = 0.0;
        let first = analyze(&rows, &config).unwrap();
        let second = analyze(&rows, &config).unwrap();
        assert_eq!(first.fraud_rings, second.fraud_rings);
        assert_eq!(
            first.nodes.iter().map(|n| &n.account_id).collect::<Vec<_>>(),
            second.nodes.iter().map(|n| &n.account_id).collect::<Vec<_>>()
        );
    }
}
