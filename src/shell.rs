//! Layered-shell intermediary detection (§4.5).
//!
//! Grounded on `original_source/detection/graph_analysis.py::_detect_layered_shell`
//! for the exact distance-2 predecessor/successor check, structured the
//! way the teacher's `network_analysis.rs::TransactionNode::is_funnel`/
//! `is_distributor` express small node-level predicates.

use std::collections::HashSet;

use crate::graph::TransactionGraph;
use crate::interner::AccountId;

/// Returns the set of accounts that are shell intermediaries per §4.5.
pub fn detect_shells(
    graph: &TransactionGraph,
    total_tx: impl Fn(AccountId) -> usize,
    total_tx_min: usize,
    total_tx_max: usize,
) -> HashSet<AccountId> {
    let mut shells = HashSet::new();

    for node in graph.nodes() {
        let tx = total_tx(node);
        if tx < total_tx_min || tx > total_tx_max {
            continue;
        }

        let in_deg = graph.in_degree(node);
        let out_deg = graph.out_degree(node);
        if in_deg < 2 || out_deg < 2 {
            continue;
        }

        let preds_dist1: HashSet<AccountId> = graph.predecessors(node).iter().copied().collect();
        let succs_dist1: HashSet<AccountId> = graph.successors(node).iter().copied().collect();

        let mut preds_dist2: HashSet<AccountId> = HashSet::new();
        for &p in &preds_dist1 {
            preds_dist2.extend(graph.predecessors(p).iter().copied());
        }

        let mut succs_dist2: HashSet<AccountId> = HashSet::new();
        for &s in &succs_dist1 {
            succs_dist2.extend(graph.successors(s).iter().copied());
        }

        let has_3hop = (!preds_dist1.is_empty() && !succs_dist2.is_empty())
            || (!preds_dist2.is_empty() && !succs_dist1.is_empty());

        if has_3hop {
            shells.insert(node);
        }
    }

    shells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_graph;
    use crate::validator::Transaction;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;

    fn tx(id: &str, from: &str, to: &str, hour: u32) -> Transaction {
        Transaction {
            transaction_id: id.to_string(),
            sender_id: from.to_string(),
            receiver_id: to.to_string(),
            amount: 100.0,
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap(),
        }
    }

    fn id_of(graph: &TransactionGraph, name: &str) -> AccountId {
        graph
            .nodes()
            .into_iter()
            .find(|id| graph.interner.name(*id) == name)
            .unwrap()
    }

    fn tx_counts(graph: &TransactionGraph, transactions: &[Transaction]) -> HashMap<AccountId, usize> {
        let mut counts: HashMap<AccountId, usize> = HashMap::new();
        for t in transactions {
            *counts.entry(id_of(graph, &t.sender_id)).or_insert(0) += 1;
            *counts.entry(id_of(graph, &t.receiver_id)).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn no_shells_in_a_simple_chain() {
        // A->B->C: B has in_deg=1,out_deg=1, fails the >=2,>=2 requirement.
        let txs = vec![tx("t1", "A", "B", 0), tx("t2", "B", "C", 1)];
        let graph = build_graph(&txs).unwrap();
        let counts = tx_counts(&graph, &txs);
        let shells = detect_shells(&graph, |id| *counts.get(&id).unwrap_or(&0), 2, 3);
        assert!(shells.is_empty());
    }

    #[test]
    fn reproduces_the_documented_open_question_literally() {
        // Two predecessors and two successors of V: in_deg=2, out_deg=2,
        // but total_tx (spec-defined as sender-count + receiver-count over
        // the raw transaction list) is 4, outside [2,3]. This is exactly
        // the jointly-unsatisfiable case §9 documents: with distinct
        // neighbors, in/out degree >= 2 forces total_tx >= 4.
        let txs = vec![
            tx("t1", "P1", "V", 0),
            tx("t2", "P2", "V", 1),
            tx("t3", "V", "S1", 2),
            tx("t4", "V", "S2", 3),
        ];
        let graph = build_graph(&txs).unwrap();
        let v = id_of(&graph, "V");
        let counts = tx_counts(&graph, &txs);
        assert_eq!(counts[&v], 4);
        let shells = detect_shells(&graph, |id| *counts.get(&id).unwrap_or(&0), 2, 3);
        assert!(!shells.contains(&v));
    }
}
