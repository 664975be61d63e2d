//! Transaction graph construction (§4.2, §3).
//!
//! Grounded on the teacher's `network_analysis.rs::TransactionGraph`, which
//! aggregates transactions into `(from, to)`-keyed edges; generalized here
//! to interned `AccountId` keys and to the exact `AggregateEdge` shape §3
//! requires (transaction ids, count, total amount, timestamp range).

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::error::AnalysisError;
use crate::interner::{AccountId, Interner};
use crate::validator::Transaction;

/// The merged record of all transactions sharing a `(sender, receiver)` pair.
#[derive(Debug, Clone)]
pub struct AggregateEdge {
    pub sender: AccountId,
    pub receiver: AccountId,
    pub transaction_ids: Vec<String>,
    pub count: usize,
    pub total_amount: f64,
    pub first_timestamp: DateTime<Utc>,
    pub last_timestamp: DateTime<Utc>,
}

impl AggregateEdge {
    fn push(&mut self, tx: &Transaction) {
        self.transaction_ids.push(tx.transaction_id.clone());
        self.count += 1;
        self.total_amount += tx.amount;
        if tx.timestamp < self.first_timestamp {
            self.first_timestamp = tx.timestamp;
        }
        if tx.timestamp > self.last_timestamp {
            self.last_timestamp = tx.timestamp;
        }
    }

    fn check_invariants(&self) {
        debug_assert!(self.count >= 1);
        debug_assert_eq!(self.count, self.transaction_ids.len());
        debug_assert!(self.first_timestamp <= self.last_timestamp);
    }
}

/// A directed multi-aggregate transaction graph.
pub struct TransactionGraph {
    pub interner: Interner,
    edges: HashMap<(AccountId, AccountId), AggregateEdge>,
    /// Edges ordered canonically by `(sender, receiver)` string form, for
    /// ReportAssembler (§4.9) and CycleDetector's adjacency traversal —
    /// independent of the input rows' order.
    edge_order: Vec<(AccountId, AccountId)>,
    successors: HashMap<AccountId, Vec<AccountId>>,
    predecessors: HashMap<AccountId, Vec<AccountId>>,
}

impl TransactionGraph {
    pub fn node_count(&self) -> usize {
        self.interner.len()
    }

    pub fn nodes(&self) -> Vec<AccountId> {
        self.interner.ids_sorted_by_name()
    }

    pub fn edge(&self, sender: AccountId, receiver: AccountId) -> Option<&AggregateEdge> {
        self.edges.get(&(sender, receiver))
    }

    /// Edges in GraphBuilder's canonical `(sender, receiver)` order, as
    /// ReportAssembler needs.
    pub fn edges_in_order(&self) -> impl Iterator<Item = &AggregateEdge> {
        self.edge_order.iter().map(move |key| &self.edges[key])
    }

    pub fn successors(&self, node: AccountId) -> &[AccountId] {
        self.successors.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn predecessors(&self, node: AccountId) -> &[AccountId] {
        self.predecessors
            .get(&node)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn in_degree(&self, node: AccountId) -> usize {
        self.predecessors(node).len()
    }

    pub fn out_degree(&self, node: AccountId) -> usize {
        self.successors(node).len()
    }
}

/// Builds a `TransactionGraph` from validated transactions, grouping by
/// `(sender_id, receiver_id)` into `AggregateEdge`s. Fails with
/// `EmptyGraph` if no accounts were found.
pub fn build_graph(transactions: &[Transaction]) -> Result<TransactionGraph, AnalysisError> {
    let mut interner = Interner::new();
    let mut edges: HashMap<(AccountId, AccountId), AggregateEdge> = HashMap::new();
    let mut edge_order: Vec<(AccountId, AccountId)> = Vec::new();

    for tx in transactions {
        let sender = interner.intern(&tx.sender_id);
        let receiver = interner.intern(&tx.receiver_id);
        let key = (sender, receiver);
        edges
            .entry(key)
            .and_modify(|e| e.push(tx))
            .or_insert_with(|| {
                edge_order.push(key);
                AggregateEdge {
                    sender,
                    receiver,
                    transaction_ids: vec![tx.transaction_id.clone()],
                    count: 1,
                    total_amount: tx.amount,
                    first_timestamp: tx.timestamp,
                    last_timestamp: tx.timestamp,
                }
            });
    }

    if interner.is_empty() {
        return Err(AnalysisError::EmptyGraph);
    }

    for edge in edges.values() {
        edge.check_invariants();
    }

    // Canonical order by (sender, receiver) string form, not first-seen
    // position: GraphBuilder's grouping must not depend on input row order
    // (§4.9, §8 reordering-invariance), matching pandas' `groupby(...,
    // sort=True)` in the Python reference.
    edge_order.sort_by(|a, b| {
        (interner.name(a.0), interner.name(a.1)).cmp(&(interner.name(b.0), interner.name(b.1)))
    });

    let mut successors: HashMap<AccountId, Vec<AccountId>> = HashMap::new();
    let mut predecessors: HashMap<AccountId, Vec<AccountId>> = HashMap::new();
    for &(sender, receiver) in &edge_order {
        successors.entry(sender).or_default().push(receiver);
        predecessors.entry(receiver).or_default().push(sender);
    }

    Ok(TransactionGraph {
        interner,
        edges,
        edge_order,
        successors,
        predecessors,
    })
}
