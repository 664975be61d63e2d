//! Temporal smurfing detection (§4.4).
//!
//! Two symmetric two-pointer sliding-window scans over deduplicated
//! (counterparty, timestamp) pairs, grounded on
//! `original_source/detection/graph_analysis.py::_detect_smurfing_fan_in/_fan_out`,
//! expressed with the teacher's velocity-window idiom
//! (`fraud_patterns.rs::check_velocity`'s "cutoff + filter recent history").

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use chrono::{DateTime, Duration, Utc};

use crate::interner::AccountId;
use crate::validator::Transaction;

/// Accounts flagged by fan-in or fan-out smurfing scans.
#[derive(Debug, Default)]
pub struct SmurfingFlags {
    pub fan_in: HashSet<AccountId>,
    pub fan_out: HashSet<AccountId>,
}

/// Runs both scans. `key_of` maps a raw transaction's sender/receiver
/// string to its interned id. Respects `deadline`: if exceeded between
/// groups, remaining groups are silently skipped.
pub fn detect_smurfing(
    transactions: &[Transaction],
    key_of: impl Fn(&str) -> AccountId,
    window_hours: i64,
    min_counterparties: usize,
    deadline: Option<Instant>,
) -> SmurfingFlags {
    let window = Duration::hours(window_hours);

    let mut by_receiver: HashMap<AccountId, Vec<(AccountId, DateTime<Utc>)>> = HashMap::new();
    let mut by_sender: HashMap<AccountId, Vec<(AccountId, DateTime<Utc>)>> = HashMap::new();
    for tx in transactions {
        let sender = key_of(&tx.sender_id);
        let receiver = key_of(&tx.receiver_id);
        by_receiver
            .entry(receiver)
            .or_default()
            .push((sender, tx.timestamp));
        by_sender
            .entry(sender)
            .or_default()
            .push((receiver, tx.timestamp));
    }

    let fan_in = scan_groups(by_receiver, window, min_counterparties, deadline);
    let fan_out = scan_groups(by_sender, window, min_counterparties, deadline);

    SmurfingFlags { fan_in, fan_out }
}

fn scan_groups(
    groups: HashMap<AccountId, Vec<(AccountId, DateTime<Utc>)>>,
    window: Duration,
    min_counterparties: usize,
    deadline: Option<Instant>,
) -> HashSet<AccountId> {
    let mut flagged = HashSet::new();

    // Deterministic iteration order over groups.
    let mut keys: Vec<AccountId> = groups.keys().copied().collect();
    keys.sort();

    for key in keys {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            break;
        }
        let rows = &groups[&key];
        if scan_one_group(rows, window, min_counterparties) {
            flagged.insert(key);
        }
    }

    flagged
}

/// Two-pointer sweep over one account's deduplicated (counterparty,
/// timestamp) pairs, sorted ascending by timestamp.
fn scan_one_group(
    rows: &[(AccountId, DateTime<Utc>)],
    window: Duration,
    min_counterparties: usize,
) -> bool {
    // Deduplicate exact (counterparty, timestamp) pairs only — a sender
    // that legitimately recurs at distinct timestamps still contributes
    // multiple entries here; only the window's *distinct counterparty*
    // count (via the HashSet below) matters for flagging.
    let mut deduped: Vec<(AccountId, DateTime<Utc>)> = rows.to_vec();
    deduped.sort_by_key(|(counterparty, ts)| (*counterparty, *ts));
    deduped.dedup();
    deduped.sort_by_key(|(_, ts)| *ts);

    if deduped.len() < min_counterparties {
        return false;
    }

    let mut start = 0usize;
    for end in 0..deduped.len() {
        while deduped[end].1 - deduped[start].1 > window {
            start += 1;
        }
        let window_counterparties: HashSet<AccountId> =
            deduped[start..=end].iter().map(|(c, _)| *c).collect();
        if window_counterparties.len() >= min_counterparties {
            return true;
        }
    }
    false
}
