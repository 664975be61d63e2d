//! Schema normalization (§4.1).
//!
//! Coerces a raw, stringly-typed row table into the canonical five-field
//! `Transaction` schema, or fails with a typed `AnalysisError`. Semantics
//! follow `original_source/detection/graph_analysis.py::_validate_and_clean`
//! exactly: drop all-empty rows first, require the five columns, coerce
//! `amount`/`timestamp`, then drop any row still missing a field.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{cap_sample_indices, AnalysisError};

/// One raw input row. Every field is a string because real upstream data
/// (CSV-sourced, per §1) hasn't been type-coerced yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRow {
    pub transaction_id: Option<String>,
    pub sender_id: Option<String>,
    pub receiver_id: Option<String>,
    pub amount: Option<String>,
    pub timestamp: Option<String>,
}

impl TransactionRow {
    fn is_entirely_empty(&self) -> bool {
        self.transaction_id.is_none()
            && self.sender_id.is_none()
            && self.receiver_id.is_none()
            && self.amount.is_none()
            && self.timestamp.is_none()
    }
}

/// A validated, canonically typed transaction (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
}

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Validates and coerces a batch of raw rows into canonical transactions.
///
/// Column presence is checked against the *declared* schema: every row is
/// expected to carry all five fields as `Option`s (a caller mapping from a
/// CSV without one of the five columns at all should surface that as
/// `MissingColumn` before calling this, since the columnar/row-oriented
/// distinction lives on the IO boundary this crate doesn't own). Here we
/// treat a column as "missing" when every row in the batch has `None` for
/// it, which is the in-memory equivalent of the column never having
/// existed in the source table.
pub fn validate(rows: &[TransactionRow]) -> Result<Vec<Transaction>, AnalysisError> {
    let rows: Vec<&TransactionRow> = rows
        .iter()
        .filter(|row| !row.is_entirely_empty())
        .collect();

    for (name, present) in [
        (
            "transaction_id",
            rows.iter().any(|r| r.transaction_id.is_some()),
        ),
        ("sender_id", rows.iter().any(|r| r.sender_id.is_some())),
        ("receiver_id", rows.iter().any(|r| r.receiver_id.is_some())),
        ("amount", rows.iter().any(|r| r.amount.is_some())),
        ("timestamp", rows.iter().any(|r| r.timestamp.is_some())),
    ] {
        if !rows.is_empty() && !present {
            return Err(AnalysisError::MissingColumn(name.to_string()));
        }
    }

    let mut bad_amount_rows = Vec::new();
    let mut parsed_amounts = Vec::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        match &row.amount {
            Some(raw) => match raw.trim().parse::<f64>() {
                Ok(value) => parsed_amounts.push(Some(value)),
                Err(_) => {
                    bad_amount_rows.push(idx);
                    parsed_amounts.push(None);
                }
            },
            None => parsed_amounts.push(None),
        }
    }
    if !bad_amount_rows.is_empty() {
        return Err(AnalysisError::NonNumericAmount(cap_sample_indices(
            bad_amount_rows,
        )));
    }

    let mut bad_timestamp_rows = Vec::new();
    let mut parsed_timestamps = Vec::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        match &row.timestamp {
            Some(raw) => match NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT) {
                Ok(naive) => parsed_timestamps.push(Some(DateTime::<Utc>::from_naive_utc_and_offset(
                    naive, Utc,
                ))),
                Err(_) => {
                    bad_timestamp_rows.push(idx);
                    parsed_timestamps.push(None);
                }
            },
            None => parsed_timestamps.push(None),
        }
    }
    if !bad_timestamp_rows.is_empty() {
        return Err(AnalysisError::BadTimestamp(cap_sample_indices(
            bad_timestamp_rows,
        )));
    }

    let mut cleaned = Vec::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        let (Some(transaction_id), Some(sender_id), Some(receiver_id)) = (
            row.transaction_id.clone(),
            row.sender_id.clone(),
            row.receiver_id.clone(),
        ) else {
            continue;
        };
        let (Some(amount), Some(timestamp)) = (parsed_amounts[idx], parsed_timestamps[idx]) else {
            continue;
        };
        cleaned.push(Transaction {
            transaction_id,
            sender_id,
            receiver_id,
            amount,
            timestamp,
        });
    }

    if cleaned.is_empty() {
        return Err(AnalysisError::EmptyAfterClean);
    }

    Ok(cleaned)
}
