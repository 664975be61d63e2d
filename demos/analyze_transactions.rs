//! Runs the analyzer over a small synthetic batch containing a fraud ring
//! and a fan-in smurfing pattern, then prints the report as JSON.

use transaction_graph_analyzer::{analyze, AnalysisConfig, TransactionRow};

fn row(id: &str, sender: &str, receiver: &str, amount: &str, ts: &str) -> TransactionRow {
    TransactionRow {
        transaction_id: Some(id.to_string()),
        sender_id: Some(sender.to_string()),
        receiver_id: Some(receiver.to_string()),
        amount: Some(amount.to_string()),
        timestamp: Some(ts.to_string()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut rows = vec![
        row("t1", "A", "B", "1000.00", "2024-01-01 00:00:00"),
        row("t2", "B", "C", "1000.00", "2024-01-01 01:00:00"),
        row("t3", "C", "A", "1000.00", "2024-01-01 02:00:00"),
    ];

    for i in 0..10 {
        rows.push(row(
            &format!("fanin{i}"),
            &format!("S{i}"),
            "R",
            "900.00",
            "2024-03-01 00:00:00",
        ));
    }

    let report = analyze(&rows, &AnalysisConfig::default())?;
    println!("{}", report.to_json()?);
    Ok(())
}
