use crate::core::account::AccountId;
use crate::core::error::AnalysisError;
use crate::core::transaction::Transaction;
use crate::graph::transaction_graph::TransactionGraph;
use chrono::{DateTime, NaiveDateTime, Utc};
use log::{debug, info};
use std::collections::HashMap;

/// Columns every batch must carry, in canonical order.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    "transaction_id",
    "sender_id",
    "receiver_id",
    "amount",
    "timestamp",
];

/// Hard cap on accepted rows per batch.
pub const MAX_TRANSACTIONS: usize = 10_000;

const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse raw CSV text into a fully constructed [`TransactionGraph`].
///
/// The header row is required; column names are matched
/// case-insensitively after trimming, extra columns are ignored.
/// Malformed rows are skipped silently and counted. Fatal conditions:
///
/// - [`AnalysisError::BadSchema`] — required columns missing
/// - [`AnalysisError::TooLarge`] — a row arrives while 10,000 are
///   already accepted
/// - [`AnalysisError::EmptyData`] — no row survives parsing
pub fn parse_csv(text: &str) -> Result<TransactionGraph, AnalysisError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let columns = column_indices(&mut reader)?;

    let mut transactions: Vec<Transaction> = Vec::new();
    let mut skipped = 0usize;

    for result in reader.records() {
        if transactions.len() >= MAX_TRANSACTIONS {
            return Err(AnalysisError::TooLarge(MAX_TRANSACTIONS));
        }

        let record = match result {
            Ok(record) => record,
            Err(err) => {
                debug!("skipping unreadable row: {err}");
                skipped += 1;
                continue;
            }
        };

        match parse_row(&record, &columns) {
            Some(tx) => transactions.push(tx),
            None => {
                debug!("skipping malformed row {}", transactions.len() + skipped + 1);
                skipped += 1;
            }
        }
    }

    if transactions.is_empty() {
        return Err(AnalysisError::EmptyData);
    }

    info!(
        "ingested {} transactions ({} malformed rows skipped)",
        transactions.len(),
        skipped
    );

    Ok(TransactionGraph::from_transactions(transactions))
}

/// Map each required column name to its position in the header row.
fn column_indices(
    reader: &mut csv::Reader<&[u8]>,
) -> Result<HashMap<&'static str, usize>, AnalysisError> {
    let all_missing = || AnalysisError::BadSchema(REQUIRED_COLUMNS.join(", "));

    let headers = reader.headers().map_err(|_| all_missing())?.clone();

    let mut positions: HashMap<String, usize> = HashMap::new();
    for (idx, header) in headers.iter().enumerate() {
        let name = header.trim().trim_start_matches('\u{feff}').to_lowercase();
        positions.insert(name, idx);
    }

    let mut columns = HashMap::new();
    let mut missing: Vec<&str> = Vec::new();
    for name in REQUIRED_COLUMNS {
        match positions.get(name) {
            Some(&idx) => {
                columns.insert(name, idx);
            }
            None => missing.push(name),
        }
    }

    if !missing.is_empty() {
        missing.sort_unstable();
        return Err(AnalysisError::BadSchema(missing.join(", ")));
    }

    Ok(columns)
}

fn parse_row(
    record: &csv::StringRecord,
    columns: &HashMap<&'static str, usize>,
) -> Option<Transaction> {
    let field = |name: &str| record.get(columns[name]).map(str::trim);

    let transaction_id = field("transaction_id")?;
    let sender = field("sender_id")?;
    let receiver = field("receiver_id")?;
    let amount = parse_amount(field("amount")?)?;
    let timestamp = parse_timestamp(field("timestamp")?)?;

    Some(Transaction::new(
        transaction_id,
        AccountId::new(sender),
        AccountId::new(receiver),
        amount,
        timestamp,
    ))
}

fn parse_amount(raw: &str) -> Option<f64> {
    let value: f64 = raw.parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some(value)
}

/// Accepts `YYYY-MM-DD HH:MM:SS` and `YYYY-MM-DDTHH:MM:SS`, both read as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_csv() {
        let csv = "transaction_id,sender_id,receiver_id,amount,timestamp\n\
                   T1,A,B,100.0,2024-01-01 00:00:00\n\
                   T2,B,C,200.5,2024-01-01T06:30:00\n";
        let graph = parse_csv(csv).unwrap();
        assert_eq!(graph.transaction_count(), 2);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.transactions()[1].amount, 200.5);
    }

    #[test]
    fn test_bom_and_header_case() {
        let csv = "\u{feff}Transaction_ID, Sender_Id ,RECEIVER_ID,Amount,Timestamp\n\
                   T1,A,B,100,2024-01-01 00:00:00\n";
        let graph = parse_csv(csv).unwrap();
        assert_eq!(graph.transaction_count(), 1);
    }

    #[test]
    fn test_extra_columns_ignored() {
        let csv = "transaction_id,sender_id,receiver_id,amount,timestamp,notes\n\
                   T1,A,B,100,2024-01-01 00:00:00,hello\n";
        let graph = parse_csv(csv).unwrap();
        assert_eq!(graph.transaction_count(), 1);
    }

    #[test]
    fn test_missing_columns() {
        let csv = "transaction_id,sender_id,receiver_id\nT1,A,B\n";
        match parse_csv(csv) {
            Err(AnalysisError::BadSchema(missing)) => {
                assert_eq!(missing, "amount, timestamp");
            }
            other => panic!("expected BadSchema, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_input_is_bad_schema() {
        assert!(matches!(parse_csv(""), Err(AnalysisError::BadSchema(_))));
    }

    #[test]
    fn test_malformed_rows_skipped() {
        let csv = "transaction_id,sender_id,receiver_id,amount,timestamp\n\
                   T1,A,B,not-a-number,2024-01-01 00:00:00\n\
                   T2,A,B,-5,2024-01-01 00:00:00\n\
                   T3,A,B,100,not-a-date\n\
                   T4,A,B,100\n\
                   T5,A,B,100,2024-01-01 00:00:00\n";
        let graph = parse_csv(csv).unwrap();
        assert_eq!(graph.transaction_count(), 1);
        assert_eq!(graph.transactions()[0].transaction_id, "T5");
    }

    #[test]
    fn test_all_rows_malformed_is_empty_data() {
        let csv = "transaction_id,sender_id,receiver_id,amount,timestamp\n\
                   T1,A,B,bad,2024-01-01 00:00:00\n";
        assert!(matches!(parse_csv(csv), Err(AnalysisError::EmptyData)));
    }

    #[test]
    fn test_row_cap() {
        let mut csv = String::from("transaction_id,sender_id,receiver_id,amount,timestamp\n");
        for i in 0..(MAX_TRANSACTIONS + 1) {
            csv.push_str(&format!("T{i},A,B,100,2024-01-01 00:00:00\n"));
        }
        assert!(matches!(parse_csv(&csv), Err(AnalysisError::TooLarge(_))));
    }

    #[test]
    fn test_exactly_at_cap_is_accepted() {
        let mut csv = String::from("transaction_id,sender_id,receiver_id,amount,timestamp\n");
        for i in 0..MAX_TRANSACTIONS {
            csv.push_str(&format!("T{i},A,B,100,2024-01-01 00:00:00\n"));
        }
        let graph = parse_csv(&csv).unwrap();
        assert_eq!(graph.transaction_count(), MAX_TRANSACTIONS);
    }

    #[test]
    fn test_fields_are_trimmed() {
        let csv = "transaction_id,sender_id,receiver_id,amount,timestamp\n\
                   \" T1 \", A , B , 100 , 2024-01-01 00:00:00 \n";
        let graph = parse_csv(csv).unwrap();
        let tx = &graph.transactions()[0];
        assert_eq!(tx.transaction_id, "T1");
        assert_eq!(tx.sender.as_str(), "A");
    }
}
