use chrono::{DateTime, NaiveDate, Utc};
use csv::Writer;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::{DashboardError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Send,
    Receive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Success,
    Pending,
    Failed,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Send => f.write_str("send"),
            TransactionKind::Receive => f.write_str("receive"),
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStatus::Success => f.write_str("success"),
            TransactionStatus::Pending => f.write_str("pending"),
            TransactionStatus::Failed => f.write_str("failed"),
        }
    }
}

/// One entry of a wallet's transaction history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,

    #[serde(rename = "type")]
    pub kind: TransactionKind,

    /// Amount in units of `token`
    pub amount: Decimal,

    /// Token symbol
    pub token: String,

    /// Receiving account id
    pub to: String,

    /// Sending account id
    pub from: String,

    pub timestamp: DateTime<Utc>,

    pub status: TransactionStatus,

    pub memo: String,
}

impl Transaction {
    pub fn matches_search(&self, search: &str) -> bool {
        if search.is_empty() {
            return true;
        }
        let needle = search.to_lowercase();
        self.memo.to_lowercase().contains(&needle)
            || self.to.to_lowercase().contains(&needle)
            || self.from.to_lowercase().contains(&needle)
    }
}

/// Keep transactions whose memo, recipient or sender contains `search` (case-insensitive)
pub fn filter_transactions<'a>(transactions: &'a [Transaction], search: &str) -> Vec<&'a Transaction> {
    let filtered: Vec<&Transaction> = transactions
        .iter()
        .filter(|tx| tx.matches_search(search))
        .collect();

    debug!(
        "Transaction search '{}' matched {} of {}",
        search,
        filtered.len(),
        transactions.len()
    );

    filtered
}

/// Render transactions as CSV with a header row
pub fn export_csv<'a, I>(transactions: I) -> Result<String>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut wtr = Writer::from_writer(Vec::new());

    wtr.write_record([
        "Transaction ID",
        "Type",
        "Amount",
        "Token",
        "To",
        "From",
        "Date",
        "Status",
        "Memo",
    ])?;

    for tx in transactions {
        wtr.write_record([
            tx.id.clone(),
            tx.kind.to_string(),
            tx.amount.to_string(),
            tx.token.clone(),
            tx.to.clone(),
            tx.from.clone(),
            tx.timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            tx.status.to_string(),
            tx.memo.clone(),
        ])?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| DashboardError::Export(format!("CSV flush error: {}", e)))?;

    String::from_utf8(bytes).map_err(|e| DashboardError::Export(format!("CSV encoding error: {}", e)))
}

pub fn export_filename(date: NaiveDate) -> String {
    format!("transactions-{}.csv", date.format("%Y-%m-%d"))
}
