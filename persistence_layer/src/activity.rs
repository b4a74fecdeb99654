use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::debug;

/// What kind of account event an entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    WalletAdd,
    WalletRemove,
    AccountUpdate,
    SecurityUpdate,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
}

fn sample_at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

fn sample_entry(
    id: &str,
    timestamp: DateTime<Utc>,
    kind: ActivityKind,
    description: &str,
    wallet_address: Option<&str>,
) -> ActivityEntry {
    ActivityEntry {
        id: id.to_string(),
        timestamp,
        kind,
        description: description.to_string(),
        wallet_address: wallet_address.map(str::to_string),
    }
}

/// Activity shown on a fresh installation
pub fn sample_activity() -> Vec<ActivityEntry> {
    vec![
        sample_entry(
            "1",
            sample_at(15, 14, 30),
            ActivityKind::WalletAdd,
            "Added new wallet to account",
            Some("0.0.847264"),
        ),
        sample_entry(
            "2",
            sample_at(15, 12, 15),
            ActivityKind::AccountUpdate,
            "Updated profile information",
            None,
        ),
        sample_entry(
            "3",
            sample_at(14, 16, 45),
            ActivityKind::WalletRemove,
            "Removed wallet from account",
            Some("0.0.123456"),
        ),
        sample_entry(
            "4",
            sample_at(14, 10, 20),
            ActivityKind::SecurityUpdate,
            "Changed account password",
            None,
        ),
        sample_entry(
            "5",
            sample_at(13, 9, 30),
            ActivityKind::Other,
            "Updated notification preferences",
            None,
        ),
    ]
}

/// In-process account activity log
pub struct ActivityLog {
    entries: Mutex<Vec<ActivityEntry>>,
    next_id: AtomicU64,
}

impl ActivityLog {
    pub fn new(entries: Vec<ActivityEntry>) -> Self {
        let next_id = entries
            .iter()
            .filter_map(|e| e.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            + 1;

        Self {
            entries: Mutex::new(entries),
            next_id: AtomicU64::new(next_id),
        }
    }

    pub fn with_sample_data() -> Self {
        Self::new(sample_activity())
    }

    /// Append an event stamped with the current time
    pub async fn record(
        &self,
        kind: ActivityKind,
        description: &str,
        wallet_address: Option<&str>,
    ) -> ActivityEntry {
        let entry = ActivityEntry {
            id: self.next_id.fetch_add(1, Ordering::SeqCst).to_string(),
            timestamp: Utc::now(),
            kind,
            description: description.to_string(),
            wallet_address: wallet_address.map(str::to_string),
        };
        debug!("Activity {} recorded: {:?}", entry.id, entry.kind);
        self.entries.lock().await.push(entry.clone());
        entry
    }

    /// All entries, newest first. Entries with the same timestamp keep insertion order.
    pub async fn entries(&self) -> Vec<ActivityEntry> {
        let mut entries = self.entries.lock().await.clone();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sample_entries_newest_first() {
        let mut shuffled = sample_activity();
        shuffled.reverse();
        let log = ActivityLog::new(shuffled);

        let ids: Vec<String> = log.entries().await.into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4", "5"]);
    }

    #[tokio::test]
    async fn test_record_goes_to_top_with_fresh_id() {
        let log = ActivityLog::with_sample_data();
        let entry = log
            .record(ActivityKind::WalletAdd, "Added new wallet to account", Some("0.0.42"))
            .await;
        assert_eq!(entry.id, "6");

        let entries = log.entries().await;
        assert_eq!(entries.len(), 6);
        assert_eq!(entries[0], entry);
        assert_eq!(entries[0].wallet_address.as_deref(), Some("0.0.42"));
    }

    #[test]
    fn test_entry_wire_format() {
        let entry = &sample_activity()[2];
        let value = serde_json::to_value(entry).unwrap();
        assert_eq!(value["type"], "wallet_remove");
        assert_eq!(value["walletAddress"], "0.0.123456");

        let value = serde_json::to_value(&sample_activity()[1]).unwrap();
        assert_eq!(value["type"], "account_update");
        assert!(value.get("walletAddress").is_none());
    }
}
