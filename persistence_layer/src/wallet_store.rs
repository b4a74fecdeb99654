use chrono::{DateTime, TimeZone, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::activity::{ActivityKind, ActivityLog};
use crate::{KeyValueStore, PersistenceError};

pub const DEFAULT_WALLET_KEY: &str = "wallet-storage";

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Please enter a valid Hedera account ID (e.g., 0.0.123456)")]
    InvalidAddress,
    #[error("This wallet is already connected")]
    AlreadyConnected,
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

pub type Result<T> = std::result::Result<T, WalletError>;

/// A connected Hedera account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    /// Hedera account id, `0.0.<num>`
    pub address: String,

    pub is_active: bool,

    pub date_added: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WalletState {
    wallets: Vec<Wallet>,
}

/// Envelope written under the wallet key
#[derive(Debug, Serialize, Deserialize)]
struct PersistedState {
    state: WalletState,
    version: u32,
}

fn account_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^0\.0\.[0-9]+$").expect("account id pattern compiles"))
}

pub fn is_valid_account_id(address: &str) -> bool {
    account_id_pattern().is_match(address)
}

fn seeded_at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

/// Wallets a fresh installation starts with
pub fn seed_wallets() -> Vec<Wallet> {
    vec![
        Wallet {
            address: "0.0.1234567".to_string(),
            is_active: true,
            date_added: seeded_at(2024, 1, 10, 9, 30),
        },
        Wallet {
            address: "0.0.7654321".to_string(),
            is_active: false,
            date_added: seeded_at(2024, 1, 12, 14, 45),
        },
        Wallet {
            address: "0.0.9876543".to_string(),
            is_active: false,
            date_added: seeded_at(2024, 1, 15, 11, 20),
        },
    ]
}

/// Connected wallets, written through to a [`KeyValueStore`] on every change
pub struct WalletStore {
    wallets: Mutex<Vec<Wallet>>,
    store: Arc<dyn KeyValueStore>,
    key: String,
    activity: Option<Arc<ActivityLog>>,
}

impl WalletStore {
    /// Load persisted wallets, seeding the store when the key is absent
    pub async fn load(store: Arc<dyn KeyValueStore>, key: &str) -> Result<Self> {
        let wallets = match store.get(key).await? {
            Some(raw) => match serde_json::from_str::<PersistedState>(&raw) {
                Ok(persisted) => {
                    info!("👛 Loaded {} wallets from {}", persisted.state.wallets.len(), key);
                    persisted.state.wallets
                }
                Err(e) => {
                    warn!("Stored wallet data under {} is malformed ({}), using seed wallets", key, e);
                    seed_wallets()
                }
            },
            None => {
                let seeded = seed_wallets();
                write_state(store.as_ref(), key, &seeded).await?;
                info!("👛 Seeded {} wallets under {}", seeded.len(), key);
                seeded
            }
        };

        Ok(Self {
            wallets: Mutex::new(wallets),
            store,
            key: key.to_string(),
            activity: None,
        })
    }

    /// Record wallet additions and removals in `log`
    pub fn with_activity_log(mut self, log: Arc<ActivityLog>) -> Self {
        self.activity = Some(log);
        self
    }

    pub async fn wallets(&self) -> Vec<Wallet> {
        self.wallets.lock().await.clone()
    }

    /// Connect a new wallet; it becomes active only if it is the first one
    pub async fn add_wallet(&self, address: &str) -> Result<Wallet> {
        let address = address.trim();
        if !is_valid_account_id(address) {
            return Err(WalletError::InvalidAddress);
        }

        let mut wallets = self.wallets.lock().await;
        if wallets.iter().any(|w| w.address == address) {
            return Err(WalletError::AlreadyConnected);
        }

        let wallet = Wallet {
            address: address.to_string(),
            is_active: wallets.is_empty(),
            date_added: Utc::now(),
        };

        let mut updated = wallets.clone();
        updated.push(wallet.clone());
        self.commit(&mut wallets, updated).await?;

        info!("➕ Added wallet {} (active: {})", wallet.address, wallet.is_active);
        self.log_activity(ActivityKind::WalletAdd, "Added new wallet to account", &wallet.address)
            .await;
        Ok(wallet)
    }

    /// Drop a wallet; unknown addresses are ignored
    pub async fn remove_wallet(&self, address: &str) -> Result<()> {
        let mut wallets = self.wallets.lock().await;
        let updated: Vec<Wallet> = wallets
            .iter()
            .filter(|w| w.address != address)
            .cloned()
            .collect();

        if updated.len() == wallets.len() {
            debug!("Remove ignored, wallet {} not connected", address);
            return Ok(());
        }

        self.commit(&mut wallets, updated).await?;
        info!("➖ Removed wallet {}", address);
        self.log_activity(ActivityKind::WalletRemove, "Removed wallet from account", address)
            .await;
        Ok(())
    }

    /// Make `address` the only active wallet. An unknown address leaves none active.
    pub async fn activate_wallet(&self, address: &str) -> Result<()> {
        let mut wallets = self.wallets.lock().await;
        let updated: Vec<Wallet> = wallets
            .iter()
            .map(|w| Wallet {
                is_active: w.address == address,
                ..w.clone()
            })
            .collect();

        self.commit(&mut wallets, updated).await?;
        debug!("Activated wallet {}", address);
        Ok(())
    }

    pub async fn deactivate_wallet(&self, address: &str) -> Result<()> {
        let mut wallets = self.wallets.lock().await;
        let updated: Vec<Wallet> = wallets
            .iter()
            .map(|w| Wallet {
                is_active: w.is_active && w.address != address,
                ..w.clone()
            })
            .collect();

        self.commit(&mut wallets, updated).await?;
        debug!("Deactivated wallet {}", address);
        Ok(())
    }

    /// First active wallet in list order
    pub async fn get_active_wallet(&self) -> Option<Wallet> {
        self.wallets
            .lock()
            .await
            .iter()
            .find(|w| w.is_active)
            .cloned()
    }

    async fn log_activity(&self, kind: ActivityKind, description: &str, address: &str) {
        if let Some(log) = &self.activity {
            log.record(kind, description, Some(address)).await;
        }
    }

    /// Persist `updated` and then make it current. A failed write keeps the old list.
    async fn commit(&self, current: &mut Vec<Wallet>, updated: Vec<Wallet>) -> Result<()> {
        if *current == updated {
            return Ok(());
        }
        write_state(self.store.as_ref(), &self.key, &updated).await?;
        *current = updated;
        Ok(())
    }
}

async fn write_state(store: &dyn KeyValueStore, key: &str, wallets: &[Wallet]) -> Result<()> {
    let persisted = PersistedState {
        state: WalletState {
            wallets: wallets.to_vec(),
        },
        version: 0,
    };
    let raw = serde_json::to_string(&persisted).map_err(PersistenceError::from)?;
    store.set(key, &raw).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use async_trait::async_trait;

    async fn seeded_store() -> (Arc<MemoryStore>, WalletStore) {
        let backend = Arc::new(MemoryStore::new());
        let store = WalletStore::load(backend.clone(), DEFAULT_WALLET_KEY)
            .await
            .unwrap();
        (backend, store)
    }

    async fn empty_store() -> WalletStore {
        let backend = Arc::new(MemoryStore::new());
        backend
            .set(DEFAULT_WALLET_KEY, r#"{"state":{"wallets":[]},"version":0}"#)
            .await
            .unwrap();
        WalletStore::load(backend, DEFAULT_WALLET_KEY).await.unwrap()
    }

    fn addresses(wallets: &[Wallet]) -> Vec<&str> {
        wallets.iter().map(|w| w.address.as_str()).collect()
    }

    #[tokio::test]
    async fn test_seeds_when_key_absent() {
        let (backend, store) = seeded_store().await;
        let wallets = store.wallets().await;
        assert_eq!(
            addresses(&wallets),
            vec!["0.0.1234567", "0.0.7654321", "0.0.9876543"]
        );
        assert_eq!(
            store.get_active_wallet().await.unwrap().address,
            "0.0.1234567"
        );

        let raw = backend.get(DEFAULT_WALLET_KEY).await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], 0);
        assert_eq!(value["state"]["wallets"][0]["address"], "0.0.1234567");
        assert_eq!(value["state"]["wallets"][0]["isActive"], true);
        assert_eq!(value["state"]["wallets"][0]["dateAdded"], "2024-01-10T09:30:00Z");
    }

    #[tokio::test]
    async fn test_persisted_empty_list_is_not_reseeded() {
        let store = empty_store().await;
        assert!(store.wallets().await.is_empty());
        assert!(store.get_active_wallet().await.is_none());
    }

    #[tokio::test]
    async fn test_first_wallet_added_is_active() {
        let store = empty_store().await;
        let first = store.add_wallet("0.0.42").await.unwrap();
        let second = store.add_wallet("0.0.43").await.unwrap();
        assert!(first.is_active);
        assert!(!second.is_active);
    }

    #[tokio::test]
    async fn test_add_wallet_validation() {
        let (_, store) = seeded_store().await;
        assert!(matches!(
            store.add_wallet("0x1234").await,
            Err(WalletError::InvalidAddress)
        ));
        assert!(matches!(
            store.add_wallet("0.0.1234567").await,
            Err(WalletError::AlreadyConnected)
        ));
        assert_eq!(
            WalletError::InvalidAddress.to_string(),
            "Please enter a valid Hedera account ID (e.g., 0.0.123456)"
        );

        let added = store.add_wallet("0.0.555").await.unwrap();
        assert!(!added.is_active);
        assert_eq!(store.wallets().await.len(), 4);
    }

    #[tokio::test]
    async fn test_activate_is_exclusive() {
        let (_, store) = seeded_store().await;
        store.activate_wallet("0.0.9876543").await.unwrap();

        let active: Vec<Wallet> = store
            .wallets()
            .await
            .into_iter()
            .filter(|w| w.is_active)
            .collect();
        assert_eq!(addresses(&active), vec!["0.0.9876543"]);
    }

    #[tokio::test]
    async fn test_activate_unknown_deactivates_all() {
        let (_, store) = seeded_store().await;
        store.activate_wallet("0.0.1").await.unwrap();
        assert!(store.get_active_wallet().await.is_none());
    }

    #[tokio::test]
    async fn test_deactivate_only_touches_target() {
        let (_, store) = seeded_store().await;
        store.deactivate_wallet("0.0.7654321").await.unwrap();
        assert_eq!(
            store.get_active_wallet().await.unwrap().address,
            "0.0.1234567"
        );

        store.deactivate_wallet("0.0.1234567").await.unwrap();
        assert!(store.get_active_wallet().await.is_none());
    }

    #[tokio::test]
    async fn test_remove_wallet() {
        let (_, store) = seeded_store().await;
        store.remove_wallet("0.0.7654321").await.unwrap();
        store.remove_wallet("0.0.0000").await.unwrap();
        assert_eq!(
            addresses(&store.wallets().await),
            vec!["0.0.1234567", "0.0.9876543"]
        );
    }

    #[tokio::test]
    async fn test_changes_survive_reload() {
        let (backend, store) = seeded_store().await;
        store.add_wallet("0.0.99").await.unwrap();
        store.activate_wallet("0.0.99").await.unwrap();

        let reloaded = WalletStore::load(backend, DEFAULT_WALLET_KEY).await.unwrap();
        assert_eq!(reloaded.wallets().await.len(), 4);
        assert_eq!(reloaded.get_active_wallet().await.unwrap().address, "0.0.99");
    }

    #[tokio::test]
    async fn test_malformed_data_falls_back_to_seed() {
        let backend = Arc::new(MemoryStore::new());
        backend.set(DEFAULT_WALLET_KEY, "{not json").await.unwrap();
        let store = WalletStore::load(backend, DEFAULT_WALLET_KEY).await.unwrap();
        assert_eq!(store.wallets().await.len(), 3);
    }

    struct ReadOnlyStore(MemoryStore);

    #[async_trait]
    impl KeyValueStore for ReadOnlyStore {
        async fn get(&self, key: &str) -> crate::Result<Option<String>> {
            self.0.get(key).await
        }

        async fn set(&self, _key: &str, _value: &str) -> crate::Result<()> {
            Err(PersistenceError::Backend("read only".to_string()))
        }

        async fn remove(&self, _key: &str) -> crate::Result<()> {
            Err(PersistenceError::Backend("read only".to_string()))
        }

        fn backend_name(&self) -> &'static str {
            "read-only"
        }

        async fn health_check(&self) -> crate::StorageHealthStatus {
            self.0.health_check().await
        }
    }

    #[tokio::test]
    async fn test_failed_write_keeps_list() {
        let inner = MemoryStore::new();
        inner
            .set(DEFAULT_WALLET_KEY, r#"{"state":{"wallets":[]},"version":0}"#)
            .await
            .unwrap();
        let store = WalletStore::load(Arc::new(ReadOnlyStore(inner)), DEFAULT_WALLET_KEY)
            .await
            .unwrap();

        assert!(matches!(
            store.add_wallet("0.0.7").await,
            Err(WalletError::Persistence(_))
        ));
        assert!(store.wallets().await.is_empty());
    }

    #[test]
    fn test_account_id_pattern() {
        assert!(is_valid_account_id("0.0.123456"));
        assert!(!is_valid_account_id("0.0."));
        assert!(!is_valid_account_id("1.0.5"));
        assert!(!is_valid_account_id("0.0.12a"));
    }

    #[tokio::test]
    async fn test_wallet_changes_are_logged() {
        let log = Arc::new(ActivityLog::default());
        let store = empty_store().await.with_activity_log(log.clone());

        store.add_wallet("0.0.11").await.unwrap();
        store.add_wallet("0.0.11").await.unwrap_err();
        store.remove_wallet("0.0.99").await.unwrap();
        store.activate_wallet("0.0.11").await.unwrap();
        store.remove_wallet("0.0.11").await.unwrap();

        let kinds: Vec<ActivityKind> = log.entries().await.iter().map(|e| e.kind).collect();
        assert_eq!(kinds.len(), 2);
        assert!(kinds.contains(&ActivityKind::WalletAdd));
        assert!(kinds.contains(&ActivityKind::WalletRemove));
        assert!(log
            .entries()
            .await
            .iter()
            .all(|e| e.wallet_address.as_deref() == Some("0.0.11")));
    }

    #[tokio::test]
    async fn test_failed_write_is_not_logged() {
        let inner = MemoryStore::new();
        inner
            .set(DEFAULT_WALLET_KEY, r#"{"state":{"wallets":[]},"version":0}"#)
            .await
            .unwrap();
        let log = Arc::new(ActivityLog::default());
        let store = WalletStore::load(Arc::new(ReadOnlyStore(inner)), DEFAULT_WALLET_KEY)
            .await
            .unwrap()
            .with_activity_log(log.clone());

        assert!(store.add_wallet("0.0.7").await.is_err());
        assert!(log.entries().await.is_empty());
    }
}
