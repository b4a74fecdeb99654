use persistence_layer::KeyValueStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::Result;

pub const DEFAULT_PREFERENCES_KEY: &str = "userPreferences";
pub const DEFAULT_CUSTOM_THRESHOLD: u32 = 15;
pub const CUSTOM_THRESHOLD_KEY: &str = "custom";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Price-move percentage that triggers a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationThreshold {
    pub value: u32,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub thresholds: BTreeMap<String, NotificationThreshold>,

    pub custom_threshold: u32,

    pub theme: Theme,
}

impl Default for Preferences {
    fn default() -> Self {
        let threshold = |value, enabled| NotificationThreshold { value, enabled };
        let thresholds = BTreeMap::from([
            ("5".to_string(), threshold(5, false)),
            ("10".to_string(), threshold(10, true)),
            ("20".to_string(), threshold(20, false)),
            (
                CUSTOM_THRESHOLD_KEY.to_string(),
                threshold(DEFAULT_CUSTOM_THRESHOLD, false),
            ),
        ]);

        Self {
            thresholds,
            custom_threshold: DEFAULT_CUSTOM_THRESHOLD,
            theme: Theme::Light,
        }
    }
}

impl Preferences {
    /// Read stored preferences leniently.
    ///
    /// Unparseable data yields the defaults. Within a valid object, threshold
    /// entries without a numeric `value` and boolean `enabled` are dropped and
    /// fields of the wrong type keep their default.
    pub fn from_stored(raw: &str) -> Self {
        let mut prefs = Self::default();

        let data: Value = match serde_json::from_str(raw) {
            Ok(data) => data,
            Err(e) => {
                warn!("Failed to parse preferences: {}", e);
                return prefs;
            }
        };

        let Some(object) = data.as_object() else {
            return prefs;
        };

        if let Some(stored) = object.get("thresholds").and_then(Value::as_object) {
            prefs.thresholds = stored
                .iter()
                .filter_map(|(key, entry)| {
                    let value = entry.get("value")?.as_u64()?;
                    let enabled = entry.get("enabled")?.as_bool()?;
                    let value = u32::try_from(value).ok()?;
                    Some((key.clone(), NotificationThreshold { value, enabled }))
                })
                .collect();
        }

        if let Some(custom) = object
            .get("customThreshold")
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
        {
            prefs.custom_threshold = custom;
        }

        if let Some(theme) = object
            .get("theme")
            .and_then(|t| serde_json::from_value::<Theme>(t.clone()).ok())
        {
            prefs.theme = theme;
        }

        prefs
    }

    /// Flip a threshold's `enabled` flag; returns false for unknown keys
    pub fn toggle_threshold(&mut self, key: &str) -> bool {
        match self.thresholds.get_mut(key) {
            Some(threshold) => {
                threshold.enabled = !threshold.enabled;
                true
            }
            None => false,
        }
    }

    pub fn set_custom_threshold(&mut self, value: u32) {
        self.custom_threshold = value;
        if let Some(custom) = self.thresholds.get_mut(CUSTOM_THRESHOLD_KEY) {
            custom.value = value;
        }
    }
}

/// Preferences held in memory and written through to a [`KeyValueStore`]
pub struct PreferencesStore {
    prefs: Mutex<Preferences>,
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl PreferencesStore {
    pub async fn load(store: Arc<dyn KeyValueStore>, key: &str) -> Result<Self> {
        let prefs = match store.get(key).await? {
            Some(raw) => Preferences::from_stored(&raw),
            None => {
                debug!("No stored preferences under {}, using defaults", key);
                Preferences::default()
            }
        };

        Ok(Self {
            prefs: Mutex::new(prefs),
            store,
            key: key.to_string(),
        })
    }

    pub async fn get(&self) -> Preferences {
        self.prefs.lock().await.clone()
    }

    /// Replace all preferences
    pub async fn save(&self, prefs: Preferences) -> Result<Preferences> {
        let mut current = self.prefs.lock().await;
        self.persist(&prefs).await?;
        *current = prefs.clone();
        info!("⚙️ Preferences saved");
        Ok(prefs)
    }

    /// Flip one threshold; unknown keys leave preferences unchanged
    pub async fn toggle_threshold(&self, key: &str) -> Result<Preferences> {
        let mut current = self.prefs.lock().await;
        let mut updated = current.clone();
        if !updated.toggle_threshold(key) {
            debug!("Ignoring toggle for unknown threshold {}", key);
            return Ok(updated);
        }

        self.persist(&updated).await?;
        *current = updated.clone();
        Ok(updated)
    }

    pub async fn set_custom_threshold(&self, value: u32) -> Result<Preferences> {
        let mut current = self.prefs.lock().await;
        let mut updated = current.clone();
        updated.set_custom_threshold(value);

        self.persist(&updated).await?;
        *current = updated.clone();
        Ok(updated)
    }

    pub async fn set_theme(&self, theme: Theme) -> Result<Preferences> {
        let mut current = self.prefs.lock().await;
        let updated = Preferences {
            theme,
            ..current.clone()
        };

        self.persist(&updated).await?;
        *current = updated.clone();
        Ok(updated)
    }

    async fn persist(&self, prefs: &Preferences) -> Result<()> {
        let raw = serde_json::to_string(prefs).map_err(persistence_layer::PersistenceError::from)?;
        self.store.set(&self.key, &raw).await?;
        Ok(())
    }
}
