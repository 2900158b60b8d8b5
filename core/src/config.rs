//! Persistence and feature-advertisement settings, loaded from JSON.
//!
//! Every field is optional in the file; missing fields take the
//! `Default` values. In tests, use `PersistConfig::default()`.

use crate::{
    features::{ServerFeatures, FEAT_CHANNELS, FEAT_USERS},
    saved_game::SaveConfig,
    types::{ModelVersion, CURRENT_MODEL_VERSION},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistConfig {
    /// Model version written into new saves, and the newest one loaded.
    pub model_version: ModelVersion,
    /// Represent a server older than feature lists: start from the old
    /// default features instead of an empty set.
    pub legacy_server: bool,
    /// Feature names to activate, in advertisement order.
    pub features: Vec<String>,
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self {
            model_version: CURRENT_MODEL_VERSION,
            legacy_server: false,
            features:      vec![FEAT_CHANNELS.to_string(), FEAT_USERS.to_string()],
        }
    }
}

impl PersistConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: PersistConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        Ok(config)
    }

    pub fn save_config(&self) -> SaveConfig {
        SaveConfig { model_version: self.model_version }
    }

    /// Build the feature set advertised to connecting clients.
    pub fn server_features(&self) -> anyhow::Result<ServerFeatures> {
        let mut feats = ServerFeatures::new(self.legacy_server);
        for name in &self.features {
            feats.add(name)?;
        }
        Ok(feats)
    }
}
