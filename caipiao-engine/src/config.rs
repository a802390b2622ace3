use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("impossible de lire la configuration {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("configuration invalide dans {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("paramètre invalide : {0}")]
    Invalid(String),
}

/// Paramètres du moteur. Tous les champs ont une valeur par défaut.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// En dessous, les générateurs retournent une liste vide.
    pub min_history: usize,
    /// Taille des fenêtres récente / ancienne (tendance, Bayes).
    pub window: usize,
    pub sequence_min_history: usize,
    pub hot_threshold: f64,
    pub cold_threshold: f64,
    pub explanation_threshold: f64,
    pub hot_cold_periods: usize,
    pub zone_count: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_history: 20,
            window: 10,
            sequence_min_history: 10,
            hot_threshold: 0.7,
            cold_threshold: 0.3,
            explanation_threshold: 0.7,
            hot_cold_periods: 20,
            zone_count: 3,
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: EngineConfig = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_history == 0 || self.window == 0 {
            return Err(ConfigError::Invalid("min_history et window doivent être > 0".into()));
        }
        for (name, value) in [
            ("hot_threshold", self.hot_threshold),
            ("cold_threshold", self.cold_threshold),
            ("explanation_threshold", self.explanation_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!("{} hors de [0, 1] : {}", name, value)));
            }
        }
        if self.cold_threshold >= self.hot_threshold {
            return Err(ConfigError::Invalid("cold_threshold doit être < hot_threshold".into()));
        }
        if self.zone_count == 0 || self.hot_cold_periods == 0 {
            return Err(ConfigError::Invalid("zone_count et hot_cold_periods doivent être > 0".into()));
        }
        Ok(())
    }
}
