//! Configuration for the KGQuest pipeline.
//!
//! Maps directly to `kgquest.toml`. `TRAIN_TYPE` and `KG_DEPTH` in the
//! environment take precedence over the file.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::types::TrainType;

/// Environment variable overriding [`KgConfig::train_type`].
pub const ENV_TRAIN_TYPE: &str = "TRAIN_TYPE";
/// Environment variable overriding [`KgConfig::depth`].
pub const ENV_KG_DEPTH: &str = "KG_DEPTH";

/// Top-level configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KgQuestConfig {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Background composition settings.
    #[serde(default)]
    pub kg: KgConfig,
    /// Input locations and sample filtering.
    #[serde(default)]
    pub data: DataConfig,
}

impl KgQuestConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `KgError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::KgError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Apply `TRAIN_TYPE` / `KG_DEPTH` from the process environment.
    ///
    /// # Errors
    /// Returns `KgError::Config` if a variable is set but unparsable.
    pub fn apply_env_overrides(&mut self) -> crate::error::Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns `KgError::Config` if a variable is set but unparsable.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> crate::error::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_TRAIN_TYPE) {
            self.kg.train_type = raw
                .trim()
                .parse()
                .map_err(|e: String| crate::KgError::Config(format!("{ENV_TRAIN_TYPE}: {e}")))?;
        }
        if let Some(raw) = lookup(ENV_KG_DEPTH) {
            self.kg.depth = raw.trim().parse().map_err(|e| {
                crate::KgError::Config(format!("{ENV_KG_DEPTH}: invalid integer '{raw}': {e}"))
            })?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Background composition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KgConfig {
    /// Prompt mode (`TRAIN_TYPE`).
    #[serde(default)]
    pub train_type: TrainType,
    /// Sampling and traversal depth (`KG_DEPTH`).
    #[serde(default = "default_depth")]
    pub depth: i32,
    /// Seed for relation sampling. Unset means entropy-seeded.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for KgConfig {
    fn default() -> Self {
        Self {
            train_type: TrainType::default(),
            depth: default_depth(),
            seed: None,
        }
    }
}

/// Input locations and sample filtering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory of `<GAME>.graphml` files.
    #[serde(default = "default_graph_dir")]
    pub graph_dir: PathBuf,
    /// Directory holding `train.jsonl` and `val.jsonl`.
    #[serde(default = "default_dataset_dir")]
    pub dataset_dir: PathBuf,
    /// Drop samples whose prompt reaches this many tokens.
    ///
    /// The CLI counts whitespace-separated words, not tokenizer tokens, so
    /// leave headroom below the model's real context size.
    #[serde(default)]
    pub max_prompt_tokens: Option<usize>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            graph_dir: default_graph_dir(),
            dataset_dir: default_dataset_dir(),
            max_prompt_tokens: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_log_level() -> String {
    "info".to_string()
}
fn default_depth() -> i32 {
    2
}
fn default_graph_dir() -> PathBuf {
    PathBuf::from("kg")
}
fn default_dataset_dir() -> PathBuf {
    PathBuf::from("data")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_text_kg_depth_two() {
        let config = KgQuestConfig::default();
        assert_eq!(config.kg.train_type, TrainType::TextKg);
        assert_eq!(config.kg.depth, 2);
        assert!(config.kg.seed.is_none());
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config = KgQuestConfig::from_toml(
            r#"
            [kg]
            train_type = "no_kg"
            seed = 42

            [data]
            max_prompt_tokens = 1024
            "#,
        )
        .expect("parse");
        assert_eq!(config.kg.train_type, TrainType::NoKg);
        assert_eq!(config.kg.depth, 2);
        assert_eq!(config.kg.seed, Some(42));
        assert_eq!(config.data.max_prompt_tokens, Some(1024));
        assert_eq!(config.data.graph_dir, PathBuf::from("kg"));
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let err = KgQuestConfig::from_toml("[kg]\ntrain_type = \"graph\"").expect_err("invalid");
        assert!(matches!(err, crate::KgError::Config(_)));
    }

    #[test]
    fn overrides_take_precedence() {
        let mut config = KgQuestConfig::default();
        config
            .apply_overrides_from(|key| match key {
                ENV_TRAIN_TYPE => Some("tree_kg".to_string()),
                ENV_KG_DEPTH => Some(" -1 ".to_string()),
                _ => None,
            })
            .expect("apply");
        assert_eq!(config.kg.train_type, TrainType::TreeKg);
        assert_eq!(config.kg.depth, -1);
    }

    #[test]
    fn unparsable_override_is_rejected() {
        let mut config = KgQuestConfig::default();
        let err = config
            .apply_overrides_from(|key| (key == ENV_KG_DEPTH).then(|| "deep".to_string()))
            .expect_err("invalid");
        assert!(err.to_string().contains(ENV_KG_DEPTH));
    }

    #[test]
    fn from_file_reads_toml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("kgquest.toml");
        std::fs::write(&path, "[kg]\ndepth = 4\n").expect("write");
        let config = KgQuestConfig::from_file(&path).expect("load");
        assert_eq!(config.kg.depth, 4);
    }
}
