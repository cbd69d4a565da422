use obojobo_document::IdStrategy;
use obojobo_editor::DEFAULT_MAX_PASSES;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "obojobo.config.json";

/// Obojobo configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Cap on normalization passes per draft
    #[serde(default = "default_max_repair_passes")]
    pub max_repair_passes: usize,

    /// How ids are generated for nodes that lack one
    #[serde(default)]
    pub id_strategy: IdStrategy,

    /// Output directory for converted drafts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<String>,

    /// Pretty-print JSON output
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

fn default_max_repair_passes() -> usize {
    DEFAULT_MAX_PASSES
}

fn default_pretty() -> bool {
    true
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Absolute output directory, if one is configured
    pub fn get_out_dir(&self, cwd: &str) -> Option<PathBuf> {
        self.out_dir.as_ref().map(|dir| PathBuf::from(cwd).join(dir))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_repair_passes: default_max_repair_passes(),
            id_strategy: IdStrategy::default(),
            out_dir: None,
            pretty: default_pretty(),
        }
    }
}
