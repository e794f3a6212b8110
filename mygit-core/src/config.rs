//! Repository configuration stored at `.mygit/config.json`.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILE: &str = "config.json";

/// Shortest commit id prefix accepted: the bucket selector plus one character.
pub const MIN_PREFIX_LEN: usize = 3;

/// Per-repository settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoConfig {
    /// Reject commit id prefixes that match more than one commit instead of
    /// taking the first match in lexical order.
    #[serde(default)]
    pub strict_prefix_lookup: bool,
    /// Minimum length of an abbreviated commit id.
    #[serde(default = "default_min_prefix_len")]
    pub min_prefix_len: usize,
}

fn default_min_prefix_len() -> usize {
    MIN_PREFIX_LEN
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            strict_prefix_lookup: false,
            min_prefix_len: default_min_prefix_len(),
        }
    }
}

impl RepoConfig {
    /// Load config from a `.mygit` directory, falling back to defaults.
    pub fn load(repo_dir: &Path) -> Result<Self> {
        let config_path = repo_dir.join(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&config_path)?;
        let config: RepoConfig = serde_json::from_str(&data)?;
        Ok(config)
    }

    /// Save config to a `.mygit` directory.
    pub fn save(&self, repo_dir: &Path) -> Result<()> {
        let config_path = repo_dir.join(CONFIG_FILE);
        let tmp_path = config_path.with_extension("tmp");
        let data = serde_json::to_string_pretty(self)?;
        fs::write(&tmp_path, &data)?;
        fs::rename(&tmp_path, &config_path)?;
        Ok(())
    }

    /// Effective minimum prefix length, never below [`MIN_PREFIX_LEN`].
    pub fn prefix_len(&self) -> usize {
        self.min_prefix_len.max(MIN_PREFIX_LEN)
    }

    pub fn exists(repo_dir: &Path) -> bool {
        repo_dir.join(CONFIG_FILE).exists()
    }
}
