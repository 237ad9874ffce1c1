use crate::search::SearchOptions;
use crate::walker::WalkOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_DIR_NAME: &str = "textscan";
const CONFIG_FILE_NAME: &str = "config.toml";
const DOTFILE_NAME: &str = ".textscan.toml";

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub search: SearchConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Raw filter text, same syntax as `--extensions`.
    pub extensions: String,
    pub include_file_names: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallel_jobs: Option<usize>,
    pub follow_links: bool,
    pub include_hidden: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        let walk = WalkOptions::default();
        Self {
            extensions: String::new(),
            include_file_names: false,
            parallel_jobs: None,
            follow_links: walk.follow_links,
            include_hidden: walk.include_hidden,
        }
    }
}

impl SearchConfig {
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            walk: WalkOptions {
                follow_links: self.follow_links,
                include_hidden: self.include_hidden,
            },
            parallel_jobs: self.parallel_jobs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub show_progress: bool,
    pub show_summary: bool,
    pub color: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_progress: true,
            show_summary: true,
            color: true,
        }
    }
}

impl Config {
    /// Loads the first config file found, or defaults when there is none.
    pub fn load() -> Result<Self> {
        match Self::find_config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Lookup order: user config dir, home dotfile, working directory
    /// dotfile. The first that exists wins.
    pub fn candidate_paths() -> Vec<PathBuf> {
        let user_dir = dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME));
        let home = dirs::home_dir().map(|dir| dir.join(DOTFILE_NAME));
        user_dir
            .into_iter()
            .chain(home)
            .chain(Some(PathBuf::from(DOTFILE_NAME)))
            .collect()
    }

    pub fn find_config_path() -> Option<PathBuf> {
        Self::candidate_paths().into_iter().find(|path| path.exists())
    }

    /// Where `config --init` writes when no path is given.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(DOTFILE_NAME))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create config directory: {}", parent.display())
                })?;
            }
        }

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }
}
