use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::srs::StudyMode;

pub const DEFAULT_QUESTIONS_PER_SESSION: usize = 20;
pub const QUESTIONS_PER_SESSION_OPTIONS: [usize; 4] = [10, 20, 30, 50];

const QUESTION_BANK_ENV: &str = "EXAMPREP_QUESTION_BANK";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub question_bank: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub questions_per_session: usize,
    pub study_mode: StudyMode,
    pub preferred_domains: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            question_bank: None,
            data_dir: None,
            questions_per_session: DEFAULT_QUESTIONS_PER_SESSION,
            study_mode: StudyMode::default(),
            preferred_domains: Vec::new(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let base = dirs::config_dir().context("Could not determine config directory")?;
        Ok(base.join("examprep"))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Default data directory, used unless `data_dir` is set
    pub fn default_data_dir() -> Result<PathBuf> {
        let base = dirs::data_dir().context("Could not determine data directory")?;
        Ok(base.join("examprep"))
    }

    /// Directory holding the progress database
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Self::default_data_dir(),
        }
    }

    /// Load config from file, or return default if not found
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config from {:?}", path))?;
            Self::parse(&content)
        } else {
            log::debug!("No config at {:?}, using defaults", path);
            Ok(Config::default())
        }
    }

    fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| "Failed to parse config file")
    }

    /// Save config to file, readable only by the owner
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        let dir = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Config path has no parent directory"))?;

        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create config directory {:?}", dir))?;

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&path, &content)
            .with_context(|| format!("Failed to write config to {:?}", path))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(&path, perms)
                .with_context(|| "Failed to set config file permissions")?;
        }

        log::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Question bank path, checking the environment variable as fallback
    pub fn question_bank_path(&self) -> Option<PathBuf> {
        self.question_bank
            .clone()
            .filter(|p| !p.as_os_str().is_empty())
            .or_else(|| std::env::var_os(QUESTION_BANK_ENV).map(PathBuf::from))
    }

    pub fn has_question_bank(&self) -> bool {
        self.question_bank_path().is_some()
    }
}
