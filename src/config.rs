use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use rand::{rngs::StdRng, SeedableRng as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::job_board::JobBoard;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("invalid CSS selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },
}

/// Everything needed to run searches, loaded from [`Config::FILE_PATH`].
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub board: JobBoard,
    pub scraper: ScraperSettings,
    /// Where scraped jobs are persisted.
    pub jobs_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            board: JobBoard::default(),
            scraper: ScraperSettings::default(),
            jobs_path: PathBuf::from(Self::JOBS_FILE_PATH),
        }
    }
}

impl Config {
    pub const FILE_PATH: &str = "data/scraper.ron";
    pub const JOBS_FILE_PATH: &str = "data/jobs.ron";

    /// Loads the config file, or the built-in defaults if there is none.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Path::new(Self::FILE_PATH);
        if !path.exists() {
            log::warn!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from(path)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config_str = std::fs::read_to_string(path)?;
        Ok(ron::from_str(&config_str)?)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct ScraperSettings {
    /// Skip the job board entirely and answer every search with mock jobs.
    pub use_mock_data: bool,
    pub min_request_interval_ms: u64,
    /// Bounds of the random pause between result pages.
    pub page_delay_ms: (u64, u64),
    pub request_timeout_secs: u64,
    /// User-Agent strings to rotate through.
    pub user_agents: Vec<String>,
    pub referer: String,
    /// Seeds every random choice, for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self {
            use_mock_data: false,
            min_request_interval_ms: 2000,
            page_delay_ms: (1500, 3000),
            request_timeout_secs: 30,
            user_agents: [
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.1.1 Safari/605.1.15",
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:89.0) Gecko/20100101 Firefox/89.0",
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.114 Safari/537.36",
                "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.101 Safari/537.36",
            ]
            .map(String::from)
            .to_vec(),
            referer: "https://www.indeed.com/".to_string(),
            seed: None,
        }
    }
}

impl ScraperSettings {
    pub fn min_request_interval(&self) -> Duration {
        Duration::from_millis(self.min_request_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}
