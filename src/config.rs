use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

use crate::classifier::KeywordSet;
use crate::delay_manager::DelayRange;
use crate::error::ConfigError;
use crate::models::JobSource;
use crate::recency::DEFAULT_WINDOW_HOURS;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Settings for one scraping run. Every field has a default, so a config file
/// only needs the values it wants to change.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub queries: Vec<String>,
    pub location: String,
    pub sites: Vec<JobSource>,
    /// Result pages fetched per query and site.
    pub max_pages: u32,
    pub window_hours: u32,
    pub delay: DelayRange,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Rows in the top-companies tables of the report.
    pub top_n: usize,
    pub output_dir: PathBuf,
    pub file_prefix: String,
    pub keywords: KeywordSet,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        ScraperConfig {
            queries: vec![
                "DevOps Engineer H1B sponsorship".to_string(),
                "Site Reliability Engineer visa sponsorship".to_string(),
                "Infrastructure Engineer H1B".to_string(),
                "Platform Engineer visa sponsor".to_string(),
                "Cloud Engineer H1B sponsorship".to_string(),
            ],
            location: "United States".to_string(),
            sites: JobSource::ALL.to_vec(),
            max_pages: 3,
            window_hours: DEFAULT_WINDOW_HOURS,
            delay: DelayRange::default(),
            request_timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            top_n: 10,
            output_dir: PathBuf::from("output"),
            file_prefix: "h1b_jobs".to_string(),
            keywords: KeywordSet::default(),
        }
    }
}

impl ScraperConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ScraperConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Loads `path` when given, otherwise the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                let content = fs::read_to_string(p)?;
                let config = Self::from_toml_str(&content)?;
                info!("Loaded configuration from {:?}", p);
                Ok(config)
            }
            None => Ok(ScraperConfig::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.queries.iter().all(|q| q.trim().is_empty()) {
            return Err(ConfigError::Invalid("at least one search query is required".to_string()));
        }
        if self.sites.is_empty() {
            return Err(ConfigError::Invalid("at least one job site is required".to_string()));
        }
        if self.max_pages == 0 {
            return Err(ConfigError::Invalid("max_pages must be at least 1".to_string()));
        }
        if self.delay.min_secs > self.delay.max_secs {
            return Err(ConfigError::Invalid(format!(
                "delay range is inverted: min {}s > max {}s",
                self.delay.min_secs, self.delay.max_secs
            )));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::Invalid("user_agent must not be empty".to_string()));
        }
        Ok(())
    }
}
