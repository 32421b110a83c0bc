//! Pipeline configuration, validated once at construction time.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid listing URL {url}: {reason}")]
    ListingUrl { url: String, reason: String },
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
    #[error("save_dir must not be empty")]
    EmptySaveDir,
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Configuration for the acquisition pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listing_url: String,
    pub max_candidates_per_run: usize,
    pub max_input_chars_for_summary: usize,
    pub max_output_tokens: u32,
    pub save_dir: PathBuf,
    pub user_agent: String,
    pub http_timeout_secs: u64,
    /// Minimum gap between HTTP requests to the gazette site; 0 disables pacing.
    pub request_interval_ms: u64,
    /// Skip documents with no extractable text instead of summarizing nothing.
    pub skip_textless: bool,
    /// JSON file of already-summarized URLs. `None` dedupes by filename only.
    pub seen_store: Option<PathBuf>,
    /// Only take links from listing cards dated on the run's date.
    pub published_on_run_date: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listing_url: "https://dziennikustaw.gov.pl/DU".to_string(),
            max_candidates_per_run: 5,
            max_input_chars_for_summary: 12_000,
            max_output_tokens: 300,
            save_dir: PathBuf::from("ustawy"),
            user_agent: concat!("gazette/", env!("CARGO_PKG_VERSION")).to_string(),
            http_timeout_secs: 30,
            request_interval_ms: 500,
            skip_textless: true,
            seen_store: None,
            published_on_run_date: false,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.listing_url).map_err(|e| ConfigError::ListingUrl {
            url: self.listing_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::ListingUrl {
                url: self.listing_url.clone(),
                reason: format!("unsupported scheme {}", url.scheme()),
            });
        }
        if self.max_input_chars_for_summary == 0 {
            return Err(ConfigError::Zero {
                field: "max_input_chars_for_summary",
            });
        }
        if self.max_output_tokens == 0 {
            return Err(ConfigError::Zero {
                field: "max_output_tokens",
            });
        }
        if self.save_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptySaveDir);
        }
        Ok(())
    }
}
