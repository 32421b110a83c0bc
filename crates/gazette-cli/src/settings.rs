//! Resolves run settings from flags, environment, a TOML file and defaults,
//! in that order of precedence.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::Args;
use serde::Deserialize;

use gazette_core::Config;

pub const DEFAULT_CONFIG_FILE: &str = "gazette.toml";

/// Flags shared by `run` and `daily`.
#[derive(Args, Debug, Clone, Default)]
pub struct PipelineArgs {
    /// TOML settings file (default: ./gazette.toml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Listing page to scan for PDF links
    #[arg(long)]
    pub listing_url: Option<String>,

    /// Directory the PDFs are saved into
    #[arg(long)]
    pub save_dir: Option<PathBuf>,

    /// Maximum number of documents handled per run
    #[arg(long)]
    pub max_candidates: Option<usize>,

    /// Characters of document text submitted for summarization
    #[arg(long)]
    pub max_input_chars: Option<usize>,

    /// Output token budget per summary
    #[arg(long)]
    pub max_output_tokens: Option<u32>,

    /// JSON file remembering already-summarized URLs
    #[arg(long)]
    pub seen_store: Option<PathBuf>,

    /// Submit documents even when no text could be extracted
    #[arg(long)]
    pub summarize_textless: bool,

    /// Only take acts whose listing card is dated on the run's date
    #[arg(long)]
    pub published_today: bool,

    /// OpenAI API key (otherwise OPENAI_API_KEY)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Chat model used for summaries
    #[arg(long)]
    pub model: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileSettings {
    pipeline: Config,
    openai: OpenAiSettings,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OpenAiSettings {
    model: Option<String>,
    base_url: Option<String>,
}

/// Everything a run needs, after layering.
#[derive(Debug, Clone)]
pub struct Settings {
    pub pipeline: Config,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

impl Settings {
    /// Resolve settings against the process environment.
    pub fn resolve(args: &PipelineArgs) -> Result<Self> {
        Self::resolve_with(args, |key| std::env::var(key).ok())
    }

    pub fn resolve_with(args: &PipelineArgs, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let file = match &args.config {
            Some(path) => load_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => load_file(Path::new(DEFAULT_CONFIG_FILE))?,
            None => FileSettings::default(),
        };

        let mut settings = Settings {
            pipeline: file.pipeline,
            api_key: None,
            model: file.openai.model,
            base_url: file.openai.base_url,
        };
        settings.apply_env(&env)?;
        settings.apply_args(args);
        Ok(settings)
    }

    fn apply_env(&mut self, env: &impl Fn(&str) -> Option<String>) -> Result<()> {
        let config = &mut self.pipeline;
        if let Some(v) = env("GAZETTE_LISTING_URL") {
            config.listing_url = v;
        }
        if let Some(v) = env("GAZETTE_SAVE_DIR") {
            config.save_dir = PathBuf::from(v);
        }
        if let Some(v) = env("GAZETTE_MAX_CANDIDATES") {
            config.max_candidates_per_run = parse_env("GAZETTE_MAX_CANDIDATES", &v)?;
        }
        if let Some(v) = env("GAZETTE_MAX_INPUT_CHARS") {
            config.max_input_chars_for_summary = parse_env("GAZETTE_MAX_INPUT_CHARS", &v)?;
        }
        if let Some(v) = env("GAZETTE_MAX_OUTPUT_TOKENS") {
            config.max_output_tokens = parse_env("GAZETTE_MAX_OUTPUT_TOKENS", &v)?;
        }
        if let Some(v) = env("GAZETTE_SEEN_STORE") {
            config.seen_store = Some(PathBuf::from(v));
        }
        if let Some(v) = env("OPENAI_API_KEY").filter(|v| !v.trim().is_empty()) {
            self.api_key = Some(v);
        }
        if let Some(v) = env("GAZETTE_MODEL") {
            self.model = Some(v);
        }
        if let Some(v) = env("OPENAI_BASE_URL") {
            self.base_url = Some(v);
        }
        Ok(())
    }

    fn apply_args(&mut self, args: &PipelineArgs) {
        let config = &mut self.pipeline;
        if let Some(v) = &args.listing_url {
            config.listing_url = v.clone();
        }
        if let Some(v) = &args.save_dir {
            config.save_dir = v.clone();
        }
        if let Some(v) = args.max_candidates {
            config.max_candidates_per_run = v;
        }
        if let Some(v) = args.max_input_chars {
            config.max_input_chars_for_summary = v;
        }
        if let Some(v) = args.max_output_tokens {
            config.max_output_tokens = v;
        }
        if let Some(v) = &args.seen_store {
            config.seen_store = Some(v.clone());
        }
        if args.summarize_textless {
            config.skip_textless = false;
        }
        if args.published_today {
            config.published_on_run_date = true;
        }
        if let Some(v) = &args.api_key {
            self.api_key = Some(v.clone());
        }
        if let Some(v) = &args.model {
            self.model = Some(v.clone());
        }
    }
}

fn load_file(path: &Path) -> Result<FileSettings> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn parse_env<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("{} has invalid value {:?}", key, value))
}
