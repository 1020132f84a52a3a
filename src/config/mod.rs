// notionbackup/src/config/mod.rs
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::errors::AppError;
use crate::retry::RetryPolicy;

pub const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Debug,
}

impl LogLevel {
    /// Only `debug` turns on verbose output; any other value, including an
    /// unknown one, means `info`.
    pub fn parse_lenient(raw: &str) -> Result<Self, String> {
        if raw.trim().eq_ignore_ascii_case("debug") {
            Ok(LogLevel::Debug)
        } else {
            Ok(LogLevel::Info)
        }
    }

    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

// Raw command-line / environment surface. `.env` is loaded before parsing.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "notionbackup",
    version,
    about = "Back up every page and database of a Notion workspace as JSON"
)]
pub struct Cli {
    /// Notion integration token
    #[arg(long, env = "NOTION_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Proxy used for every API request
    #[arg(long, env = "http_proxy")]
    pub proxy: Option<String>,

    /// Per-request timeout in milliseconds
    #[arg(long, env = "CLIENT_TIMEOUT", default_value_t = 10_000)]
    pub client_timeout_ms: u64,

    /// Retries of the whole backup task
    #[arg(long, env = "TASK_TRY_TIME", default_value_t = 10)]
    pub task_try_time: u32,

    /// Wait between task retries in milliseconds
    #[arg(long, env = "TASK_RETRY_TIME", default_value_t = 3_000)]
    pub task_retry_time: u64,

    /// Retries of a single API call (search traversal or block children)
    #[arg(long, env = "SEARCH_TRY_TIME", default_value_t = 3)]
    pub search_try_time: u32,

    /// Wait between API call retries in milliseconds
    #[arg(long, env = "API_RETRY_TIME", default_value_t = 1_000)]
    pub api_retry_time: u64,

    /// Root under which the timestamped run directory is created
    #[arg(long, env = "BACKUP_OUTPUT_DIR", default_value = "../files")]
    pub output_dir: PathBuf,

    /// `debug` for verbose output, anything else logs at info
    #[arg(
        long,
        env = "LOG_LEVEL",
        default_value = "info",
        value_parser = LogLevel::parse_lenient
    )]
    pub log_level: LogLevel,

    #[arg(long, env = "NOTION_API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Pack the run directory into a .tar.gz after a successful backup
    #[arg(long, env = "BACKUP_ARCHIVE")]
    pub archive: bool,
}

/// Retry budgets for the two tiers of the backup pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackupConfig {
    /// Whole-workflow retry (outer tier).
    pub task_retry: RetryPolicy,
    /// Single remote call retry (inner tier).
    pub api_retry: RetryPolicy,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub token: String,
    pub proxy: Option<Url>,
    pub client_timeout: Duration,
    pub base_url: Url,
    pub output_root: PathBuf,
    pub log_level: LogLevel,
    pub archive: bool,
    pub backup: BackupConfig,
}

impl AppConfig {
    /// Validates the raw CLI surface into the configuration used by the run.
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let token = cli.token.trim().to_string();
        if token.is_empty() {
            return Err(AppError::Config("NOTION_TOKEN cannot be empty".to_string()).into());
        }

        if cli.client_timeout_ms == 0 {
            return Err(
                AppError::Config("CLIENT_TIMEOUT must be greater than 0".to_string()).into(),
            );
        }

        let proxy = match cli.proxy.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(
                Url::parse(raw)
                    .map_err(AppError::UrlParse)
                    .with_context(|| format!("Invalid proxy URL: {}", raw))?,
            ),
            _ => None,
        };

        if cli.output_dir.as_os_str().is_empty() {
            return Err(AppError::Config("BACKUP_OUTPUT_DIR cannot be empty".to_string()).into());
        }

        Ok(AppConfig {
            token,
            proxy,
            client_timeout: Duration::from_millis(cli.client_timeout_ms),
            base_url: parse_base_url(&cli.base_url)?,
            output_root: cli.output_dir,
            log_level: cli.log_level,
            archive: cli.archive,
            backup: BackupConfig {
                task_retry: RetryPolicy::new(
                    cli.task_try_time,
                    Duration::from_millis(cli.task_retry_time),
                ),
                api_retry: RetryPolicy::new(
                    cli.search_try_time,
                    Duration::from_millis(cli.api_retry_time),
                ),
            },
        })
    }
}

/// Parses the API base URL, forcing a trailing slash so `Url::join` appends
/// endpoint paths instead of replacing the last segment.
fn parse_base_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };
    Url::parse(&normalized)
        .map_err(AppError::UrlParse)
        .with_context(|| format!("Invalid API base URL: {}", raw))
}
