use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cml::job_history::PageSizes;

/// Configuration file structure for cmlreport.
///
/// Every value is optional; command-line flags and environment variables take
/// precedence over the file, and the file over built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Connection settings for the management API
    #[serde(default)]
    pub api: ApiConfig,

    /// Job-run export settings
    #[serde(default)]
    pub job_history: JobHistoryConfig,

    /// Resource aggregation settings
    #[serde(default)]
    pub resources: ResourcesConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ApiConfig {
    /// Workspace URL, usually the value of `CDSW_API_URL`
    pub url: Option<String>,

    /// API v2 key
    pub api_key: Option<String>,

    /// Per-request timeout; unset means no timeout
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct JobHistoryConfig {
    /// Destination CSV file
    #[serde(default = "default_output")]
    pub output: PathBuf,

    #[serde(default = "default_project_page_size")]
    pub project_page_size: usize,

    #[serde(default = "default_job_page_size")]
    pub job_page_size: usize,

    #[serde(default = "default_run_page_size")]
    pub run_page_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResourcesConfig {
    /// Page size for every listing call of the aggregation
    #[serde(default = "default_resources_page_size")]
    pub page_size: usize,

    /// Output format for the totals
    #[serde(default)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Default for JobHistoryConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            project_page_size: default_project_page_size(),
            job_page_size: default_job_page_size(),
            run_page_size: default_run_page_size(),
        }
    }
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            page_size: default_resources_page_size(),
            format: OutputFormat::Table,
        }
    }
}

impl JobHistoryConfig {
    pub fn page_sizes(&self) -> PageSizes {
        PageSizes {
            projects: self.project_page_size,
            jobs: self.job_page_size,
            runs: self.run_page_size,
        }
    }
}

fn default_output() -> PathBuf {
    PathBuf::from("all_job_runs.csv")
}

fn default_project_page_size() -> usize {
    100_000
}

fn default_job_page_size() -> usize {
    100_000
}

fn default_run_page_size() -> usize {
    1000
}

fn default_resources_page_size() -> usize {
    1000
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./cmlreport.toml
    /// 3. ./cmlreport.json
    /// 4. ./cmlreport.yaml
    /// 5. ./cmlreport.yml
    /// 6. `<config dir>/cmlreport/config.toml`
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let candidates = ["cmlreport.toml", "cmlreport.json", "cmlreport.yaml", "cmlreport.yml"];

        for candidate in &candidates {
            let path = Path::new(candidate);
            if path.exists() {
                return Self::load_from_path(path);
            }
        }

        let user_config = dirs::config_dir()
            .map(|dir| dir.join("cmlreport").join("config.toml"))
            .filter(|path| path.exists());
        if let Some(user_config) = user_config {
            return Self::load_from_path(&user_config);
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display())),
        }
    }
}
