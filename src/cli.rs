use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::auth::ApiKey;
use crate::cml::job_history::{gather_job_runs, list_all_projects};
use crate::cml::resources::aggregate_resources;
use crate::cml::CmlClient;
use crate::config::{Config, OutputFormat};
use crate::output::{self, PhaseProgress};

#[derive(Parser)]
#[command(name = "cmlreport")]
#[command(author, version, about = "Cloudera Machine Learning reporting tool", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Workspace URL; a trailing `/api/v1` is removed
    #[arg(short, long, global = true, env = "CDSW_API_URL")]
    url: Option<String>,

    /// API v2 key
    #[arg(short = 'k', long, global = true, env = "CDSW_APIV2_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Configuration file (defaults to ./cmlreport.toml and friends)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Export every job run of every project to a CSV file
    JobHistory {
        /// Destination file [default: all_job_runs.csv]
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Total CPU, memory and GPU reserved by jobs, applications and models
    Resources {
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },
}

impl Cli {
    fn client(&self, config: &Config) -> Result<CmlClient> {
        let url = self
            .url
            .clone()
            .or_else(|| config.api.url.clone())
            .context("CDSW_API_URL is not set (pass --url or set it in a config file)")?;
        let api_key = self
            .api_key
            .clone()
            .or_else(|| config.api.api_key.clone())
            .context("CDSW_APIV2_KEY is not set (pass --api-key or set it in a config file)")?;

        let timeout = config.api.timeout_secs.map(Duration::from_secs);
        let client = CmlClient::new(&url, ApiKey::from(api_key), timeout)?;
        info!("Using API at {}", client.api_url());
        Ok(client)
    }

    async fn execute_job_history(&self, config: &Config, destination: Option<&Path>) -> Result<()> {
        let client = self.client(config)?;
        let path = destination.unwrap_or(config.job_history.output.as_path());
        let page_sizes = config.job_history.page_sizes();

        let progress = PhaseProgress::start_phase_1();
        let projects = list_all_projects(&client, page_sizes.projects).await;
        if projects.is_empty() {
            warn!("No projects found; the export will only contain the header");
        }

        let progress = progress.finish_phase_1_start_phase_2(projects.len());
        let rows = gather_job_runs(&client, &projects, page_sizes, |index, name| {
            progress.set_project(index + 1, projects.len(), name);
        })
        .await;

        let progress = progress.finish_phase_2_start_phase_3(rows.len());
        let written = output::export_job_runs(rows, path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        progress.finish_phase_3();

        output::print_export_summary(path, written, projects.len());
        Ok(())
    }

    async fn execute_resources(&self, config: &Config, format: Option<OutputFormat>) -> Result<()> {
        let client = self.client(config)?;
        let format = format.unwrap_or(config.resources.format);

        let spinner = output::resources_spinner();
        let totals = aggregate_resources(&client, config.resources.page_size).await;
        spinner.finish_and_clear();
        let totals = totals.context("Failed to aggregate resources")?;

        match format {
            OutputFormat::Table => output::print_resource_summary(&totals, Utc::now()),
            OutputFormat::Json => println!("{}", output::render_resource_json(&totals)?),
        }

        Ok(())
    }

    pub async fn execute(&self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;

        match &self.command {
            Commands::JobHistory { output } => {
                self.execute_job_history(&config, output.as_deref()).await
            }
            Commands::Resources { format } => self.execute_resources(&config, *format).await,
        }
    }
}
