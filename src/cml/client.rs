use std::time::Duration;

use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use crate::auth::ApiKey;
use crate::error::{CmlError, Result};

use super::types::{
    Application, ApplicationsPage, Job, JobRun, JobRunsPage, JobsPage, Model, ModelsPage, Project,
    ProjectsPage,
};

/// Legacy API path that deployments expose in `CDSW_API_URL`.
const LEGACY_API_PATH: &str = "/api/v1";
const API_PATH: &str = "api/v2/";

/// Read-only operations of the management API used by the reports.
///
/// Each call fetches a single page bounded by `page_size`; the API's own page
/// limit is treated as a ceiling.
#[allow(async_fn_in_trait)]
pub trait CmlApi {
    async fn list_projects(&self, page_size: usize, include_all: bool) -> Result<Vec<Project>>;

    async fn list_jobs(&self, project_id: &str, page_size: usize) -> Result<Vec<Job>>;

    async fn list_job_runs(
        &self,
        project_id: &str,
        job_id: &str,
        page_size: usize,
    ) -> Result<Vec<JobRun>>;

    async fn list_applications(
        &self,
        project_id: &str,
        page_size: usize,
    ) -> Result<Vec<Application>>;

    async fn list_models(&self, project_id: &str, page_size: usize) -> Result<Vec<Model>>;
}

/// Builds the versioned API root from a configured base URL.
///
/// Every `/api/v1` occurrence is stripped, then `api/v2/` is joined onto the
/// remaining URL.
pub fn api_base_url(base_url: &str) -> Result<Url> {
    let mut base = base_url.trim().replace(LEGACY_API_PATH, "");
    if !base.ends_with('/') {
        base.push('/');
    }

    Url::parse(&base)
        .map_err(|e| CmlError::Config(format!("Invalid base URL '{base_url}': {e}")))?
        .join(API_PATH)
        .map_err(|e| CmlError::Config(format!("Invalid API base URL: {e}")))
}

pub struct CmlClient {
    client: Client,
    api_url: Url,
    api_key: ApiKey,
}

impl CmlClient {
    pub fn new(base_url: &str, api_key: ApiKey, timeout: Option<Duration>) -> Result<Self> {
        let mut builder =
            Client::builder().user_agent(format!("cmlreport/{}", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| CmlError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url: api_base_url(base_url)?,
            api_key,
        })
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// Appends percent-encoded path segments and the `page_size` query to the API root.
    fn endpoint(&self, segments: &[&str], page_size: usize) -> Result<Url> {
        let mut url = self.api_url.clone();
        let base = self.api_url.as_str();
        url.path_segments_mut()
            .map_err(|()| CmlError::Config(format!("Base URL cannot have a path: {base}")))?
            .pop_if_empty()
            .extend(segments);
        url.query_pairs_mut()
            .append_pair("page_size", &page_size.to_string());
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!("GET {url}");

        let response = self
            .client
            .get(url)
            .bearer_auth(self.api_key.as_str())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(CmlError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl CmlApi for CmlClient {
    async fn list_projects(&self, page_size: usize, include_all: bool) -> Result<Vec<Project>> {
        let mut url = self.endpoint(&["projects"], page_size)?;
        if include_all {
            url.query_pairs_mut()
                .append_pair("include_all_projects", "true");
        }
        let page: ProjectsPage = self.get_json(url).await?;
        Ok(page.projects)
    }

    async fn list_jobs(&self, project_id: &str, page_size: usize) -> Result<Vec<Job>> {
        let url = self.endpoint(&["projects", project_id, "jobs"], page_size)?;
        let page: JobsPage = self.get_json(url).await?;
        Ok(page.jobs)
    }

    async fn list_job_runs(
        &self,
        project_id: &str,
        job_id: &str,
        page_size: usize,
    ) -> Result<Vec<JobRun>> {
        let url = self.endpoint(&["projects", project_id, "jobs", job_id, "runs"], page_size)?;
        let page: JobRunsPage = self.get_json(url).await?;
        Ok(page.job_runs)
    }

    async fn list_applications(
        &self,
        project_id: &str,
        page_size: usize,
    ) -> Result<Vec<Application>> {
        let url = self.endpoint(&["projects", project_id, "applications"], page_size)?;
        let page: ApplicationsPage = self.get_json(url).await?;
        Ok(page.applications)
    }

    async fn list_models(&self, project_id: &str, page_size: usize) -> Result<Vec<Model>> {
        let url = self.endpoint(&["projects", project_id, "models"], page_size)?;
        let page: ModelsPage = self.get_json(url).await?;
        Ok(page.models)
    }
}
