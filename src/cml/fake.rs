//! In-memory stand-in for the management API, used by pipeline tests.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use crate::error::{CmlError, Result};

use super::client::CmlApi;
use super::types::{Application, Creator, Job, JobRun, Model, Project};

#[derive(Default)]
pub struct FakeApi {
    pub projects: Vec<Project>,
    pub jobs: HashMap<String, Vec<Job>>,
    pub runs: HashMap<(String, String), Vec<JobRun>>,
    pub applications: HashMap<String, Vec<Application>>,
    pub models: HashMap<String, Vec<Model>>,
    /// Keys are `"<call>:<project>"` or `"runs:<project>:<job>"`.
    pub failures: HashSet<String>,
    pub calls: RefCell<Vec<String>>,
}

impl FakeApi {
    pub fn project(mut self, id: &str, name: &str) -> Self {
        self.projects.push(Project {
            id: id.to_string(),
            name: name.to_string(),
        });
        self
    }

    pub fn job(mut self, project_id: &str, job: Job) -> Self {
        self.jobs.entry(project_id.to_string()).or_default().push(job);
        self
    }

    pub fn run(mut self, project_id: &str, run: JobRun) -> Self {
        self.runs
            .entry((project_id.to_string(), run.job_id.clone()))
            .or_default()
            .push(run);
        self
    }

    pub fn application(mut self, project_id: &str, application: Application) -> Self {
        self.applications
            .entry(project_id.to_string())
            .or_default()
            .push(application);
        self
    }

    pub fn model(mut self, project_id: &str, model: Model) -> Self {
        self.models
            .entry(project_id.to_string())
            .or_default()
            .push(model);
        self
    }

    pub fn failing(mut self, key: &str) -> Self {
        self.failures.insert(key.to_string());
        self
    }

    fn check(&self, key: String) -> Result<()> {
        self.calls.borrow_mut().push(key.clone());
        if self.failures.contains(&key) {
            return Err(CmlError::Api {
                status: 500,
                message: format!("injected failure for {key}"),
            });
        }
        Ok(())
    }
}

impl CmlApi for FakeApi {
    async fn list_projects(&self, _page_size: usize, _include_all: bool) -> Result<Vec<Project>> {
        self.check("projects".to_string())?;
        Ok(self.projects.clone())
    }

    async fn list_jobs(&self, project_id: &str, _page_size: usize) -> Result<Vec<Job>> {
        self.check(format!("jobs:{project_id}"))?;
        Ok(self.jobs.get(project_id).cloned().unwrap_or_default())
    }

    async fn list_job_runs(
        &self,
        project_id: &str,
        job_id: &str,
        _page_size: usize,
    ) -> Result<Vec<JobRun>> {
        self.check(format!("runs:{project_id}:{job_id}"))?;
        Ok(self
            .runs
            .get(&(project_id.to_string(), job_id.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn list_applications(
        &self,
        project_id: &str,
        _page_size: usize,
    ) -> Result<Vec<Application>> {
        self.check(format!("applications:{project_id}"))?;
        Ok(self.applications.get(project_id).cloned().unwrap_or_default())
    }

    async fn list_models(&self, project_id: &str, _page_size: usize) -> Result<Vec<Model>> {
        self.check(format!("models:{project_id}"))?;
        Ok(self.models.get(project_id).cloned().unwrap_or_default())
    }
}

pub fn creator(username: &str) -> Creator {
    Creator {
        username: Some(username.to_string()),
        name: Some(format!("{username} name")),
        email: Some(format!("{username}@example.com")),
    }
}

pub fn job(id: &str, name: &str, creator: Option<Creator>) -> Job {
    Job {
        id: id.to_string(),
        name: name.to_string(),
        creator,
        ..Default::default()
    }
}

pub fn run(id: &str, job_id: &str, created_at: &str, creator: Option<Creator>) -> JobRun {
    JobRun {
        id: id.to_string(),
        job_id: job_id.to_string(),
        created_at: Some(serde_json::Value::String(created_at.to_string())),
        creator,
        ..Default::default()
    }
}
