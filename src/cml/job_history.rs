use indexmap::IndexMap;
use log::{debug, error, info};

use crate::report::{resolve_identity, to_iso, Identity, JobRunRow};

use super::client::CmlApi;
use super::types::{Job, JobRun};

/// Page sizes for the three listing calls of the export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSizes {
    pub projects: usize,
    pub jobs: usize,
    pub runs: usize,
}

impl Default for PageSizes {
    fn default() -> Self {
        Self {
            projects: 100_000,
            jobs: 100_000,
            runs: 1000,
        }
    }
}

/// Job context captured once per project and joined onto each of its runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobMeta {
    pub name: String,
    pub creator: Identity,
}

impl From<&Job> for JobMeta {
    fn from(job: &Job) -> Self {
        Self {
            name: job.name.clone(),
            creator: job.creator.as_ref().map(Identity::from).unwrap_or_default(),
        }
    }
}

/// Lists every project the credential can see as `id -> name`, in API order.
///
/// A failed listing is logged and yields an empty lookup, which leaves the
/// export with nothing to enumerate.
pub async fn list_all_projects(api: &impl CmlApi, page_size: usize) -> IndexMap<String, String> {
    match api.list_projects(page_size, true).await {
        Ok(projects) => {
            let lookup: IndexMap<_, _> = projects.into_iter().map(|p| (p.id, p.name)).collect();
            info!("Found {} projects", lookup.len());
            lookup
        }
        Err(e) => {
            error!("Listing projects failed: {e}");
            IndexMap::new()
        }
    }
}

/// Builds the `job id -> metadata` lookup for one project's jobs.
pub fn job_meta_lookup(jobs: &[Job]) -> IndexMap<String, JobMeta> {
    jobs.iter()
        .map(|job| (job.id.clone(), JobMeta::from(job)))
        .collect()
}

/// Flattens one run with its project and job context.
///
/// The job id column comes from the run itself; the job name comes from `meta`.
pub fn enrich_run(
    project_id: &str,
    project_name: &str,
    meta: &JobMeta,
    run: &JobRun,
) -> JobRunRow {
    let identity = resolve_identity(run.creator.as_ref(), Some(&meta.creator));

    JobRunRow {
        user_username: identity.username.unwrap_or_default(),
        user_name: identity.name.unwrap_or_default(),
        user_email: identity.email.unwrap_or_default(),
        project_id: project_id.to_string(),
        project_name: project_name.to_string(),
        job_id: run.job_id.clone(),
        job_name: meta.name.clone(),
        run_id: run.id.clone(),
        status: run.status.clone().unwrap_or_default(),
        created_at: to_iso(run.created_at.as_ref()),
        scheduling_at: to_iso(run.scheduling_at.as_ref()),
        starting_at: to_iso(run.starting_at.as_ref()),
        running_at: to_iso(run.running_at.as_ref()),
        finished_at: to_iso(run.finished_at.as_ref()),
        kernel: run.kernel.clone().unwrap_or_default(),
        cpu: run.cpu,
        memory: run.memory,
        nvidia_gpu: run.nvidia_gpu.unwrap_or(0),
        arguments: run.arguments.clone().unwrap_or_default(),
        runtime_identifier: run.runtime_identifier.clone().unwrap_or_default(),
    }
}

/// Fetches and enriches every run of every job in one project.
///
/// A failed job listing skips the project; a failed run listing skips only
/// that job.
pub async fn project_job_runs(
    api: &impl CmlApi,
    project_id: &str,
    project_name: &str,
    page_sizes: PageSizes,
) -> Vec<JobRunRow> {
    let jobs = match api.list_jobs(project_id, page_sizes.jobs).await {
        Ok(jobs) => jobs,
        Err(e) => {
            error!("Listing jobs for project={project_id} failed: {e}");
            return Vec::new();
        }
    };

    let job_meta = job_meta_lookup(&jobs);
    let mut rows = Vec::new();

    for job in &jobs {
        let runs = match api.list_job_runs(project_id, &job.id, page_sizes.runs).await {
            Ok(runs) => runs,
            Err(e) => {
                error!("Listing job runs for job {} failed: {e}", job.id);
                continue;
            }
        };

        let meta = &job_meta[&job.id];
        debug!("Project {project_id}: job {} has {} runs", job.id, runs.len());
        for run in &runs {
            rows.push(enrich_run(project_id, project_name, meta, run));
        }
    }

    rows
}

/// Collects enriched rows for all projects in the lookup, in lookup order.
///
/// `on_project` is called with the position and name of each project before
/// its jobs are listed.
pub async fn gather_job_runs(
    api: &impl CmlApi,
    projects: &IndexMap<String, String>,
    page_sizes: PageSizes,
    mut on_project: impl FnMut(usize, &str),
) -> Vec<JobRunRow> {
    let mut rows = Vec::new();
    for (index, (project_id, project_name)) in projects.iter().enumerate() {
        on_project(index, project_name);
        rows.extend(project_job_runs(api, project_id, project_name, page_sizes).await);
    }
    info!("Collected {} job runs across {} projects", rows.len(), projects.len());
    rows
}
