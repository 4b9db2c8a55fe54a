use serde::Deserialize;

/// Project visible to the credential.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Project {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// User that created a job or a job run.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Creator {
    pub username: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Job definition within a project.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Job {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub creator: Option<Creator>,
    /// CPU cores requested per run
    pub cpu: Option<f64>,
    /// Memory requested per run, in GB
    pub memory: Option<f64>,
    pub nvidia_gpu: Option<i64>,
}

/// One execution of a job.
///
/// Timestamps are kept as raw JSON values: only string values are carried into
/// the export, anything else is rendered empty.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct JobRun {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub job_id: String,
    pub status: Option<String>,
    pub created_at: Option<serde_json::Value>,
    pub scheduling_at: Option<serde_json::Value>,
    pub starting_at: Option<serde_json::Value>,
    pub running_at: Option<serde_json::Value>,
    pub finished_at: Option<serde_json::Value>,
    pub kernel: Option<String>,
    pub cpu: Option<f64>,
    pub memory: Option<f64>,
    pub nvidia_gpu: Option<i64>,
    pub arguments: Option<String>,
    pub runtime_identifier: Option<String>,
    pub creator: Option<Creator>,
}

/// Long-running application within a project.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Application {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub cpu: Option<f64>,
    pub memory: Option<f64>,
    pub nvidia_gpu: Option<i64>,
}

/// Deployed model within a project.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Model {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub default_resources: Option<ModelResources>,
}

/// Default resources of a model deployment, in millicores and megabytes.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ModelResources {
    pub cpu_millicores: Option<Quantity>,
    pub memory_mb: Option<Quantity>,
    pub nvidia_gpus: Option<Quantity>,
}

/// Integer quantity that the API may encode as an integer, a float or a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    Number(i64),
    Float(f64),
    Text(String),
}

impl Quantity {
    /// Floats truncate toward zero; strings must hold an integer.
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            Self::Float(_) => None,
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Text(s) => write!(f, "{s:?}"),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ProjectsPage {
    #[serde(default)]
    pub projects: Vec<Project>,
}

#[derive(Debug, Deserialize)]
pub(super) struct JobsPage {
    #[serde(default)]
    pub jobs: Vec<Job>,
}

#[derive(Debug, Deserialize)]
pub(super) struct JobRunsPage {
    #[serde(default)]
    pub job_runs: Vec<JobRun>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ApplicationsPage {
    #[serde(default)]
    pub applications: Vec<Application>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ModelsPage {
    #[serde(default)]
    pub models: Vec<Model>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_run_tolerates_missing_fields() {
        let run: JobRun = serde_json::from_str(r#"{"id": "r1"}"#).unwrap();
        assert_eq!(run.id, "r1");
        assert_eq!(run.job_id, "");
        assert!(run.creator.is_none());
        assert!(run.cpu.is_none());
        assert!(run.created_at.is_none());
    }

    #[test]
    fn test_job_run_null_creator_is_absent() {
        let run: JobRun =
            serde_json::from_str(r#"{"id": "r1", "job_id": "j1", "creator": null}"#).unwrap();
        assert!(run.creator.is_none());
        assert_eq!(run.job_id, "j1");
    }

    #[test]
    fn test_quantity_accepts_numbers_and_strings() {
        let resources: ModelResources = serde_json::from_str(
            r#"{"cpu_millicores": "2000", "memory_mb": 2048, "nvidia_gpus": "x"}"#,
        )
        .unwrap();
        assert_eq!(resources.cpu_millicores.unwrap().as_i64(), Some(2000));
        assert_eq!(resources.memory_mb.unwrap().as_i64(), Some(2048));
        assert_eq!(resources.nvidia_gpus.unwrap().as_i64(), None);
    }

    #[test]
    fn test_quantity_truncates_floats() {
        let resources: ModelResources = serde_json::from_str(
            r#"{"cpu_millicores": 1000.0, "memory_mb": 1536.9, "nvidia_gpus": -0.5}"#,
        )
        .unwrap();
        assert_eq!(resources.cpu_millicores, Some(Quantity::Float(1000.0)));
        assert_eq!(resources.cpu_millicores.unwrap().as_i64(), Some(1000));
        assert_eq!(resources.memory_mb.unwrap().as_i64(), Some(1536));
        assert_eq!(resources.nvidia_gpus.unwrap().as_i64(), Some(0));
    }

    #[test]
    fn test_job_without_id_still_parses() {
        let page: JobsPage =
            serde_json::from_str(r#"{"jobs": [{"name": "J1", "cpu": 1, "memory": 2}]}"#).unwrap();
        assert_eq!(page.jobs[0].id, "");
        assert_eq!(page.jobs[0].cpu, Some(1.0));
    }

    #[test]
    fn test_page_without_list_is_empty() {
        let page: JobRunsPage = serde_json::from_str(r#"{"next_page_token": ""}"#).unwrap();
        assert!(page.job_runs.is_empty());
    }
}
