use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Serialize, Serializer};

use crate::cml::types::Creator;

/// Creator identity attributed to a job run.
///
/// Fields stay optional until the row is flattened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub username: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl Identity {
    /// True when none of the three fields carries a non-empty value.
    pub fn is_empty(&self) -> bool {
        [&self.username, &self.name, &self.email]
            .iter()
            .all(|field| field.as_deref().map_or(true, str::is_empty))
    }
}

impl From<&Creator> for Identity {
    fn from(creator: &Creator) -> Self {
        Self {
            username: creator.username.clone(),
            name: creator.name.clone(),
            email: creator.email.clone(),
        }
    }
}

/// Resolves who a run is attributed to.
///
/// The run's own creator wins when it is present and not empty, then the
/// creator captured from the parent job, then an empty identity.
pub fn resolve_identity(run_creator: Option<&Creator>, job_creator: Option<&Identity>) -> Identity {
    if let Some(identity) = run_creator.map(Identity::from).filter(|i| !i.is_empty()) {
        return identity;
    }
    job_creator.cloned().unwrap_or_default()
}

/// Carries string timestamps through unchanged; any other JSON value renders empty.
pub fn to_iso(value: Option<&serde_json::Value>) -> String {
    match value {
        Some(serde_json::Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

/// One line of the job-run export.
///
/// Field declaration order is the CSV column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobRunRow {
    pub user_username: String,
    pub user_name: String,
    pub user_email: String,
    #[serde(rename = "ProjectID")]
    pub project_id: String,
    pub project_name: String,
    #[serde(rename = "JobID")]
    pub job_id: String,
    pub job_name: String,
    #[serde(rename = "RunID")]
    pub run_id: String,
    pub status: String,
    pub created_at: String,
    pub scheduling_at: String,
    pub starting_at: String,
    pub running_at: String,
    pub finished_at: String,
    pub kernel: String,
    #[serde(rename = "CPU", serialize_with = "float_or_zero")]
    pub cpu: Option<f64>,
    #[serde(serialize_with = "float_or_zero")]
    pub memory: Option<f64>,
    #[serde(rename = "NvidiaGPU")]
    pub nvidia_gpu: i64,
    pub arguments: String,
    pub runtime_identifier: String,
}

/// Column names of the export, in order.
pub const JOB_RUN_COLUMNS: [&str; 20] = [
    "UserUsername",
    "UserName",
    "UserEmail",
    "ProjectID",
    "ProjectName",
    "JobID",
    "JobName",
    "RunID",
    "Status",
    "CreatedAt",
    "SchedulingAt",
    "StartingAt",
    "RunningAt",
    "FinishedAt",
    "Kernel",
    "CPU",
    "Memory",
    "NvidiaGPU",
    "Arguments",
    "RuntimeIdentifier",
];

// Present values keep their fractional part (`4.0`); a missing value is the integer `0`.
fn float_or_zero<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => serializer.collect_str(&format_args!("{v:?}")),
        None => serializer.serialize_str("0"),
    }
}

/// CPU cores, memory in GB and GPU units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Resources {
    pub cpu: f64,
    pub memory: f64,
    pub gpu: i64,
}

impl Resources {
    pub fn new(cpu: f64, memory: f64, gpu: i64) -> Self {
        Self { cpu, memory, gpu }
    }
}

impl Add for Resources {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            cpu: self.cpu + other.cpu,
            memory: self.memory + other.memory,
            gpu: self.gpu + other.gpu,
        }
    }
}

impl AddAssign for Resources {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sum for Resources {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Resource totals across all projects.
///
/// `total` covers jobs and applications only; models are reported on their own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ResourceTotals {
    pub jobs: Resources,
    pub applications: Resources,
    pub models: Resources,
    pub total: Resources,
}

impl ResourceTotals {
    pub fn new(jobs: Resources, applications: Resources, models: Resources) -> Self {
        Self {
            jobs,
            applications,
            models,
            total: jobs + applications,
        }
    }
}
