use log::{error, info, warn};

use crate::error::{CmlError, Result};
use crate::report::{ResourceTotals, Resources};

use super::client::CmlApi;
use super::types::{Application, Job, Model, Quantity};

const MILLICORES_PER_CORE: f64 = 1000.0;
const MB_PER_GB: f64 = 1024.0;

/// Entity that reserves CPU, memory and GPU.
pub trait ResourceUsage {
    fn label(&self) -> String;

    /// Resources this entity contributes, or the attribute that could not be read.
    fn usage(&self) -> Result<Resources>;
}

fn required<T: Copy>(
    value: Option<T>,
    entity: &impl ResourceUsage,
    field: &'static str,
) -> Result<T> {
    value.ok_or_else(|| CmlError::MissingField {
        entity: entity.label(),
        field,
    })
}

fn quantity(
    value: Option<&Quantity>,
    entity: &impl ResourceUsage,
    field: &'static str,
) -> Result<i64> {
    let value = value.ok_or_else(|| CmlError::MissingField {
        entity: entity.label(),
        field,
    })?;
    value.as_i64().ok_or_else(|| CmlError::InvalidField {
        entity: entity.label(),
        field,
        value: value.to_string(),
    })
}

impl ResourceUsage for Job {
    fn label(&self) -> String {
        format!("job {} ({})", self.id, self.name)
    }

    fn usage(&self) -> Result<Resources> {
        Ok(Resources::new(
            required(self.cpu, self, "cpu")?,
            required(self.memory, self, "memory")?,
            required(self.nvidia_gpu, self, "nvidia_gpu")?,
        ))
    }
}

impl ResourceUsage for Application {
    fn label(&self) -> String {
        format!("application {} ({})", self.id, self.name)
    }

    fn usage(&self) -> Result<Resources> {
        Ok(Resources::new(
            required(self.cpu, self, "cpu")?,
            required(self.memory, self, "memory")?,
            required(self.nvidia_gpu, self, "nvidia_gpu")?,
        ))
    }
}

impl ResourceUsage for Model {
    fn label(&self) -> String {
        format!("model {} ({})", self.id, self.name)
    }

    /// Converts millicores to cores and megabytes to gigabytes.
    #[allow(clippy::cast_precision_loss)]
    fn usage(&self) -> Result<Resources> {
        let resources = self
            .default_resources
            .as_ref()
            .ok_or_else(|| CmlError::MissingField {
                entity: self.label(),
                field: "default_resources",
            })?;

        let millicores = quantity(resources.cpu_millicores.as_ref(), self, "cpu_millicores")?;
        let memory_mb = quantity(resources.memory_mb.as_ref(), self, "memory_mb")?;
        let gpus = quantity(resources.nvidia_gpus.as_ref(), self, "nvidia_gpus")?;

        Ok(Resources::new(
            millicores as f64 / MILLICORES_PER_CORE,
            memory_mb as f64 / MB_PER_GB,
            gpus,
        ))
    }
}

/// Sums the usage of `entities`, counting unreadable ones as zero.
pub fn sum_usage<T: ResourceUsage>(entities: &[T]) -> Resources {
    entities
        .iter()
        .map(|entity| {
            entity.usage().unwrap_or_else(|e| {
                warn!("Skipping {}: {e}", entity.label());
                Resources::default()
            })
        })
        .sum()
}

fn listed<T: ResourceUsage>(listing: Result<Vec<T>>, kind: &str, project_id: &str) -> Resources {
    match listing {
        Ok(entities) => sum_usage(&entities),
        Err(e) => {
            error!("Listing {kind} for project={project_id} failed: {e}");
            Resources::default()
        }
    }
}

/// Totals jobs, applications and models across every project.
///
/// # Errors
///
/// Returns an error if the projects cannot be listed. Failures listing one
/// project's entities only zero that category for that project.
pub async fn aggregate_resources(api: &impl CmlApi, page_size: usize) -> Result<ResourceTotals> {
    let projects = api.list_projects(page_size, false).await.inspect_err(|e| {
        error!("Listing projects failed: {e}");
    })?;

    info!("Aggregating resources for {} projects", projects.len());

    let mut jobs = Resources::default();
    let mut applications = Resources::default();
    let mut models = Resources::default();

    for project in &projects {
        let id = project.id.as_str();
        jobs += listed(api.list_jobs(id, page_size).await, "jobs", id);
        applications += listed(
            api.list_applications(id, page_size).await,
            "applications",
            id,
        );
        models += listed(api.list_models(id, page_size).await, "models", id);
    }

    Ok(ResourceTotals::new(jobs, applications, models))
}
