pub mod coder;
pub mod tabular;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use switchboard_config::{resolve_path, Config};

use crate::models::ModelPool;
use crate::registry::{AgentKind, Capability, Dataset, Registry};

use coder::CoderAgent;
use tabular::TabularAgent;

/// Build the full fixed registry: the coder agent plus one tabular agent
/// per dataset, in stable order.
///
/// Any factory failure here (missing dataset file, malformed CSV) is
/// startup-fatal: the error propagates out and the process must not serve
/// with a partial registry.
pub fn build_registry(config: &Config, models: &ModelPool) -> Result<Registry> {
    let mut capabilities = Vec::with_capacity(AgentKind::ALL.len());

    for kind in AgentKind::ALL {
        let capability = match kind {
            AgentKind::Coder => {
                let agent = CoderAgent::new(config, models);
                Capability::new(kind, coder::CODER_DESCRIPTION, Arc::new(agent))
            }
            AgentKind::Dataset(dataset) => {
                let path = dataset_path(config, dataset);
                let agent = TabularAgent::new(dataset, &path, config, models)
                    .with_context(|| format!("failed to build '{}' agent", kind.name()))?;
                Capability::new(kind, tabular::dataset_description(dataset), Arc::new(agent))
            }
        };
        capabilities.push(capability);
    }

    Registry::new(capabilities)
}

/// Resolve a dataset's CSV path: absolute paths are used as-is, relative
/// ones live under `datasets.dataDir`.
fn dataset_path(config: &Config, dataset: Dataset) -> PathBuf {
    let file = match dataset {
        Dataset::Cats => &config.datasets.cats,
        Dataset::Dogs => &config.datasets.dogs,
        Dataset::SleepPatterns => &config.datasets.sleep_patterns,
        Dataset::HealthyFoods => &config.datasets.healthy_foods,
    };
    let file = resolve_path(file);
    if file.is_absolute() {
        file
    } else {
        resolve_path(&config.datasets.data_dir).join(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_path_relative_joins_data_dir() {
        let mut config = Config::default();
        config.datasets.data_dir = "/srv/switchboard".into();
        assert_eq!(
            dataset_path(&config, Dataset::Cats),
            PathBuf::from("/srv/switchboard/cats_dataset.csv")
        );
    }

    #[test]
    fn test_dataset_path_absolute_used_verbatim() {
        let mut config = Config::default();
        config.datasets.dogs = "/data/dogs.csv".into();
        assert_eq!(
            dataset_path(&config, Dataset::Dogs),
            PathBuf::from("/data/dogs.csv")
        );
    }
}
