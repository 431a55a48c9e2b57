use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use switchboard_config::Config;
use tracing::info;

use crate::models::{ModelPool, ModelTier};
use crate::registry::{Agent, Dataset};
use crate::runner::AgentRunner;
use crate::table::Table;
use crate::tools::table::{TableInfoTool, TableRowsTool, TableStatsTool};
use crate::tools::ToolSet;

/// Routing descriptions, one per dataset, carried over from the original
/// deployment's tool declarations.
pub fn dataset_description(dataset: Dataset) -> &'static str {
    match dataset {
        Dataset::Cats => {
            "Provides detailed answers about cat breeds, including age, weight, color, \
             and gender, based on the cats dataset."
        }
        Dataset::Dogs => {
            "Enables queries about various dog breeds from around the world, offering \
             insights into breed specifics."
        }
        Dataset::SleepPatterns => {
            "Analyzes and responds to queries on student sleep patterns, including sleep \
             duration, study hours, screen time, and more."
        }
        Dataset::HealthyFoods => {
            "Answers questions related to nutritional values, origin, and health benefits \
             of the 100 healthiest foods, focusing on aspects like calories, protein \
             content, fiber, and vitamins."
        }
    }
}

/// A question-answering agent bound to one read-only CSV dataset.
///
/// The table is loaded once at construction; a missing or malformed file
/// fails the factory, which is startup-fatal for the whole registry.
pub struct TabularAgent {
    runner: AgentRunner,
}

impl TabularAgent {
    pub fn new(
        dataset: Dataset,
        csv_path: &Path,
        config: &Config,
        models: &ModelPool,
    ) -> Result<Self> {
        let table = Arc::new(Table::load(dataset.label(), csv_path)?);
        info!(
            "Loaded dataset '{}': {} rows, {} columns",
            table.name(),
            table.row_count(),
            table.columns().len()
        );

        let preamble = build_preamble(&table);

        let mut tools = ToolSet::new();
        tools.register(Box::new(TableInfoTool::new(table.clone())));
        tools.register(Box::new(TableRowsTool::new(table.clone())));
        tools.register(Box::new(TableStatsTool::new(table)));

        let model = models.get(ModelTier::Tabular);
        let defaults = &config.agents.defaults;
        let runner = AgentRunner::new(
            model.handle.clone(),
            model.name.clone(),
            preamble,
            tools,
            defaults.max_tool_iterations as usize,
            defaults.temperature as f64,
            defaults.max_tokens as u64,
        );

        Ok(Self { runner })
    }
}

fn build_preamble(table: &Table) -> String {
    format!(
        "You are a data analyst answering questions about a dataset of {}.\n\
         Columns: {}\n\
         Rows: {}\n\n\
         Use the table tools to look at the data before answering; base every \
         answer on what the tools return, not on prior knowledge. If the dataset \
         cannot answer the question, say so.",
        table.name(),
        table.schema_line(),
        table.row_count()
    )
}

#[async_trait]
impl Agent for TabularAgent {
    async fn answer(&self, question: &str) -> Result<String> {
        self.runner.run(question).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_preamble_embeds_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cats.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "Breed,Weight").unwrap();
        writeln!(f, "Persian,4.5").unwrap();
        drop(f);

        let table = Table::load("cat breeds", &path).unwrap();
        let preamble = build_preamble(&table);
        assert!(preamble.contains("dataset of cat breeds"));
        assert!(preamble.contains("Breed (text)"));
        assert!(preamble.contains("Weight (numeric)"));
        assert!(preamble.contains("Rows: 1"));
    }

    #[test]
    fn test_descriptions_cover_all_datasets() {
        for dataset in Dataset::ALL {
            assert!(!dataset_description(dataset).is_empty());
        }
    }
}
