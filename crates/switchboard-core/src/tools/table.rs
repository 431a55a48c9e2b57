use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::table::{Table, FILTER_OPS};

use super::Tool;

const DEFAULT_ROW_LIMIT: usize = 25;
const MAX_ROW_LIMIT: usize = 200;
const GROUP_TOP: usize = 20;

/// Reports the dataset's shape: columns, kinds, row count, sample rows.
pub struct TableInfoTool {
    table: Arc<Table>,
}

impl TableInfoTool {
    pub fn new(table: Arc<Table>) -> Self {
        Self { table }
    }
}

#[async_trait]
impl Tool for TableInfoTool {
    fn name(&self) -> &str {
        "table_info"
    }

    fn description(&self) -> &str {
        "Describe the dataset: column names with their kinds (numeric or text), \
         total row count, and the first few rows."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _params: serde_json::Value) -> Result<String> {
        Ok(format!(
            "Dataset: {}\nColumns: {}\nRows: {}\n\nSample:\n{}",
            self.table.name(),
            self.table.schema_line(),
            self.table.row_count(),
            self.table.preview(5)
        ))
    }
}

/// Lists rows matching a single column filter.
pub struct TableRowsTool {
    table: Arc<Table>,
}

impl TableRowsTool {
    pub fn new(table: Arc<Table>) -> Self {
        Self { table }
    }
}

#[async_trait]
impl Tool for TableRowsTool {
    fn name(&self) -> &str {
        "table_rows"
    }

    fn description(&self) -> &str {
        "Return rows where a column matches a condition. Ordering operators \
         (gt, lt, ge, le) compare numerically and only work on numeric columns."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "column": {
                    "type": "string",
                    "description": "Column to filter on"
                },
                "op": {
                    "type": "string",
                    "enum": FILTER_OPS,
                    "description": "Comparison operator"
                },
                "value": {
                    "type": "string",
                    "description": "Value to compare against"
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum rows to return (default 25)"
                }
            },
            "required": ["column", "op", "value"]
        })
    }

    async fn execute(&self, params: serde_json::Value) -> Result<String> {
        let column = params
            .get("column")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow::anyhow!("missing required parameter: column"))?;
        let op = params
            .get("op")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow::anyhow!("missing required parameter: op"))?;
        let value = params
            .get("value")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow::anyhow!("missing required parameter: value"))?;
        let limit = params
            .get("limit")
            .and_then(|v| v.as_u64())
            .map(|n| (n as usize).min(MAX_ROW_LIMIT))
            .unwrap_or(DEFAULT_ROW_LIMIT);

        let rows = match self.table.rows_where(column, op, value, limit) {
            Ok(r) => r,
            Err(e) => return Ok(format!("Error: {e}")),
        };
        if rows.is_empty() {
            return Ok("(no matching rows)".to_string());
        }

        let mut out = self.table.columns().join(" | ");
        for row in &rows {
            out.push('\n');
            out.push_str(&row.join(" | "));
        }
        out.push_str(&format!("\n({} rows shown)", rows.len()));
        Ok(out)
    }
}

/// Summarises a column: numeric stats or value counts.
pub struct TableStatsTool {
    table: Arc<Table>,
}

impl TableStatsTool {
    pub fn new(table: Arc<Table>) -> Self {
        Self { table }
    }
}

#[async_trait]
impl Tool for TableStatsTool {
    fn name(&self) -> &str {
        "table_stats"
    }

    fn description(&self) -> &str {
        "Summarise one column. Numeric columns get count/min/max/mean; text \
         columns get the most frequent values with counts."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "column": {
                    "type": "string",
                    "description": "Column to summarise"
                }
            },
            "required": ["column"]
        })
    }

    async fn execute(&self, params: serde_json::Value) -> Result<String> {
        let column = params
            .get("column")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow::anyhow!("missing required parameter: column"))?;

        let col = match self.table.column_index(column) {
            Some(c) => c,
            None => {
                return Ok(format!(
                    "Error: no column '{column}' (available: {})",
                    self.table.columns().join(", ")
                ))
            }
        };

        if self.table.is_numeric(col) {
            let s = match self.table.stats(column) {
                Ok(s) => s,
                Err(e) => return Ok(format!("Error: {e}")),
            };
            Ok(format!(
                "{column}: count={} min={} max={} mean={:.4}",
                s.count, s.min, s.max, s.mean
            ))
        } else {
            let groups = match self.table.group_counts(column, GROUP_TOP) {
                Ok(g) => g,
                Err(e) => return Ok(format!("Error: {e}")),
            };
            let lines: Vec<String> = groups
                .iter()
                .map(|(value, count)| format!("{value}: {count}"))
                .collect();
            Ok(format!("{column} value counts:\n{}", lines.join("\n")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::Path;

    fn load_table(dir: &tempfile::TempDir) -> Arc<Table> {
        let path = dir.path().join("foods.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "Food,Calories,Origin").unwrap();
        writeln!(f, "Kale,49,Greece").unwrap();
        writeln!(f, "Salmon,208,Norway").unwrap();
        writeln!(f, "Lentils,116,Egypt").unwrap();
        writeln!(f, "Feta,264,Greece").unwrap();
        drop(f);
        Arc::new(Table::load("foods", Path::new(&path)).unwrap())
    }

    #[tokio::test]
    async fn test_info_reports_shape() {
        let dir = tempfile::tempdir().unwrap();
        let tool = TableInfoTool::new(load_table(&dir));
        let out = tool.execute(serde_json::json!({})).await.unwrap();
        assert!(out.contains("Dataset: foods"));
        assert!(out.contains("Calories (numeric)"));
        assert!(out.contains("Rows: 4"));
        assert!(out.contains("Kale"));
    }

    #[tokio::test]
    async fn test_rows_filter() {
        let dir = tempfile::tempdir().unwrap();
        let tool = TableRowsTool::new(load_table(&dir));
        let out = tool
            .execute(serde_json::json!({
                "column": "Origin", "op": "eq", "value": "greece"
            }))
            .await
            .unwrap();
        assert!(out.contains("Kale"));
        assert!(out.contains("Feta"));
        assert!(out.contains("(2 rows shown)"));
    }

    #[tokio::test]
    async fn test_rows_unknown_column_is_model_error() {
        let dir = tempfile::tempdir().unwrap();
        let tool = TableRowsTool::new(load_table(&dir));
        let out = tool
            .execute(serde_json::json!({
                "column": "Taste", "op": "eq", "value": "good"
            }))
            .await
            .unwrap();
        assert!(out.starts_with("Error:"));
    }

    #[tokio::test]
    async fn test_stats_numeric() {
        let dir = tempfile::tempdir().unwrap();
        let tool = TableStatsTool::new(load_table(&dir));
        let out = tool
            .execute(serde_json::json!({"column": "Calories"}))
            .await
            .unwrap();
        assert!(out.contains("count=4"));
        assert!(out.contains("min=49"));
        assert!(out.contains("max=264"));
    }

    #[tokio::test]
    async fn test_stats_text_counts() {
        let dir = tempfile::tempdir().unwrap();
        let tool = TableStatsTool::new(load_table(&dir));
        let out = tool
            .execute(serde_json::json!({"column": "Origin"}))
            .await
            .unwrap();
        assert!(out.contains("Greece: 2"));
    }
}
