use std::path::Path;

use anyhow::{Context, Result};

/// In-memory, read-only view of one CSV dataset.
///
/// Loaded once at startup and never mutated. Column kinds are inferred
/// (a column is numeric when every non-empty cell parses as f64), which is
/// all the query tools need.
pub struct Table {
    name: String,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    numeric: Vec<bool>,
}

/// Summary statistics for one numeric column.
#[derive(Debug, PartialEq)]
pub struct ColumnStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Comparison operators accepted by `rows_where`.
pub const FILTER_OPS: &[&str] = &["eq", "ne", "contains", "gt", "lt", "ge", "le"];

impl Table {
    /// Load a CSV file. Fails if the file is missing, unreadable, or has no
    /// header row — a startup-fatal condition for the owning agent.
    pub fn load(name: &str, path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("failed to open dataset '{}'", path.display()))?;

        let headers: Vec<String> = reader
            .headers()
            .with_context(|| format!("failed to read header row of '{}'", path.display()))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        if headers.is_empty() {
            anyhow::bail!("dataset '{}' has no columns", path.display());
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record =
                record.with_context(|| format!("malformed row in '{}'", path.display()))?;
            let mut row: Vec<String> = record.iter().map(|c| c.trim().to_string()).collect();
            row.resize(headers.len(), String::new());
            rows.push(row);
        }

        let numeric = (0..headers.len())
            .map(|col| {
                let mut any = false;
                for row in &rows {
                    let cell = &row[col];
                    if cell.is_empty() {
                        continue;
                    }
                    if cell.parse::<f64>().is_err() {
                        return false;
                    }
                    any = true;
                }
                any
            })
            .collect();

        Ok(Self {
            name: name.to_string(),
            headers,
            rows,
            numeric,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_numeric(&self, col: usize) -> bool {
        self.numeric.get(col).copied().unwrap_or(false)
    }

    /// Case-insensitive column lookup.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name.trim()))
    }

    /// Column list with inferred kinds, for agent prompts and `table_info`.
    pub fn schema_line(&self) -> String {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                if self.numeric[i] {
                    format!("{h} (numeric)")
                } else {
                    format!("{h} (text)")
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// First `n` rows rendered as pipe-separated lines, header first.
    pub fn preview(&self, n: usize) -> String {
        let mut out = self.headers.join(" | ");
        for row in self.rows.iter().take(n) {
            out.push('\n');
            out.push_str(&row.join(" | "));
        }
        out
    }

    /// Rows where `column <op> value` holds, capped at `limit`.
    ///
    /// Numeric columns compare numerically for the ordering operators;
    /// `eq`/`ne`/`contains` compare case-insensitive text everywhere.
    pub fn rows_where(
        &self,
        column: &str,
        op: &str,
        value: &str,
        limit: usize,
    ) -> Result<Vec<&Vec<String>>> {
        let col = self
            .column_index(column)
            .with_context(|| format!("no column '{column}' in {}", self.name))?;

        let wanted_num = value.parse::<f64>().ok();
        let matches = |cell: &str| -> bool {
            match op {
                "eq" => cell.eq_ignore_ascii_case(value),
                "ne" => !cell.eq_ignore_ascii_case(value),
                "contains" => cell.to_lowercase().contains(&value.to_lowercase()),
                "gt" | "lt" | "ge" | "le" => {
                    let (Some(want), Ok(have)) = (wanted_num, cell.parse::<f64>()) else {
                        return false;
                    };
                    match op {
                        "gt" => have > want,
                        "lt" => have < want,
                        "ge" => have >= want,
                        _ => have <= want,
                    }
                }
                _ => false,
            }
        };

        if !FILTER_OPS.contains(&op) {
            anyhow::bail!("unknown filter op '{op}' (expected one of {FILTER_OPS:?})");
        }

        Ok(self
            .rows
            .iter()
            .filter(|row| matches(&row[col]))
            .take(limit)
            .collect())
    }

    /// count/min/max/mean over the non-empty cells of a numeric column.
    pub fn stats(&self, column: &str) -> Result<ColumnStats> {
        let col = self
            .column_index(column)
            .with_context(|| format!("no column '{column}' in {}", self.name))?;
        if !self.numeric[col] {
            anyhow::bail!("column '{column}' is not numeric");
        }

        let values: Vec<f64> = self
            .rows
            .iter()
            .filter_map(|row| row[col].parse::<f64>().ok())
            .collect();
        if values.is_empty() {
            anyhow::bail!("column '{column}' has no values");
        }

        let count = values.len();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / count as f64;
        Ok(ColumnStats {
            count,
            min,
            max,
            mean,
        })
    }

    /// Distinct values of a column with occurrence counts, most frequent
    /// first, capped at `top`.
    pub fn group_counts(&self, column: &str, top: usize) -> Result<Vec<(String, usize)>> {
        let col = self
            .column_index(column)
            .with_context(|| format!("no column '{column}' in {}", self.name))?;

        let mut counts: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();
        for row in &self.rows {
            let cell = row[col].as_str();
            if !cell.is_empty() {
                *counts.entry(cell).or_insert(0) += 1;
            }
        }

        let mut pairs: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        pairs.truncate(top);
        Ok(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn cats_table() -> (tempfile::TempDir, Table) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cats.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "Breed,Age,Weight,Color").unwrap();
        writeln!(f, "Persian,3,4.5,White").unwrap();
        writeln!(f, "Siamese,5,3.8,Cream").unwrap();
        writeln!(f, "Maine Coon,2,8.2,Brown").unwrap();
        writeln!(f, "Persian,7,5.1,Grey").unwrap();
        drop(f);
        let table = Table::load("cats", &path).unwrap();
        (dir, table)
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(Table::load("x", Path::new("/nonexistent/x.csv")).is_err());
    }

    #[test]
    fn test_headers_and_rows() {
        let (_dir, t) = cats_table();
        assert_eq!(t.columns(), &["Breed", "Age", "Weight", "Color"]);
        assert_eq!(t.row_count(), 4);
    }

    #[test]
    fn test_numeric_detection() {
        let (_dir, t) = cats_table();
        assert!(!t.is_numeric(0));
        assert!(t.is_numeric(1));
        assert!(t.is_numeric(2));
        assert!(!t.is_numeric(3));
        assert!(t.schema_line().contains("Age (numeric)"));
        assert!(t.schema_line().contains("Breed (text)"));
    }

    #[test]
    fn test_column_lookup_case_insensitive() {
        let (_dir, t) = cats_table();
        assert_eq!(t.column_index("weight"), Some(2));
        assert_eq!(t.column_index(" BREED "), Some(0));
        assert_eq!(t.column_index("tail"), None);
    }

    #[test]
    fn test_rows_where_eq() {
        let (_dir, t) = cats_table();
        let rows = t.rows_where("Breed", "eq", "persian", 10).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_rows_where_numeric_ordering() {
        let (_dir, t) = cats_table();
        let rows = t.rows_where("Weight", "gt", "4.6", 10).unwrap();
        assert_eq!(rows.len(), 2);
        let rows = t.rows_where("Age", "le", "3", 10).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_rows_where_limit() {
        let (_dir, t) = cats_table();
        let rows = t.rows_where("Age", "gt", "0", 2).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_rows_where_bad_op() {
        let (_dir, t) = cats_table();
        assert!(t.rows_where("Age", "between", "1", 10).is_err());
    }

    #[test]
    fn test_stats() {
        let (_dir, t) = cats_table();
        let s = t.stats("Age").unwrap();
        assert_eq!(s.count, 4);
        assert_eq!(s.min, 2.0);
        assert_eq!(s.max, 7.0);
        assert!((s.mean - 4.25).abs() < 1e-9);
    }

    #[test]
    fn test_stats_rejects_text_column() {
        let (_dir, t) = cats_table();
        assert!(t.stats("Breed").is_err());
    }

    #[test]
    fn test_group_counts() {
        let (_dir, t) = cats_table();
        let groups = t.group_counts("Breed", 10).unwrap();
        assert_eq!(groups[0], ("Persian".to_string(), 2));
        assert_eq!(groups.len(), 3);
    }

    #[test]
    fn test_preview() {
        let (_dir, t) = cats_table();
        let p = t.preview(1);
        assert!(p.starts_with("Breed | Age | Weight | Color"));
        assert!(p.contains("Persian | 3 | 4.5 | White"));
        assert_eq!(p.lines().count(), 2);
    }
}
