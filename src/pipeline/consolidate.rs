// src/pipeline/consolidate.rs

//! Merging persisted records into aggregate JSON and CSV.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::Context;
use super::resume::RECORD_EXTENSION;
use crate::error::{AppError, Result};
use crate::models::Category;
use crate::storage::{RecordStorage, read_json, write_json};
use crate::utils::{csv, flatten::flatten};

/// Rectangular rendering of a set of records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Flatten every record and pad missing fields with `placeholder`.
    pub fn from_values(values: &[Value], placeholder: &str) -> Self {
        let flat: Vec<BTreeMap<String, String>> = values.iter().map(flatten).collect();
        let headers = schema(&flat);
        let rows = flat
            .iter()
            .map(|record| {
                headers
                    .iter()
                    .map(|h| record.get(h).cloned().unwrap_or_else(|| placeholder.to_string()))
                    .collect()
            })
            .collect();
        Self { headers, rows }
    }

    pub fn to_csv(&self) -> Result<Vec<u8>> {
        csv::render(&self.headers, &self.rows)
    }
}

/// Union of all keys, grouped by their first dotted segment.
///
/// Groups are sorted, and keys are sorted within each group.
pub fn schema(records: &[BTreeMap<String, String>]) -> Vec<String> {
    let keys: BTreeSet<&str> = records
        .iter()
        .flat_map(|r| r.keys().map(String::as_str))
        .collect();

    let mut keys: Vec<&str> = keys.into_iter().collect();
    keys.sort_by(|a, b| group_key(a).cmp(&group_key(b)));
    keys.into_iter().map(str::to_string).collect()
}

fn group_key(key: &str) -> (&str, &str) {
    key.split_once('.').unwrap_or((key, ""))
}

/// Outcome of consolidating a category.
#[derive(Debug, Clone, Serialize)]
pub struct ConsolidationSummary {
    pub category: Category,
    pub records: usize,
    /// Files that could not be parsed and were left out
    pub skipped: usize,
    pub columns: usize,
    pub json_key: String,
    pub csv_key: String,
    pub generated_at: DateTime<Utc>,
}

/// Read every persisted record of a category and write the aggregates.
pub async fn run_consolidate(ctx: &Context<'_>, category: Category) -> Result<ConsolidationSummary> {
    let dir = ctx.layout.record_dir(category);
    let names = ctx.storage.list_files(&dir, RECORD_EXTENSION).await?;
    log::info!("Consolidating {} {} records", names.len(), category.label());

    let (records, skipped) = load_records(ctx.storage, &dir, &names).await?;

    let json_key = ctx.layout.aggregate_json(category);
    write_json(ctx.storage, &json_key, &records).await?;

    let table = Table::from_values(&records, &ctx.config.export.placeholder);
    let csv_key = ctx.layout.aggregate_csv(category);
    ctx.storage.write_bytes(&csv_key, &table.to_csv()?).await?;

    log::info!(
        "Wrote {} records with {} columns to {}",
        records.len(),
        table.headers.len(),
        ctx.display_path(&csv_key).display()
    );

    Ok(ConsolidationSummary {
        category,
        records: records.len(),
        skipped,
        columns: table.headers.len(),
        json_key,
        csv_key,
        generated_at: Utc::now(),
    })
}

async fn load_records(
    storage: &dyn RecordStorage,
    dir: &str,
    names: &[String],
) -> Result<(Vec<Value>, usize)> {
    let mut records = Vec::with_capacity(names.len());
    let mut skipped = 0;
    for name in names {
        let key = format!("{dir}/{name}");
        match read_json::<_, Value>(storage, &key).await {
            Ok(Some(value)) => records.push(value),
            Ok(None) => {}
            Err(AppError::Json(e)) => {
                skipped += 1;
                log::warn!("Skipping unreadable record {key}: {e}");
            }
            Err(e) => return Err(e),
        }
    }
    Ok((records, skipped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_union_schema_pads_missing_cells() {
        let records = vec![
            json!({ "a": "1", "b": "2" }),
            json!({ "a": "3", "c": "4" }),
            json!({ "b": "5" }),
        ];

        let table = Table::from_values(&records, "N/A");
        assert_eq!(table.headers, vec!["a", "b", "c"]);
        assert_eq!(
            table.rows,
            vec![
                vec!["1", "2", "N/A"],
                vec!["3", "N/A", "4"],
                vec!["N/A", "5", "N/A"],
            ]
        );
        assert!(table.rows.iter().all(|r| r.len() == table.headers.len()));
    }

    #[test]
    fn test_schema_groups_by_prefix() {
        let records = vec![json!({
            "firm_list": { "name": "x", "url": "u" },
            "firm-notes": "n",
            "firm_details": { "Status": "s" },
            "firm": { "b": "1" }
        })];
        let table = Table::from_values(&records, "N/A");
        assert_eq!(
            table.headers,
            vec![
                "firm.b",
                "firm-notes",
                "firm_details.Status",
                "firm_list.name",
                "firm_list.url"
            ]
        );
    }

    #[test]
    fn test_empty_value_is_not_replaced() {
        let table = Table::from_values(&[json!({ "a": "" })], "N/A");
        assert_eq!(table.rows, vec![vec![""]]);
    }
}
