use std::collections::{BTreeSet, HashSet};

use crate::config::SearchConfig;
use crate::model::AttributeRecord;

/// Column name for the object's own name.
pub const OBJECT_NAME_COLUMN: &str = "Object Name";
/// Column name for the source file's name.
pub const MODEL_NAME_COLUMN: &str = "Model Name";
/// Column name for the source file's ancestor path.
pub const MODEL_PATH_COLUMN: &str = "Model Path";

/// The final rectangular report.
///
/// Every row has exactly one value (possibly empty) per column. `columns`
/// is computed once from the full record set and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ReportTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Flatten attribute records into a single table.
///
/// Columns are the configured base columns first, in user-chosen order,
/// followed by every attribute name discovered in the records that is not
/// already a base column, sorted lexicographically. This keeps the column
/// sequence reproducible for any ordering of the same input records, and a
/// record missing an attribute contributes an empty value rather than
/// shifting its row.
pub fn assemble(records: &[AttributeRecord], cfg: &SearchConfig) -> ReportTable {
    let mut columns: Vec<String> = Vec::new();
    for name in &cfg.base_column_order {
        if !columns.contains(name) {
            columns.push(name.clone());
        }
    }

    let base: HashSet<&str> = columns.iter().map(String::as_str).collect();
    let mut discovered = BTreeSet::new();
    for record in records {
        for name in record.attributes.keys() {
            if !base.contains(name.as_str()) {
                discovered.insert(name.clone());
            }
        }
    }
    columns.extend(discovered);

    let rows = records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|column| value_for(record, column))
                .collect()
        })
        .collect();

    ReportTable { columns, rows }
}

fn value_for(record: &AttributeRecord, column: &str) -> String {
    match column {
        OBJECT_NAME_COLUMN => record.object_name.clone(),
        MODEL_NAME_COLUMN => record.source_file.name.clone(),
        MODEL_PATH_COLUMN => record.source_file.path_string(),
        _ => record
            .attributes
            .get(column)
            .map(|value| value.to_string())
            .unwrap_or_default(),
    }
}
