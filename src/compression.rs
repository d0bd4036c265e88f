//! Advisory summary of frequently recurring values per column.
//!
//! The summary never rewrites rows; consumers that want the space savings
//! apply it themselves.

use std::collections::HashMap;

use itertools::Itertools;
use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::rows::{Columns, Row};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommonValue {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionSummary {
    pub enabled: bool,
    /// Columns with at least one common value, in column order.
    #[serde(serialize_with = "serialize_common_values")]
    pub common_values: Vec<(String, Vec<CommonValue>)>,
    pub original_size: usize,
    pub compression_ratio: f64,
}

impl CompressionSummary {
    pub fn for_column(&self, name: &str) -> Option<&[CommonValue]> {
        self.common_values
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, values)| values.as_slice())
    }

    /// Flattens the summary into `column, value, count, percent` rows.
    pub fn table_rows(&self) -> Vec<Vec<String>> {
        let total = self.original_size.max(1) as f64;
        self.common_values
            .iter()
            .flat_map(|(column, values)| {
                values.iter().map(move |entry| {
                    let percent = entry.count as f64 / total * 100.0;
                    vec![
                        column.clone(),
                        entry.value.clone(),
                        entry.count.to_string(),
                        format!("{percent:.2}%"),
                    ]
                })
            })
            .collect()
    }
}

/// Counts each column's non-null values by display string and keeps those
/// seen in at least `floor(rows * 0.1)` rows.
pub fn summarize(columns: &Columns, rows: &[Row]) -> CompressionSummary {
    let threshold = rows.len() / 10;
    let mut counts: Vec<HashMap<String, usize>> = vec![HashMap::new(); columns.len()];

    for row in rows {
        for (idx, value) in row.values().iter().enumerate() {
            if value.is_null() {
                continue;
            }
            if let Some(counter) = counts.get_mut(idx) {
                *counter.entry(value.as_display()).or_insert(0) += 1;
            }
        }
    }

    let common_values = columns
        .names()
        .iter()
        .zip(counts)
        .filter_map(|(name, counter)| {
            let common = counter
                .into_iter()
                .filter(|(_, count)| *count >= threshold)
                .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
                .map(|(value, count)| CommonValue { value, count })
                .collect::<Vec<_>>();
            (!common.is_empty()).then(|| (name.clone(), common))
        })
        .collect::<Vec<_>>();

    let compression_ratio = if columns.is_empty() {
        0.0
    } else {
        common_values.len() as f64 / columns.len() as f64
    };

    CompressionSummary {
        enabled: true,
        common_values,
        original_size: rows.len(),
        compression_ratio,
    }
}

fn serialize_common_values<S>(
    entries: &[(String, Vec<CommonValue>)],
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(entries.len()))?;
    for (column, values) in entries {
        map.serialize_entry(column, values)?;
    }
    map.end()
}
