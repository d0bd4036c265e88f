//! Typed rows keyed by header name.
//!
//! The column set is derived once from the header line and shared by every
//! [`Row`] of a parse through an [`Arc`]. Each row stores its values
//! positionally and serializes as a JSON object in column order.

use std::sync::Arc;

use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::{infer::infer_value, value::Value};

/// Distinct column names plus the mapping from header field to column.
///
/// A repeated header name refers to the column at its first position, so a
/// later field with the same name overwrites the earlier value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Columns {
    names: Vec<String>,
    slots: Vec<usize>,
}

impl Columns {
    pub fn from_headers(headers: &[String]) -> Self {
        let mut names: Vec<String> = Vec::with_capacity(headers.len());
        let mut slots = Vec::with_capacity(headers.len());
        for header in headers {
            let slot = match names.iter().position(|name| name == header) {
                Some(existing) => existing,
                None => {
                    names.push(header.clone());
                    names.len() - 1
                }
            };
            slots.push(slot);
        }
        Self { names, slots }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|candidate| candidate == name)
    }
}

/// Builds a row from tokenized fields.
///
/// Missing trailing fields become empty strings and extra fields are
/// ignored. With inference enabled every field, empty ones included, goes
/// through [`infer_value`]; otherwise fields are kept as text.
pub fn build_row(columns: &Arc<Columns>, fields: &[String], infer_types: bool) -> Row {
    let mut values = vec![Value::Null; columns.len()];
    for (field_idx, &slot) in columns.slots.iter().enumerate() {
        let raw = fields.get(field_idx).map(String::as_str).unwrap_or("");
        values[slot] = if infer_types {
            infer_value(raw)
        } else {
            Value::Text(raw.to_string())
        };
    }
    Row {
        columns: Arc::clone(columns),
        values,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<Columns>,
    values: Vec<Value>,
}

impl Row {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns
            .index_of(name)
            .and_then(|idx| self.values.get(idx))
    }

    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    pub fn display_cells(&self) -> Vec<String> {
        self.values.iter().map(Value::as_display).collect()
    }
}

impl Serialize for Row {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Arc<Columns> {
        let owned = names.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Arc::new(Columns::from_headers(&owned))
    }

    fn fields(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn missing_fields_become_empty() {
        let columns = headers(&["stop", "violations", "note"]);
        let row = build_row(&columns, &fields(&["Main St", "12"]), false);
        assert_eq!(row.get("note"), Some(&Value::from("")));

        let typed = build_row(&columns, &fields(&["Main St", "12"]), true);
        assert_eq!(typed.get("violations"), Some(&Value::Integer(12)));
        assert_eq!(typed.get("note"), Some(&Value::Null));
    }

    #[test]
    fn extra_fields_are_ignored() {
        let columns = headers(&["a"]);
        let row = build_row(&columns, &fields(&["1", "2", "3"]), true);
        assert_eq!(row.len(), 1);
        assert_eq!(row.get("a"), Some(&Value::Integer(1)));
    }

    #[test]
    fn duplicate_headers_keep_first_position_last_value() {
        let columns = headers(&["id", "name", "id"]);
        assert_eq!(columns.len(), 2);
        let row = build_row(&columns, &fields(&["1", "bus", "2"]), true);
        let json = serde_json::to_string(&row).expect("serialize");
        assert_eq!(json, r#"{"id":2,"name":"bus"}"#);
    }

    #[test]
    fn serializes_in_column_order() {
        let columns = headers(&["z", "a", "m"]);
        let row = build_row(&columns, &fields(&["true", "1.5", ""]), true);
        let json = serde_json::to_string(&row).expect("serialize");
        assert_eq!(json, r#"{"z":true,"a":1.5,"m":null}"#);
        assert_eq!(row.display_cells(), vec!["true", "1.5", ""]);
    }
}
