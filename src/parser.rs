//! Row builder: header detection, sampling, row ceiling, and progress.
//!
//! The whole text is held in memory and split on `\n` before tokenization.
//! Line 0 is the header. Data lines are visited with a fixed stride derived
//! from the sample rate until the target row count is reached or the input
//! runs out. Blank lines are skipped without consuming a slot, and a line
//! that fails to tokenize is logged and skipped.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use log::{debug, warn};
use serde::{Serialize, Serializer, ser::SerializeStruct};

use crate::{
    compression::{CompressionSummary, summarize},
    config::ParseConfig,
    error::{ParseError, Result},
    rows::{Columns, Row, build_row},
    tokenizer::split_fields,
};

/// Accepted-row interval between progress events.
pub const PROGRESS_INTERVAL: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressEvent {
    pub processed: usize,
    pub total: usize,
    pub percentage: f64,
}

impl ProgressEvent {
    fn new(processed: usize, total: usize) -> Self {
        Self {
            processed,
            total,
            percentage: processed as f64 / total as f64 * 100.0,
        }
    }
}

/// Cooperative cancellation flag, checked once per visited line.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutput {
    pub columns: Arc<Columns>,
    pub rows: Vec<Row>,
    /// Present when compression was requested and at least one row was kept.
    pub compression_summary: Option<CompressionSummary>,
}

impl ParseOutput {
    fn empty(columns: Arc<Columns>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            compression_summary: None,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Columns of the first row, or zero when nothing was accepted.
    pub fn column_count(&self) -> usize {
        self.rows.first().map(Row::len).unwrap_or(0)
    }
}

impl Serialize for ParseOutput {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match &self.compression_summary {
            None => self.rows.serialize(serializer),
            Some(summary) => {
                let mut state = serializer.serialize_struct("ParseResult", 2)?;
                state.serialize_field("rows", &self.rows)?;
                state.serialize_field("compressionSummary", summary)?;
                state.end()
            }
        }
    }
}

pub fn parse_text(text: &str, config: &ParseConfig) -> Result<ParseOutput> {
    parse_text_with(text, config, &CancelToken::new(), |_| {})
}

/// Parses `text`, reporting progress every [`PROGRESS_INTERVAL`] accepted
/// rows and stopping with [`ParseError::Cancelled`] once `cancel` is set.
pub fn parse_text_with<F>(
    text: &str,
    config: &ParseConfig,
    cancel: &CancelToken,
    mut on_progress: F,
) -> Result<ParseOutput>
where
    F: FnMut(ProgressEvent),
{
    config.validate()?;

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::MissingHeader);
    }
    let lines = trimmed.split('\n').collect::<Vec<_>>();
    let dialect = config.dialect();

    let headers =
        split_fields(lines[0], &dialect).map_err(|source| ParseError::MalformedHeader { source })?;
    let columns = Arc::new(Columns::from_headers(&headers));

    let total_data_rows = lines.len() - 1;
    let target_rows = config.target_rows(total_data_rows);
    if target_rows == 0 {
        debug!("No rows targeted from {total_data_rows} data line(s)");
        return Ok(ParseOutput::empty(columns));
    }
    let step = config.step(total_data_rows, target_rows);
    debug!(
        "Sampling {target_rows} of {total_data_rows} data line(s) with stride {step} across {} column(s)",
        columns.len()
    );

    let mut rows = Vec::with_capacity(target_rows);
    let mut skipped = 0usize;
    for line_idx in (1..lines.len()).step_by(step) {
        if rows.len() >= target_rows {
            break;
        }
        if cancel.is_cancelled() {
            return Err(ParseError::Cancelled {
                processed: rows.len(),
            });
        }
        let line = lines[line_idx];
        if line.trim().is_empty() {
            continue;
        }
        match split_fields(line, &dialect) {
            Ok(fields) => {
                rows.push(build_row(&columns, &fields, config.enable_type_detection));
                if rows.len() % PROGRESS_INTERVAL == 0 {
                    on_progress(ProgressEvent::new(rows.len(), target_rows));
                }
            }
            Err(err) => {
                skipped += 1;
                warn!("Error parsing line {line_idx}: {err}");
            }
        }
    }
    if skipped > 0 {
        debug!("Skipped {skipped} malformed line(s)");
    }

    let compression_summary = (config.enable_compression && !rows.is_empty())
        .then(|| summarize(&columns, &rows));

    Ok(ParseOutput {
        columns,
        rows,
        compression_summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn blank_lines_do_not_consume_slots() {
        let text = "id\n1\n\n   \n2\n3";
        let config = ParseConfig {
            max_rows: Some(2),
            ..ParseConfig::default()
        };
        let output = parse_text(text, &config).expect("parse");
        let ids = output
            .rows
            .iter()
            .map(|row| row.get("id").cloned())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![Some(Value::Integer(1)), Some(Value::Integer(2))]);
    }

    #[test]
    fn carriage_returns_are_trimmed() {
        let output = parse_text("a,b\r\n1,x\r\n", &ParseConfig::default()).expect("parse");
        assert_eq!(output.columns.names(), ["a", "b"]);
        assert_eq!(output.rows[0].get("b"), Some(&Value::from("x")));
    }

    #[test]
    fn header_only_input_is_empty_not_an_error() {
        let output = parse_text("a,b,c", &ParseConfig::default()).expect("parse");
        assert_eq!(output.row_count(), 0);
        assert_eq!(output.column_count(), 0);
        assert_eq!(output.columns.len(), 3);
    }

    #[test]
    fn whitespace_input_has_no_header() {
        let err = parse_text(" \n\t\n", &ParseConfig::default()).unwrap_err();
        assert!(matches!(err, ParseError::MissingHeader));
    }

    #[test]
    fn malformed_header_is_catastrophic() {
        let err = parse_text("a,\"b\n1,2", &ParseConfig::default()).unwrap_err();
        assert!(matches!(err, ParseError::MalformedHeader { .. }));
    }

    #[test]
    fn serializes_plain_rows_without_summary() {
        let output = parse_text("a\n1", &ParseConfig::default()).expect("parse");
        assert_eq!(serde_json::to_string(&output).unwrap(), r#"[{"a":1}]"#);

        let config = ParseConfig {
            enable_compression: true,
            ..ParseConfig::default()
        };
        let output = parse_text("a\n1", &config).expect("parse");
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["rows"][0]["a"], 1);
        assert_eq!(json["compressionSummary"]["commonValues"]["a"][0]["value"], "1");
    }

    #[test]
    fn pre_cancelled_token_aborts() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = parse_text_with("a\n1\n2", &ParseConfig::default(), &cancel, |_| {})
            .unwrap_err();
        assert!(matches!(err, ParseError::Cancelled { processed: 0 }));
    }
}
