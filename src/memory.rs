//! Rough in-memory size estimate for a parsed row set.
//!
//! The estimate serializes a bounded sample and extrapolates. It is a
//! diagnostics figure only.

use log::debug;

use crate::rows::Row;

const SAMPLE_ROWS: usize = 100;
const FALLBACK_BYTES_PER_ROW: usize = 100;
const OVERHEAD_FACTOR: f64 = 2.0;

pub fn estimate_memory_usage(rows: &[Row]) -> usize {
    if rows.is_empty() {
        return 0;
    }
    let sample = &rows[..rows.len().min(SAMPLE_ROWS)];
    match serde_json::to_string(sample) {
        Ok(serialized) => {
            let avg_row_bytes = serialized.len() as f64 / sample.len() as f64;
            (avg_row_bytes * rows.len() as f64 * OVERHEAD_FACTOR).round() as usize
        }
        Err(err) => {
            debug!("Falling back to fixed per-row estimate: {err}");
            rows.len() * FALLBACK_BYTES_PER_ROW
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::rows::{Columns, build_row};

    #[test]
    fn empty_rows_cost_nothing() {
        assert_eq!(estimate_memory_usage(&[]), 0);
    }

    #[test]
    fn extrapolates_from_the_sample() {
        let columns = Arc::new(Columns::from_headers(&["n".to_string()]));
        let rows = (0..250)
            .map(|_| build_row(&columns, &["7".to_string()], true))
            .collect::<Vec<_>>();
        // sample of 100 rows serializes to `[{"n":7},...]`: 7 bytes per row
        // plus 99 commas and 2 brackets
        let sample_len = 100 * 7 + 99 + 2;
        let expected = (sample_len as f64 / 100.0 * 250.0 * 2.0).round() as usize;
        assert_eq!(estimate_memory_usage(&rows), expected);
    }
}
