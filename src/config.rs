//! Parse configuration: defaults, validation, and file loading.
//!
//! A [`ParseConfig`] can be deserialized from the camelCase keys used on the
//! worker wire (`maxRows`, `sampleRate`, `enableTypeDetection`, …). Config
//! files are read as YAML, which also accepts plain JSON.

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{error::ParseError, tokenizer::Dialect};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParseConfig {
    /// Ceiling on accepted rows; `None` means unlimited.
    pub max_rows: Option<usize>,
    /// Fraction of data rows to keep, in `0.0..=1.0`.
    pub sample_rate: f64,
    pub enable_type_detection: bool,
    pub enable_compression: bool,
    pub delimiter: char,
    pub quote: char,
    pub escape: char,
}

impl Default for ParseConfig {
    fn default() -> Self {
        let dialect = Dialect::default();
        Self {
            max_rows: None,
            sample_rate: 1.0,
            enable_type_detection: true,
            enable_compression: false,
            delimiter: dialect.delimiter,
            quote: dialect.quote,
            escape: dialect.escape,
        }
    }
}

impl ParseConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening config file {path:?}"))?;
        let config: ParseConfig = serde_yaml::from_reader(BufReader::new(file))
            .with_context(|| format!("Parsing config file {path:?}"))?;
        Ok(config)
    }

    pub fn dialect(&self) -> Dialect {
        Dialect {
            delimiter: self.delimiter,
            quote: self.quote,
            escape: self.escape,
        }
    }

    pub fn validate(&self) -> Result<(), ParseError> {
        if !self.sample_rate.is_finite() || !(0.0..=1.0).contains(&self.sample_rate) {
            return Err(ParseError::invalid_config(format!(
                "sampleRate must be between 0 and 1 (got {})",
                self.sample_rate
            )));
        }
        if self.delimiter == self.quote {
            return Err(ParseError::invalid_config(format!(
                "delimiter and quote must differ (both '{}')",
                self.delimiter.escape_debug()
            )));
        }
        if self.delimiter == '\n' || self.quote == '\n' {
            return Err(ParseError::invalid_config(
                "newline cannot be used as a delimiter or quote",
            ));
        }
        if self.escape != self.quote && self.escape == self.delimiter {
            return Err(ParseError::invalid_config(format!(
                "escape and delimiter must differ (both '{}')",
                self.escape.escape_debug()
            )));
        }
        Ok(())
    }

    /// Number of data rows a parse over `total_data_rows` lines will target.
    pub fn target_rows(&self, total_data_rows: usize) -> usize {
        let sampled = (total_data_rows as f64 * self.sample_rate).floor() as usize;
        match self.max_rows {
            Some(limit) => sampled.min(limit),
            None => sampled,
        }
    }

    /// Fixed stride between visited lines.
    pub fn step(&self, total_data_rows: usize, target_rows: usize) -> usize {
        if self.sample_rate >= 1.0 || target_rows == 0 {
            1
        } else {
            (total_data_rows / target_rows).max(1)
        }
    }
}
