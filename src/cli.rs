use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::{config::ParseConfig, io_utils};

#[derive(Debug, Parser)]
#[command(author, version, about = "Parse delimited text into typed rows", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Parse a file on a worker thread and emit the result message as JSON
    Parse(ParseArgs),
    /// Preview the first few typed rows in a formatted table
    Preview(PreviewArgs),
    /// Show the values that recur in at least 10% of rows for each column
    Summary(SummaryArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ParseOptions {
    /// Input file to parse (`-` reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// YAML or JSON file with parse settings (camelCase keys)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Maximum number of rows to keep
    #[arg(long = "max-rows")]
    pub max_rows: Option<usize>,
    /// Fraction of data rows to keep, between 0 and 1
    #[arg(long = "sample-rate", value_parser = parse_sample_rate)]
    pub sample_rate: Option<f64>,
    /// Keep every field as text instead of inferring types
    #[arg(long = "no-type-detection")]
    pub no_type_detection: bool,
    /// Field delimiter (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<char>,
    /// Quote character
    #[arg(long, value_parser = parse_char)]
    pub quote: Option<char>,
    /// Escape character used inside quotes (defaults to the quote character)
    #[arg(long, value_parser = parse_char)]
    pub escape: Option<char>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

impl ParseOptions {
    /// Loads the config file, if any, then applies flag overrides.
    pub fn to_config(&self) -> Result<ParseConfig> {
        let mut config = match &self.config {
            Some(path) => ParseConfig::load(path)?,
            None => ParseConfig::default(),
        };
        if let Some(max_rows) = self.max_rows {
            config.max_rows = Some(max_rows);
        }
        if let Some(rate) = self.sample_rate {
            config.sample_rate = rate;
        }
        if self.no_type_detection {
            config.enable_type_detection = false;
        }
        if self.config.is_none() || self.delimiter.is_some() {
            config.delimiter =
                io_utils::resolve_input_delimiter(&self.input, self.delimiter, config.delimiter);
        }
        if let Some(quote) = self.quote {
            config.quote = quote;
            config.escape = self.escape.unwrap_or(quote);
        } else if let Some(escape) = self.escape {
            config.escape = escape;
        }
        Ok(config)
    }
}

#[derive(Debug, Args)]
pub struct ParseArgs {
    #[command(flatten)]
    pub options: ParseOptions,
    /// Output JSON file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Attach a summary of frequently recurring values
    #[arg(long)]
    pub compress: bool,
    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub options: ParseOptions,
    /// Number of rows to display
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
}

#[derive(Debug, Args)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub options: ParseOptions,
}

pub fn parse_delimiter(value: &str) -> Result<char, String> {
    match value {
        "tab" | "\\t" => Ok('\t'),
        "comma" => Ok(','),
        "pipe" => Ok('|'),
        "semicolon" => Ok(';'),
        other => parse_char(other),
    }
}

pub fn parse_char(value: &str) -> Result<char, String> {
    let mut chars = value.chars();
    let first = chars
        .next()
        .ok_or_else(|| "Value cannot be empty".to_string())?;
    if chars.next().is_some() {
        return Err("Value must be a single character".to_string());
    }
    if first == '\n' || first == '\r' {
        return Err("Line breaks cannot be used here".to_string());
    }
    Ok(first)
}

fn parse_sample_rate(value: &str) -> Result<f64, String> {
    let rate: f64 = value
        .parse()
        .map_err(|_| format!("'{value}' is not a number"))?;
    if !(0.0..=1.0).contains(&rate) {
        return Err("Sample rate must be between 0 and 1".to_string());
    }
    Ok(rate)
}
