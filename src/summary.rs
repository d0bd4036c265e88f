use anyhow::{Context, Result};
use log::info;

use crate::{cli::SummaryArgs, io_utils, parser, table};

pub fn execute(args: &SummaryArgs) -> Result<()> {
    let options = &args.options;
    let mut config = options.to_config()?;
    config.enable_compression = true;
    let encoding = io_utils::resolve_encoding(options.input_encoding.as_deref())?;
    let text = io_utils::read_input_text(&options.input, encoding)?;

    let output = parser::parse_text(&text, &config)
        .with_context(|| format!("Parsing {:?}", options.input))?;
    let Some(summary) = output.compression_summary else {
        info!("No rows accepted from {:?}; nothing to summarize", options.input);
        return Ok(());
    };

    let headers = ["column", "value", "count", "percent"]
        .iter()
        .map(|h| h.to_string())
        .collect::<Vec<_>>();
    table::print_table(&headers, &summary.table_rows());
    info!(
        "{} of {} column(s) have common values across {} row(s) (ratio {:.2})",
        summary.common_values.len(),
        output.columns.len(),
        summary.original_size,
        summary.compression_ratio
    );
    Ok(())
}
