use anyhow::{Context, Result};
use log::info;

use crate::{cli::PreviewArgs, io_utils, parser, printable_delimiter, table};

pub fn execute(args: &PreviewArgs) -> Result<()> {
    let options = &args.options;
    let mut config = options.to_config()?;
    config.max_rows = Some(config.max_rows.map_or(args.rows, |limit| limit.min(args.rows)));
    let encoding = io_utils::resolve_encoding(options.input_encoding.as_deref())?;
    let text = io_utils::read_input_text(&options.input, encoding)?;

    let output = parser::parse_text(&text, &config)
        .with_context(|| format!("Parsing {:?}", options.input))?;
    print!("{}", table::render_rows(output.columns.names(), &output.rows));
    info!(
        "Displayed {} row(s) from {:?} (delimiter '{}')",
        output.row_count(),
        options.input,
        printable_delimiter(config.delimiter)
    );
    Ok(())
}
