pub mod cli;
pub mod compression;
pub mod config;
pub mod error;
pub mod infer;
pub mod io_utils;
pub mod memory;
pub mod parser;
pub mod preview;
pub mod rows;
pub mod summary;
pub mod table;
pub mod tokenizer;
pub mod value;
pub mod worker;

use std::{env, io::Write, sync::OnceLock};

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    cli::{Cli, Commands},
    worker::{WorkerMessage, WorkerRequest},
};

pub use crate::{
    config::ParseConfig,
    error::ParseError,
    parser::{CancelToken, ParseOutput, ProgressEvent, parse_text, parse_text_with},
    rows::Row,
    value::Value,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("clearlane_csv", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Parse(args) => handle_parse(&args),
        Commands::Preview(args) => preview::execute(&args),
        Commands::Summary(args) => summary::execute(&args),
    }
}

fn handle_parse(args: &cli::ParseArgs) -> Result<()> {
    let options = &args.options;
    let mut config = options.to_config()?;
    if args.compress {
        config.enable_compression = true;
    }
    let encoding = io_utils::resolve_encoding(options.input_encoding.as_deref())?;
    let text = io_utils::read_input_text(&options.input, encoding)?;
    info!(
        "Parsing '{}' with delimiter '{}'",
        options.input.display(),
        printable_delimiter(config.delimiter)
    );
    debug!("Parse config: {config:?}");

    let handle = worker::spawn_parse(WorkerRequest::new(text).with_config(config));
    let terminal = handle.wait(|event| {
        info!(
            "Processed {}/{} row(s) ({:.1}%)",
            event.processed, event.total, event.percentage
        );
    })?;

    match &terminal {
        WorkerMessage::Parsed { metadata, .. } => {
            let mut writer = io_utils::open_output(args.output.as_deref())?;
            if args.pretty {
                serde_json::to_writer_pretty(&mut writer, &terminal)
            } else {
                serde_json::to_writer(&mut writer, &terminal)
            }
            .context("Serializing parse result")?;
            writeln!(writer)?;
            writer.flush()?;
            info!(
                "Parsed {} row(s) across {} column(s) in {:.2} ms",
                metadata.row_count, metadata.column_count, metadata.processing_time_ms
            );
            Ok(())
        }
        WorkerMessage::Error { message, stack } => {
            debug!("{stack}");
            bail!("{message}")
        }
        WorkerMessage::Progress(_) => bail!("Parse worker ended on a progress message"),
    }
}

pub(crate) fn printable_delimiter(delimiter: char) -> String {
    match delimiter {
        '\t' => "\\t".to_string(),
        other => other.to_string(),
    }
}
