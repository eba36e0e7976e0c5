use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;

use datarepo_core::caps::domain::caps::Caps;
use datarepo_core::shared::record::{Record, RecordData};
use datarepo_core::shared::source_config::SourceConfig;
use datarepo_core::source::domain::record_source::RecordSource;
use datarepo_core::source::infrastructure::data_repo_source::DataRepoSource;

/// Reads records from a data repository file and prints a summary of each.
#[derive(Parser)]
#[command(name = "datarepo-cat")]
struct Cli {
    /// Data file, or image sequence pattern such as `frame_%04d.png`.
    location: String,

    /// Caps describing the stored data, e.g. `audio/x-raw,format=S16LE,rate=8000,channels=2`.
    #[arg(long)]
    caps: String,

    /// JSON config file; command line flags take precedence.
    #[arg(long)]
    config: Option<PathBuf>,

    /// First image index of a sequence.
    #[arg(long)]
    start_index: Option<u32>,

    /// Last image index of a sequence (inclusive).
    #[arg(long)]
    stop_index: Option<u32>,

    /// Record size for text and octet streams.
    #[arg(long)]
    blocksize: Option<usize>,

    /// Read at most this many tensor slots per record.
    #[arg(long)]
    tensor_slot_limit: Option<usize>,

    /// Stop after this many records.
    #[arg(long)]
    max_records: Option<usize>,

    /// Write record payloads, concatenated, to this file.
    #[arg(long)]
    dump: Option<PathBuf>,

    /// Do not print per-record summaries.
    #[arg(long)]
    quiet: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;
    let caps: Caps = cli.caps.parse()?;

    let mut source = DataRepoSource::with_config(config);
    let info = source.set_caps(&caps)?;
    log::debug!("Resolved {} schema {:?}", info.kind, info.schema);

    let mut dump = match &cli.dump {
        Some(path) => Some(BufWriter::new(File::create(path)?)),
        None => None,
    };

    source.start()?;
    let result = drain(&mut source, &cli, dump.as_mut());
    source.stop();
    let (records, bytes) = result?;

    if let Some(mut writer) = dump {
        writer.flush()?;
    }
    log::info!("Read {records} records, {bytes} bytes");
    Ok(())
}

fn drain(
    source: &mut DataRepoSource,
    cli: &Cli,
    mut dump: Option<&mut BufWriter<File>>,
) -> Result<(u64, u64), Box<dyn std::error::Error>> {
    let limit = cli.max_records.unwrap_or(usize::MAX);
    let mut records = 0;
    let mut bytes = 0;

    for record in source.records().take(limit) {
        let record = record?;
        if !cli.quiet {
            println!("{}", summarize(&record));
        }
        if let Some(writer) = dump.as_mut() {
            for block in record.blocks() {
                writer.write_all(block)?;
            }
        }
        records += 1;
        bytes += record.len() as u64;
    }
    Ok((records, bytes))
}

fn build_config(cli: &Cli) -> Result<SourceConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => SourceConfig::load(path)?,
        None => SourceConfig::default(),
    };
    config.location = Some(cli.location.clone());
    if let Some(index) = cli.start_index {
        config.start_frame_index = index;
    }
    if cli.stop_index.is_some() {
        config.stop_frame_index = cli.stop_index;
    }
    if cli.blocksize.is_some() {
        config.blocksize = cli.blocksize;
    }
    if cli.tensor_slot_limit.is_some() {
        config.tensor_slot_limit = cli.tensor_slot_limit;
    }
    config.validate()?;
    Ok(config)
}

fn summarize(record: &Record) -> String {
    match record.data() {
        RecordData::Block(data) => format!("#{} {} bytes", record.index(), data.len()),
        RecordData::Tensors(blocks) => {
            let sizes: Vec<String> = blocks.iter().map(|b| b.len().to_string()).collect();
            format!(
                "#{} {} bytes [{}]",
                record.index(),
                record.len(),
                sizes.join(", ")
            )
        }
    }
}
