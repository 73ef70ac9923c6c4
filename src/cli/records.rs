//! Record conversion (`fixedrec decode ...`, `fixedrec encode ...`).

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use fixedrec::{Codec, DynamicRecord};
use serde_json::Value;

use crate::cli::utils::{load_schema, read_input};

/// Arguments for `fixedrec decode`.
#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Built-in schema name or path to a schema JSON file.
    #[arg(long)]
    pub schema: String,
    /// Read records from file (`-` for stdin).
    #[arg(long = "from")]
    pub from: Option<PathBuf>,
    /// Ignore lines that are empty or only whitespace.
    #[arg(long)]
    pub skip_blank: bool,
}

/// Arguments for `fixedrec encode`.
#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Built-in schema name or path to a schema JSON file.
    #[arg(long)]
    pub schema: String,
    /// Read JSON lines from file (`-` for stdin).
    #[arg(long = "from")]
    pub from: Option<PathBuf>,
}

pub fn decode(codec: &Codec, args: DecodeArgs) -> Result<()> {
    let layout = load_schema(&args.schema)?.compile()?;
    let input = read_input(args.from)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (index, line) in input.lines().enumerate() {
        if args.skip_blank && line.trim().is_empty() {
            continue;
        }
        let record = codec
            .decode_with(&layout, line)
            .with_context(|| format!("line {}", index + 1))?;
        serde_json::to_writer(&mut out, &record)?;
        writeln!(out)?;
    }
    Ok(())
}

pub fn encode(codec: &Codec, args: EncodeArgs) -> Result<()> {
    let layout = load_schema(&args.schema)?.compile()?;
    let input = read_input(args.from)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (index, line) in input.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(line)
            .with_context(|| format!("line {}: invalid JSON", index + 1))?;
        let line = DynamicRecord::try_from(value)
            .and_then(|record| codec.encode_with(&layout, &record))
            .with_context(|| format!("line {}", index + 1))?;
        writeln!(out, "{line}")?;
    }
    Ok(())
}
