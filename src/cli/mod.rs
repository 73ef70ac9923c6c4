//! Command-line interface wiring for the `fixedrec` binary.
//!
//! This module owns the clap definitions and delegates execution to
//! specialized submodules that encapsulate each command family.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod common;
pub mod overpunch;
pub mod records;
pub mod schema;
pub mod utils;

/// Parsed CLI entrypoint for the `fixedrec` binary.
#[derive(Parser, Debug)]
#[command(name = "fixedrec", version, about = "Fixed-width record codec with signed overpunch")]
pub struct Cli {
    /// Settings file (JSON) with alignment, decimal places and leading zeroes.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Log skipped optional fields and other diagnostics to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(flatten)]
    pub overrides: common::SettingsArgs,
    /// Top-level command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// High-level command families made available to end users.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode flat lines into JSON objects.
    Decode(records::DecodeArgs),
    /// Encode JSON objects into flat lines.
    Encode(records::EncodeArgs),
    #[command(subcommand)]
    Overpunch(overpunch::OverpunchCommand),
    #[command(subcommand)]
    Schema(schema::SchemaCommand),
}

/// Execute the requested command.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Decode(args) => {
            let codec = common::build_codec(cli.config.as_deref(), &cli.overrides)?;
            records::decode(&codec, args)
        }
        Command::Encode(args) => {
            let codec = common::build_codec(cli.config.as_deref(), &cli.overrides)?;
            records::encode(&codec, args)
        }
        Command::Overpunch(cmd) => {
            let codec = common::build_codec(cli.config.as_deref(), &cli.overrides)?;
            overpunch::handle(&codec, cmd)
        }
        Command::Schema(cmd) => schema::handle(cmd),
    }
}
