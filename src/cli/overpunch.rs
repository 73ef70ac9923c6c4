//! Overpunch helpers (`fixedrec overpunch ...`).

use anyhow::Result;
use clap::{Args, Subcommand};
use fixedrec::{overpunch, Codec};

/// Overpunch subcommands.
#[derive(Subcommand, Debug)]
pub enum OverpunchCommand {
    /// Convert an overpunched numeral into a plain decimal.
    Decode(OverpunchArgs),
    /// Convert a plain decimal into its overpunched form.
    Encode(OverpunchArgs),
}

/// Arguments shared by both directions.
#[derive(Args, Debug)]
pub struct OverpunchArgs {
    /// Value to convert.
    #[arg(allow_hyphen_values = true)]
    pub value: String,
    /// Implied decimal places. Defaults to the configured decimal places.
    #[arg(long)]
    pub decimals: Option<usize>,
}

/// Execute an overpunch command.
pub fn handle(codec: &Codec, command: OverpunchCommand) -> Result<()> {
    let scale = |args: &OverpunchArgs| args.decimals.unwrap_or(codec.settings().decimal_places);
    match command {
        OverpunchCommand::Decode(args) => {
            println!("{}", overpunch::decode(&args.value, scale(&args)));
        }
        OverpunchCommand::Encode(args) => {
            println!("{}", overpunch::encode(&args.value, scale(&args)));
        }
    }
    Ok(())
}
