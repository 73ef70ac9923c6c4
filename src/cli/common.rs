//! Shared clap helper types for CLI commands.

use std::path::Path;

use anyhow::Result;
use clap::{Args, ValueEnum};
use fixedrec::{Alignment, Codec, Settings};

/// Alignment flags accepted by CLI commands.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum AlignmentArg {
    Left,
    Right,
    Center,
}

impl From<AlignmentArg> for Alignment {
    fn from(value: AlignmentArg) -> Alignment {
        match value {
            AlignmentArg::Left => Alignment::Left,
            AlignmentArg::Right => Alignment::Right,
            AlignmentArg::Center => Alignment::Center,
        }
    }
}

/// Command-line overrides applied on top of the settings file.
#[derive(Args, Debug, Default)]
pub struct SettingsArgs {
    /// Default alignment for fields without an `align` annotation.
    #[arg(long, global = true, value_enum)]
    pub align: Option<AlignmentArg>,
    /// Default scale for `overpunch` when `--decimals` is not given.
    #[arg(long, global = true)]
    pub decimal_places: Option<usize>,
    /// Pad numbers with spaces instead of leading zeroes.
    #[arg(long, global = true)]
    pub no_leading_zeroes: bool,
}

impl SettingsArgs {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(align) = self.align {
            settings.alignment = align.into();
        }
        if let Some(decimal_places) = self.decimal_places {
            settings.decimal_places = decimal_places;
        }
        if self.no_leading_zeroes {
            settings.leading_zeroes = false;
        }
    }
}

/// Resolve settings from an optional file plus flag overrides.
pub fn build_codec(config: Option<&Path>, overrides: &SettingsArgs) -> Result<Codec> {
    let mut settings = match config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    overrides.apply(&mut settings);
    tracing::debug!(?settings, "resolved settings");
    Ok(Codec::new(settings))
}
