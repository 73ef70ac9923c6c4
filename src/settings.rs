use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::align::Alignment;

/// Defaults consulted when a field leaves a formatting choice unset.
///
/// Settings are read-only once handed to a [`Codec`](crate::Codec).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Alignment for fields without an `align` annotation.
    pub alignment: Alignment,
    /// Scale used by the overpunch command when `--decimals` is not given.
    pub decimal_places: usize,
    /// Right-align numbers and pad them with `'0'`.
    pub leading_zeroes: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            alignment: Alignment::Left,
            decimal_places: 2,
            leading_zeroes: true,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file; missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse settings in {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_json_keeps_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"alignment":"right"}"#).unwrap();
        assert_eq!(
            settings,
            Settings {
                alignment: Alignment::Right,
                ..Settings::default()
            }
        );
    }

    #[test]
    fn rejects_unknown_alignment() {
        assert!(serde_json::from_str::<Settings>(r#"{"alignment":"justify"}"#).is_err());
    }
}
