use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::FieldError;

/// Placement of a value inside its fixed-width slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Value first, filler on the right.
    #[default]
    Left,
    /// Filler first, value on the right.
    Right,
    /// Filler split around the value; an odd remainder goes right.
    Center,
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alignment::Left => write!(f, "left"),
            Alignment::Right => write!(f, "right"),
            Alignment::Center => write!(f, "center"),
        }
    }
}

/// Pads `text` with `filler` to exactly `width` characters.
///
/// Widths are counted in `char`s, so multi-byte content and fillers occupy one
/// column each. Text longer than `width` is rejected rather than truncated.
pub fn format(
    text: &str,
    width: usize,
    alignment: Alignment,
    filler: char,
) -> Result<String, FieldError> {
    let len = text.chars().count();
    if len > width {
        return Err(FieldError::LengthExceeded { width, len });
    }
    let diff = width - len;
    let (before, after) = match alignment {
        Alignment::Left => (0, diff),
        Alignment::Right => (diff, 0),
        Alignment::Center => (diff / 2, diff - diff / 2),
    };

    let mut out = String::with_capacity(text.len() + diff * filler.len_utf8());
    out.extend(std::iter::repeat_n(filler, before));
    out.push_str(text);
    out.extend(std::iter::repeat_n(filler, after));
    Ok(out)
}

/// Formats an already-encoded number. Leading-zero mode overrides the
/// alignment: the value is right-aligned and padded with `'0'`.
pub fn format_number(
    text: &str,
    width: usize,
    leading_zeroes: bool,
    alignment: Alignment,
) -> Result<String, FieldError> {
    if leading_zeroes {
        format(text, width, Alignment::Right, '0')
    } else {
        format(text, width, alignment, ' ')
    }
}
