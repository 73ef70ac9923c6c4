//! Per-field layout descriptors parsed from annotation strings.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::align::Alignment;
use crate::error::LayoutError;

/// `range` end value meaning "through the end of the record".
pub const END_OF_RECORD: i64 = -1;

/// Raw annotation strings attached to a field. Empty means absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldTags {
    /// `"<from>,<to>"`, half-open; `to` may be `-1`.
    pub range: String,
    /// `left` or `right`.
    pub align: String,
    /// Implied decimal places for numeric fields.
    pub decimals: String,
    /// Comma-separated flag tokens.
    pub flags: String,
}

impl FieldTags {
    pub fn range(range: impl Into<String>) -> Self {
        Self {
            range: range.into(),
            ..Self::default()
        }
    }
}

/// Behaviour switches from the `flags` annotation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldFlags {
    /// Any failure on this field skips it instead of failing the record.
    pub optional: bool,
    /// Per-field override of the leading-zero setting for numbers.
    pub zero_fill: Option<bool>,
}

impl FieldFlags {
    /// Parses a comma list of flag tokens. Unknown tokens are ignored.
    pub fn parse(tag: &str) -> Self {
        let mut flags = Self::default();
        for token in tag.split(',').map(str::trim) {
            match token {
                "optional" => flags.optional = true,
                "zerofill" => flags.zero_fill = Some(true),
                "nozerofill" => flags.zero_fill = Some(false),
                _ => {}
            }
        }
        flags
    }
}

impl fmt::Display for FieldFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "optional:{}", self.optional)?;
        if let Some(zero_fill) = self.zero_fill {
            write!(f, ",zerofill:{zero_fill}")?;
        }
        Ok(())
    }
}

/// Resolved character range of a field within one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub from: usize,
    pub to: usize,
}

/// Parsed layout of one field: range, alignment, scale and flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLayout {
    pub from: i64,
    pub to: i64,
    pub align: Option<Alignment>,
    pub decimals: Option<usize>,
    pub flags: FieldFlags,
}

impl FieldLayout {
    /// Parses all annotations of a field.
    ///
    /// Returns [`LayoutError::TagEmpty`] when there is no `range`, which callers
    /// treat as "not a layout field" rather than as a failure.
    pub fn parse(tags: &FieldTags) -> Result<Self, LayoutError> {
        let flags = FieldFlags::parse(&tags.flags);
        let (from, to) = parse_range(&tags.range)?;
        Ok(Self {
            from,
            to,
            align: parse_align(&tags.align)?,
            decimals: parse_decimals(&tags.decimals)?,
            flags,
        })
    }

    /// Resolves the range against a record of `len` characters.
    pub fn validate(&self, len: usize) -> Result<Span, LayoutError> {
        if len == 0 {
            return Err(LayoutError::InvalidUpperBound(len));
        }
        if self.from < 0 {
            return Err(LayoutError::InvalidRangeValues(self.range_string()));
        }
        let to = if self.to == END_OF_RECORD {
            len as i64
        } else {
            self.to
        };
        if to > len as i64 {
            return Err(LayoutError::RangeTooLarge {
                to: to as usize,
                len,
            });
        }
        if to <= self.from {
            return Err(LayoutError::InefectualRange {
                from: self.from,
                to: self.to,
            });
        }
        Ok(Span {
            from: self.from as usize,
            to: to as usize,
        })
    }

    /// Structural checks when no record length is known yet (encoding).
    ///
    /// Returns the start offset and, unless the field runs to the end of the
    /// record, its width.
    pub fn placement(&self) -> Result<(usize, Option<usize>), LayoutError> {
        if self.from < 0 {
            return Err(LayoutError::InvalidRangeValues(self.range_string()));
        }
        if self.to == END_OF_RECORD {
            return Ok((self.from as usize, None));
        }
        if self.to <= self.from {
            return Err(LayoutError::InefectualRange {
                from: self.from,
                to: self.to,
            });
        }
        Ok((self.from as usize, Some((self.to - self.from) as usize)))
    }

    /// Decimal places used for overpunch conversion.
    pub fn scale(&self) -> usize {
        self.decimals.unwrap_or(0)
    }

    fn range_string(&self) -> String {
        format!("{},{}", self.from, self.to)
    }
}

impl fmt::Display for FieldLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "range:{},{}", self.from, self.to)?;
        if let Some(align) = self.align {
            write!(f, " align:{align}")?;
        }
        if let Some(decimals) = self.decimals {
            write!(f, " decimals:{decimals}")?;
        }
        write!(f, " flags:{}", self.flags)
    }
}

fn parse_range(tag: &str) -> Result<(i64, i64), LayoutError> {
    let tag = tag.trim();
    if tag.is_empty() {
        return Err(LayoutError::TagEmpty);
    }
    let parts: Vec<&str> = tag.split(',').map(str::trim).collect();
    let [from, to] = parts.as_slice() else {
        return Err(LayoutError::InvalidRangeValues(tag.to_string()));
    };
    let from: i64 = from
        .parse()
        .map_err(|_| LayoutError::InvalidRangeValues(tag.to_string()))?;
    let to: i64 = to
        .parse()
        .map_err(|_| LayoutError::InvalidRangeValues(tag.to_string()))?;
    Ok((from, to))
}

fn parse_align(tag: &str) -> Result<Option<Alignment>, LayoutError> {
    match tag.trim() {
        "" => Ok(None),
        "left" => Ok(Some(Alignment::Left)),
        "right" => Ok(Some(Alignment::Right)),
        other => Err(LayoutError::InvalidAlignType(other.to_string())),
    }
}

fn parse_decimals(tag: &str) -> Result<Option<usize>, LayoutError> {
    let tag = tag.trim();
    if tag.is_empty() {
        return Ok(None);
    }
    tag.parse()
        .map(Some)
        .map_err(|_| LayoutError::InvalidDecimals(tag.to_string()))
}
