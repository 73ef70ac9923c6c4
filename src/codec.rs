//! Walks a [`RecordLayout`] to turn lines into records and back.

use std::iter;

use tracing::{debug, trace};

use crate::align;
use crate::error::{CodecError, FieldError, LayoutError};
use crate::layout::FieldLayout;
use crate::overpunch;
use crate::record::{FieldEntry, FieldKind, Record, RecordLayout};
use crate::settings::Settings;

/// Fixed-width encoder and decoder bound to one set of [`Settings`].
#[derive(Debug, Clone, Default)]
pub struct Codec {
    settings: Settings,
}

impl Codec {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Decodes one line into a fresh `T`.
    pub fn decode<T: Record + Default>(&self, line: &str) -> Result<T, CodecError> {
        self.decode_with(T::layout(), line)
    }

    /// Decodes one line using an explicit layout.
    ///
    /// Fields outside the layout keep their `Default` value, as do optional
    /// fields that fail.
    pub fn decode_with<T: Default>(
        &self,
        layout: &RecordLayout<T>,
        line: &str,
    ) -> Result<T, CodecError> {
        let chars: Vec<char> = line.chars().collect();
        let mut record = T::default();
        self.decode_fields(layout, &chars, &mut record)?;
        trace!(len = chars.len(), fields = layout.len(), "decoded record");
        Ok(record)
    }

    /// Fills `target` from `line`. Nested records receive the same line, so
    /// every range is relative to the start of the outermost record.
    pub(crate) fn decode_fields<T>(
        &self,
        layout: &RecordLayout<T>,
        line: &[char],
        target: &mut T,
    ) -> Result<(), CodecError> {
        for entry in layout.fields() {
            if let FieldKind::Nested(nested) = entry.kind() {
                nested.decode(self, line, target)?;
                continue;
            }

            let field_layout = match entry.layout() {
                Ok(field_layout) => field_layout,
                Err(LayoutError::TagEmpty) => continue,
                Err(err) => {
                    let err = FieldError::from(err.clone());
                    if skip_optional(entry, &err) {
                        continue;
                    }
                    return Err(entry.error(err));
                }
            };

            let result = field_layout
                .validate(line.len())
                .map_err(FieldError::from)
                .and_then(|span| {
                    let raw: String = line[span.from..span.to].iter().collect();
                    self.assign(entry.kind(), field_layout, raw.trim(), target)
                });
            if let Err(err) = result {
                if skip_optional(entry, &err) {
                    continue;
                }
                return Err(entry.error(err));
            }
        }
        Ok(())
    }

    fn assign<T>(
        &self,
        kind: &FieldKind<T>,
        layout: &FieldLayout,
        raw: &str,
        target: &mut T,
    ) -> Result<(), FieldError> {
        match kind {
            FieldKind::Scalar(field) if field.kind().is_numeric() => {
                field.assign(target, &overpunch::decode(raw, layout.scale()))
            }
            FieldKind::Scalar(field) => field.assign(target, raw),
            FieldKind::Custom(field) => field.assign(target, raw).map_err(FieldError::Custom),
            FieldKind::Nested(_) => Err(FieldError::UnsupportedFieldKind("nested".into())),
        }
    }

    /// Encodes `record` into one line.
    pub fn encode<T: Record>(&self, record: &T) -> Result<String, CodecError> {
        self.encode_with(T::layout(), record)
    }

    /// Encodes `record` using an explicit layout.
    ///
    /// Fields are written in ascending start order regardless of declaration
    /// order; gaps are filled with spaces and the line ends where the last
    /// field ends. An open-ended field (`to == -1`) takes the width of its
    /// value and must be the last field written.
    pub fn encode_with<T>(&self, layout: &RecordLayout<T>, record: &T) -> Result<String, CodecError> {
        let mut pending = Vec::new();
        collect_fields(layout, record, &mut pending)?;
        pending.sort_by_key(|field| field.from);

        let mut line = String::new();
        let mut last = 0;
        let mut open_ended = false;
        for Pending {
            name,
            layout,
            from,
            width,
            value,
        } in pending
        {
            // Nothing may follow a field that runs to the end of the record.
            if from < last || open_ended {
                return Err(CodecError::OverlappingField {
                    field: name.to_string(),
                    from,
                    last,
                });
            }

            let text = match value.and_then(|value| self.format_value(layout, value, width)) {
                Ok(text) => text,
                Err(err) if layout.flags.optional => {
                    debug!(field = name, error = %err, "skipping optional field");
                    continue;
                }
                Err(FieldError::LengthExceeded { width, len }) => {
                    return Err(CodecError::FieldTooLong {
                        field: name.to_string(),
                        width,
                        actual: len,
                    });
                }
                Err(source) => {
                    return Err(CodecError::Field {
                        field: name.to_string(),
                        layout: layout.to_string(),
                        source,
                    });
                }
            };

            line.extend(iter::repeat_n(' ', from - last));
            line.push_str(&text);
            last = from + text.chars().count();
            open_ended = width.is_none();
        }
        trace!(len = last, "encoded record");
        Ok(line)
    }

    fn format_value(
        &self,
        layout: &FieldLayout,
        value: RawValue,
        width: Option<usize>,
    ) -> Result<String, FieldError> {
        let alignment = layout.align.unwrap_or(self.settings.alignment);
        match value {
            RawValue::Number(plain) => {
                let encoded = overpunch::encode(&plain, layout.scale());
                let width = width.unwrap_or_else(|| encoded.chars().count());
                let zero_fill = layout.flags.zero_fill.unwrap_or(self.settings.leading_zeroes);
                align::format_number(&encoded, width, zero_fill, alignment)
            }
            RawValue::Text(text) => {
                let width = width.unwrap_or_else(|| text.chars().count());
                align::format(&text, width, alignment, ' ')
            }
        }
    }
}

fn skip_optional<T>(entry: &FieldEntry<T>, err: &FieldError) -> bool {
    if entry.flags().optional {
        debug!(field = entry.name(), error = %err, "skipping optional field");
        true
    } else {
        false
    }
}

/// Plain rendering of a field before overpunch and alignment.
pub(crate) enum RawValue {
    Number(String),
    Text(String),
}

/// A field waiting to be written, flattened out of any nesting.
pub(crate) struct Pending<'a> {
    name: &'a str,
    layout: &'a FieldLayout,
    from: usize,
    width: Option<usize>,
    value: Result<RawValue, FieldError>,
}

/// Gathers the writable fields of `record`. Rendering failures are kept on
/// the pending entry so they surface in position order.
pub(crate) fn collect_fields<'a, T>(
    layout: &'a RecordLayout<T>,
    record: &'a T,
    out: &mut Vec<Pending<'a>>,
) -> Result<(), CodecError> {
    for entry in layout.fields() {
        let kind = entry.kind();
        if let FieldKind::Nested(nested) = kind {
            nested.collect(record, out)?;
            continue;
        }

        let placed = entry
            .layout()
            .map_err(Clone::clone)
            .and_then(|field_layout| Ok((field_layout, field_layout.placement()?)));
        let (field_layout, (from, width)) = match placed {
            Ok(placed) => placed,
            Err(LayoutError::TagEmpty) => continue,
            Err(err) => {
                let err = FieldError::from(err);
                if skip_optional(entry, &err) {
                    continue;
                }
                return Err(entry.error(err));
            }
        };

        let value = match kind {
            FieldKind::Scalar(field) => field.render(record).map(|plain| {
                if field.kind().is_numeric() {
                    RawValue::Number(plain)
                } else {
                    RawValue::Text(plain)
                }
            }),
            FieldKind::Custom(field) => field
                .render(record)
                .map(RawValue::Text)
                .map_err(FieldError::Custom),
            FieldKind::Nested(_) => Err(FieldError::UnsupportedFieldKind("nested".into())),
        };

        out.push(Pending {
            name: entry.name(),
            layout: field_layout,
            from,
            width,
            value,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::Alignment;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Default, PartialEq)]
    struct Inner {
        a: String,
        b: i64,
        c: f64,
    }

    crate::record!(Inner {
        a: scalar { range = "0,1" },
        b: scalar { range = "2,3" },
        c: scalar,
    });

    #[derive(Debug, Default, PartialEq)]
    struct Outer {
        nested: Inner,
        empty: String,
    }

    crate::record!(Outer {
        nested: nested,
        empty: scalar,
    });

    #[derive(Debug, Default, PartialEq)]
    struct Greeting {
        word: String,
        count: i64,
    }

    crate::record!(Greeting {
        count: scalar { range = "5,10" },
        word: scalar { range = "0,5" },
    });

    #[derive(Debug, Default, PartialEq)]
    struct GreetingInOrder {
        word: String,
        count: i64,
    }

    crate::record!(GreetingInOrder {
        word: scalar { range = "0,5" },
        count: scalar { range = "5,10" },
    });

    #[derive(Debug, Default, PartialEq)]
    struct Overlap {
        first: String,
        second: String,
    }

    crate::record!(Overlap {
        first: scalar { range = "0,5" },
        second: scalar { range = "3,8" },
    });

    #[derive(Debug, Default, PartialEq)]
    struct Amounts {
        id: u32,
        amount: f64,
        active: bool,
        note: String,
    }

    crate::record!(Amounts {
        id: scalar { range = "0,3" },
        amount: scalar { range = "3,10", decimals = "2" },
        active: scalar { range = "10,15" },
        note: scalar { range = "15,25", flags = "optional" },
    });

    #[derive(Debug, Default, PartialEq)]
    struct Rates {
        rate: f64,
        whole: f64,
    }

    crate::record!(Rates {
        rate: scalar { range = "0,6", decimals = "2" },
        whole: scalar { range = "6,12" },
    });

    #[derive(Debug, Default, PartialEq)]
    struct Trailer {
        memo: String,
        code: String,
    }

    crate::record!(Trailer {
        memo: scalar { range = "0,-1" },
        code: scalar { range = "5,8" },
    });

    #[test]
    fn nested_records_share_the_parent_offsets() {
        let outer: Outer = Codec::default().decode("AB2D").unwrap();
        assert_eq!(
            outer,
            Outer {
                nested: Inner {
                    a: "A".into(),
                    b: 2,
                    c: 0.0,
                },
                empty: String::new(),
            }
        );
    }

    #[test]
    fn nested_records_flatten_on_encode() {
        let outer = Outer {
            nested: Inner {
                a: "A".into(),
                b: 7,
                c: 1.5,
            },
            empty: "ignored".into(),
        };
        assert_eq!(Codec::default().encode(&outer).unwrap(), "A 7");
    }

    #[test]
    fn encodes_in_position_order() {
        let codec = Codec::default();
        let greeting = Greeting {
            word: "hello".into(),
            count: 42,
        };
        assert_eq!(codec.encode(&greeting).unwrap(), "hello00042");
        assert_eq!(codec.decode::<Greeting>("hello00042").unwrap(), greeting);

        let in_order = GreetingInOrder {
            word: "hello".into(),
            count: 42,
        };
        assert_eq!(codec.encode(&in_order).unwrap(), codec.encode(&greeting).unwrap());
    }

    #[test]
    fn overlapping_ranges_are_rejected() {
        let err = Codec::default()
            .encode(&Overlap {
                first: "abc".into(),
                second: "def".into(),
            })
            .unwrap_err();
        assert!(matches!(
            err,
            CodecError::OverlappingField { ref field, from: 3, last: 5 } if field == "second"
        ));
    }

    #[test]
    fn fields_after_an_open_ended_field_are_rejected() {
        let err = Codec::default()
            .encode(&Trailer {
                memo: "ab".into(),
                code: "xyz".into(),
            })
            .unwrap_err();
        assert!(matches!(
            err,
            CodecError::OverlappingField { ref field, from: 5, last: 2 } if field == "code"
        ));
    }

    #[test]
    fn overflowing_values_are_rejected() {
        let err = Codec::default()
            .encode(&Greeting {
                word: "salutations".into(),
                count: 1,
            })
            .unwrap_err();
        assert!(matches!(
            err,
            CodecError::FieldTooLong { ref field, width: 5, actual: 11 } if field == "word"
        ));
    }

    #[test]
    fn negative_amounts_use_overpunch() {
        let codec = Codec::default();
        let record = Amounts {
            id: 7,
            amount: -123.42,
            active: true,
            note: "paid".into(),
        };
        let line = codec.encode(&record).unwrap();
        assert_eq!(line, "007001234Ktrue paid      ");
        assert_eq!(codec.decode::<Amounts>(&line).unwrap(), record);
    }

    #[test]
    fn extra_fraction_digits_are_truncated_not_rounded() {
        let codec = Codec::default();
        let rates = Rates {
            rate: 1.239,
            whole: 2.999,
        };
        assert_eq!(codec.encode(&rates).unwrap(), "000123000002");

        let negative = Rates {
            rate: -0.019,
            whole: -4.5,
        };
        assert_eq!(codec.encode(&negative).unwrap(), "00000J00000M");
    }

    #[test]
    fn optional_field_missing_from_short_line() {
        let amounts: Amounts = Codec::default().decode("0070012345T    ").unwrap();
        assert_eq!(amounts.amount, 123.45);
        assert!(amounts.active);
        assert_eq!(amounts.note, "");
    }

    #[test]
    fn required_field_missing_from_short_line() {
        let err = Codec::default().decode::<Amounts>("0070012").unwrap_err();
        assert!(matches!(
            err.field_error(),
            Some(FieldError::Layout(LayoutError::RangeTooLarge { to: 10, len: 7 }))
        ));
        assert_eq!(
            err.to_string(),
            "field amount (range:3,10 decimals:2 flags:optional:false): range end 10 exceeds record length 7"
        );
    }

    #[test]
    fn conversion_failures_name_the_field() {
        let err = Codec::default()
            .decode::<Amounts>("0x70000000false")
            .unwrap_err();
        match err {
            CodecError::Field { field, source, .. } => {
                assert_eq!(field, "id");
                assert!(matches!(source, FieldError::InvalidIntValue(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn settings_drive_unannotated_formatting() {
        let settings = Settings {
            alignment: Alignment::Right,
            decimal_places: 3,
            leading_zeroes: false,
        };
        let codec = Codec::new(settings.clone());
        assert_eq!(codec.settings(), &settings);
        let greeting = Greeting {
            word: "hi".into(),
            count: 42,
        };
        assert_eq!(codec.encode(&greeting).unwrap(), "   hi   42");

        let centered = Codec::new(Settings {
            alignment: Alignment::Center,
            ..Settings::default()
        });
        assert_eq!(centered.encode(&greeting).unwrap(), " hi  00042");
    }

    #[test]
    fn ranges_count_characters() {
        let amounts: Amounts = Codec::default().decode("000000001ütrue ").unwrap();
        assert_eq!(amounts.id, 0);
        assert_eq!(amounts.amount, -0.1);
    }
}
