//! Record descriptions: the per-type table of fields the codec walks.
//!
//! A [`RecordLayout`] is an ordered list of named fields. Each field carries
//! its raw annotations, the descriptor parsed from them, and a [`FieldKind`]
//! saying how the value is read from and written to the record:
//!
//! - `Scalar`: integers, floats, text and booleans via the built-in codecs
//! - `Nested`: another [`Record`] sharing the parent's coordinate space
//! - `Custom`: a [`FixedField`] type that converts itself
//!
//! Layouts are built once per type and reused for every record. For plain
//! Rust structs the [`record!`](crate::record!) macro writes the table.

use std::fmt;

use chrono::NaiveDate;

use crate::codec::{self, Codec, Pending};
use crate::error::{BoxError, CodecError, FieldError, LayoutError};
use crate::layout::{FieldFlags, FieldLayout, FieldTags};

/// A type with a fixed-width layout.
pub trait Record: Sized + 'static {
    fn layout() -> &'static RecordLayout<Self>;
}

/// Value category of a scalar field; decides which codec path it takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Integer,
    Float,
    Text,
    Boolean,
}

impl ScalarKind {
    /// Numbers go through the overpunch codec.
    pub fn is_numeric(self) -> bool {
        matches!(self, ScalarKind::Integer | ScalarKind::Float)
    }
}

/// Built-in scalar conversions between plain text and a Rust value.
pub trait Scalar: Sized {
    const KIND: ScalarKind;

    /// Parses the plain (already overpunch-decoded) text.
    fn parse_scalar(text: &str) -> Result<Self, FieldError>;

    /// Renders the value as plain text. Floats keep every fraction digit;
    /// scaling to the field's decimal places happens in the overpunch step.
    fn render_scalar(&self) -> String;
}

macro_rules! integer_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Scalar for $ty {
                const KIND: ScalarKind = ScalarKind::Integer;

                fn parse_scalar(text: &str) -> Result<Self, FieldError> {
                    text.parse().map_err(FieldError::InvalidIntValue)
                }

                fn render_scalar(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

integer_scalar!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! float_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Scalar for $ty {
                const KIND: ScalarKind = ScalarKind::Float;

                fn parse_scalar(text: &str) -> Result<Self, FieldError> {
                    text.parse().map_err(FieldError::InvalidFloatValue)
                }

                fn render_scalar(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

float_scalar!(f32, f64);

impl Scalar for String {
    const KIND: ScalarKind = ScalarKind::Text;

    fn parse_scalar(text: &str) -> Result<Self, FieldError> {
        Ok(text.to_string())
    }

    fn render_scalar(&self) -> String {
        self.clone()
    }
}

impl Scalar for bool {
    const KIND: ScalarKind = ScalarKind::Boolean;

    fn parse_scalar(text: &str) -> Result<Self, FieldError> {
        let canonical = match text {
            "1" | "t" | "T" | "TRUE" | "True" => "true",
            "0" | "f" | "F" | "FALSE" | "False" => "false",
            other => other,
        };
        canonical.parse().map_err(FieldError::InvalidBooleanValue)
    }

    fn render_scalar(&self) -> String {
        self.to_string()
    }
}

/// A field type that owns its fixed-width representation.
///
/// Decoding receives the trimmed slice of the record. The encoded text is
/// still aligned into the field's declared width and checked for overflow.
pub trait FixedField: Sized {
    fn from_fixed(raw: &str) -> Result<Self, BoxError>;
    fn to_fixed(&self) -> Result<String, BoxError>;
}

/// Mainframe dates are written `YYYYMMDD`.
impl FixedField for NaiveDate {
    fn from_fixed(raw: &str) -> Result<Self, BoxError> {
        Ok(NaiveDate::parse_from_str(raw, "%Y%m%d")?)
    }

    fn to_fixed(&self) -> Result<String, BoxError> {
        Ok(self.format("%Y%m%d").to_string())
    }
}

/// A blank slot decodes to `None` and `None` encodes to a blank slot.
impl<F: FixedField> FixedField for Option<F> {
    fn from_fixed(raw: &str) -> Result<Self, BoxError> {
        if raw.is_empty() {
            Ok(None)
        } else {
            F::from_fixed(raw).map(Some)
        }
    }

    fn to_fixed(&self) -> Result<String, BoxError> {
        match self {
            Some(value) => value.to_fixed(),
            None => Ok(String::new()),
        }
    }
}

type AssignFn<T, E> = Box<dyn Fn(&mut T, &str) -> Result<(), E> + Send + Sync>;

/// Accessors for a scalar field.
pub struct ScalarField<T> {
    kind: ScalarKind,
    assign: AssignFn<T, FieldError>,
    render: Box<dyn Fn(&T) -> Result<String, FieldError> + Send + Sync>,
}

impl<T> ScalarField<T> {
    /// `assign` stores plain text into the record; `render` reads the value
    /// back as plain text.
    pub fn new(
        kind: ScalarKind,
        assign: impl Fn(&mut T, &str) -> Result<(), FieldError> + Send + Sync + 'static,
        render: impl Fn(&T) -> Result<String, FieldError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            assign: Box::new(assign),
            render: Box::new(render),
        }
    }

    pub fn kind(&self) -> ScalarKind {
        self.kind
    }

    pub(crate) fn assign(&self, target: &mut T, text: &str) -> Result<(), FieldError> {
        (self.assign)(target, text)
    }

    pub(crate) fn render(&self, record: &T) -> Result<String, FieldError> {
        (self.render)(record)
    }
}

/// Accessors for a self-describing field.
pub struct CustomField<T> {
    assign: AssignFn<T, BoxError>,
    render: Box<dyn Fn(&T) -> Result<String, BoxError> + Send + Sync>,
}

impl<T> CustomField<T> {
    pub fn new(
        assign: impl Fn(&mut T, &str) -> Result<(), BoxError> + Send + Sync + 'static,
        render: impl Fn(&T) -> Result<String, BoxError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            assign: Box::new(assign),
            render: Box::new(render),
        }
    }

    pub(crate) fn assign(&self, target: &mut T, raw: &str) -> Result<(), BoxError> {
        (self.assign)(target, raw)
    }

    pub(crate) fn render(&self, record: &T) -> Result<String, BoxError> {
        (self.render)(record)
    }
}

/// A nested record reached through a pair of getters.
pub struct NestedField<T>(Box<dyn Nest<T>>);

impl<T> NestedField<T> {
    pub(crate) fn decode(
        &self,
        codec: &Codec,
        line: &[char],
        target: &mut T,
    ) -> Result<(), CodecError> {
        self.0.decode(codec, line, target)
    }

    pub(crate) fn collect<'a>(
        &self,
        record: &'a T,
        out: &mut Vec<Pending<'a>>,
    ) -> Result<(), CodecError> {
        self.0.collect(record, out)
    }
}

trait Nest<T>: Send + Sync {
    fn decode(&self, codec: &Codec, line: &[char], target: &mut T) -> Result<(), CodecError>;

    fn collect<'a>(&self, record: &'a T, out: &mut Vec<Pending<'a>>) -> Result<(), CodecError>;
}

struct Getters<T, U> {
    get: fn(&T) -> &U,
    get_mut: fn(&mut T) -> &mut U,
}

impl<T: 'static, U: Record> Nest<T> for Getters<T, U> {
    fn decode(&self, codec: &Codec, line: &[char], target: &mut T) -> Result<(), CodecError> {
        codec.decode_fields(U::layout(), line, (self.get_mut)(target))
    }

    fn collect<'a>(&self, record: &'a T, out: &mut Vec<Pending<'a>>) -> Result<(), CodecError> {
        codec::collect_fields(U::layout(), (self.get)(record), out)
    }
}

/// How a field's value is converted, resolved once when the layout is built.
pub enum FieldKind<T> {
    Scalar(ScalarField<T>),
    Nested(NestedField<T>),
    Custom(CustomField<T>),
}

impl<T: 'static> FieldKind<T> {
    /// A field handled by the built-in [`Scalar`] conversions.
    pub fn scalar<V: Scalar + 'static>(get: fn(&T) -> &V, get_mut: fn(&mut T) -> &mut V) -> Self {
        FieldKind::Scalar(ScalarField::new(
            V::KIND,
            move |target, text| {
                *get_mut(target) = V::parse_scalar(text)?;
                Ok(())
            },
            move |record| Ok(get(record).render_scalar()),
        ))
    }

    /// A nested record decoded from the same line at the same offsets.
    pub fn nested<U: Record>(get: fn(&T) -> &U, get_mut: fn(&mut T) -> &mut U) -> Self {
        FieldKind::Nested(NestedField(Box::new(Getters { get, get_mut })))
    }

    /// A field whose type implements [`FixedField`].
    pub fn custom<V: FixedField + 'static>(
        get: fn(&T) -> &V,
        get_mut: fn(&mut T) -> &mut V,
    ) -> Self {
        FieldKind::Custom(CustomField::new(
            move |target, raw| {
                *get_mut(target) = V::from_fixed(raw)?;
                Ok(())
            },
            move |record| get(record).to_fixed(),
        ))
    }
}

/// One named field of a [`RecordLayout`].
pub struct FieldEntry<T> {
    name: String,
    tags: FieldTags,
    flags: FieldFlags,
    layout: Result<FieldLayout, LayoutError>,
    kind: FieldKind<T>,
}

impl<T> FieldEntry<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn flags(&self) -> FieldFlags {
        self.flags
    }

    /// The parsed descriptor, or why it could not be parsed.
    pub fn layout(&self) -> Result<&FieldLayout, &LayoutError> {
        self.layout.as_ref()
    }

    pub fn kind(&self) -> &FieldKind<T> {
        &self.kind
    }

    /// Wraps a field-level error with this field's name and descriptor.
    pub(crate) fn error(&self, source: FieldError) -> CodecError {
        let layout = match &self.layout {
            Ok(layout) => layout.to_string(),
            Err(_) => format!("range:{} flags:{}", self.tags.range, self.flags),
        };
        CodecError::Field {
            field: self.name.clone(),
            layout,
            source,
        }
    }
}

/// Ordered field table for a record type.
pub struct RecordLayout<T> {
    fields: Vec<FieldEntry<T>>,
}

impl<T> fmt::Debug for RecordLayout<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.fields.iter().map(|entry| &entry.name))
            .finish()
    }
}

impl<T> Default for RecordLayout<T> {
    fn default() -> Self {
        Self { fields: Vec::new() }
    }
}

impl<T> RecordLayout<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field, parsing its annotations now.
    pub fn field(mut self, name: impl Into<String>, tags: FieldTags, kind: FieldKind<T>) -> Self {
        self.push(name, tags, kind);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, tags: FieldTags, kind: FieldKind<T>) {
        let flags = FieldFlags::parse(&tags.flags);
        let layout = FieldLayout::parse(&tags);
        self.fields.push(FieldEntry {
            name: name.into(),
            tags,
            flags,
            layout,
            kind,
        });
    }

    pub fn fields(&self) -> &[FieldEntry<T>] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Implements [`Record`] for a struct by listing its fields.
///
/// Each field is `name: kind`, optionally followed by `{ key = "value", ... }`
/// annotations (`range`, `align`, `decimals`, `flags`). `kind` is `scalar`,
/// `custom` or `nested`. Fields left out of the list, or listed without a
/// `range`, are not part of the layout.
///
/// ```
/// #[derive(Debug, Default)]
/// struct Payment {
///     account: String,
///     amount: f64,
/// }
///
/// fixedrec::record!(Payment {
///     account: scalar { range = "0,10" },
///     amount: scalar { range = "10,18", decimals = "2" },
/// });
///
/// let codec = fixedrec::Codec::default();
/// let line = codec.encode(&Payment { account: "ACME".into(), amount: -12.5 }).unwrap();
/// assert_eq!(line, "ACME      0000125ü");
/// let back: Payment = codec.decode(&line).unwrap();
/// assert_eq!(back.amount, -12.5);
/// ```
#[macro_export]
macro_rules! record {
    (@tags) => {
        $crate::FieldTags::default()
    };
    (@tags $($key:ident = $value:expr),+) => {{
        let mut tags = $crate::FieldTags::default();
        $(tags.$key = ::std::string::String::from($value);)+
        tags
    }};
    (@kind scalar, $rec:ident, $field:ident) => {
        $crate::FieldKind::<$rec>::scalar(|r: &$rec| &r.$field, |r: &mut $rec| &mut r.$field)
    };
    (@kind custom, $rec:ident, $field:ident) => {
        $crate::FieldKind::<$rec>::custom(|r: &$rec| &r.$field, |r: &mut $rec| &mut r.$field)
    };
    (@kind nested, $rec:ident, $field:ident) => {
        $crate::FieldKind::<$rec>::nested(|r: &$rec| &r.$field, |r: &mut $rec| &mut r.$field)
    };
    ($rec:ident {
        $($field:ident : $kind:ident $({ $($key:ident = $value:expr),* $(,)? })?),* $(,)?
    }) => {
        impl $crate::Record for $rec {
            fn layout() -> &'static $crate::RecordLayout<Self> {
                static LAYOUT: ::std::sync::OnceLock<$crate::RecordLayout<$rec>> =
                    ::std::sync::OnceLock::new();
                LAYOUT.get_or_init(|| {
                    $crate::RecordLayout::new()
                        $(.field(
                            ::core::stringify!($field),
                            $crate::record!(@tags $($($key = $value),*)?),
                            $crate::record!(@kind $kind, $rec, $field),
                        ))*
                })
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn booleans_accept_canonical_tokens() {
        for token in ["1", "t", "T", "TRUE", "True", "true"] {
            assert!(bool::parse_scalar(token).unwrap(), "{token}");
        }
        for token in ["0", "f", "F", "FALSE", "False", "false"] {
            assert!(!bool::parse_scalar(token).unwrap(), "{token}");
        }
        assert!(matches!(
            bool::parse_scalar("yes"),
            Err(FieldError::InvalidBooleanValue(_))
        ));
    }

    #[test]
    fn numeric_parse_errors_keep_their_cause() {
        assert!(matches!(
            i64::parse_scalar("invalid"),
            Err(FieldError::InvalidIntValue(_))
        ));
        assert!(matches!(
            f64::parse_scalar("invalid"),
            Err(FieldError::InvalidFloatValue(_))
        ));
        assert!(matches!(
            u8::parse_scalar("300"),
            Err(FieldError::InvalidIntValue(_))
        ));
        assert_eq!(i64::parse_scalar("42").unwrap(), 42);
        assert_eq!(f64::parse_scalar("42.5").unwrap(), 42.5);
    }

    #[test]
    fn floats_render_every_fraction_digit() {
        assert_eq!(12345.12f64.render_scalar(), "12345.12");
        assert_eq!((-1.5f64).render_scalar(), "-1.5");
        assert_eq!(1.239f64.render_scalar(), "1.239");
        assert_eq!(7.0f32.render_scalar(), "7");
        assert_eq!(42i32.render_scalar(), "42");
    }

    #[test]
    fn dates_use_compact_form() {
        let date = NaiveDate::from_ymd_opt(1997, 3, 22).unwrap();
        assert_eq!(NaiveDate::from_fixed("19970322").unwrap(), date);
        assert_eq!(date.to_fixed().unwrap(), "19970322");
        assert!(NaiveDate::from_fixed("1997-03-22").is_err());
        assert_eq!(Option::<NaiveDate>::from_fixed("").unwrap(), None);
        assert_eq!(None::<NaiveDate>.to_fixed().unwrap(), "");
    }

    #[derive(Default)]
    struct Sample {
        id: u32,
        label: String,
    }

    crate::record!(Sample {
        id: scalar { range = "0,4", flags = "optional" },
        label: scalar,
    });

    #[test]
    fn macro_builds_the_table_once() {
        let layout = Sample::layout();
        assert!(std::ptr::eq(layout, Sample::layout()));
        assert_eq!(layout.len(), 2);

        let id = &layout.fields()[0];
        assert_eq!(id.name(), "id");
        assert!(id.flags().optional);
        assert_eq!(id.layout().unwrap().to, 4);
        assert!(matches!(id.kind(), FieldKind::Scalar(f) if f.kind() == ScalarKind::Integer));

        let label = &layout.fields()[1];
        assert_eq!(label.layout().unwrap_err(), &LayoutError::TagEmpty);
    }

    #[test]
    fn layout_debug_lists_field_names() {
        assert_eq!(format!("{:?}", Sample::layout()), r#"["id", "label"]"#);
        let empty: RecordLayout<Sample> = RecordLayout::new();
        assert_eq!(format!("{empty:?}"), "[]");
    }

    #[test]
    fn scalar_accessors_reach_the_field() {
        let layout = Sample::layout();
        let FieldKind::Scalar(id) = layout.fields()[0].kind() else {
            panic!("id should be scalar");
        };
        let mut sample = Sample::default();
        id.assign(&mut sample, "17").unwrap();
        assert_eq!(sample.id, 17);
        assert_eq!(id.render(&sample).unwrap(), "17");
        assert_eq!(sample.label, "");
    }
}
