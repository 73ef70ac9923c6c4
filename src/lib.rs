//! Fixed-width record encoding with EBCDIC signed-overpunch numerics.
//!
//! A record is one line of text; each field occupies a half-open character
//! range `[from, to)` of that line. Layouts come either from Rust structs via
//! [`record!`] or from JSON [`Schema`]s decoded into [`DynamicRecord`]s.

pub mod align;
mod codec;
mod error;
mod layout;
pub mod overpunch;
mod record;
mod schema;
mod settings;
mod templates;

pub use align::Alignment;
pub use codec::Codec;
pub use error::{BoxError, CodecError, FieldError, LayoutError};
pub use layout::{END_OF_RECORD, FieldFlags, FieldLayout, FieldTags, Span};
pub use record::{
    CustomField, FieldEntry, FieldKind, FixedField, NestedField, Record, RecordLayout, Scalar,
    ScalarField, ScalarKind,
};
pub use schema::{DynamicRecord, Schema, SchemaField};
pub use settings::Settings;
pub use templates::{Template, TemplateField, TemplateRegistry};
