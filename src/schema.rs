//! Layouts described in JSON and the map-backed records they decode into.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CodecError, FieldError};
use crate::layout::FieldTags;
use crate::record::{CustomField, FieldKind, FixedField, RecordLayout, Scalar, ScalarField};

/// A record layout declared as data.
///
/// ```json
/// {
///   "name": "person",
///   "fields": [
///     { "name": "full_name", "kind": "string", "range": "0,20" },
///     { "name": "income", "kind": "float", "range": "37,-1" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub fields: Vec<SchemaField>,
}

/// One field of a [`Schema`]: a key in the JSON record, its kind and its
/// layout annotations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    /// `int`, `float`, `string`, `bool` or `date`.
    pub kind: String,
    #[serde(flatten)]
    pub tags: FieldTags,
}

impl Schema {
    /// Read a schema from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read schema {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse schema in {}", path.display()))
    }

    /// Builds the field table used by the codec.
    pub fn compile(&self) -> Result<RecordLayout<DynamicRecord>, CodecError> {
        let mut layout = RecordLayout::new();
        for field in &self.fields {
            let kind = dynamic_kind(&field.name, &field.kind).map_err(|source| {
                CodecError::Field {
                    field: field.name.clone(),
                    layout: format!("kind:{}", field.kind),
                    source,
                }
            })?;
            layout.push(field.name.clone(), field.tags.clone(), kind);
        }
        Ok(layout)
    }
}

/// A record held as a JSON object, keyed by schema field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DynamicRecord(Map<String, Value>);

impl DynamicRecord {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(name.into(), value)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl TryFrom<Value> for DynamicRecord {
    type Error = CodecError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(CodecError::InvalidTarget(format!(
                "expected a JSON object, found {}",
                json_type(&other)
            ))),
        }
    }
}

impl From<DynamicRecord> for Value {
    fn from(record: DynamicRecord) -> Self {
        record.into_value()
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn dynamic_kind(name: &str, kind: &str) -> Result<FieldKind<DynamicRecord>, FieldError> {
    let key = name.to_string();
    match kind {
        "int" | "integer" => Ok(scalar_kind::<i64>(key, "integer", Value::from, Value::as_i64)),
        "float" => Ok(scalar_kind::<f64>(key, "float", Value::from, Value::as_f64)),
        "string" => Ok(scalar_kind::<String>(key, "string", Value::String, |value| {
            value.as_str().map(str::to_string)
        })),
        "bool" | "boolean" => Ok(scalar_kind::<bool>(key, "boolean", Value::Bool, Value::as_bool)),
        "date" => Ok(date_kind(key)),
        other => Err(FieldError::UnsupportedFieldKind(other.to_string())),
    }
}

/// Scalar accessors over one key. A missing or null key encodes as the
/// kind's zero value; numbers and booleans also accept their text form.
fn scalar_kind<V>(
    key: String,
    expected: &'static str,
    to_json: fn(V) -> Value,
    from_json: fn(&Value) -> Option<V>,
) -> FieldKind<DynamicRecord>
where
    V: Scalar + Default + 'static,
{
    let read_key = key.clone();
    FieldKind::Scalar(ScalarField::new(
        V::KIND,
        move |record: &mut DynamicRecord, text: &str| {
            record.insert(key.clone(), to_json(V::parse_scalar(text)?));
            Ok(())
        },
        move |record: &DynamicRecord| {
            let value = match record.get(&read_key) {
                None | Some(Value::Null) => V::default(),
                Some(value) => match (from_json(value), value) {
                    (Some(value), _) => value,
                    (None, Value::String(text)) => V::parse_scalar(text)?,
                    (None, other) => {
                        return Err(FieldError::TypeMismatch {
                            expected,
                            found: other.to_string(),
                        });
                    }
                },
            };
            Ok(value.render_scalar())
        },
    ))
}

/// Dates travel as ISO `YYYY-MM-DD` strings in JSON and `YYYYMMDD` in the
/// record. A blank slot maps to `null`.
fn date_kind(key: String) -> FieldKind<DynamicRecord> {
    let read_key = key.clone();
    FieldKind::Custom(CustomField::new(
        move |record: &mut DynamicRecord, raw: &str| {
            let date = Option::<NaiveDate>::from_fixed(raw)?;
            let value = date.map_or(Value::Null, |date| Value::String(date.to_string()));
            record.insert(key.clone(), value);
            Ok(())
        },
        move |record: &DynamicRecord| match record.get(&read_key) {
            None | Some(Value::Null) => Ok(String::new()),
            Some(Value::String(text)) => text.parse::<NaiveDate>()?.to_fixed(),
            Some(other) => Err(format!("expected an ISO date string, found {other}").into()),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Codec;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn person() -> Schema {
        serde_json::from_value(json!({
            "name": "person",
            "fields": [
                { "name": "full_name", "kind": "string", "range": "0,20" },
                { "name": "birth_date", "kind": "date", "range": "20,28" },
                { "name": "ssn", "kind": "string", "range": "28,37" },
                { "name": "income", "kind": "float", "range": "37,-1", "decimals": "" }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn flattened_tags_deserialize() {
        let schema = person();
        assert_eq!(schema.fields[3].tags.range, "37,-1");
        assert_eq!(schema.fields[0].tags.align, "");
        assert_eq!(schema.description, "");
    }

    #[test]
    fn decodes_into_json_objects() {
        let layout = person().compile().unwrap();
        let record = Codec::default()
            .decode_with(&layout, "Olivia Parker       199703221112223331550.85   ")
            .unwrap();
        assert_eq!(
            record.into_value(),
            json!({
                "full_name": "Olivia Parker",
                "birth_date": "1997-03-22",
                "ssn": "111222333",
                "income": 1550.85
            })
        );
    }

    #[test]
    fn encodes_json_objects() {
        let layout = person().compile().unwrap();
        let record = DynamicRecord::try_from(json!({
            "full_name": "Ada",
            "birth_date": "1815-12-10",
            "ssn": "000000001",
            "income": 42
        }))
        .unwrap();
        assert_eq!(
            Codec::default().encode_with(&layout, &record).unwrap(),
            "Ada                 1815121000000000142"
        );
    }

    #[test]
    fn missing_keys_encode_as_zero_values() {
        let layout = person().compile().unwrap();
        let line = Codec::default()
            .encode_with(&layout, &DynamicRecord::default())
            .unwrap();
        assert_eq!(line, format!("{}0", " ".repeat(37)));
    }

    #[test]
    fn numbers_accept_text() {
        let layout = person().compile().unwrap();
        let record = DynamicRecord::try_from(json!({ "income": "-7" })).unwrap();
        let line = Codec::default().encode_with(&layout, &record).unwrap();
        assert!(line.ends_with('P'), "{line:?}");
    }

    #[test]
    fn wrong_json_type_is_a_field_error() {
        let layout = person().compile().unwrap();
        let record = DynamicRecord::try_from(json!({ "ssn": 123 })).unwrap();
        let err = Codec::default().encode_with(&layout, &record).unwrap_err();
        assert!(matches!(
            err.field_error(),
            Some(FieldError::TypeMismatch { expected: "string", .. })
        ));
    }

    #[test]
    fn rejects_non_object_targets() {
        let err = DynamicRecord::try_from(json!([1, 2])).unwrap_err();
        assert!(matches!(err, CodecError::InvalidTarget(_)));
    }

    #[test]
    fn rejects_unknown_kinds() {
        let mut schema = person();
        schema.fields[0].kind = "complex".into();
        let err = schema.compile().unwrap_err();
        assert!(matches!(
            err.field_error(),
            Some(FieldError::UnsupportedFieldKind(kind)) if kind == "complex"
        ));
    }
}
