//! JSON object serdes base behavior: record mappers, the field-level
//! reader/writer pair, and the adapter wiring a mapper into the
//! [`Serializer`]/[`Deserializer`] traits.

use serde_json::{Map, Value};

use crate::container::{Container, ContainerKind};
use crate::context::{DeserializationContext, SerializationContext};
use crate::error::SerdesError;
use crate::value::JsonNumber;
use crate::{Deserializer, Serializer};

/// Default media type patterns for JSON-bound serdes.
pub const JSON_PATTERNS: &[&str] = &["application/json", "application/javascript"];

/// Maps a JSON object to and from a structured record, field by field.
///
/// The mapper only deals with single records; whether a request expects a
/// single record or a collection is decided by the operation invoked on the
/// adapter, not by inspecting the mapper at runtime.
pub trait JsonRecordMapper {
    type Record: PartialEq;

    /// Build a record from the fields of one JSON object.
    fn read(
        &self,
        reader: &JsonRecordReader<'_>,
        ctx: &DeserializationContext<'_>,
    ) -> Result<Self::Record, SerdesError>;

    /// Write the record's fields into a JSON object.
    fn write(&self, record: &Self::Record, writer: &mut JsonRecordWriter, ctx: &SerializationContext);
}

/// Field-level access to a parsed JSON object.
///
/// Every accessor fails with [`SerdesError::UnableToDeserialize`] naming
/// the offending field when it is missing or has the wrong type.
pub struct JsonRecordReader<'a> {
    fields: &'a Map<String, Value>,
}

impl<'a> JsonRecordReader<'a> {
    pub(crate) fn new(fields: &'a Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn has(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn read_string(&self, name: &str) -> Result<String, SerdesError> {
        match self.field(name)? {
            Value::String(s) => Ok(s.clone()),
            _ => Err(wrong_type(name, "a string")),
        }
    }

    pub fn read_bool(&self, name: &str) -> Result<bool, SerdesError> {
        match self.field(name)? {
            Value::Bool(b) => Ok(*b),
            _ => Err(wrong_type(name, "a boolean")),
        }
    }

    pub fn read_i32(&self, name: &str) -> Result<i32, SerdesError> {
        let wide = self.read_i64(name)?;
        i32::try_from(wide).map_err(|_| wrong_type(name, "a 32-bit integer"))
    }

    pub fn read_i64(&self, name: &str) -> Result<i64, SerdesError> {
        match self.field(name)? {
            Value::Number(n) => n.as_i64().ok_or_else(|| wrong_type(name, "an integer")),
            _ => Err(wrong_type(name, "an integer")),
        }
    }

    pub fn read_f64(&self, name: &str) -> Result<f64, SerdesError> {
        match self.field(name)? {
            Value::Number(n) => n.as_f64().ok_or_else(|| wrong_type(name, "a number")),
            _ => Err(wrong_type(name, "a number")),
        }
    }

    /// Read a numeric field under the crate's numeric width policy: exact
    /// floats stay floats, integers take the narrowest fitting width.
    pub fn read_number(&self, name: &str) -> Result<JsonNumber, SerdesError> {
        match self.field(name)? {
            Value::Number(n) => Ok(JsonNumber::from_json(n)),
            _ => Err(wrong_type(name, "a number")),
        }
    }

    fn field(&self, name: &str) -> Result<&Value, SerdesError> {
        self.fields
            .get(name)
            .ok_or_else(|| SerdesError::UnableToDeserialize(format!("missing field {name:?}")))
    }
}

fn wrong_type(name: &str, expected: &str) -> SerdesError {
    SerdesError::UnableToDeserialize(format!("field {name:?} is not {expected}"))
}

/// Chainable field-level builder for one JSON object.
///
/// Fields are emitted in write order.
#[derive(Debug, Default)]
pub struct JsonRecordWriter {
    fields: Map<String, Value>,
}

impl JsonRecordWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_string(&mut self, name: &str, value: &str) -> &mut Self {
        self.fields.insert(name.to_string(), Value::String(value.to_string()));
        self
    }

    pub fn write_bool(&mut self, name: &str, value: bool) -> &mut Self {
        self.fields.insert(name.to_string(), Value::Bool(value));
        self
    }

    pub fn write_i32(&mut self, name: &str, value: i32) -> &mut Self {
        self.fields.insert(name.to_string(), Value::from(value));
        self
    }

    pub fn write_i64(&mut self, name: &str, value: i64) -> &mut Self {
        self.fields.insert(name.to_string(), Value::from(value));
        self
    }

    /// Non-finite values are written as JSON null.
    pub fn write_f64(&mut self, name: &str, value: f64) -> &mut Self {
        self.fields.insert(name.to_string(), Value::from(value));
        self
    }

    pub fn write_value(&mut self, name: &str, value: Value) -> &mut Self {
        self.fields.insert(name.to_string(), value);
        self
    }

    pub fn into_json(self) -> String {
        Value::Object(self.fields).to_string()
    }
}

/// Adapter turning a [`JsonRecordMapper`] into a full serdes bound to the
/// JSON media type patterns (overridable via [`with_patterns`]).
///
/// [`with_patterns`]: JsonObjectSerdes::with_patterns
pub struct JsonObjectSerdes<M> {
    mapper: M,
    patterns: Vec<&'static str>,
}

impl<M> JsonObjectSerdes<M> {
    pub fn new(mapper: M) -> Self {
        Self {
            mapper,
            patterns: JSON_PATTERNS.to_vec(),
        }
    }

    /// Replace the media type patterns this serdes is bound to.
    pub fn with_patterns(mut self, patterns: &[&'static str]) -> Self {
        self.patterns = patterns.to_vec();
        self
    }
}

impl<M: JsonRecordMapper> Serializer for JsonObjectSerdes<M> {
    type Value = M::Record;

    fn produces(&self) -> &[&str] {
        &self.patterns
    }

    fn serialize(
        &self,
        value: &M::Record,
        ctx: &SerializationContext,
    ) -> Result<String, SerdesError> {
        let mut writer = JsonRecordWriter::new();
        self.mapper.write(value, &mut writer, ctx);
        Ok(writer.into_json())
    }

    fn serialize_collection(
        &self,
        values: &Container<M::Record>,
        ctx: &SerializationContext,
    ) -> Result<String, SerdesError> {
        join_serialized(values.iter().map(|value| self.serialize(value, ctx)))
    }
}

impl<M: JsonRecordMapper> Deserializer for JsonObjectSerdes<M> {
    type Value = M::Record;

    fn accepts(&self) -> &[&str] {
        &self.patterns
    }

    fn deserialize(
        &self,
        text: &str,
        ctx: &DeserializationContext<'_>,
    ) -> Result<M::Record, SerdesError> {
        if !looks_like_object(text) {
            return Err(SerdesError::UnableToDeserialize(
                "response content is not an object".into(),
            ));
        }
        let fields = match parse_json(text)? {
            Value::Object(fields) => fields,
            _ => {
                return Err(SerdesError::UnableToDeserialize(
                    "response content is not an object".into(),
                ))
            }
        };
        self.mapper.read(&JsonRecordReader::new(&fields), ctx)
    }

    fn deserialize_collection(
        &self,
        kind: ContainerKind,
        text: &str,
        ctx: &DeserializationContext<'_>,
    ) -> Result<Container<M::Record>, SerdesError> {
        let items = parse_json_array(text)?;
        let mut container = ctx.containers().new_container(kind)?;
        for item in &items {
            let fields = match item {
                Value::Object(fields) => fields,
                _ => {
                    return Err(SerdesError::UnableToDeserialize(
                        "array element is not an object".into(),
                    ))
                }
            };
            container.push(self.mapper.read(&JsonRecordReader::new(fields), ctx)?);
        }
        Ok(container)
    }
}

pub(crate) fn looks_like_object(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.starts_with('{') && trimmed.ends_with('}')
}

pub(crate) fn looks_like_array(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.starts_with('[') && trimmed.ends_with(']')
}

pub(crate) fn parse_json(text: &str) -> Result<Value, SerdesError> {
    serde_json::from_str(text.trim())
        .map_err(|err| SerdesError::UnableToDeserialize(format!("invalid json: {err}")))
}

/// Parse a top-level JSON array, rejecting other shapes.
pub(crate) fn parse_json_array(text: &str) -> Result<Vec<Value>, SerdesError> {
    if !looks_like_array(text) {
        return Err(SerdesError::UnableToDeserialize(
            "response content is not an array".into(),
        ));
    }
    match parse_json(text)? {
        Value::Array(items) => Ok(items),
        _ => Err(SerdesError::UnableToDeserialize(
            "response content is not an array".into(),
        )),
    }
}

/// Comma-join serialized elements inside brackets; an empty input yields
/// `[]` with no dangling separator.
pub(crate) fn join_serialized(
    parts: impl Iterator<Item = Result<String, SerdesError>>,
) -> Result<String, SerdesError> {
    let parts: Vec<String> = parts.collect::<Result<_, _>>()?;
    Ok(format!("[{}]", parts.join(",")))
}
