//! Built-in serdes for primitive JSON values: strings, numbers, booleans,
//! the void (no-body) type and the raw JSON pass-through.
//!
//! These are what a freshly bootstrapped client registers so that
//! unconfigured clients can still round-trip JSON bodies. The string and
//! number serdes keep a deliberately minimal wire behavior; see the
//! individual docs.

use std::fmt;

use serde_json::{Number, Value};

use crate::container::{Container, ContainerKind};
use crate::context::{DeserializationContext, SerializationContext};
use crate::error::SerdesError;
use crate::json::{join_serialized, parse_json, parse_json_array, JSON_PATTERNS};
use crate::{Deserializer, Serializer};

/// Numeric value produced by [`JsonNumberSerdes`]: the narrowest width the
/// wire text fits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JsonNumber {
    Int(i32),
    Long(i64),
    Float(f64),
}

impl JsonNumber {
    /// Widening view of the value.
    pub fn as_f64(&self) -> f64 {
        match *self {
            JsonNumber::Int(v) => f64::from(v),
            JsonNumber::Long(v) => v as f64,
            JsonNumber::Float(v) => v,
        }
    }

    /// Classify a parsed JSON number: exact floats stay floats, integers
    /// take the narrowest fitting width, and magnitudes beyond `i64` fall
    /// back to floating point.
    pub fn from_json(number: &Number) -> Self {
        if let Some(wide) = number.as_i64() {
            match i32::try_from(wide) {
                Ok(narrow) => JsonNumber::Int(narrow),
                Err(_) => JsonNumber::Long(wide),
            }
        } else {
            JsonNumber::Float(number.as_f64().unwrap_or(f64::NAN))
        }
    }

    /// Parse numeric wire text: a literal with a decimal point or exponent
    /// is floating point; otherwise the narrowest fitting integer width,
    /// falling back to floating point beyond `i64` range.
    pub fn parse(text: &str) -> Result<Self, SerdesError> {
        let text = text.trim();
        if text.contains(['.', 'e', 'E']) {
            return text
                .parse::<f64>()
                .map(JsonNumber::Float)
                .map_err(|_| not_a_number());
        }
        if let Ok(narrow) = text.parse::<i32>() {
            return Ok(JsonNumber::Int(narrow));
        }
        if let Ok(wide) = text.parse::<i64>() {
            return Ok(JsonNumber::Long(wide));
        }
        match text.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(JsonNumber::Float(value)),
            _ => Err(not_a_number()),
        }
    }
}

impl fmt::Display for JsonNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            JsonNumber::Int(v) => write!(f, "{v}"),
            JsonNumber::Long(v) => write!(f, "{v}"),
            // Keep the decimal point so the float survives a round trip.
            JsonNumber::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{v:.1}"),
            JsonNumber::Float(v) => write!(f, "{v}"),
        }
    }
}

fn not_a_number() -> SerdesError {
    SerdesError::UnableToDeserialize("could not deserialize response as a number".into())
}

/// Deserialize every element of a top-level JSON array through `de`.
fn elements_via<D>(
    de: &D,
    kind: ContainerKind,
    text: &str,
    ctx: &DeserializationContext<'_>,
) -> Result<Container<D::Value>, SerdesError>
where
    D: Deserializer,
    D::Value: PartialEq,
{
    let items = parse_json_array(text)?;
    let mut container = ctx.containers().new_container(kind)?;
    for item in items {
        container.push(de.deserialize(&item.to_string(), ctx)?);
    }
    Ok(container)
}

/// Serdes for plain JSON string values.
///
/// Deserialization strips exactly one leading and one trailing quote and
/// performs no unescaping; serialization adds the quotes and no escaping.
/// This is a minimal, non-general-purpose text codec.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonStringSerdes;

impl Serializer for JsonStringSerdes {
    type Value = String;

    fn produces(&self) -> &[&str] {
        JSON_PATTERNS
    }

    fn serialize(&self, value: &String, _ctx: &SerializationContext) -> Result<String, SerdesError> {
        Ok(format!("\"{value}\""))
    }

    fn serialize_collection(
        &self,
        values: &Container<String>,
        ctx: &SerializationContext,
    ) -> Result<String, SerdesError> {
        join_serialized(values.iter().map(|value| self.serialize(value, ctx)))
    }
}

impl Deserializer for JsonStringSerdes {
    type Value = String;

    fn accepts(&self) -> &[&str] {
        JSON_PATTERNS
    }

    fn deserialize(
        &self,
        text: &str,
        _ctx: &DeserializationContext<'_>,
    ) -> Result<String, SerdesError> {
        text.trim()
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
            .map(str::to_owned)
            .ok_or_else(|| {
                SerdesError::UnableToDeserialize("response content is not a json string".into())
            })
    }

    fn deserialize_collection(
        &self,
        kind: ContainerKind,
        text: &str,
        ctx: &DeserializationContext<'_>,
    ) -> Result<Container<String>, SerdesError> {
        elements_via(self, kind, text, ctx)
    }
}

/// Serdes for JSON numeric values under the numeric width policy of
/// [`JsonNumber::parse`].
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonNumberSerdes;

impl Serializer for JsonNumberSerdes {
    type Value = JsonNumber;

    fn produces(&self) -> &[&str] {
        JSON_PATTERNS
    }

    fn serialize(
        &self,
        value: &JsonNumber,
        _ctx: &SerializationContext,
    ) -> Result<String, SerdesError> {
        Ok(value.to_string())
    }

    fn serialize_collection(
        &self,
        values: &Container<JsonNumber>,
        ctx: &SerializationContext,
    ) -> Result<String, SerdesError> {
        join_serialized(values.iter().map(|value| self.serialize(value, ctx)))
    }
}

impl Deserializer for JsonNumberSerdes {
    type Value = JsonNumber;

    fn accepts(&self) -> &[&str] {
        JSON_PATTERNS
    }

    fn deserialize(
        &self,
        text: &str,
        _ctx: &DeserializationContext<'_>,
    ) -> Result<JsonNumber, SerdesError> {
        JsonNumber::parse(text)
    }

    fn deserialize_collection(
        &self,
        kind: ContainerKind,
        text: &str,
        ctx: &DeserializationContext<'_>,
    ) -> Result<Container<JsonNumber>, SerdesError> {
        elements_via(self, kind, text, ctx)
    }
}

/// Serdes for JSON boolean values. Anything other than the literals `true`
/// and `false` is rejected.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonBooleanSerdes;

impl Serializer for JsonBooleanSerdes {
    type Value = bool;

    fn produces(&self) -> &[&str] {
        JSON_PATTERNS
    }

    fn serialize(&self, value: &bool, _ctx: &SerializationContext) -> Result<String, SerdesError> {
        Ok(value.to_string())
    }

    fn serialize_collection(
        &self,
        values: &Container<bool>,
        ctx: &SerializationContext,
    ) -> Result<String, SerdesError> {
        join_serialized(values.iter().map(|value| self.serialize(value, ctx)))
    }
}

impl Deserializer for JsonBooleanSerdes {
    type Value = bool;

    fn accepts(&self) -> &[&str] {
        JSON_PATTERNS
    }

    fn deserialize(&self, text: &str, _ctx: &DeserializationContext<'_>) -> Result<bool, SerdesError> {
        match text.trim() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(SerdesError::UnableToDeserialize(format!(
                "{other:?} is not a json boolean"
            ))),
        }
    }

    fn deserialize_collection(
        &self,
        kind: ContainerKind,
        text: &str,
        ctx: &DeserializationContext<'_>,
    ) -> Result<Container<bool>, SerdesError> {
        elements_via(self, kind, text, ctx)
    }
}

/// Serdes for the no-body type `()`: deserialization ignores the body,
/// serialization yields an empty string which the request layer treats as
/// "no body".
#[derive(Debug, Default, Clone, Copy)]
pub struct VoidSerdes;

impl Serializer for VoidSerdes {
    type Value = ();

    fn produces(&self) -> &[&str] {
        JSON_PATTERNS
    }

    fn serialize(&self, _value: &(), _ctx: &SerializationContext) -> Result<String, SerdesError> {
        Ok(String::new())
    }

    fn serialize_collection(
        &self,
        _values: &Container<()>,
        _ctx: &SerializationContext,
    ) -> Result<String, SerdesError> {
        Ok(String::new())
    }
}

impl Deserializer for VoidSerdes {
    type Value = ();

    fn accepts(&self) -> &[&str] {
        JSON_PATTERNS
    }

    fn deserialize(&self, _text: &str, _ctx: &DeserializationContext<'_>) -> Result<(), SerdesError> {
        Ok(())
    }

    fn deserialize_collection(
        &self,
        kind: ContainerKind,
        _text: &str,
        ctx: &DeserializationContext<'_>,
    ) -> Result<Container<()>, SerdesError> {
        ctx.containers().new_container(kind)
    }
}

/// Pass-through serdes for raw [`serde_json::Value`] bodies.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawJsonSerdes;

impl Serializer for RawJsonSerdes {
    type Value = Value;

    fn produces(&self) -> &[&str] {
        JSON_PATTERNS
    }

    fn serialize(&self, value: &Value, _ctx: &SerializationContext) -> Result<String, SerdesError> {
        Ok(value.to_string())
    }

    fn serialize_collection(
        &self,
        values: &Container<Value>,
        ctx: &SerializationContext,
    ) -> Result<String, SerdesError> {
        join_serialized(values.iter().map(|value| self.serialize(value, ctx)))
    }
}

impl Deserializer for RawJsonSerdes {
    type Value = Value;

    fn accepts(&self) -> &[&str] {
        JSON_PATTERNS
    }

    fn deserialize(&self, text: &str, _ctx: &DeserializationContext<'_>) -> Result<Value, SerdesError> {
        parse_json(text)
    }

    fn deserialize_collection(
        &self,
        kind: ContainerKind,
        text: &str,
        ctx: &DeserializationContext<'_>,
    ) -> Result<Container<Value>, SerdesError> {
        let items = parse_json_array(text)?;
        let mut container = ctx.containers().new_container(kind)?;
        for item in items {
            container.push(item);
        }
        Ok(container)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ContainerRegistry;
    use crate::headers::Headers;

    fn ser_ctx() -> SerializationContext {
        SerializationContext::of(&Headers::new())
    }

    #[test]
    fn test_number_parse_boundaries() {
        assert_eq!(JsonNumber::parse("3").unwrap(), JsonNumber::Int(3));
        assert_eq!(JsonNumber::parse("3.0").unwrap(), JsonNumber::Float(3.0));
        assert_eq!(
            JsonNumber::parse("3000000000").unwrap(),
            JsonNumber::Long(3_000_000_000)
        );
        // Beyond i64: falls back to an overflow-safe wide representation.
        assert_eq!(
            JsonNumber::parse("99999999999999999999").unwrap(),
            JsonNumber::Float(1e20)
        );
        assert!(JsonNumber::parse("not-a-number").is_err());
    }

    #[test]
    fn test_number_round_trip() {
        let registry = ContainerRegistry::new();
        let ctx = DeserializationContext::of(&Headers::new(), &registry);
        let serdes = JsonNumberSerdes;
        for value in [
            JsonNumber::Int(42),
            JsonNumber::Long(i64::from(i32::MAX) + 1),
            JsonNumber::Float(3.0),
            JsonNumber::Float(2.5),
        ] {
            let text = serdes.serialize(&value, &ser_ctx()).unwrap();
            assert_eq!(serdes.deserialize(&text, &ctx).unwrap(), value, "{text}");
        }
    }

    #[test]
    fn test_string_strips_one_quote_pair() {
        let registry = ContainerRegistry::new();
        let ctx = DeserializationContext::of(&Headers::new(), &registry);
        let serdes = JsonStringSerdes;
        assert_eq!(serdes.deserialize("\"hello\"", &ctx).unwrap(), "hello");
        assert_eq!(serdes.serialize(&"hello".to_string(), &ser_ctx()).unwrap(), "\"hello\"");
        // Deliberately minimal: embedded escapes pass through untouched.
        assert_eq!(serdes.deserialize("\"a\\\"b\"", &ctx).unwrap(), "a\\\"b");
        assert!(serdes.deserialize("hello", &ctx).is_err());
        assert!(serdes.deserialize("\"", &ctx).is_err());
    }

    #[test]
    fn test_boolean_rejects_non_literals() {
        let registry = ContainerRegistry::new();
        let ctx = DeserializationContext::of(&Headers::new(), &registry);
        let serdes = JsonBooleanSerdes;
        assert!(serdes.deserialize("true", &ctx).unwrap());
        assert!(!serdes.deserialize(" false ", &ctx).unwrap());
        assert!(serdes.deserialize("TRUE", &ctx).is_err());
        assert!(serdes.deserialize("1", &ctx).is_err());
    }

    #[test]
    fn test_void_round_trip() {
        let registry = ContainerRegistry::new();
        let ctx = DeserializationContext::of(&Headers::new(), &registry);
        VoidSerdes.deserialize("anything", &ctx).unwrap();
        assert_eq!(VoidSerdes.serialize(&(), &ser_ctx()).unwrap(), "");
    }

    #[test]
    fn test_raw_json_pass_through() {
        let registry = ContainerRegistry::new();
        let ctx = DeserializationContext::of(&Headers::new(), &registry);
        let serdes = RawJsonSerdes;
        let value = serdes
            .deserialize(r#"{"nested":{"ok":true}}"#, &ctx)
            .unwrap();
        assert_eq!(value["nested"]["ok"], Value::Bool(true));
        let text = serdes.serialize(&value, &ser_ctx()).unwrap();
        assert_eq!(serdes.deserialize(&text, &ctx).unwrap(), value);
    }

    #[test]
    fn test_value_collection_round_trip() {
        let registry = ContainerRegistry::new();
        let ctx = DeserializationContext::of(&Headers::new(), &registry);
        let serdes = JsonStringSerdes;
        for strings in [vec![], vec!["a".to_string()], vec!["a".to_string(), "b".to_string()]] {
            let text = serdes
                .serialize_collection(&Container::list(strings.clone()), &ser_ctx())
                .unwrap();
            let back = serdes
                .deserialize_collection(ContainerKind::List, &text, &ctx)
                .unwrap();
            assert_eq!(back.into_vec(), strings);
        }
    }

    #[test]
    fn test_collection_requires_array() {
        let registry = ContainerRegistry::new();
        let ctx = DeserializationContext::of(&Headers::new(), &registry);
        let err = JsonNumberSerdes
            .deserialize_collection(ContainerKind::List, "3", &ctx)
            .unwrap_err();
        assert_eq!(
            err,
            SerdesError::UnableToDeserialize("response content is not an array".into())
        );
    }
}
