//! Content-negotiated serialization core for the restio HTTP client.
//!
//! Maps a target type and a media type pattern to a serializer or
//! deserializer, resolves wildcarded patterns with specificity
//! tie-breaking, and drives the encode/decode path of request and response
//! bodies.
//!
//! # Architecture
//!
//! [`MediaTypePattern`] parses `type/subtype` patterns (wildcards allowed
//! in either part) and defines matching plus a specificity order.
//! [`SerdesRegistry`] stores per-type bindings of pattern to handler and
//! resolves the best match for a concrete content type. Handlers receive an
//! ephemeral [`SerializationContext`]/[`DeserializationContext`] carrying
//! an isolated header copy and the [`ContainerRegistry`] used for
//! collection bodies. The `json` and `value` modules provide the JSON
//! serdes family, including the record-mapper base for user-defined object
//! serdes.
//!
//! Everything here is single-threaded cooperative: registries are cheap
//! `Rc`-backed handles mutated during setup and read on every
//! request/response cycle, with no internal synchronization.
//!
//! # Example
//!
//! ```rust,ignore
//! let registry = SerdesRegistry::new();
//! registry.register_serdes::<Book, _>(JsonObjectSerdes::new(BookMapper))?;
//!
//! let deserializer = registry.deserializer_for::<Book>("application/json")?;
//! let book = deserializer.deserialize(body, &ctx)?;
//! ```

mod container;
mod context;
mod error;
mod headers;
mod json;
mod media;
mod registry;
mod value;

pub use container::{Container, ContainerIter, ContainerKind, ContainerRegistry, FactoryRegistration};
pub use context::{DeserializationContext, SerializationContext};
pub use error::{Direction, SerdesError};
pub use headers::Headers;
pub use json::{JsonObjectSerdes, JsonRecordMapper, JsonRecordReader, JsonRecordWriter, JSON_PATTERNS};
pub use media::MediaTypePattern;
pub use registry::{Registration, SerdesRegistry};
pub use value::{
    JsonBooleanSerdes, JsonNumber, JsonNumberSerdes, JsonStringSerdes, RawJsonSerdes, VoidSerdes,
};

/// Serializes values of one target type into wire text.
///
/// A serializer declares the media type patterns it can produce; the
/// registry binds it under each of them.
pub trait Serializer {
    type Value;

    /// Media type patterns this serializer produces, e.g.
    /// `["application/json"]`. Validated when registered.
    fn produces(&self) -> &[&str];

    /// Serialize one value.
    fn serialize(
        &self,
        value: &Self::Value,
        ctx: &SerializationContext,
    ) -> Result<String, SerdesError>;

    /// Serialize a collection of values into one body.
    fn serialize_collection(
        &self,
        values: &Container<Self::Value>,
        ctx: &SerializationContext,
    ) -> Result<String, SerdesError>;
}

/// Deserializes wire text into values of one target type.
pub trait Deserializer {
    type Value;

    /// Media type patterns this deserializer accepts. Validated when
    /// registered.
    fn accepts(&self) -> &[&str];

    /// Deserialize one value from a response body.
    fn deserialize(
        &self,
        text: &str,
        ctx: &DeserializationContext<'_>,
    ) -> Result<Self::Value, SerdesError>;

    /// Deserialize a collection body into a container of the requested
    /// shape, preserving element order.
    fn deserialize_collection(
        &self,
        kind: ContainerKind,
        text: &str,
        ctx: &DeserializationContext<'_>,
    ) -> Result<Container<Self::Value>, SerdesError>;
}

/// A combined serializer and deserializer for one target type.
pub trait Serdes: Serializer + Deserializer<Value = <Self as Serializer>::Value> {}

impl<S> Serdes for S where S: Serializer + Deserializer<Value = <S as Serializer>::Value> {}
