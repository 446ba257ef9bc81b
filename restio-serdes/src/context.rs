//! Ephemeral per-request contexts handed to serdes calls.
//!
//! Contexts carry ambient information (headers, the container registry)
//! without widening serdes signatures. They are created at the start of a
//! send/receive cycle, never shared or mutated after handoff, and discarded
//! when the cycle ends.

use crate::container::ContainerRegistry;
use crate::headers::Headers;

/// Ambient data available while serializing a request body.
///
/// Holds a deep, isolated copy of the request headers taken at creation
/// time, so serializers can neither observe later mutations nor mutate
/// caller-visible state.
#[derive(Debug, Clone)]
pub struct SerializationContext {
    headers: Headers,
}

impl SerializationContext {
    pub fn of(headers: &Headers) -> Self {
        Self {
            headers: headers.clone(),
        }
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }
}

/// Ambient data available while deserializing a response body: an isolated
/// copy of the response headers plus the container registry used to
/// instantiate collection results.
#[derive(Debug)]
pub struct DeserializationContext<'a> {
    headers: Headers,
    containers: &'a ContainerRegistry,
}

impl<'a> DeserializationContext<'a> {
    pub fn of(headers: &Headers, containers: &'a ContainerRegistry) -> Self {
        Self {
            headers: headers.clone(),
            containers,
        }
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn containers(&self) -> &ContainerRegistry {
        self.containers
    }
}
