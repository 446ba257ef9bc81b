//! Top-level client: owns the serdes and container registries and the
//! transport handle, and hands out request builders.

use std::cell::RefCell;
use std::rc::Rc;

use restio_serdes::{
    ContainerRegistry, Deserializer, JsonBooleanSerdes, JsonNumber, JsonNumberSerdes,
    JsonStringSerdes, RawJsonSerdes, Registration, SerdesError, SerdesRegistry, Serializer,
    VoidSerdes,
};

use crate::error::RequestError;
use crate::request::RequestBuilder;
use crate::transport::Transport;

/// HTTP client front end.
///
/// A fresh client pre-registers serdes for strings, numbers, booleans, the
/// void type and raw JSON values, so unconfigured clients can round-trip
/// JSON bodies out of the box. Registries are owned per client instance;
/// independent clients never share serdes state.
pub struct Client {
    serdes: SerdesRegistry,
    containers: ContainerRegistry,
    transport: Rc<RefCell<dyn Transport>>,
}

impl Client {
    pub fn new(transport: impl Transport + 'static) -> Self {
        let serdes = SerdesRegistry::new();
        bootstrap(&serdes);
        Self {
            serdes,
            containers: ContainerRegistry::new(),
            transport: Rc::new(RefCell::new(transport)),
        }
    }

    /// The serdes registry, for registrations beyond the built-ins.
    pub fn serdes(&self) -> &SerdesRegistry {
        &self.serdes
    }

    /// The container registry governing collection deserialization.
    pub fn containers(&self) -> &ContainerRegistry {
        &self.containers
    }

    /// Register a combined serializer/deserializer for `T`.
    pub fn register_serdes<T, S>(&self, serdes: S) -> Result<Registration, SerdesError>
    where
        T: 'static,
        S: Serializer<Value = T> + Deserializer<Value = T> + 'static,
    {
        self.serdes.register_serdes::<T, S>(serdes)
    }

    /// Register a serializer for `T`.
    pub fn register_serializer<T, S>(&self, serializer: S) -> Result<Registration, SerdesError>
    where
        T: 'static,
        S: Serializer<Value = T> + 'static,
    {
        self.serdes.register_serializer::<T, S>(serializer)
    }

    /// Register a deserializer for `T`.
    pub fn register_deserializer<T, D>(&self, deserializer: D) -> Result<Registration, SerdesError>
    where
        T: 'static,
        D: Deserializer<Value = T> + 'static,
    {
        self.serdes.register_deserializer::<T, D>(deserializer)
    }

    /// A request builder with body type `Req` and response type `Res`.
    pub fn request<Req, Res>(&self) -> RequestBuilder<Req, Res>
    where
        Req: 'static,
        Res: 'static,
    {
        RequestBuilder::new(
            self.serdes.clone(),
            self.containers.clone(),
            Rc::clone(&self.transport),
        )
    }

    // -- Request aliases --

    pub fn get<Res: 'static>(
        &self,
        path: &str,
        on_result: impl FnOnce(Result<Res, RequestError>) + 'static,
    ) {
        self.request::<(), Res>().path(path).get(on_result);
    }

    pub fn post<Req: 'static, Res: 'static>(
        &self,
        path: &str,
        body: &Req,
        on_result: impl FnOnce(Result<Res, RequestError>) + 'static,
    ) {
        self.request::<Req, Res>().path(path).post(body, on_result);
    }

    pub fn put<Req: 'static, Res: 'static>(
        &self,
        path: &str,
        body: &Req,
        on_result: impl FnOnce(Result<Res, RequestError>) + 'static,
    ) {
        self.request::<Req, Res>().path(path).put(body, on_result);
    }

    pub fn delete<Res: 'static>(
        &self,
        path: &str,
        on_result: impl FnOnce(Result<Res, RequestError>) + 'static,
    ) {
        self.request::<(), Res>().path(path).delete(on_result);
    }
}

fn bootstrap(registry: &SerdesRegistry) {
    // Built-in pattern lists are compile-time constants; registration
    // cannot fail.
    registry
        .register_serdes::<String, _>(JsonStringSerdes)
        .expect("built-in serdes patterns are valid");
    registry
        .register_serdes::<JsonNumber, _>(JsonNumberSerdes)
        .expect("built-in serdes patterns are valid");
    registry
        .register_serdes::<bool, _>(JsonBooleanSerdes)
        .expect("built-in serdes patterns are valid");
    registry
        .register_serdes::<(), _>(VoidSerdes)
        .expect("built-in serdes patterns are valid");
    registry
        .register_serdes::<serde_json::Value, _>(RawJsonSerdes)
        .expect("built-in serdes patterns are valid");
}
