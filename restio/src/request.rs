//! Fluent request builder: serializes the body through the serdes
//! registry, hands the wire request to the transport, and deserializes the
//! response by its Content-Type header.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;

use restio_serdes::{
    Container, ContainerKind, ContainerRegistry, DeserializationContext, Headers,
    SerializationContext, SerdesRegistry,
};

use crate::error::RequestError;
use crate::transport::{Transport, WireRequest, WireResponse, TransportError};

/// Media type assumed when neither the request nor the response declares
/// one.
pub const DEFAULT_MEDIA_TYPE: &str = "application/json";

/// Builder for one request with body type `Req` and response type `Res`.
///
/// Configuration methods chain by value; a terminal method (`get`, `post`,
/// `get_collection`, ...) consumes the builder and reports the outcome
/// through its callback. The response shape (single value or collection) is
/// decided by which terminal method is called. Every failure (registry
/// lookup, body processing, transport, non-2xx status) arrives on the
/// callback's failure channel; nothing panics.
pub struct RequestBuilder<Req, Res> {
    serdes: SerdesRegistry,
    containers: ContainerRegistry,
    transport: Rc<RefCell<dyn Transport>>,
    path: String,
    headers: Headers,
    timeout_ms: u32,
    _marker: PhantomData<fn(Req) -> Res>,
}

impl<Req, Res> RequestBuilder<Req, Res>
where
    Req: 'static,
    Res: 'static,
{
    pub(crate) fn new(
        serdes: SerdesRegistry,
        containers: ContainerRegistry,
        transport: Rc<RefCell<dyn Transport>>,
    ) -> Self {
        Self {
            serdes,
            containers,
            transport,
            path: String::from("/"),
            headers: Headers::new(),
            timeout_ms: 0,
            _marker: PhantomData,
        }
    }

    /// Target path (URI construction is the caller's concern).
    pub fn path(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }

    /// Set a request header.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Media type the request body is serialized as.
    pub fn content_type(self, value: &str) -> Self {
        self.header("Content-Type", value)
    }

    /// Media type requested from the server; also the fallback used to pick
    /// a deserializer when the response carries no Content-Type header.
    pub fn accept(self, value: &str) -> Self {
        self.header("Accept", value)
    }

    /// Timeout in milliseconds, forwarded to the transport; 0 disables.
    pub fn timeout(mut self, timeout_ms: u32) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    // -- Terminal methods: single response value --

    pub fn get(self, on_result: impl FnOnce(Result<Res, RequestError>) + 'static) {
        self.send_single("GET", None, on_result);
    }

    pub fn delete(self, on_result: impl FnOnce(Result<Res, RequestError>) + 'static) {
        self.send_single("DELETE", None, on_result);
    }

    pub fn post(self, body: &Req, on_result: impl FnOnce(Result<Res, RequestError>) + 'static) {
        self.send_single("POST", Some(body), on_result);
    }

    pub fn put(self, body: &Req, on_result: impl FnOnce(Result<Res, RequestError>) + 'static) {
        self.send_single("PUT", Some(body), on_result);
    }

    pub fn patch(self, body: &Req, on_result: impl FnOnce(Result<Res, RequestError>) + 'static) {
        self.send_single("PATCH", Some(body), on_result);
    }

    // -- Terminal methods: collection bodies --

    /// GET expecting a collection response of the given container shape.
    pub fn get_collection(
        self,
        kind: ContainerKind,
        on_result: impl FnOnce(Result<Container<Res>, RequestError>) + 'static,
    ) {
        self.send_collection("GET", None, kind, on_result);
    }

    /// POST a collection body, expecting a single response value.
    pub fn post_collection(
        self,
        body: &Container<Req>,
        on_result: impl FnOnce(Result<Res, RequestError>) + 'static,
    ) {
        self.send_single_with_body(
            "POST",
            |builder| builder.encode_collection(body),
            on_result,
        );
    }

    /// PUT a collection body, expecting a single response value.
    pub fn put_collection(
        self,
        body: &Container<Req>,
        on_result: impl FnOnce(Result<Res, RequestError>) + 'static,
    ) {
        self.send_single_with_body(
            "PUT",
            |builder| builder.encode_collection(body),
            on_result,
        );
    }

    // -- Send plumbing --

    fn send_single(
        self,
        method: &str,
        body: Option<&Req>,
        on_result: impl FnOnce(Result<Res, RequestError>) + 'static,
    ) {
        self.send_single_with_body(method, |builder| builder.encode_single(body), on_result);
    }

    fn send_single_with_body(
        self,
        method: &str,
        encode: impl FnOnce(&Self) -> Result<Option<String>, RequestError>,
        on_result: impl FnOnce(Result<Res, RequestError>) + 'static,
    ) {
        let body = match encode(&self) {
            Ok(body) => body,
            Err(err) => {
                on_result(Err(err));
                return;
            }
        };
        let serdes = self.serdes.clone();
        let containers = self.containers.clone();
        let fallback = self.accept_fallback();
        self.dispatch(
            method,
            body,
            Box::new(move |result| {
                on_result(decode_single::<Res>(&serdes, &containers, &fallback, result));
            }),
        );
    }

    fn send_collection(
        self,
        method: &str,
        body: Option<&Req>,
        kind: ContainerKind,
        on_result: impl FnOnce(Result<Container<Res>, RequestError>) + 'static,
    ) {
        let body = match self.encode_single(body) {
            Ok(body) => body,
            Err(err) => {
                on_result(Err(err));
                return;
            }
        };
        let serdes = self.serdes.clone();
        let containers = self.containers.clone();
        let fallback = self.accept_fallback();
        self.dispatch(
            method,
            body,
            Box::new(move |result| {
                on_result(decode_collection::<Res>(
                    &serdes,
                    &containers,
                    &fallback,
                    kind,
                    result,
                ));
            }),
        );
    }

    fn dispatch(
        self,
        method: &str,
        body: Option<String>,
        done: Box<dyn FnOnce(Result<WireResponse, TransportError>)>,
    ) {
        let mut headers = self.headers.clone();
        if body.is_some() && !headers.contains("Content-Type") {
            headers.set("Content-Type", DEFAULT_MEDIA_TYPE);
        }
        if !headers.contains("Accept") {
            headers.set("Accept", DEFAULT_MEDIA_TYPE);
        }
        let request = WireRequest {
            method: method.to_string(),
            path: self.path.clone(),
            headers,
            body,
            timeout_ms: self.timeout_ms,
        };
        self.transport.borrow_mut().send(request, done);
    }

    fn encode_single(&self, body: Option<&Req>) -> Result<Option<String>, RequestError> {
        let body = match body {
            Some(body) => body,
            None => return Ok(None),
        };
        let serializer = self.serdes.serializer_for::<Req>(self.request_content_type())?;
        let ctx = SerializationContext::of(&self.headers);
        Ok(non_empty(serializer.serialize(body, &ctx)?))
    }

    fn encode_collection(&self, body: &Container<Req>) -> Result<Option<String>, RequestError> {
        let serializer = self.serdes.serializer_for::<Req>(self.request_content_type())?;
        let ctx = SerializationContext::of(&self.headers);
        Ok(non_empty(serializer.serialize_collection(body, &ctx)?))
    }

    fn request_content_type(&self) -> &str {
        self.headers.get("Content-Type").unwrap_or(DEFAULT_MEDIA_TYPE)
    }

    /// Content type assumed for the response when the server sends none.
    fn accept_fallback(&self) -> String {
        self.headers
            .get("Accept")
            .unwrap_or(DEFAULT_MEDIA_TYPE)
            .to_string()
    }
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn checked_body<'a>(
    response: &'a WireResponse,
    fallback_accept: &'a str,
) -> Result<(&'a str, &'a str), RequestError> {
    if !(200..300).contains(&response.status) {
        return Err(RequestError::Status {
            status: response.status,
            body: response.text().unwrap_or_default().to_string(),
        });
    }
    let text = response.text().ok_or(RequestError::BodyNotText)?;
    let content_type = response.headers.get("Content-Type").unwrap_or(fallback_accept);
    Ok((text, content_type))
}

fn decode_single<Res: 'static>(
    serdes: &SerdesRegistry,
    containers: &ContainerRegistry,
    fallback_accept: &str,
    result: Result<WireResponse, TransportError>,
) -> Result<Res, RequestError> {
    let response = result?;
    let (text, content_type) = checked_body(&response, fallback_accept)?;
    let deserializer = serdes.deserializer_for::<Res>(content_type)?;
    let ctx = DeserializationContext::of(&response.headers, containers);
    Ok(deserializer.deserialize(text, &ctx)?)
}

fn decode_collection<Res: 'static>(
    serdes: &SerdesRegistry,
    containers: &ContainerRegistry,
    fallback_accept: &str,
    kind: ContainerKind,
    result: Result<WireResponse, TransportError>,
) -> Result<Container<Res>, RequestError> {
    let response = result?;
    let (text, content_type) = checked_body(&response, fallback_accept)?;
    let deserializer = serdes.deserializer_for::<Res>(content_type)?;
    let ctx = DeserializationContext::of(&response.headers, containers);
    Ok(deserializer.deserialize_collection(kind, text, &ctx)?)
}
