//! Fluent HTTP client with content-negotiated request and response bodies.
//!
//! # Architecture
//!
//! [`Client`] owns a [`SerdesRegistry`] (bootstrapped with serdes for
//! strings, numbers, booleans, void and raw JSON values), a
//! [`ContainerRegistry`] for collection bodies, and a [`Transport`] handle.
//! [`RequestBuilder`] serializes the request body through the registry,
//! hands the wire request to the transport, and on completion picks a
//! deserializer by the response's Content-Type header; the most specific
//! registered media type pattern wins.
//!
//! The crate assumes a single-threaded cooperative execution model: the
//! transport completes asynchronously, and decoding runs synchronously on
//! the turn that delivers the response.
//!
//! # Example
//!
//! ```rust,ignore
//! use restio::{Client, ContainerKind};
//!
//! let client = Client::new(transport);
//! client.register_serdes::<Book, _>(JsonObjectSerdes::new(BookMapper))?;
//!
//! client.request::<(), Book>()
//!     .path("/books/1")
//!     .get(|result| match result {
//!         Ok(book) => println!("{}", book.title),
//!         Err(err) => eprintln!("request failed: {err}"),
//!     });
//! ```

mod client;
mod error;
mod request;
mod transport;

pub use client::Client;
pub use error::RequestError;
pub use request::{RequestBuilder, DEFAULT_MEDIA_TYPE};
pub use transport::{Transport, TransportCallback, TransportError, WireRequest, WireResponse};

pub use restio_serdes::{
    Container, ContainerKind, ContainerRegistry, DeserializationContext, Deserializer, Headers,
    JsonObjectSerdes, JsonRecordMapper, JsonRecordReader, JsonRecordWriter, MediaTypePattern,
    Registration, SerdesError, SerdesRegistry, SerializationContext, Serializer,
};

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::transport::TransportCallback;

    /// Transport double: replies to every request with a canned response
    /// and records what was sent.
    struct StubTransport {
        reply: Result<WireResponse, TransportError>,
        seen: Rc<RefCell<Vec<WireRequest>>>,
    }

    impl StubTransport {
        fn replying(status: u16, content_type: &str, body: &str) -> (Self, Rc<RefCell<Vec<WireRequest>>>) {
            let mut headers = Headers::new();
            headers.set("Content-Type", content_type);
            let seen = Rc::new(RefCell::new(Vec::new()));
            (
                Self {
                    reply: Ok(WireResponse::new(status, headers, body.as_bytes().to_vec())),
                    seen: Rc::clone(&seen),
                },
                seen,
            )
        }

        fn failing(error: TransportError) -> Self {
            Self {
                reply: Err(error),
                seen: Rc::new(RefCell::new(Vec::new())),
            }
        }
    }

    impl Transport for StubTransport {
        fn send(&mut self, request: WireRequest, done: TransportCallback) {
            self.seen.borrow_mut().push(request);
            done(self.reply.clone());
        }
    }

    fn observed<T: 'static>(slot: &Rc<RefCell<Option<T>>>) -> impl FnOnce(Result<T, RequestError>) + 'static {
        let slot = Rc::clone(slot);
        move |result| {
            *slot.borrow_mut() = Some(result.unwrap());
        }
    }

    #[test]
    fn test_get_string_round_trip() {
        let (transport, seen) = StubTransport::replying(200, "application/json", "\"pong\"");
        let client = Client::new(transport);

        let got = Rc::new(RefCell::new(None));
        client.get::<String>("/ping", observed(&got));

        assert_eq!(got.borrow().as_deref(), Some("pong"));
        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].method, "GET");
        assert_eq!(seen[0].path, "/ping");
        assert_eq!(seen[0].body, None);
        assert_eq!(seen[0].headers.get("Accept"), Some("application/json"));
    }

    #[test]
    fn test_post_serializes_body_with_default_content_type() {
        let (transport, seen) = StubTransport::replying(200, "application/json", "true");
        let client = Client::new(transport);

        let got = Rc::new(RefCell::new(None));
        client.post::<String, bool>("/check", &"payload".to_string(), observed(&got));

        assert_eq!(*got.borrow(), Some(true));
        let seen = seen.borrow();
        assert_eq!(seen[0].body.as_deref(), Some("\"payload\""));
        assert_eq!(seen[0].headers.get("Content-Type"), Some("application/json"));
    }

    #[test]
    fn test_void_body_sends_no_body() {
        let (transport, seen) = StubTransport::replying(204, "application/json", "");
        let client = Client::new(transport);

        let done = Rc::new(RefCell::new(None));
        client.post::<(), ()>("/touch", &(), observed(&done));

        assert_eq!(*done.borrow(), Some(()));
        let seen = seen.borrow();
        assert_eq!(seen[0].body, None);
        // No body, no Content-Type.
        assert_eq!(seen[0].headers.get("Content-Type"), None);
    }

    #[test]
    fn test_non_2xx_is_status_error() {
        let (transport, _) = StubTransport::replying(404, "text/plain", "missing");
        let client = Client::new(transport);

        let got: Rc<RefCell<Option<Result<String, RequestError>>>> =
            Rc::new(RefCell::new(None));
        let slot = Rc::clone(&got);
        client.get::<String>("/gone", move |result| {
            *slot.borrow_mut() = Some(result);
        });

        assert_eq!(
            *got.borrow(),
            Some(Err(RequestError::Status {
                status: 404,
                body: "missing".into()
            }))
        );
    }

    #[test]
    fn test_transport_failure_reaches_callback() {
        let client = Client::new(StubTransport::failing(TransportError::Timeout));

        let got: Rc<RefCell<Option<Result<String, RequestError>>>> =
            Rc::new(RefCell::new(None));
        let slot = Rc::clone(&got);
        client.get::<String>("/slow", move |result| {
            *slot.borrow_mut() = Some(result);
        });

        assert_eq!(
            *got.borrow(),
            Some(Err(RequestError::Transport(TransportError::Timeout)))
        );
    }

    #[test]
    fn test_unregistered_response_type_fails_before_send() {
        struct Unregistered;
        let (transport, seen) = StubTransport::replying(200, "application/json", "{}");
        let client = Client::new(transport);

        let failed = Rc::new(RefCell::new(false));
        let slot = Rc::clone(&failed);
        // Serializer lookup for the body type fails before the transport
        // is invoked.
        client
            .request::<Unregistered, String>()
            .path("/nope")
            .post(&Unregistered, move |result| {
                assert!(matches!(
                    result,
                    Err(RequestError::Serdes(SerdesError::NoSerdesRegistered { .. }))
                ));
                *slot.borrow_mut() = true;
            });

        assert!(*failed.borrow());
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_malformed_body_is_unable_to_deserialize() {
        let (transport, _) = StubTransport::replying(200, "application/json", "not-json");
        let client = Client::new(transport);

        let got = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&got);
        client.get::<serde_json::Value>("/raw", move |result| {
            *slot.borrow_mut() = Some(result);
        });

        assert!(matches!(
            got.borrow().as_ref(),
            Some(Err(RequestError::Serdes(SerdesError::UnableToDeserialize(_))))
        ));
    }

    #[test]
    fn test_get_collection_of_strings() {
        let (transport, _) =
            StubTransport::replying(200, "application/json", r#"["a","b","a"]"#);
        let client = Client::new(transport);

        let got = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&got);
        client
            .request::<(), String>()
            .path("/tags")
            .get_collection(ContainerKind::Set, move |result| {
                *slot.borrow_mut() = Some(result.unwrap());
            });

        let container = got.borrow_mut().take().unwrap();
        assert_eq!(container.kind(), ContainerKind::Set);
        assert_eq!(container.into_vec(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_response_content_type_picks_deserializer() {
        // Server replies with a content type only matched by a wildcard
        // binding; the raw JSON serdes is bound to application/json only,
        // so the lookup must fail.
        let (transport, _) = StubTransport::replying(200, "text/csv", "a,b");
        let client = Client::new(transport);

        let got = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&got);
        client.get::<String>("/csv", move |result| {
            *slot.borrow_mut() = Some(result);
        });

        assert!(matches!(
            got.borrow().as_ref(),
            Some(Err(RequestError::Serdes(SerdesError::NoSerdesRegistered { .. })))
        ));
    }
}
