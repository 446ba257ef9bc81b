//! Transport collaborator contract.
//!
//! The client core never performs I/O itself: it hands a [`WireRequest`] to
//! a [`Transport`] and gets the outcome back through a completion callback,
//! keeping transport failures attributable separately from serialization
//! failures.

use bytes::Bytes;
use restio_serdes::Headers;

/// Outgoing request as handed to the transport: method, target, headers and
/// an optional already-serialized text body.
#[derive(Debug, Clone)]
pub struct WireRequest {
    pub method: String,
    pub path: String,
    pub headers: Headers,
    pub body: Option<String>,
    /// Timeout in milliseconds; 0 means no timeout.
    pub timeout_ms: u32,
}

/// Response as delivered by the transport.
#[derive(Debug, Clone)]
pub struct WireResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: Bytes,
}

impl WireResponse {
    pub fn new(status: u16, headers: Headers, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// The body as UTF-8 text, or `None` when it is not valid UTF-8.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }
}

/// Failure reported by the transport, distinct from serialization errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The connection could not be established.
    #[error("connect failed: {0}")]
    Connect(String),

    /// The connection dropped before a full response arrived.
    #[error("connection closed")]
    ConnectionClosed,

    /// The request timed out.
    #[error("timeout")]
    Timeout,

    /// Transport-specific failure.
    #[error("transport error: {0}")]
    Other(String),
}

/// Completion callback handed to [`Transport::send`]; invoked exactly once.
pub type TransportCallback = Box<dyn FnOnce(Result<WireResponse, TransportError>)>;

/// Issues the actual network call.
///
/// Implementations must invoke `done` exactly once, with either the full
/// response or a [`TransportError`], and never both. The callback may run
/// synchronously (test doubles) or on a later event-loop turn.
pub trait Transport {
    fn send(&mut self, request: WireRequest, done: TransportCallback);
}
