//! Errors surfaced on a request's failure channel.

use restio_serdes::SerdesError;

use crate::transport::TransportError;

/// Failure delivered to a request callback.
///
/// Serialization and transport failures stay separate variants so callers
/// can attribute them independently; none are retried internally.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// Registry lookup or body processing failure.
    #[error("serdes error: {0}")]
    Serdes(#[from] SerdesError),

    /// Failure reported by the transport.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The server answered with a non-2xx status.
    #[error("unexpected status {status}")]
    Status { status: u16, body: String },

    /// The response body was not valid UTF-8 text.
    #[error("response body is not utf-8 text")]
    BodyNotText,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_sources_stay_attributable() {
        let serdes: RequestError = SerdesError::UnableToDeserialize("bad".into()).into();
        assert!(matches!(serdes, RequestError::Serdes(_)));

        let transport: RequestError = TransportError::Timeout.into();
        assert!(matches!(transport, RequestError::Transport(_)));
    }

    #[test]
    fn test_status_display() {
        let err = RequestError::Status {
            status: 404,
            body: "not found".into(),
        };
        assert_eq!(format!("{err}"), "unexpected status 404");
    }
}
