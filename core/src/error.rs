//! Error type shared by every yd4b operation.
//!
//! # Design
//! Every failure is reported as an `ApiError` carrying an HTTP-style status
//! code and a short message. Remote failures keep the status the server sent;
//! local failures (endpoint construction, encoding, transport, decoding) use
//! 500. The underlying cause, when there is one, stays reachable through
//! `std::error::Error::source`. `ErrorKind` lets callers branch on the failure
//! class without matching on message text.

use serde::Serialize;

use crate::http::BoxError;

/// Status code used for failures that happen on this side of the wire.
pub const LOCAL_FAILURE_STATUS: u16 = 500;

/// Which stage of a call produced an `ApiError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The endpoint URL could not be built from the configured origin.
    Endpoint,
    /// The request body could not be serialized.
    Encode,
    /// The transport failed to produce a response.
    Transport,
    /// The server answered with a status other than 200.
    Status,
    /// The response body did not match the expected JSON shape.
    Decode,
    /// Constructed directly by a caller.
    Other,
}

/// Uniform error returned by `Yd4bClient` operations.
#[derive(Debug, thiserror::Error, Serialize)]
#[error("{message}")]
pub struct ApiError {
    pub status_code: u16,
    pub message: String,
    #[serde(skip)]
    kind: ErrorKind,
    #[serde(skip)]
    #[source]
    source: Option<BoxError>,
}

impl ApiError {
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
            kind: ErrorKind::Other,
            source: None,
        }
    }

    pub(crate) fn local(kind: ErrorKind, message: &str, source: impl Into<BoxError>) -> Self {
        Self {
            status_code: LOCAL_FAILURE_STATUS,
            message: message.to_string(),
            kind,
            source: Some(source.into()),
        }
    }

    pub(crate) fn endpoint(source: impl Into<BoxError>) -> Self {
        Self::local(ErrorKind::Endpoint, "endpoint error", source)
    }

    pub(crate) fn encode(source: serde_json::Error) -> Self {
        Self::local(ErrorKind::Encode, "json encoding error", source)
    }

    pub(crate) fn transport(source: BoxError) -> Self {
        Self::local(ErrorKind::Transport, "client do error", source)
    }

    pub(crate) fn decode(source: serde_json::Error) -> Self {
        Self::local(ErrorKind::Decode, "json decoding error", source)
    }

    pub(crate) fn unexpected_status(status_code: u16) -> Self {
        Self {
            status_code,
            message: "unexpected status code".to_string(),
            kind: ErrorKind::Status,
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Serialize as `{"status_code":..,"message":..}` for logging or relaying.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
