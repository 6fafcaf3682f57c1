use std::backtrace::Backtrace;
use std::io;

use serde_json::{Map, Value};
use thiserror::Error;

/// Errors raised while building or loading a [`Config`](crate::Config)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("API version [{0}] is not supported")]
    UnsupportedVersion(u32),

    #[error("Invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },
}

/// A failed HTTP exchange.
///
/// Carries the status code and the normalized response body next to the
/// transport's message. `status_code` is 0 when no response was received at
/// all (connection refused, timeout, DNS failure).
#[derive(Debug, Error)]
#[error("Status code: [{status_code}] => {message}")]
pub struct RequestError {
    message: String,
    status_code: u16,
    response: Map<String, Value>,
    #[source]
    source: Option<reqwest::Error>,
    // Boxed: a bare `Backtrace` field makes thiserror emit a nightly-only `provide`
    trace: Box<Backtrace>,
}

impl RequestError {
    #[must_use]
    pub fn new(
        message: impl Into<String>,
        status_code: u16,
        response: Map<String, Value>,
        source: Option<reqwest::Error>,
    ) -> Self {
        Self {
            message: message.into(),
            status_code,
            response,
            source,
            trace: Box::new(Backtrace::capture()),
        }
    }

    /// Failure that never produced an HTTP response
    pub(crate) fn without_response(source: reqwest::Error) -> Self {
        Self::new(source.to_string(), 0, Map::new(), Some(source))
    }

    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    #[must_use]
    pub fn response(&self) -> &Map<String, Value> {
        &self.response
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the server answered before the exchange failed
    #[must_use]
    pub fn has_response(&self) -> bool {
        self.status_code != 0
    }

    /// Full diagnostic rendering: type name, status, message and the trace
    /// captured when the error was built.
    ///
    /// The trace is only populated when `RUST_BACKTRACE` or
    /// `RUST_LIB_BACKTRACE` is set.
    #[must_use]
    pub fn report(&self) -> String {
        format!(
            "RequestError: Status code: [{}] => {}\n{}",
            self.status_code,
            self.message.trim_end_matches('\n'),
            self.trace
        )
    }
}

/// Errors returned by the crate
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Request(Box<RequestError>),

    #[error("Request build error: {0}")]
    BuildError(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ClientError {
    /// The failed HTTP exchange, if this error is one
    #[must_use]
    pub fn as_request_error(&self) -> Option<&RequestError> {
        match self {
            ClientError::Request(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RequestError> for ClientError {
    fn from(err: RequestError) -> Self {
        ClientError::Request(Box::new(err))
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Serialization(err.to_string())
    }
}

impl From<serde_urlencoded::ser::Error> for ClientError {
    fn from(err: serde_urlencoded::ser::Error) -> Self {
        ClientError::Serialization(err.to_string())
    }
}
