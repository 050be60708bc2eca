//! Error types for catalog lookups.

use serde_json::Value;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong between issuing a request and holding a mapped value.
#[derive(Debug, Error)]
pub enum Error {
    /// The endpoint could not be reached or the body could not be read
    #[error("transport error: {message}")]
    Transport { message: String },

    /// Non-success status with a body that is not a service error document
    #[error("server answered {status} for {url}")]
    Status { status: u16, url: String },

    /// Body is not JSON, or lacks a required field
    #[error("malformed payload: {message}")]
    Decode { message: String },

    /// Payload decoded but breaks a mapping precondition
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// The web service rejected the request (top-level "Error" key)
    #[error("web service error: {payload}")]
    Service { payload: Value },

    #[error("configuration error: {message}")]
    Config { message: String },
}

impl Error {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Error::Invalid {
            field,
            reason: reason.into(),
        }
    }

    /// Returns true if the API could not be reached or answered with a bad status.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport { .. } | Error::Status { .. })
    }

    /// Returns true if the payload could not be turned into domain values.
    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Decode { .. } | Error::Invalid { .. })
    }

    /// Returns true if the remote service refused the request, e.g. an unknown course code.
    pub fn is_service(&self) -> bool {
        matches!(self, Error::Service { .. })
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode {
            message: err.to_string(),
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Config {
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::Config {
            message: format!("bad base url: {err}"),
        }
    }
}
