use std::{error::Error, fmt};

use crate::input::ValidationError;

/// The dashboard client's result type.
pub type Result<T> = std::result::Result<T, ClientErr>;

/// Failures a dashboard request can end with.
///
/// A superseded metrics response is not represented here: it is dropped
/// by the controller before it can become an error.
#[derive(Debug)]
pub enum ClientErr {
    /// The request never produced a response (connect, transport or timeout).
    Network(reqwest::Error),
    /// The backend answered with a non-success status.
    Http { status: u16, endpoint: &'static str },
    /// The response body could not be read into the expected shape.
    Decode(String),
    /// A record with a non-finite field was offered for submission.
    Validation(ValidationError),
    /// A prediction is already in flight.
    Busy,
    /// The request task ended without reporting a response.
    Interrupted,
    /// The environment holds an unusable setting.
    Config(String),
}

impl fmt::Display for ClientErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientErr::Network(e) => write!(f, "network failure: {e}"),
            ClientErr::Http { status, endpoint } => {
                write!(f, "{endpoint} returned HTTP {status}")
            }
            ClientErr::Decode(msg) => write!(f, "invalid response body: {msg}"),
            ClientErr::Validation(e) => write!(f, "invalid input: {e}"),
            ClientErr::Busy => write!(f, "a prediction is already in flight"),
            ClientErr::Interrupted => write!(f, "request ended without a response"),
            ClientErr::Config(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl Error for ClientErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ClientErr::Network(e) => Some(e),
            ClientErr::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientErr {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::Decode(value.to_string())
        } else {
            Self::Network(value)
        }
    }
}

impl From<ValidationError> for ClientErr {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}
