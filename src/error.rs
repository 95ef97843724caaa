use std::fmt;

use serde::{Deserialize, Serialize};

/// Programmer-facing failures, returned to the immediate caller and never
/// written into a request record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// `load_more` on a key that has no record yet.
    NotInitialized { key: String },
    /// `load_more` on a record still in its loading state.
    Loading { key: String },
    /// `load_more` on a record holding an error.
    Errored { key: String },
    /// A trigger was called without a requester behind it.
    MissingRequester { key: String },
    /// The endpoint set sent with `load_more` was empty.
    EmptyEndpoints,
    /// The paginated endpoint is not part of the stored result.
    EndpointNotInResult { endpoint: String },
    /// The stored value for the endpoint is not a pagination result.
    NotPagination { endpoint: String },
    /// The transport finished without firing the one-shot request hook.
    HookNotFired,
    LockPoisoned(&'static str),
    Serde(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotInitialized { key } => {
                write!(f, "request {} not initialized yet", key)
            }
            ApiError::Loading { key } => write!(f, "request {} is in \"loading\" state", key),
            ApiError::Errored { key } => write!(f, "request {} is in \"error\" state", key),
            ApiError::MissingRequester { key } => {
                write!(f, "no requester defined for request {}", key)
            }
            ApiError::EmptyEndpoints => write!(f, "argument \"endpoints\" can't be empty"),
            ApiError::EndpointNotInResult { endpoint } => {
                write!(f, "endpoint \"{}\" not in request result", endpoint)
            }
            ApiError::NotPagination { endpoint } => {
                write!(f, "endpoint \"{}\" is not of pagination type", endpoint)
            }
            ApiError::HookNotFired => {
                write!(f, "transport completed without invoking the request hook")
            }
            ApiError::LockPoisoned(operation) => {
                write!(f, "store lock poisoned during {}", operation)
            }
            ApiError::Serde(msg) => write!(f, "serialization error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Serde(err.to_string())
    }
}

/// Data-facing failures of a request, captured into records for the UI to
/// render. Cloneable and serializable so records can be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum RequestError {
    /// The request never reached the server or the connection broke.
    Transport(String),
    /// The server answered with an error.
    Server(String),
    /// The response did not have the expected shape.
    Decode(String),
    /// A pre-send hook refused the request.
    Aborted(String),
}

impl RequestError {
    pub fn message(&self) -> &str {
        match self {
            RequestError::Transport(msg)
            | RequestError::Server(msg)
            | RequestError::Decode(msg)
            | RequestError::Aborted(msg) => msg,
        }
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::Transport(msg) => write!(f, "transport error: {}", msg),
            RequestError::Server(msg) => write!(f, "server error: {}", msg),
            RequestError::Decode(msg) => write!(f, "unexpected response shape: {}", msg),
            RequestError::Aborted(msg) => write!(f, "request aborted: {}", msg),
        }
    }
}

impl std::error::Error for RequestError {}

impl From<serde_json::Error> for RequestError {
    fn from(err: serde_json::Error) -> Self {
        RequestError::Decode(err.to_string())
    }
}
