//! Transport - the contract the stores expect from an API client.
//!
//! The wire protocol is not implemented here. A transport sends an endpoint
//! set, resolves with a map of `endpoint name -> raw result`, and exposes
//! three observation points:
//!
//! ```text
//!   once_request(hook) ──► fires synchronously right before the next send,
//!                          exactly once; an Err aborts that send
//!   on_request(listener) ─► per request: listener gets a CallEmitter that
//!                          emits "result" when the response data arrives
//!   on_subscribe(listener) per subscription: same, but results keep coming
//! ```
//!
//! [`InMemoryTransport`] is a scripted implementation for tests and
//! single-process use.

mod emitter;
mod in_memory;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::RequestError;

pub use emitter::CallEmitter;
pub use in_memory::{DeferredResponse, InMemoryTransport};

/// Endpoints of one request: `endpoint name -> arguments`.
pub type Endpoints = Map<String, Value>;

/// Raw response data: `endpoint name -> raw result`.
pub type ResponseResult = Map<String, Value>;

pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Response, RequestError>> + Send + 'a>>;

/// One-shot pre-send hook. Returning `Err` aborts the send and the request
/// resolves with that error.
pub type RequestHook = Box<dyn FnOnce(&Endpoints) -> Result<(), RequestError> + Send>;

/// Called with the endpoint set and the per-call emitter of every request
/// or subscription.
pub type CallListener = Arc<dyn Fn(&Endpoints, &CallEmitter) + Send + Sync>;

/// Response envelope returned by [`Transport::request`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    data: ResponseResult,
}

impl Response {
    pub fn new(data: ResponseResult) -> Self {
        Self { data }
    }

    /// Build a response from a JSON object. Non-object values yield an empty
    /// response.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(data) => Self { data },
            _ => Self::default(),
        }
    }

    pub fn data(&self) -> &ResponseResult {
        &self.data
    }

    pub fn into_data(self) -> ResponseResult {
        self.data
    }
}

/// An API client the stores can drive.
pub trait Transport: Send + Sync {
    /// Send `endpoints` and resolve with the response data.
    fn request(&self, endpoints: Endpoints) -> TransportFuture<'_>;

    /// Register a hook for the next request only. There is a single slot:
    /// registering again before a send replaces the pending hook.
    fn once_request(&self, hook: RequestHook);

    fn on_request(&self, listener: CallListener);

    fn on_subscribe(&self, listener: CallListener);
}
