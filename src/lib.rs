//! Normalized document cache and request lifecycle store for GraphQL-like
//! API clients.
//!
//! Raw responses are flattened into a `type -> id -> document` table, with
//! nested documents replaced by their id. Named requests are tracked as
//! records (loading, done, errored), and paginated endpoints accumulate
//! pages in place. Both stores notify listeners on change, and the [`Api`]
//! facade exposes them to a UI layer through selectors and triggers.

mod api;
mod config;
mod document;
mod error;
mod key;
mod normalize;
mod notifier;
mod request;
mod transport;

#[cfg(feature = "emitter")]
pub mod emitter;

pub use api::{requester, Api, LoadTrigger, PersistedState, RequestTrigger, Requester};
pub use config::{ApiConfig, DocumentKeys};
pub use document::DocumentStore;
pub use error::{ApiError, RequestError};
pub use key::{KeyGenerator, RequestKey, SequentialKeys, UuidKeys};
pub use normalize::{Documents, Normalizer};
pub use notifier::{ListenerId, Notifier};
pub use request::{
    Callbacks, EndpointResult, Interceptor, Interceptors, LogInterceptor, Page,
    PaginationResult, RequestRecord, RequestResult, RequestStore, Requests,
};
pub use transport::{
    CallEmitter, CallListener, DeferredResponse, Endpoints, InMemoryTransport, RequestHook,
    Response, ResponseResult, Transport, TransportFuture,
};

// Re-export the EventEmitter from the event_emitter_rs crate
#[cfg(feature = "emitter")]
pub use event_emitter_rs::EventEmitter;
