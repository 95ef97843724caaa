//! Request store - lifecycle records of named requests.
//!
//! Each request key owns one [`RequestRecord`]. Endpoints whose result is a
//! pagination type carry a nested [`PaginationResult`] with its own
//! loading/error state, extended page by page through
//! [`RequestStore::load_more`].
//!
//! ```text
//! record:      absent ──► loading ──► done | errored ──► loading ...
//! pagination:  idle ──load_more──► loading ──► idle (nodes appended) | errored
//! ```
//!
//! [`Interceptors`] map endpoint names to side effects run at each
//! transition (dispatch, data, error).

mod interceptor;
mod record;
mod store;

pub use interceptor::{Callbacks, Interceptor, Interceptors, LogInterceptor};
pub use record::{
    EndpointResult, Page, PaginationResult, RequestRecord, RequestResult, Requests,
};
pub use store::RequestStore;
