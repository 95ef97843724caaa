use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RequestError;

/// Normalized result of one request: `endpoint name -> endpoint result`.
pub type RequestResult = BTreeMap<String, EndpointResult>;

/// All request records, keyed by request key.
pub type Requests = HashMap<String, RequestRecord>;

/// Lifecycle state of one named request.
///
/// ```text
/// absent ──dispatch──► loading ──ok──► done
///                         │
///                         └──err──► errored
/// done | errored ──dispatch──► loading
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestRecord {
    pub loading: bool,
    pub done: bool,
    pub result: Option<RequestResult>,
    pub error: Option<RequestError>,
}

impl RequestRecord {
    /// The record selectors see for a key that was never dispatched.
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn loading() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }

    pub fn done(result: RequestResult) -> Self {
        Self {
            loading: false,
            done: true,
            result: Some(result),
            error: None,
        }
    }

    /// A failed request keeps no result, even if an earlier dispatch had one.
    pub fn errored(error: RequestError) -> Self {
        Self {
            loading: false,
            done: false,
            result: None,
            error: Some(error),
        }
    }

    pub fn endpoint(&self, endpoint: &str) -> Option<&EndpointResult> {
        self.result.as_ref()?.get(endpoint)
    }

    pub fn pagination(&self, endpoint: &str) -> Option<&PaginationResult> {
        match self.endpoint(endpoint)? {
            EndpointResult::Pagination(pagination) => Some(pagination),
            EndpointResult::Value(_) => None,
        }
    }

    pub(crate) fn endpoint_mut(&mut self, endpoint: &str) -> Option<&mut EndpointResult> {
        self.result.as_mut()?.get_mut(endpoint)
    }

    pub(crate) fn pagination_mut(&mut self, endpoint: &str) -> Option<&mut PaginationResult> {
        match self.endpoint_mut(endpoint)? {
            EndpointResult::Pagination(pagination) => Some(pagination),
            EndpointResult::Value(_) => None,
        }
    }
}

/// Normalized result of one endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EndpointResult {
    Pagination(PaginationResult),
    Value(Value),
}

impl EndpointResult {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            EndpointResult::Value(value) => Some(value),
            EndpointResult::Pagination(_) => None,
        }
    }

    pub fn as_pagination(&self) -> Option<&PaginationResult> {
        match self {
            EndpointResult::Pagination(pagination) => Some(pagination),
            EndpointResult::Value(_) => None,
        }
    }
}

/// Accumulated pages of one paginated endpoint.
///
/// `loading` and `error` track "load more" calls and are independent of the
/// parent record's own state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PaginationResult {
    pub loading: bool,
    pub error: Option<RequestError>,
    pub result: Page,
}

impl PaginationResult {
    pub fn new(page: Page) -> Self {
        Self {
            loading: false,
            error: None,
            result: page,
        }
    }
}

/// One page, or the concatenation of every page loaded so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub nodes: Vec<Value>,
    #[serde(default)]
    pub has_next_page: bool,
    /// Opaque cursor token, kept as sent by the server.
    #[serde(default)]
    pub next_page_cursor: Option<Value>,
    /// Remaining fields of the pagination object (type name, totals, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Page {
    /// Append `next` after the nodes loaded so far. Everything except the
    /// node list is taken from `next`.
    pub fn extend(&mut self, next: Page) {
        self.nodes.extend(next.nodes);
        self.has_next_page = next.has_next_page;
        self.next_page_cursor = next.next_page_cursor;
        self.extra = next.extra;
    }
}
