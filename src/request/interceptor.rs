//! Per-endpoint side effects at each request lifecycle transition.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;

use crate::error::RequestError;
use crate::transport::{Endpoints, ResponseResult};

/// Hooks invoked by the request store for one endpoint name.
///
/// Every method defaults to a no-op; implement the ones you need.
pub trait Interceptor: Send + Sync {
    /// The request went into its loading state.
    fn on_dispatch(&self, _key: &str, _endpoints: &Endpoints, _payload: Option<&Value>) {}

    /// The request settled successfully. `data` is the raw response data.
    fn on_data(
        &self,
        _key: &str,
        _endpoints: &Endpoints,
        _payload: Option<&Value>,
        _data: &ResponseResult,
    ) {
    }

    fn on_error(
        &self,
        _key: &str,
        _endpoints: &Endpoints,
        _payload: Option<&Value>,
        _error: &RequestError,
    ) {
    }
}

type DispatchFn = Box<dyn Fn(&str, &Endpoints, Option<&Value>) + Send + Sync>;
type DataFn = Box<dyn Fn(&str, &Endpoints, Option<&Value>, &ResponseResult) + Send + Sync>;
type ErrorFn = Box<dyn Fn(&str, &Endpoints, Option<&Value>, &RequestError) + Send + Sync>;

/// An interceptor assembled from optional closures.
///
/// ```
/// use superbia_store::Callbacks;
///
/// let interceptor = Callbacks::new()
///     .on_dispatch(|key, _, _| println!("{} loading", key))
///     .on_error(|key, _, _, error| eprintln!("{} failed: {}", key, error));
/// ```
#[derive(Default)]
pub struct Callbacks {
    dispatch: Option<DispatchFn>,
    data: Option<DataFn>,
    error: Option<ErrorFn>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_dispatch<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &Endpoints, Option<&Value>) + Send + Sync + 'static,
    {
        self.dispatch = Some(Box::new(f));
        self
    }

    pub fn on_data<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &Endpoints, Option<&Value>, &ResponseResult) + Send + Sync + 'static,
    {
        self.data = Some(Box::new(f));
        self
    }

    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &Endpoints, Option<&Value>, &RequestError) + Send + Sync + 'static,
    {
        self.error = Some(Box::new(f));
        self
    }
}

impl Interceptor for Callbacks {
    fn on_dispatch(&self, key: &str, endpoints: &Endpoints, payload: Option<&Value>) {
        if let Some(f) = &self.dispatch {
            f(key, endpoints, payload);
        }
    }

    fn on_data(
        &self,
        key: &str,
        endpoints: &Endpoints,
        payload: Option<&Value>,
        data: &ResponseResult,
    ) {
        if let Some(f) = &self.data {
            f(key, endpoints, payload, data);
        }
    }

    fn on_error(
        &self,
        key: &str,
        endpoints: &Endpoints,
        payload: Option<&Value>,
        error: &RequestError,
    ) {
        if let Some(f) = &self.error {
            f(key, endpoints, payload, error);
        }
    }
}

/// Interceptor that logs lifecycle transitions to `tracing` or a buffer.
#[derive(Default)]
pub struct LogInterceptor {
    buffer: Option<Arc<Mutex<Vec<String>>>>,
}

impl LogInterceptor {
    pub fn new() -> Self {
        LogInterceptor { buffer: None }
    }

    pub fn with_buffer(buffer: Arc<Mutex<Vec<String>>>) -> Self {
        LogInterceptor {
            buffer: Some(buffer),
        }
    }

    fn log(&self, phase: &str, key: &str, endpoints: &Endpoints) {
        let names: Vec<&str> = endpoints.keys().map(String::as_str).collect();
        let line = format!("[REQUEST] {} {} {}", phase, key, names.join(","));
        match &self.buffer {
            Some(buffer) => buffer
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(line),
            None => tracing::info!("{}", line),
        }
    }
}

impl Interceptor for LogInterceptor {
    fn on_dispatch(&self, key: &str, endpoints: &Endpoints, _payload: Option<&Value>) {
        self.log("dispatch", key, endpoints);
    }

    fn on_data(
        &self,
        key: &str,
        endpoints: &Endpoints,
        _payload: Option<&Value>,
        _data: &ResponseResult,
    ) {
        self.log("data", key, endpoints);
    }

    fn on_error(
        &self,
        key: &str,
        endpoints: &Endpoints,
        _payload: Option<&Value>,
        error: &RequestError,
    ) {
        self.log(&format!("error({})", error), key, endpoints);
    }
}

/// `endpoint name -> interceptor`. Empty by default.
#[derive(Clone, Default)]
pub struct Interceptors {
    by_endpoint: HashMap<String, Arc<dyn Interceptor>>,
}

impl Interceptors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `interceptor` for `endpoint`, replacing any previous one.
    pub fn with<I>(mut self, endpoint: impl Into<String>, interceptor: I) -> Self
    where
        I: Interceptor + 'static,
    {
        self.insert(endpoint, Arc::new(interceptor));
        self
    }

    pub fn insert(&mut self, endpoint: impl Into<String>, interceptor: Arc<dyn Interceptor>) {
        self.by_endpoint.insert(endpoint.into(), interceptor);
    }

    pub fn remove(&mut self, endpoint: &str) -> bool {
        self.by_endpoint.remove(endpoint).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.by_endpoint.is_empty()
    }

    pub(crate) fn dispatch(
        &self,
        targets: &[&str],
        key: &str,
        endpoints: &Endpoints,
        payload: Option<&Value>,
    ) {
        for interceptor in self.matching(targets) {
            interceptor.on_dispatch(key, endpoints, payload);
        }
    }

    pub(crate) fn data(
        &self,
        targets: &[&str],
        key: &str,
        endpoints: &Endpoints,
        payload: Option<&Value>,
        data: &ResponseResult,
    ) {
        for interceptor in self.matching(targets) {
            interceptor.on_data(key, endpoints, payload, data);
        }
    }

    pub(crate) fn error(
        &self,
        targets: &[&str],
        key: &str,
        endpoints: &Endpoints,
        payload: Option<&Value>,
        error: &RequestError,
    ) {
        for interceptor in self.matching(targets) {
            interceptor.on_error(key, endpoints, payload, error);
        }
    }

    fn matching<'a>(
        &'a self,
        targets: &'a [&'a str],
    ) -> impl Iterator<Item = &'a Arc<dyn Interceptor>> {
        targets
            .iter()
            .filter_map(move |name| self.by_endpoint.get(*name))
    }
}
