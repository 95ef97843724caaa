use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde_json::Value;

use super::interceptor::{Interceptor, Interceptors};
use super::record::{
    EndpointResult, Page, PaginationResult, RequestRecord, RequestResult, Requests,
};
use crate::config::ApiConfig;
use crate::error::{ApiError, RequestError};
use crate::key::{KeyGenerator, UuidKeys};
use crate::normalize::{Documents, Normalizer};
use crate::notifier::Notifier;
use crate::transport::{Endpoints, ResponseResult, Transport};

/// Outcome of the pre-send hook registered by `load_more`.
type HookOutcome = Arc<Mutex<Option<Result<String, ApiError>>>>;

/// Disarms a registered pre-send hook when dropped. A disarmed hook left in
/// the transport's slot lets the next request through untouched.
struct HookGuard(Arc<AtomicBool>);

impl Drop for HookGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Keyed table of request records and the operations that drive them.
///
/// Clone-friendly via Arc; clones share records, interceptors and notifier.
#[derive(Clone)]
pub struct RequestStore {
    records: Arc<RwLock<Requests>>,
    /// Latest dispatch ticket per key. Outcomes of older tickets are dropped.
    tickets: Arc<Mutex<HashMap<String, u64>>>,
    next_ticket: Arc<AtomicU64>,
    interceptors: Arc<RwLock<Interceptors>>,
    transport: Arc<dyn Transport>,
    keys: Arc<dyn KeyGenerator>,
    normalizer: Normalizer,
    config: ApiConfig,
    notifier: Notifier,
    /// Serializes `load_more` so only one one-shot hook is pending at a time.
    load_gate: Arc<tokio::sync::Mutex<()>>,
}

impl RequestStore {
    pub fn new(transport: Arc<dyn Transport>, config: ApiConfig) -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            tickets: Arc::new(Mutex::new(HashMap::new())),
            next_ticket: Arc::new(AtomicU64::new(1)),
            interceptors: Arc::new(RwLock::new(Interceptors::new())),
            transport,
            keys: Arc::new(UuidKeys),
            normalizer: Normalizer::new(config.keys.clone()),
            config,
            notifier: Notifier::new(),
            load_gate: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    pub fn with_key_generator(mut self, keys: Arc<dyn KeyGenerator>) -> Self {
        self.keys = keys;
        self
    }

    pub fn with_interceptors(self, interceptors: Interceptors) -> Self {
        *self
            .interceptors
            .write()
            .unwrap_or_else(PoisonError::into_inner) = interceptors;
        self
    }

    /// Register or replace the interceptor of one endpoint.
    pub fn intercept(
        &self,
        endpoint: impl Into<String>,
        interceptor: Arc<dyn Interceptor>,
    ) -> Result<(), ApiError> {
        self.interceptors
            .write()
            .map_err(|_| ApiError::LockPoisoned("interceptors write"))?
            .insert(endpoint, interceptor);
        Ok(())
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn key_generator(&self) -> &dyn KeyGenerator {
        self.keys.as_ref()
    }

    pub fn get(&self, key: &str) -> Result<Option<RequestRecord>, ApiError> {
        let records = self
            .records
            .read()
            .map_err(|_| ApiError::LockPoisoned("requests read"))?;
        Ok(records.get(key).cloned())
    }

    /// Evaluate `selector` against the record at `key`, or against an idle
    /// record if the key was never dispatched.
    pub fn select<W>(
        &self,
        key: &str,
        selector: impl FnOnce(&RequestRecord) -> W,
    ) -> Result<W, ApiError> {
        let records = self
            .records
            .read()
            .map_err(|_| ApiError::LockPoisoned("requests read"))?;
        match records.get(key) {
            Some(record) => Ok(selector(record)),
            None => Ok(selector(&RequestRecord::idle())),
        }
    }

    /// Send `endpoints` and track the request under `key`.
    ///
    /// A missing key is generated. The record is overwritten with a loading
    /// record, then with a done or errored record once the transport settles.
    /// Transport failures are stored, not returned. If another dispatch on the
    /// same key starts before this one settles, this one's outcome is dropped.
    pub async fn dispatch(
        &self,
        key: Option<&str>,
        endpoints: Endpoints,
        payload: Option<Value>,
    ) -> Result<String, ApiError> {
        let key = match key {
            Some(key) => key.to_string(),
            None => self.keys.generate(),
        };
        let names = endpoint_names(&endpoints);
        let targets: Vec<&str> = names.iter().map(String::as_str).collect();

        let ticket = self.issue_ticket(&key)?;
        self.write_record(&key, RequestRecord::loading())?;
        self.interceptors()?
            .dispatch(&targets, &key, &endpoints, payload.as_ref());
        tracing::debug!(key = %key, endpoints = ?names, "request dispatched");
        self.notifier.notify();

        let outcome = self.transport.request(endpoints.clone()).await;

        if !self.is_current(&key, ticket)? {
            tracing::warn!(key = %key, "dropping outcome of superseded request");
            return Ok(key);
        }

        let interceptors = self.interceptors()?;
        match outcome.and_then(|response| {
            let result = self.parse_result(response.data())?;
            Ok((response, result))
        }) {
            Ok((response, result)) => {
                self.write_record(&key, RequestRecord::done(result))?;
                interceptors.data(&targets, &key, &endpoints, payload.as_ref(), response.data());
                tracing::debug!(key = %key, "request done");
            }
            Err(error) => {
                self.write_record(&key, RequestRecord::errored(error.clone()))?;
                interceptors.error(&targets, &key, &endpoints, payload.as_ref(), &error);
                tracing::debug!(key = %key, error = %error, "request failed");
            }
        }

        self.notifier.notify();
        Ok(key)
    }

    /// Load the next page of a paginated endpoint of the record at `key`.
    ///
    /// The endpoint is the first one of the set actually sent, read through
    /// the transport's one-shot hook. Usage errors and hook validation
    /// errors are returned and leave the pagination untouched; transport
    /// failures are stored in the pagination's `error`.
    pub async fn load_more(
        &self,
        key: &str,
        endpoints: Endpoints,
        payload: Option<Value>,
    ) -> Result<(), ApiError> {
        let _gate = self.load_gate.lock().await;

        {
            let records = self
                .records
                .read()
                .map_err(|_| ApiError::LockPoisoned("requests read"))?;
            let record = records.get(key).ok_or_else(|| ApiError::NotInitialized {
                key: key.to_string(),
            })?;
            if record.loading {
                return Err(ApiError::Loading {
                    key: key.to_string(),
                });
            }
            if record.error.is_some() {
                return Err(ApiError::Errored {
                    key: key.to_string(),
                });
            }
        }

        let ticket = self.current_ticket(key)?;
        let outcome: HookOutcome = Arc::new(Mutex::new(None));
        let armed = Arc::new(AtomicBool::new(true));
        let disarm = HookGuard(Arc::clone(&armed));
        self.transport.once_request(Box::new({
            let store = self.clone();
            let key = key.to_string();
            let payload = payload.clone();
            let outcome = Arc::clone(&outcome);
            move |sent: &Endpoints| {
                if !armed.swap(false, Ordering::SeqCst) {
                    return Ok(());
                }
                let begun = store.begin_page_load(&key, sent, payload.as_ref());
                let verdict = match &begun {
                    Ok(_) => Ok(()),
                    Err(err) => Err(RequestError::Aborted(err.to_string())),
                };
                *outcome.lock().unwrap_or_else(PoisonError::into_inner) = Some(begun);
                verdict
            }
        }));

        // No suspension point between registering the hook and sending.
        let response = self.transport.request(endpoints.clone()).await;
        // The hook belongs to this call only, fired or not.
        drop(disarm);

        let hooked = outcome
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let endpoint = match hooked {
            Some(Ok(endpoint)) => endpoint,
            Some(Err(validation)) => return Err(validation),
            None => {
                tracing::warn!(key = %key, "transport settled without running the pre-send hook");
                return Err(ApiError::HookNotFired);
            }
        };
        let targets = [endpoint.as_str()];

        if self.current_ticket(key)? != ticket {
            tracing::warn!(key = %key, endpoint = %endpoint, "dropping page of superseded request");
            return Ok(());
        }

        let interceptors = self.interceptors()?;
        match response.and_then(|response| {
            let page = self.parse_page(response.data(), &endpoint)?;
            Ok((response, page))
        }) {
            Ok((response, page)) => {
                self.finish_page_load(key, &endpoint, Ok(page))?;
                interceptors.data(&targets, key, &endpoints, payload.as_ref(), response.data());
                tracing::debug!(key = %key, endpoint = %endpoint, "page loaded");
            }
            Err(error) => {
                self.finish_page_load(key, &endpoint, Err(error.clone()))?;
                interceptors.error(&targets, key, &endpoints, payload.as_ref(), &error);
                tracing::debug!(key = %key, endpoint = %endpoint, error = %error, "page failed");
            }
        }

        self.notifier.notify();
        Ok(())
    }

    /// Replace the whole table. Does not notify.
    pub fn hydrate(&self, requests: Requests) -> Result<(), ApiError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| ApiError::LockPoisoned("requests hydrate"))?;
        *records = requests;
        Ok(())
    }

    pub fn persist(&self) -> Result<Requests, ApiError> {
        let records = self
            .records
            .read()
            .map_err(|_| ApiError::LockPoisoned("requests persist"))?;
        Ok(records.clone())
    }

    /// Normalize raw response data endpoint by endpoint. Endpoints whose
    /// result is a pagination type are wrapped in an idle `PaginationResult`.
    pub fn parse_result(&self, data: &ResponseResult) -> Result<RequestResult, RequestError> {
        // Documents reach the document store through the transport; the
        // scratch table here only serves reference substitution.
        let mut scratch = Documents::new();
        let mut result = RequestResult::new();

        for (endpoint, raw) in data {
            let normalized = self.normalizer.normalize(raw, &mut scratch);
            let parsed = if self.is_pagination(raw) {
                let page: Page = serde_json::from_value(normalized)?;
                EndpointResult::Pagination(PaginationResult::new(page))
            } else {
                EndpointResult::Value(normalized)
            };
            result.insert(endpoint.clone(), parsed);
        }

        Ok(result)
    }

    fn parse_page(&self, data: &ResponseResult, endpoint: &str) -> Result<Page, RequestError> {
        let raw = data.get(endpoint).ok_or_else(|| {
            RequestError::Decode(format!("endpoint \"{}\" missing from response", endpoint))
        })?;
        let mut scratch = Documents::new();
        let normalized = self.normalizer.normalize(raw, &mut scratch);
        Ok(serde_json::from_value(normalized)?)
    }

    fn is_pagination(&self, raw: &Value) -> bool {
        raw.get(&self.config.keys.typename)
            .and_then(Value::as_str)
            .is_some_and(|typename| self.config.is_pagination_type(typename))
    }

    /// Runs inside the transport's pre-send hook.
    fn begin_page_load(
        &self,
        key: &str,
        sent: &Endpoints,
        payload: Option<&Value>,
    ) -> Result<String, ApiError> {
        let endpoint = sent.keys().next().cloned().ok_or(ApiError::EmptyEndpoints)?;

        {
            let mut records = self
                .records
                .write()
                .map_err(|_| ApiError::LockPoisoned("requests write"))?;
            let record = records.get_mut(key).ok_or_else(|| ApiError::NotInitialized {
                key: key.to_string(),
            })?;
            let pagination = match record.endpoint_mut(&endpoint) {
                None => {
                    return Err(ApiError::EndpointNotInResult { endpoint });
                }
                Some(EndpointResult::Value(_)) => {
                    return Err(ApiError::NotPagination { endpoint });
                }
                Some(EndpointResult::Pagination(pagination)) => pagination,
            };
            pagination.loading = true;
            pagination.error = None;
        }

        self.interceptors()?
            .dispatch(&[endpoint.as_str()], key, sent, payload);
        tracing::debug!(key = %key, endpoint = %endpoint, "loading next page");
        self.notifier.notify();
        Ok(endpoint)
    }

    fn finish_page_load(
        &self,
        key: &str,
        endpoint: &str,
        outcome: Result<Page, RequestError>,
    ) -> Result<(), ApiError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| ApiError::LockPoisoned("requests write"))?;
        let Some(pagination) = records
            .get_mut(key)
            .and_then(|record| record.pagination_mut(endpoint))
        else {
            tracing::warn!(key = %key, endpoint = %endpoint, "pagination vanished while loading");
            return Ok(());
        };

        pagination.loading = false;
        match outcome {
            Ok(page) => {
                pagination.error = None;
                pagination.result.extend(page);
            }
            Err(error) => pagination.error = Some(error),
        }
        Ok(())
    }

    fn write_record(&self, key: &str, record: RequestRecord) -> Result<(), ApiError> {
        self.records
            .write()
            .map_err(|_| ApiError::LockPoisoned("requests write"))?
            .insert(key.to_string(), record);
        Ok(())
    }

    fn interceptors(&self) -> Result<Interceptors, ApiError> {
        Ok(self
            .interceptors
            .read()
            .map_err(|_| ApiError::LockPoisoned("interceptors read"))?
            .clone())
    }

    fn issue_ticket(&self, key: &str) -> Result<u64, ApiError> {
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        self.tickets
            .lock()
            .map_err(|_| ApiError::LockPoisoned("tickets write"))?
            .insert(key.to_string(), ticket);
        Ok(ticket)
    }

    fn current_ticket(&self, key: &str) -> Result<Option<u64>, ApiError> {
        Ok(self
            .tickets
            .lock()
            .map_err(|_| ApiError::LockPoisoned("tickets read"))?
            .get(key)
            .copied())
    }

    fn is_current(&self, key: &str, ticket: u64) -> Result<bool, ApiError> {
        Ok(self.current_ticket(key)? == Some(ticket))
    }
}

fn endpoint_names(endpoints: &Endpoints) -> Vec<String> {
    endpoints.keys().cloned().collect()
}
