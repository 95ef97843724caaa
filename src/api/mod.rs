//! Api - facade composing the document and request stores.
//!
//! Both stores notify through their own [`Notifier`]; the facade re-emits
//! each of those as one change notification of its own, so a UI layer
//! subscribes once and re-reads through selectors.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use serde_json::json;
//! use superbia_store::{requester, Api, ApiConfig, ApiError, InMemoryTransport};
//!
//! # fn main() -> Result<(), ApiError> {
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let transport = InMemoryTransport::new();
//! transport.respond(json!({ "user": { "id": "u1", "_typename": "User", "name": "Ada" } }));
//! let api = Api::new(Arc::new(transport), ApiConfig::default());
//!
//! api.subscribe(|| println!("something changed"));
//!
//! let (loading, fetch_user) = api.bind_request(
//!     "profile",
//!     |record| record.loading,
//!     Some(requester(|id: String| {
//!         json!({ "user": { "id": id } }).as_object().cloned().unwrap_or_default()
//!     })),
//! )?;
//! assert!(!loading);
//!
//! fetch_user.call("u1".to_string()).await?;
//! let name = api.select(|docs| docs["User"]["u1"]["name"].clone())?;
//! assert_eq!(name, "Ada");
//! # Ok::<(), ApiError>(())
//! # })
//! # }
//! ```

mod binding;
mod state;

use std::sync::Arc;

use serde_json::Value;

use crate::config::ApiConfig;
use crate::document::DocumentStore;
use crate::error::ApiError;
use crate::key::{KeyGenerator, RequestKey};
use crate::normalize::Documents;
use crate::notifier::{ListenerId, Notifier};
use crate::request::{Interceptors, RequestRecord, RequestStore};
use crate::transport::Transport;

pub use binding::{requester, LoadTrigger, RequestTrigger, Requester};
pub use state::PersistedState;

/// The facade a UI layer talks to.
pub struct Api {
    documents: DocumentStore,
    requests: RequestStore,
    notifier: Notifier,
    config: ApiConfig,
}

impl Api {
    /// Build both stores over `transport` and wire their notifications.
    pub fn new(transport: Arc<dyn Transport>, config: ApiConfig) -> Self {
        let documents = DocumentStore::new(config.keys.clone());
        documents.connect(transport.as_ref());
        let requests = RequestStore::new(transport, config.clone());
        Self::from_stores(documents, requests, config)
    }

    /// Compose stores built by the caller, e.g. with custom interceptors.
    pub fn from_stores(documents: DocumentStore, requests: RequestStore, config: ApiConfig) -> Self {
        let notifier = Notifier::new();

        for source in [documents.notifier(), requests.notifier()] {
            let notifier = notifier.clone();
            source.on_change(move || notifier.notify());
        }

        Self {
            documents,
            requests,
            notifier,
            config,
        }
    }

    pub fn with_interceptors(self, interceptors: Interceptors) -> Self {
        Self {
            requests: self.requests.with_interceptors(interceptors),
            ..self
        }
    }

    pub fn with_key_generator(self, keys: Arc<dyn KeyGenerator>) -> Self {
        Self {
            requests: self.requests.with_key_generator(keys),
            ..self
        }
    }

    pub fn documents(&self) -> &DocumentStore {
        &self.documents
    }

    pub fn requests(&self) -> &RequestStore {
        &self.requests
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Attach a listener run after any change to either store.
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.notifier.on_change(listener)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.notifier.remove_listener(id)
    }

    /// Read the documents through `selector`.
    pub fn select<W>(&self, selector: impl FnOnce(&Documents) -> W) -> Result<W, ApiError> {
        self.documents.select(selector)
    }

    /// Re-evaluate `selector` over the documents after every change and hand
    /// the value to `callback`.
    pub fn watch<W, S, C>(&self, selector: S, callback: C) -> ListenerId
    where
        S: Fn(&Documents) -> W + Send + Sync + 'static,
        C: Fn(W) + Send + Sync + 'static,
    {
        let documents = self.documents.clone();
        self.notifier.on_change(move || match documents.select(&selector) {
            Ok(value) => callback(value),
            Err(err) => tracing::warn!(error = %err, "watch selector skipped"),
        })
    }

    /// Like [`watch`](Api::watch), over the record at `key`.
    pub fn watch_request<W, S, C>(&self, key: impl Into<String>, selector: S, callback: C) -> ListenerId
    where
        S: Fn(&RequestRecord) -> W + Send + Sync + 'static,
        C: Fn(W) + Send + Sync + 'static,
    {
        let requests = self.requests.clone();
        let key = key.into();
        self.notifier.on_change(move || match requests.select(&key, &selector) {
            Ok(value) => callback(value),
            Err(err) => tracing::warn!(error = %err, "watch selector skipped"),
        })
    }

    /// Read the record at `key` through `selector` and pair the value with a
    /// trigger dispatching under that key.
    ///
    /// An absent record reads as idle. A trigger bound without a requester
    /// fails with [`ApiError::MissingRequester`] when called.
    pub fn bind_request<W, A>(
        &self,
        key: impl Into<String>,
        selector: impl FnOnce(&RequestRecord) -> W,
        requester: Option<Requester<A>>,
    ) -> Result<(W, RequestTrigger<A>), ApiError> {
        let key = key.into();
        let value = self.requests.select(&key, selector)?;
        Ok((value, RequestTrigger::new(key, self.requests.clone(), requester)))
    }

    /// Read the record at `key` through `selector` and pair the value with a
    /// trigger loading further pages of that record.
    pub fn bind_load_more<W, A>(
        &self,
        key: impl Into<String>,
        selector: impl FnOnce(&RequestRecord) -> W,
        loader: Requester<A>,
    ) -> Result<(W, LoadTrigger<A>), ApiError> {
        let key = key.into();
        let value = self.requests.select(&key, selector)?;
        Ok((value, LoadTrigger::new(key, self.requests.clone(), loader)))
    }

    /// The key of one call site, regenerated only when `deps` change.
    pub fn request_key(&self, slot: &mut RequestKey, deps: &[Value]) -> String {
        slot.get(deps, self.requests.key_generator()).to_string()
    }

    pub fn persist(&self) -> Result<PersistedState, ApiError> {
        Ok(PersistedState {
            documents: self.documents.persist()?,
            requests: self.requests.persist()?,
        })
    }

    /// Restore both stores wholesale. Does not notify.
    pub fn hydrate(&self, state: PersistedState) -> Result<(), ApiError> {
        self.documents.hydrate(state.documents)?;
        self.requests.hydrate(state.requests)
    }
}
