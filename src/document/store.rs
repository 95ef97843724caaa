use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::Value;

use crate::config::DocumentKeys;
use crate::error::ApiError;
use crate::normalize::{Documents, Normalizer};
use crate::notifier::Notifier;
use crate::transport::{CallEmitter, Endpoints, ResponseResult, Transport};

/// Flat `type -> id -> document` table fed by API results.
///
/// Clone-friendly via Arc; clones share the same table and notifier.
#[derive(Clone)]
pub struct DocumentStore {
    data: Arc<RwLock<Documents>>,
    normalizer: Normalizer,
    notifier: Notifier,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new(DocumentKeys::default())
    }
}

impl DocumentStore {
    pub fn new(keys: DocumentKeys) -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
            normalizer: Normalizer::new(keys),
            notifier: Notifier::new(),
        }
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Feed every request and subscription result of `transport` into this store.
    pub fn connect(&self, transport: &dyn Transport) {
        let store = self.clone();
        let listener = Arc::new(move |_: &Endpoints, emitter: &CallEmitter| {
            let store = store.clone();
            emitter.on_result(move |result| {
                if let Err(err) = store.merge(result) {
                    tracing::warn!(error = %err, "dropping result after failed merge");
                }
            });
        });

        transport.on_request(listener.clone());
        transport.on_subscribe(listener);
    }

    /// Normalize every endpoint result and merge the documents found.
    ///
    /// Returns `false` without notifying when the payload held no documents.
    /// Otherwise notifies exactly once, however many documents were written.
    pub fn merge(&self, result: &ResponseResult) -> Result<bool, ApiError> {
        let mut scratch = Documents::new();
        for value in result.values() {
            self.normalizer.normalize(value, &mut scratch);
        }

        if scratch.is_empty() {
            return Ok(false);
        }

        {
            let mut data = self
                .data
                .write()
                .map_err(|_| ApiError::LockPoisoned("documents write"))?;

            for (typename, documents) in scratch {
                tracing::debug!(typename = %typename, count = documents.len(), "merging documents");
                data.entry(typename).or_default().extend(documents);
            }
        }

        self.notifier.notify();
        Ok(true)
    }

    pub fn get(&self, typename: &str, id: &str) -> Result<Option<Value>, ApiError> {
        let data = self
            .data
            .read()
            .map_err(|_| ApiError::LockPoisoned("documents read"))?;
        Ok(data.get(typename).and_then(|docs| docs.get(id)).cloned())
    }

    /// Evaluate `selector` against the live table.
    pub fn select<W>(&self, selector: impl FnOnce(&Documents) -> W) -> Result<W, ApiError> {
        let data = self
            .data
            .read()
            .map_err(|_| ApiError::LockPoisoned("documents read"))?;
        Ok(selector(&data))
    }

    /// Replace the whole table. Does not notify.
    pub fn hydrate(&self, documents: Documents) -> Result<(), ApiError> {
        let mut data = self
            .data
            .write()
            .map_err(|_| ApiError::LockPoisoned("documents hydrate"))?;
        *data = documents;
        Ok(())
    }

    pub fn persist(&self) -> Result<Documents, ApiError> {
        let data = self
            .data
            .read()
            .map_err(|_| ApiError::LockPoisoned("documents persist"))?;
        Ok(data.clone())
    }
}
