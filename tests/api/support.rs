//! Shared fixtures for facade tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::Value;
use superbia_store::{Api, ApiConfig, Endpoints, InMemoryTransport, SequentialKeys};

pub fn endpoints(value: Value) -> Endpoints {
    value
        .as_object()
        .cloned()
        .expect("endpoint set must be a JSON object")
}

pub fn api() -> (InMemoryTransport, Api) {
    api_with(ApiConfig::default())
}

pub fn api_with(config: ApiConfig) -> (InMemoryTransport, Api) {
    let transport = InMemoryTransport::new();
    let api = Api::new(Arc::new(transport.clone()), config)
        .with_key_generator(Arc::new(SequentialKeys::new("call")));
    (transport, api)
}

pub fn count_changes(api: &Api) -> Arc<AtomicUsize> {
    let count = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&count);
    api.subscribe(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    count
}
