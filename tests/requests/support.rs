//! Shared fixtures for request store tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};
use superbia_store::{
    ApiConfig, CallListener, Endpoints, InMemoryTransport, Notifier, RequestError, RequestHook,
    RequestStore, Response, SequentialKeys, Transport, TransportFuture,
};

pub fn endpoints(value: Value) -> Endpoints {
    value
        .as_object()
        .cloned()
        .expect("endpoint set must be a JSON object")
}

pub fn store() -> (InMemoryTransport, RequestStore) {
    let transport = InMemoryTransport::new();
    let store = RequestStore::new(Arc::new(transport.clone()), ApiConfig::default())
        .with_key_generator(Arc::new(SequentialKeys::new("req")));
    (transport, store)
}

pub struct Counter(Arc<AtomicUsize>);

impl Counter {
    pub fn attach(notifier: &Notifier) -> Self {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&count);
        notifier.on_change(move || {
            inner.fetch_add(1, Ordering::SeqCst);
        });
        Counter(count)
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

pub fn post(id: &str) -> Value {
    json!({ "id": id, "_typename": "Post", "title": format!("post {}", id) })
}

pub fn feed_page(ids: &[&str], has_next_page: bool, cursor: Option<&str>) -> Value {
    json!({
        "feed": {
            "_typename": "PostPagination",
            "nodes": ids.iter().map(|id| post(id)).collect::<Vec<_>>(),
            "hasNextPage": has_next_page,
            "nextPageCursor": cursor
        }
    })
}

/// Wraps an `InMemoryTransport`. After `fail_next`, the next request fails
/// as offline without running the pre-send hook.
pub struct Flaky {
    inner: InMemoryTransport,
    offline: AtomicBool,
}

impl Flaky {
    pub fn new(inner: InMemoryTransport) -> Self {
        Flaky {
            inner,
            offline: AtomicBool::new(false),
        }
    }

    pub fn fail_next(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }
}

impl Transport for Flaky {
    fn request(&self, endpoints: Endpoints) -> TransportFuture<'_> {
        if self.offline.swap(false, Ordering::SeqCst) {
            return Box::pin(async {
                Err::<Response, _>(RequestError::Transport("offline".into()))
            });
        }
        self.inner.request(endpoints)
    }

    fn once_request(&self, hook: RequestHook) {
        self.inner.once_request(hook);
    }

    fn on_request(&self, listener: CallListener) {
        self.inner.on_request(listener);
    }

    fn on_subscribe(&self, listener: CallListener) {
        self.inner.on_subscribe(listener);
    }
}
