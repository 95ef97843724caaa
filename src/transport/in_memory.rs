//! InMemoryTransport - scripted transport for testing and development.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde_json::Value;
use tokio::sync::oneshot;

use super::{
    CallEmitter, CallListener, Endpoints, RequestHook, Response, Transport, TransportFuture,
};
use crate::error::RequestError;

enum Scripted {
    Ready(Result<Response, RequestError>),
    Deferred(oneshot::Receiver<Result<Response, RequestError>>),
}

/// Settles a response queued with [`InMemoryTransport::defer`].
pub struct DeferredResponse {
    sender: oneshot::Sender<Result<Response, RequestError>>,
}

impl DeferredResponse {
    pub fn resolve(self, data: Value) {
        let _ = self.sender.send(Ok(Response::from_value(data)));
    }

    pub fn reject(self, error: RequestError) {
        let _ = self.sender.send(Err(error));
    }
}

struct Inner {
    script: Mutex<VecDeque<Scripted>>,
    hook: Mutex<Option<RequestHook>>,
    request_listeners: RwLock<Vec<CallListener>>,
    subscribe_listeners: RwLock<Vec<CallListener>>,
    sent: Mutex<Vec<Endpoints>>,
}

/// Transport that answers requests from a FIFO script.
///
/// Features:
/// - Responses and failures are queued ahead of time with `respond`/`fail`
/// - `defer` queues a response settled later by the test, so calls can overlap
/// - Every request that passed the one-shot hook is recorded in `sent()`
/// - Clone-friendly via Arc; clones share the script and listeners
///
/// ## Example
///
/// ```
/// use serde_json::json;
/// use superbia_store::{InMemoryTransport, Transport};
///
/// # tokio_test_block(async {
/// let transport = InMemoryTransport::new();
/// transport.respond(json!({ "me": { "id": "1", "_typename": "User" } }));
///
/// let response = transport
///     .request(json!({ "me": null }).as_object().unwrap().clone())
///     .await
///     .unwrap();
/// assert_eq!(response.data()["me"]["id"], "1");
/// assert_eq!(transport.request_count(), 1);
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f);
/// # }
/// ```
#[derive(Clone)]
pub struct InMemoryTransport {
    inner: Arc<Inner>,
}

impl Default for InMemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                script: Mutex::new(VecDeque::new()),
                hook: Mutex::new(None),
                request_listeners: RwLock::new(Vec::new()),
                subscribe_listeners: RwLock::new(Vec::new()),
                sent: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Queue a successful response. `data` should be a JSON object of
    /// `endpoint name -> raw result`.
    pub fn respond(&self, data: Value) {
        self.push(Scripted::Ready(Ok(Response::from_value(data))));
    }

    /// Queue a failed response.
    pub fn fail(&self, error: RequestError) {
        self.push(Scripted::Ready(Err(error)));
    }

    /// Queue a response that stays pending until the returned handle settles it.
    pub fn defer(&self) -> DeferredResponse {
        let (sender, receiver) = oneshot::channel();
        self.push(Scripted::Deferred(receiver));
        DeferredResponse { sender }
    }

    /// Open a subscription. Results pushed through the returned emitter reach
    /// every `on_subscribe` listener's handlers.
    pub fn subscribe(&self, endpoints: Endpoints) -> CallEmitter {
        let emitter = CallEmitter::new();
        let listeners = self
            .inner
            .subscribe_listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in listeners {
            listener(&endpoints, &emitter);
        }
        emitter
    }

    /// Endpoint sets that were actually sent, in order.
    pub fn sent(&self) -> Vec<Endpoints> {
        self.inner
            .sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn request_count(&self) -> usize {
        self.inner
            .sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether a one-shot hook is registered and not yet consumed.
    pub fn has_pending_hook(&self) -> bool {
        self.inner
            .hook
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn push(&self, scripted: Scripted) {
        self.inner
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(scripted);
    }
}

impl Transport for InMemoryTransport {
    fn request(&self, endpoints: Endpoints) -> TransportFuture<'_> {
        let inner = Arc::clone(&self.inner);

        Box::pin(async move {
            let hook = inner
                .hook
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();
            if let Some(hook) = hook {
                hook(&endpoints)?;
            }

            inner
                .sent
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(endpoints.clone());

            let emitter = CallEmitter::new();
            let listeners = inner
                .request_listeners
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone();
            for listener in listeners {
                listener(&endpoints, &emitter);
            }

            let scripted = inner
                .script
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front();

            let outcome = match scripted {
                Some(Scripted::Ready(outcome)) => outcome,
                Some(Scripted::Deferred(receiver)) => receiver.await.unwrap_or_else(|_| {
                    Err(RequestError::Transport("deferred response dropped".into()))
                }),
                None => Err(RequestError::Transport("no scripted response".into())),
            };

            let response = outcome?;
            emitter.emit_result(response.data());
            Ok(response)
        })
    }

    fn once_request(&self, hook: RequestHook) {
        *self
            .inner
            .hook
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(hook);
    }

    fn on_request(&self, listener: CallListener) {
        self.inner
            .request_listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    fn on_subscribe(&self, listener: CallListener) {
        self.inner
            .subscribe_listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }
}
