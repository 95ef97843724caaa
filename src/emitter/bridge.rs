use std::sync::{Arc, Mutex, PoisonError};

use event_emitter_rs::EventEmitter;

use crate::api::Api;
use crate::notifier::{ListenerId, Notifier};

pub const UPDATE_EVENT: &str = "update";

/// Forwards store changes onto a shared event emitter.
///
/// # Example
///
/// ```ignore
/// let bridge = EmitterBridge::new(EventEmitter::new());
/// bridge.on(UPDATE_EVENT, |source| println!("{} changed", source));
/// bridge.attach(&api);
/// ```
#[derive(Clone)]
pub struct EmitterBridge {
    emitter: Arc<Mutex<EventEmitter>>,
}

impl EmitterBridge {
    pub fn new(emitter: EventEmitter) -> Self {
        Self {
            emitter: Arc::new(Mutex::new(emitter)),
        }
    }

    /// Register a listener on the wrapped emitter. Returns the emitter's
    /// listener id.
    pub fn on<F>(&self, event: &str, listener: F) -> String
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        self.emitter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .on(event, listener)
    }

    /// Forward both stores of `api`. Returns the store-side listener ids.
    pub fn attach(&self, api: &Api) -> [ListenerId; 2] {
        [
            self.forward(api.documents().notifier(), "documents"),
            self.forward(api.requests().notifier(), "requests"),
        ]
    }

    fn forward(&self, notifier: &Notifier, source: &'static str) -> ListenerId {
        let emitter = Arc::clone(&self.emitter);
        notifier.on_change(move || {
            // Listeners run on the emitter's own threads.
            let _ = emitter
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .emit(UPDATE_EVENT, source.to_string());
        })
    }
}
