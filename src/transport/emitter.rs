use std::sync::{Arc, PoisonError, RwLock};

use super::ResponseResult;

type ResultListener = Arc<dyn Fn(&ResponseResult) + Send + Sync>;

/// Per-call emitter handed to request and subscription listeners.
///
/// Emits a `result` event each time data for the call arrives: once for a
/// request, any number of times for a subscription.
#[derive(Clone, Default)]
pub struct CallEmitter {
    listeners: Arc<RwLock<Vec<ResultListener>>>,
}

impl CallEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_result<F>(&self, listener: F)
    where
        F: Fn(&ResponseResult) + Send + Sync + 'static,
    {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(listener));
    }

    pub fn emit_result(&self, result: &ResponseResult) {
        let listeners: Vec<ResultListener> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        for listener in listeners {
            listener(result);
        }
    }
}
