use std::sync::{Arc, Mutex};

use serde_json::json;
use superbia_store::{Callbacks, Interceptors, LogInterceptor, RequestError};

use crate::support::{endpoints, feed_page, store};

#[tokio::test]
async fn lifecycle_callbacks_see_key_and_payload() {
    let (transport, store) = store();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let interceptor = {
        let on_dispatch = Arc::clone(&seen);
        let on_data = Arc::clone(&seen);
        let on_error = Arc::clone(&seen);
        Callbacks::new()
            .on_dispatch(move |key, _, payload| {
                on_dispatch
                    .lock()
                    .unwrap()
                    .push(format!("dispatch {} {}", key, payload.unwrap()["n"]));
            })
            .on_data(move |key, _, _, data| {
                on_data
                    .lock()
                    .unwrap()
                    .push(format!("data {} {}", key, data["like"]["count"]));
            })
            .on_error(move |key, _, _, error| {
                on_error
                    .lock()
                    .unwrap()
                    .push(format!("error {} {}", key, error.message()));
            })
    };
    let store = store.with_interceptors(Interceptors::new().with("like", interceptor));

    transport.respond(json!({ "like": { "count": 3 } }));
    transport.fail(RequestError::Server("rate limited".into()));

    for _ in 0..2 {
        store
            .dispatch(
                Some("like-post"),
                endpoints(json!({ "like": { "post": "p1" } })),
                Some(json!({ "n": 1 })),
            )
            .await
            .unwrap();
    }

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            "dispatch like-post 1",
            "data like-post 3",
            "dispatch like-post 1",
            "error like-post rate limited",
        ]
    );
}

#[tokio::test]
async fn endpoints_without_interceptor_are_ignored() {
    let (transport, store) = store();
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let store = store.with_interceptors(
        Interceptors::new().with("feed", LogInterceptor::with_buffer(buffer.clone())),
    );

    transport.respond(json!({ "me": null }));
    store
        .dispatch(Some("k"), endpoints(json!({ "me": null })), None)
        .await
        .unwrap();

    assert!(buffer.lock().unwrap().is_empty());
}

#[tokio::test]
async fn pagination_transitions_are_intercepted() {
    let (transport, store) = store();
    let buffer = Arc::new(Mutex::new(Vec::new()));
    store
        .intercept("feed", Arc::new(LogInterceptor::with_buffer(buffer.clone())))
        .unwrap();

    transport.respond(feed_page(&["a"], true, Some("c1")));
    transport.respond(feed_page(&["b"], false, None));
    store
        .dispatch(Some("home"), endpoints(json!({ "feed": null })), None)
        .await
        .unwrap();
    store
        .load_more("home", endpoints(json!({ "feed": null })), None)
        .await
        .unwrap();

    assert_eq!(
        *buffer.lock().unwrap(),
        vec![
            "[REQUEST] dispatch home feed",
            "[REQUEST] data home feed",
            "[REQUEST] dispatch home feed",
            "[REQUEST] data home feed",
        ]
    );
}
