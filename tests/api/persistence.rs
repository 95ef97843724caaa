use std::sync::atomic::Ordering;

use serde_json::json;
use superbia_store::{PersistedState, RequestError};

use crate::support::{api, count_changes, endpoints};

#[tokio::test]
async fn state_survives_a_json_round_trip() {
    let (transport, api) = api();
    transport.respond(json!({
        "me": { "id": "1", "_typename": "User" },
        "feed": {
            "_typename": "PostPagination",
            "nodes": [{ "id": "p1", "_typename": "Post" }],
            "hasNextPage": true,
            "nextPageCursor": "c1"
        }
    }));
    transport.fail(RequestError::Server("nope".into()));

    api.requests()
        .dispatch(Some("home"), endpoints(json!({ "me": null, "feed": null })), None)
        .await
        .unwrap();
    api.requests()
        .dispatch(Some("broken"), endpoints(json!({ "me": null })), None)
        .await
        .unwrap();

    let json = api.persist().unwrap().to_json().unwrap();

    let (_, restored) = crate::support::api();
    let changes = count_changes(&restored);
    restored.hydrate(PersistedState::from_json(&json).unwrap()).unwrap();

    assert_eq!(restored.persist().unwrap(), api.persist().unwrap());
    assert_eq!(changes.load(Ordering::SeqCst), 0);

    let home = restored.requests().get("home").unwrap().unwrap();
    assert_eq!(home.pagination("feed").unwrap().result.nodes, vec![json!("p1")]);
    let broken = restored.requests().get("broken").unwrap().unwrap();
    assert_eq!(broken.error, Some(RequestError::Server("nope".into())));
    assert!(restored.documents().get("Post", "p1").unwrap().is_some());
}

#[tokio::test]
async fn hydrated_pagination_can_load_more() {
    let (transport, api) = api();
    let state = PersistedState::from_json(
        &json!({
            "documents": {},
            "requests": {
                "home": {
                    "loading": false,
                    "done": true,
                    "error": null,
                    "result": {
                        "feed": {
                            "loading": false,
                            "error": null,
                            "result": { "nodes": ["x"], "hasNextPage": true, "nextPageCursor": "c1" }
                        }
                    }
                }
            }
        })
        .to_string(),
    )
    .unwrap();
    api.hydrate(state).unwrap();

    transport.respond(json!({
        "feed": { "_typename": "PostPagination", "nodes": ["y"], "hasNextPage": false, "nextPageCursor": null }
    }));
    api.requests()
        .load_more("home", endpoints(json!({ "feed": { "cursor": "c1" } })), None)
        .await
        .unwrap();

    let nodes = api
        .requests()
        .select("home", |record| record.pagination("feed").unwrap().result.nodes.clone())
        .unwrap();
    assert_eq!(nodes, vec![json!("x"), json!("y")]);
}
