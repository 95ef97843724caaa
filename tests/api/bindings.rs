use serde_json::{json, Value};
use superbia_store::{requester, ApiError, RequestKey, RequestRecord, RequestTrigger};

use crate::support::{api, endpoints};

fn feed(ids: &[&str], has_next_page: bool, cursor: Value) -> Value {
    json!({
        "feed": {
            "_typename": "PostPagination",
            "nodes": ids
                .iter()
                .map(|id| json!({ "id": id, "_typename": "Post" }))
                .collect::<Vec<_>>(),
            "hasNextPage": has_next_page,
            "nextPageCursor": cursor
        }
    })
}

#[test]
fn absent_request_reads_as_idle_record() {
    let (_, api) = api();

    let (record, _trigger): (RequestRecord, RequestTrigger<()>) = api
        .bind_request("never", |record| record.clone(), None)
        .unwrap();

    assert_eq!(
        record,
        RequestRecord {
            loading: false,
            done: false,
            result: None,
            error: None,
        }
    );
}

#[tokio::test]
async fn trigger_without_requester_fails_loudly() {
    let (transport, api) = api();
    let (_, trigger) = api
        .bind_request::<_, ()>("orphan", |record| record.done, None)
        .unwrap();

    let err = trigger.call(()).await.unwrap_err();

    assert_eq!(err, ApiError::MissingRequester { key: "orphan".into() });
    assert_eq!(transport.request_count(), 0);
    assert!(api.requests().get("orphan").unwrap().is_none());
}

#[tokio::test]
async fn trigger_dispatches_under_bound_key() {
    let (transport, api) = api();
    transport.respond(json!({ "user": { "id": "u7", "_typename": "User", "name": "Grace" } }));

    let (done, fetch_user) = api
        .bind_request(
            "profile",
            |record| record.done,
            Some(requester(|id: String| endpoints(json!({ "user": { "id": id } })))),
        )
        .unwrap();
    assert!(!done);
    assert_eq!(fetch_user.key(), "profile");

    fetch_user.call("u7".to_string()).await.unwrap();

    assert_eq!(transport.sent()[0]["user"]["id"], "u7");
    let (done, user_ref) = api
        .bind_request::<_, ()>(
            "profile",
            |record| (record.done, record.endpoint("user").cloned()),
            None,
        )
        .unwrap()
        .0;
    assert!(done);
    assert_eq!(
        user_ref.and_then(|result| result.as_value().cloned()),
        Some(json!("u7"))
    );
    assert_eq!(
        api.select(|docs| docs["User"]["u7"]["name"].clone()).unwrap(),
        "Grace"
    );
}

#[tokio::test]
async fn load_trigger_extends_bound_pagination() {
    let (transport, api) = api();
    transport.respond(feed(&["a", "b"], true, json!("c1")));
    transport.respond(feed(&["c"], false, Value::Null));

    let (_, fetch) = api
        .bind_request(
            "home",
            |record| record.loading,
            Some(requester(|_: ()| endpoints(json!({ "feed": { "cursor": null } })))),
        )
        .unwrap();
    fetch.call(()).await.unwrap();

    let cursor = api
        .requests()
        .select("home", |record| {
            record
                .pagination("feed")
                .and_then(|pagination| pagination.result.next_page_cursor.clone())
        })
        .unwrap();
    assert_eq!(cursor, Some(json!("c1")));

    let (_, load_more) = api
        .bind_load_more(
            "home",
            |record| record.loading,
            requester(|cursor: String| endpoints(json!({ "feed": { "cursor": cursor } }))),
        )
        .unwrap();
    load_more.call("c1".to_string()).await.unwrap();

    let nodes = api
        .requests()
        .select("home", |record| {
            record.pagination("feed").unwrap().result.nodes.clone()
        })
        .unwrap();
    assert_eq!(nodes, vec![json!("a"), json!("b"), json!("c")]);
    assert_eq!(api.select(|docs| docs["Post"].len()).unwrap(), 3);
}

#[tokio::test]
async fn load_trigger_before_request_is_a_usage_error() {
    let (transport, api) = api();
    let (_, load_more) = api
        .bind_load_more(
            "home",
            |record| record.loading,
            requester(|_: ()| endpoints(json!({ "feed": null }))),
        )
        .unwrap();

    let err = load_more.call(()).await.unwrap_err();

    assert_eq!(err, ApiError::NotInitialized { key: "home".into() });
    assert_eq!(transport.request_count(), 0);
}

#[test]
fn request_key_is_stable_until_deps_change() {
    let (_, api) = api();
    let mut slot = RequestKey::new();

    let first = api.request_key(&mut slot, &[json!("post-1")]);
    let again = api.request_key(&mut slot, &[json!("post-1")]);
    let changed = api.request_key(&mut slot, &[json!("post-2")]);

    assert_eq!(first, "call-1");
    assert_eq!(again, first);
    assert_eq!(changed, "call-2");
}

#[test]
fn fixed_request_key_is_used_verbatim() {
    let (_, api) = api();
    let mut slot = RequestKey::fixed("sidebar");
    assert_eq!(api.request_key(&mut slot, &[]), "sidebar");
}
