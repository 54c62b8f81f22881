// Tests for search/history synchronization

mod common;

use common::{Harness, LogCapture, chain, chain_json};
use netgraph_core::{GraphConfig, SearchState, processors};
use netgraph_pipeline::{
    NavigationHistory, SearchSyncController, UpdateError, UpdateOutcome, build_client,
};
use std::sync::Arc;
use std::time::Duration;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

async fn mount_graph(server: &MockServer, route: &str, prefix: &str, count: usize) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(chain_json(prefix, count)))
        .mount(server)
        .await;
}

fn controller(h: &Harness, server: &MockServer) -> SearchSyncController {
    SearchSyncController::new(
        format!("{}/", server.uri()),
        build_client().unwrap(),
        h.pipeline.clone(),
        Arc::new(NavigationHistory::new()),
    )
}

fn history_values(controller: &SearchSyncController) -> Vec<String> {
    controller
        .history()
        .entries()
        .into_iter()
        .map(|s| s.search_value)
        .collect()
}

// ============================================================================
// Construction Tests
// ============================================================================

#[tokio::test]
async fn test_new_pushes_empty_search_entry() {
    let h = Harness::new(GraphConfig::default());
    let server = MockServer::start().await;
    let controller = controller(&h, &server);

    assert_eq!(controller.history().len(), 1);
    assert_eq!(controller.history().state(), Some(SearchState::default()));
    assert!(controller.search("").is_none());
    assert!(controller.search("   ").is_none());
}

// ============================================================================
// Dedup and History Tests
// ============================================================================

#[tokio::test]
async fn test_repeated_search_fetches_once() {
    let h = Harness::new(GraphConfig::default());
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/foo"))
        .respond_with(ResponseTemplate::new(200).set_body_string(chain_json("foo", 3)))
        .expect(1)
        .mount(&server)
        .await;
    let controller = controller(&h, &server);

    let fetch = controller.search("foo").unwrap();
    assert_eq!(fetch.search_value(), "foo");
    fetch.finished().await.unwrap();

    assert!(controller.search("foo").is_none());
    assert!(controller.search(" foo\t").is_none());
    assert_eq!(history_values(&controller), vec!["", "foo"]);
    assert_eq!(h.renderer.count(), 1);
}

#[tokio::test]
async fn test_distinct_searches_grow_history() {
    let h = Harness::new(GraphConfig::default());
    let server = MockServer::start().await;
    mount_graph(&server, "/a", "a", 1).await;
    mount_graph(&server, "/b", "b", 2).await;
    let controller = controller(&h, &server);

    for key in ["a", "b", "a"] {
        controller.search(key).unwrap().finished().await.unwrap();
    }

    assert_eq!(history_values(&controller), vec!["", "a", "b", "a"]);
    assert_eq!(*h.snapshot().unwrap(), chain("a", 1));
}

#[tokio::test]
async fn test_search_key_is_trimmed() {
    let h = Harness::new(GraphConfig::default());
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/foo"))
        .respond_with(ResponseTemplate::new(200).set_body_string(chain_json("foo", 2)))
        .expect(1)
        .mount(&server)
        .await;
    let controller = controller(&h, &server);

    controller.search("  foo  ").unwrap().finished().await.unwrap();

    assert_eq!(controller.history().state(), Some(SearchState::new("foo")));
    assert!(controller.search("foo").is_none());
}

// ============================================================================
// Failure Propagation Tests
// ============================================================================

#[tokio::test]
async fn test_http_error_reaches_caller() {
    let h = Harness::new(GraphConfig::default());
    let server = MockServer::start().await;
    mount_graph(&server, "/ok", "ok", 2).await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let controller = controller(&h, &server);
    controller.search("ok").unwrap().finished().await.unwrap();
    let before = h.snapshot().unwrap();

    let result = controller.search("down").unwrap().finished().await;

    assert!(matches!(result, Err(UpdateError::Network(_))));
    assert!(Arc::ptr_eq(&h.snapshot().unwrap(), &before));
    // The entry is pushed before the request is made
    assert_eq!(controller.history().state(), Some(SearchState::new("down")));
}

#[tokio::test]
async fn test_failure_of_dropped_fetch_is_logged() {
    // Single-threaded runtime: the spawned fetches log on this thread
    let logs = LogCapture::default();
    let _guard = logs.install();
    let h = Harness::new(GraphConfig::default());
    let server = MockServer::start().await;
    let controller = controller(&h, &server);

    drop(controller.search("down"));
    drop(controller.search("up"));
    drop(controller.history().back());

    let mut waited = Duration::ZERO;
    while logs.contents().matches(r#"Search "down" failed"#).count() < 2
        || !logs.contents().contains(r#"Search "up" failed"#)
    {
        assert!(
            waited < Duration::from_secs(5),
            "failures not logged: {}",
            logs.contents()
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
        waited += Duration::from_millis(20);
    }
    assert!(h.snapshot().is_none());
    assert_eq!(controller.history().state(), Some(SearchState::new("down")));
}

#[tokio::test]
async fn test_undecodable_body_reaches_caller() {
    let h = Harness::new(GraphConfig::default());
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;
    let controller = controller(&h, &server);

    let result = controller.search("html").unwrap().finished().await;

    assert!(matches!(result, Err(UpdateError::Decode(_))));
    assert!(h.snapshot().is_none());
    assert_eq!(h.renderer.count(), 0);
}

// ============================================================================
// Traversal Tests
// ============================================================================

#[tokio::test]
async fn test_back_refetches_previous_search() {
    let h = Harness::new(GraphConfig::default());
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(200).set_body_string(chain_json("a", 2)))
        .expect(2)
        .mount(&server)
        .await;
    mount_graph(&server, "/b", "b", 5).await;
    let controller = controller(&h, &server);
    controller.search("a").unwrap().finished().await.unwrap();
    controller.search("b").unwrap().finished().await.unwrap();

    let traversal = controller.history().back().unwrap();
    assert_eq!(traversal.state, SearchState::new("a"));
    traversal.fetch.unwrap().finished().await.unwrap();

    assert_eq!(*h.snapshot().unwrap(), chain("a", 2));
    // Searching the value we navigated back to is a no-op
    assert!(controller.search("a").is_none());
}

#[tokio::test]
async fn test_forward_after_back_refetches() {
    let h = Harness::new(GraphConfig::default());
    let server = MockServer::start().await;
    mount_graph(&server, "/a", "a", 2).await;
    mount_graph(&server, "/b", "b", 5).await;
    let controller = controller(&h, &server);
    controller.search("a").unwrap().finished().await.unwrap();
    controller.search("b").unwrap().finished().await.unwrap();

    let back = controller.history().back().unwrap();
    back.fetch.unwrap().finished().await.unwrap();
    let forward = controller.history().forward().unwrap();
    forward.fetch.unwrap().finished().await.unwrap();

    assert_eq!(*h.snapshot().unwrap(), chain("b", 5));
    assert_eq!(h.renderer.count(), 4);
}

#[tokio::test]
async fn test_back_to_initial_entry_fetches_base_url() {
    let h = Harness::new(GraphConfig::default());
    let server = MockServer::start().await;
    mount_graph(&server, "/", "all", 7).await;
    mount_graph(&server, "/a", "a", 2).await;
    let controller = controller(&h, &server);
    controller.search("a").unwrap().finished().await.unwrap();

    let traversal = controller.history().back().unwrap();
    assert_eq!(traversal.state, SearchState::default());
    traversal.fetch.unwrap().finished().await.unwrap();

    assert_eq!(h.snapshot().unwrap().node_count(), 7);
    assert!(controller.history().back().is_none());
}

// ============================================================================
// Ordering Tests
// ============================================================================

/// A slow response to an older search overwrites a newer search's result.
#[tokio::test]
async fn test_stale_search_response_wins_when_it_arrives_last() {
    let h = Harness::new(GraphConfig::default());
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(chain_json("slow", 4))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    mount_graph(&server, "/fast", "fast", 2).await;
    let controller = controller(&h, &server);

    let slow = controller.search("slow").unwrap();
    let fast = controller.search("fast").unwrap();

    fast.finished().await.unwrap();
    assert_eq!(*h.snapshot().unwrap(), chain("fast", 2));

    slow.finished().await.unwrap();
    assert_eq!(*h.snapshot().unwrap(), chain("slow", 4));
    assert_eq!(controller.history().state(), Some(SearchState::new("fast")));
}

#[tokio::test]
async fn test_search_result_goes_through_worker() {
    let worker = processors::builtin("prune").unwrap();
    let h = Harness::new(GraphConfig::default().with_worker(worker));
    let server = MockServer::start().await;
    mount_graph(&server, "/a", "a", 3).await;
    let controller = controller(&h, &server);

    let outcome = controller.search("a").unwrap().finished().await.unwrap();
    assert!(matches!(outcome, UpdateOutcome::Offloaded(_)));

    let snapshot = outcome.settled().await.unwrap();
    assert_eq!(*snapshot, chain("a", 3));
    assert_eq!(h.renderer.count(), 1);
}
