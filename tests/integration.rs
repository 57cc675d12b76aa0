//! Integration tests for discord-purge against a mock API server.
//!
//! Most tests run against a local `wiremock` server with pacing disabled, so
//! only the transport's own retry delays cost wall-clock time. The pacing
//! tests shrink the delays instead of removing them.

use discord_purge::observer::{NoopObserver, Preconfirmed, PurgeProgress};
use discord_purge::{
    CancellationToken, ClientConfig, DeletionReason, Error, MessageReference, PacingConfig,
    PurgeExecutor, PurgeOptions, PurgeStatus, RetryPolicy, ScanEnd, SearchAggregator,
    SearchQuery, Session, Snowflake, TransportClient,
};
use reqwest::Method;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use wiremock::matchers::{header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

// ─────────────────────────────────────────────────────────────────────────────
// Test Helpers
// ─────────────────────────────────────────────────────────────────────────────

const TOKEN: &str = "test-token-0123456789abcdef";
const ME: u64 = 42;
const SOMEONE_ELSE: u64 = 7;
const CHANNEL: u64 = 900;
const SEARCH_PATH: &str = "/channels/900/messages/search";

fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::builder()
        .token(TOKEN)
        .base_url(server.uri())
        .pacing(PacingConfig::none())
        .network_retry_delay(Duration::from_millis(10))
        .build()
        .unwrap()
}

fn transport_for(server: &MockServer) -> TransportClient {
    TransportClient::new(config_for(server)).unwrap()
}

fn raw_message(id: u64, author: u64, content: &str) -> Value {
    json!({
        "id": id.to_string(),
        "channel_id": CHANNEL.to_string(),
        "author": { "id": author.to_string(), "username": "someone" },
        "content": content,
        "timestamp": "2023-05-01T12:00:00.000000+00:00",
        "attachments": []
    })
}

/// A search page whose groups each hold one hit by `ME`.
fn page(ids: std::ops::Range<u64>, total: u64) -> Value {
    let groups: Vec<Value> = ids.map(|id| json!([raw_message(id, ME, "hello")])).collect();
    json!({ "messages": groups, "total_results": total })
}

fn reference(id: u64) -> MessageReference {
    MessageReference {
        id: Snowflake::new(id),
        channel_id: Snowflake::new(CHANNEL),
        content: format!("message {id}"),
        timestamp: chrono::Utc::now(),
        has_attachments: false,
    }
}

fn channel_query() -> SearchQuery {
    SearchQuery::builder()
        .channel(Snowflake::new(CHANNEL))
        .author(Snowflake::new(ME))
        .build()
        .unwrap()
}

async fn mount_identity(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/users/@me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": ME.to_string(),
            "username": "alice",
            "discriminator": "0",
            "global_name": "Alice"
        })))
        .mount(server)
        .await;
}

async fn mount_delete(server: &MockServer, message_id: u64, status: u16, expected_calls: u64) {
    Mock::given(method("DELETE"))
        .and(path(format!("/channels/{CHANNEL}/messages/{message_id}")))
        .respond_with(ResponseTemplate::new(status))
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn pacing(page_delay: Duration, delete_base_delay: Duration) -> PacingConfig {
    PacingConfig {
        page_delay,
        delete_base_delay,
        delete_jitter: Duration::from_millis(50)..Duration::from_millis(100),
    }
}

fn raw_http_config(base_url: &str) -> ClientConfig {
    ClientConfig::builder()
        .token(TOKEN)
        .base_url(base_url)
        .pacing(PacingConfig::none())
        .network_retry_delay(Duration::from_millis(100))
        .build()
        .unwrap()
}

/// Plain TCP server that drops the first `drops` connections without a reply
/// and answers later ones with `204 No Content`. Returns its URL and a count
/// of accepted connections.
async fn flaky_server(drops: usize) -> (String, Arc<AtomicUsize>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accepted = Arc::new(AtomicUsize::new(0));
    let counter = accepted.clone();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            if counter.fetch_add(1, Ordering::SeqCst) < drops {
                drop(socket);
                continue;
            }
            tokio::spawn(async move {
                let mut request = [0u8; 4096];
                let _ = socket.read(&mut request).await;
                let _ = socket
                    .write_all(
                        b"HTTP/1.1 204 No Content\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                    )
                    .await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (format!("http://{addr}"), accepted)
}

/// Returns the given responses in order, repeating the last one.
#[derive(Clone)]
struct Sequence {
    responses: Vec<ResponseTemplate>,
    calls: Arc<AtomicUsize>,
}

impl Sequence {
    fn new(responses: Vec<ResponseTemplate>) -> Self {
        Self {
            responses,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl Respond for Sequence {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses[call.min(self.responses.len() - 1)].clone()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_connect_resolves_identity() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/@me"))
        .and(header("authorization", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": ME.to_string(),
            "username": "alice",
            "discriminator": "0",
            "global_name": "Alice"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = Session::connect(config_for(&server)).await.unwrap();

    assert_eq!(session.identity().account_id, Snowflake::new(ME));
    assert_eq!(session.identity().display_name, "Alice");
}

#[tokio::test]
async fn test_connect_unauthorized_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/@me"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let err = Session::connect(config_for(&server)).await.unwrap_err();
    assert!(matches!(err, Error::Unauthorized));
}

#[tokio::test]
async fn test_connect_unexpected_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/@me"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let err = Session::connect(config_for(&server)).await.unwrap_err();
    assert!(matches!(err, Error::UnexpectedStatus { status: 500, .. }));
}

#[tokio::test]
async fn test_session_query_defaults_to_own_messages() {
    let server = MockServer::start().await;
    mount_identity(&server).await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("author_id", ME.to_string()))
        .and(query_param("content", "oops"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(1..4, 3)))
        .expect(1)
        .mount(&server)
        .await;

    let session = Session::connect(config_for(&server)).await.unwrap();
    let query = session
        .query()
        .channel(Snowflake::new(CHANNEL))
        .content("oops")
        .build()
        .unwrap();

    let result = session.scan(&query, &mut NoopObserver).await.unwrap();
    assert_eq!(result.messages.len(), 3);
    assert_eq!(result.end, ScanEnd::ReachedTotal);
}

// ─────────────────────────────────────────────────────────────────────────────
// Search
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_scan_paginates_until_total() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(100..125, 40)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("offset", "25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(125..140, 40)))
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport_for(&server);
    let mut batches = Vec::new();
    let result = SearchAggregator::new(&transport)
        .scan(&channel_query(), &mut |batch: &[MessageReference]| {
            batches.push(batch.len());
        })
        .await
        .unwrap();

    assert_eq!(result.messages.len(), 40);
    assert_eq!(result.pages, 2);
    assert_eq!(result.total_expected, Some(40));
    assert_eq!(result.end, ScanEnd::ReachedTotal);
    assert_eq!(batches, vec![25, 15]);
    assert_eq!(result.messages[0].id, Snowflake::new(100));
}

#[tokio::test]
async fn test_scan_filters_context_and_duplicates() {
    let server = MockServer::start().await;

    // Context from other authors shares a group with the hit; message 2 shows up twice
    let body = json!({
        "messages": [
            [raw_message(1, SOMEONE_ELSE, "before"), raw_message(2, ME, "mine"), raw_message(3, SOMEONE_ELSE, "after")],
            [raw_message(2, ME, "mine")],
            [raw_message(4, ME, "also mine")]
        ],
        "total_results": 3
    });

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport_for(&server);
    let result = SearchAggregator::new(&transport)
        .scan(&channel_query(), &mut NoopObserver)
        .await
        .unwrap();

    let ids: Vec<u64> = result.messages.iter().map(|m| m.id.get()).collect();
    assert_eq!(ids, vec![2, 4]);
}

#[tokio::test]
async fn test_scan_stops_on_empty_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "messages": [], "total_results": 100 })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport_for(&server);
    let result = SearchAggregator::new(&transport)
        .scan(&channel_query(), &mut NoopObserver)
        .await
        .unwrap();

    assert!(result.messages.is_empty());
    assert_eq!(result.end, ScanEnd::Exhausted);
}

#[tokio::test]
async fn test_scan_keeps_partial_results_on_bad_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(1..26, 60)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("offset", "25"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport_for(&server);
    let result = SearchAggregator::new(&transport)
        .scan(&channel_query(), &mut NoopObserver)
        .await
        .unwrap();

    assert_eq!(result.messages.len(), 25);
    assert!(matches!(
        result.end,
        ScanEnd::Failed {
            status: Some(403),
            ..
        }
    ));
    assert!(!result.end.is_complete());
}

#[tokio::test]
async fn test_scan_rejects_malformed_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "total_results": 5 })))
        .mount(&server)
        .await;

    let transport = transport_for(&server);
    let err = SearchAggregator::new(&transport)
        .scan(&channel_query(), &mut NoopObserver)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Decode { .. }));
}

#[tokio::test]
async fn test_scan_honours_stop_signal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(1..26, 100)))
        .expect(0)
        .mount(&server)
        .await;

    let stop = CancellationToken::new();
    stop.cancel();

    let transport = transport_for(&server);
    let result = SearchAggregator::new(&transport)
        .with_stop_signal(stop)
        .scan(&channel_query(), &mut NoopObserver)
        .await
        .unwrap();

    assert_eq!(result.end, ScanEnd::Cancelled);
    assert_eq!(result.pages, 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Purge
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_purge_counts_each_outcome() {
    let server = MockServer::start().await;
    mount_delete(&server, 10, 204, 1).await;
    mount_delete(&server, 11, 404, 1).await;
    mount_delete(&server, 12, 403, 1).await;
    mount_delete(&server, 13, 500, 1).await;

    let transport = transport_for(&server);
    let messages: Vec<_> = (10..14).map(reference).collect();

    let mut updates = Vec::new();
    let summary = PurgeExecutor::new(&transport)
        .purge(
            &messages,
            PurgeOptions::default(),
            &Preconfirmed,
            &mut |progress: PurgeProgress| updates.push(progress),
        )
        .await;

    assert_eq!(summary.status, PurgeStatus::Completed);
    assert_eq!(summary.deleted, 2);
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.total, 4);

    let reasons: Vec<_> = summary.outcomes.iter().map(|o| o.reason).collect();
    assert_eq!(
        reasons,
        vec![
            DeletionReason::Deleted,
            DeletionReason::AlreadyAbsent,
            DeletionReason::Forbidden,
            DeletionReason::Status(500),
        ]
    );

    assert_eq!(updates.len(), 4);
    assert_eq!(updates.last().unwrap().processed(), 4);
    assert!(updates.windows(2).all(|w| w[0].processed() < w[1].processed()));
}

#[tokio::test]
async fn test_dry_run_sends_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let transport = transport_for(&server);
    let messages: Vec<_> = (1..9).map(reference).collect();
    let options = PurgeOptions {
        dry_run: true,
        require_confirmation: true,
    };

    let summary = PurgeExecutor::new(&transport)
        .purge(&messages, options, &|_count: usize| -> bool { panic!("dry run must not ask") }, &mut NoopObserver)
        .await;

    assert_eq!(summary.status, PurgeStatus::DryRun);
    assert_eq!((summary.deleted, summary.failed, summary.total), (0, 0, 8));
    assert_eq!(summary.preview.len(), 5);
}

#[tokio::test]
async fn test_declined_purge_sends_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let transport = transport_for(&server);
    let messages: Vec<_> = (1..4).map(reference).collect();

    let asked = AtomicUsize::new(0);
    let decline = |count: usize| {
        asked.store(count, Ordering::SeqCst);
        false
    };

    let summary = PurgeExecutor::new(&transport)
        .purge(&messages, PurgeOptions::default(), &decline, &mut NoopObserver)
        .await;

    assert_eq!(summary.status, PurgeStatus::Declined);
    assert_eq!((summary.deleted, summary.failed, summary.total), (0, 0, 3));
    assert_eq!(asked.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_empty_purge_skips_confirmation() {
    let server = MockServer::start().await;
    let transport = transport_for(&server);

    let summary = PurgeExecutor::new(&transport)
        .purge(
            &[],
            PurgeOptions::default(),
            &|_count: usize| -> bool { panic!("nothing to confirm") },
            &mut NoopObserver,
        )
        .await;

    assert_eq!(summary.status, PurgeStatus::Completed);
    assert_eq!(summary.total, 0);
}

#[tokio::test]
async fn test_confirmed_upfront_purge_skips_hook() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(2)
        .mount(&server)
        .await;

    let transport = transport_for(&server);
    let messages: Vec<_> = (1..3).map(reference).collect();
    let options = PurgeOptions {
        dry_run: false,
        require_confirmation: false,
    };

    let summary = PurgeExecutor::new(&transport)
        .purge(
            &messages,
            options,
            &|_count: usize| -> bool { panic!("already confirmed") },
            &mut NoopObserver,
        )
        .await;

    assert_eq!(summary.status, PurgeStatus::Completed);
    assert_eq!((summary.deleted, summary.failed, summary.total), (2, 0, 2));
}

#[tokio::test]
async fn test_purge_halts_when_token_revoked() {
    let server = MockServer::start().await;
    mount_delete(&server, 1, 204, 1).await;
    mount_delete(&server, 2, 401, 1).await;
    mount_delete(&server, 3, 204, 0).await;

    let transport = transport_for(&server);
    let messages: Vec<_> = (1..4).map(reference).collect();

    let summary = PurgeExecutor::new(&transport)
        .purge(&messages, PurgeOptions::default(), &Preconfirmed, &mut NoopObserver)
        .await;

    assert_eq!(summary.status, PurgeStatus::Unauthorized);
    assert_eq!(summary.deleted, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.total, 3);
}

#[tokio::test]
async fn test_purge_honours_stop_signal() {
    let server = MockServer::start().await;
    mount_delete(&server, 1, 204, 0).await;

    let stop = CancellationToken::new();
    stop.cancel();

    let transport = transport_for(&server);
    let summary = PurgeExecutor::new(&transport)
        .with_stop_signal(stop)
        .purge(&[reference(1)], PurgeOptions::default(), &Preconfirmed, &mut NoopObserver)
        .await;

    assert_eq!(summary.status, PurgeStatus::Cancelled);
    assert_eq!(summary.deleted, 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Pacing
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_scan_pauses_between_pages_only() {
    let server = MockServer::start().await;

    for (offset, ids) in [(0, 1..26), (25, 26..51), (50, 51..56)] {
        Mock::given(method("GET"))
            .and(path(SEARCH_PATH))
            .and(query_param("offset", offset.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(ids, 55)))
            .expect(1)
            .mount(&server)
            .await;
    }

    let config = ClientConfig::builder()
        .token(TOKEN)
        .base_url(server.uri())
        .pacing(pacing(Duration::from_millis(300), Duration::ZERO))
        .build()
        .unwrap();
    let transport = TransportClient::new(config).unwrap();

    let started = Instant::now();
    let result = SearchAggregator::new(&transport)
        .scan(&channel_query(), &mut NoopObserver)
        .await
        .unwrap();
    let elapsed = started.elapsed();

    assert_eq!(result.pages, 3);
    assert_eq!(result.messages.len(), 55);
    assert_eq!(result.end, ScanEnd::ReachedTotal);
    // Two gaps for three pages, none after the last
    assert!(elapsed >= Duration::from_millis(600), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_millis(900), "elapsed {elapsed:?}");
}

#[tokio::test]
async fn test_purge_pauses_between_items_only() {
    let server = MockServer::start().await;
    mount_delete(&server, 1, 204, 1).await;
    mount_delete(&server, 2, 204, 1).await;

    let config = ClientConfig::builder()
        .token(TOKEN)
        .base_url(server.uri())
        .pacing(pacing(Duration::ZERO, Duration::from_millis(300)))
        .build()
        .unwrap();
    let transport = TransportClient::new(config).unwrap();

    let started = Instant::now();
    let summary = PurgeExecutor::new(&transport)
        .purge(&[reference(1), reference(2)], PurgeOptions::default(), &Preconfirmed, &mut NoopObserver)
        .await;
    let elapsed = started.elapsed();

    assert_eq!(summary.deleted, 2);
    // One base delay plus 50..100ms jitter, nothing after the final item
    assert!(elapsed >= Duration::from_millis(350), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_millis(650), "elapsed {elapsed:?}");
}

// ─────────────────────────────────────────────────────────────────────────────
// Transport retries
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_rate_limit_waits_then_retries() {
    let server = MockServer::start().await;

    let responder = Sequence::new(vec![
        ResponseTemplate::new(429).set_body_json(json!({
            "message": "You are being rate limited.",
            "retry_after": 0.1,
            "global": false
        })),
        ResponseTemplate::new(204),
    ]);

    Mock::given(method("DELETE"))
        .and(path_regex(r"^/channels/\d+/messages/\d+$"))
        .respond_with(responder.clone())
        .expect(2)
        .mount(&server)
        .await;

    let transport = transport_for(&server);
    let started = Instant::now();
    let summary = PurgeExecutor::new(&transport)
        .purge(&[reference(1)], PurgeOptions::default(), &Preconfirmed, &mut NoopObserver)
        .await;

    // retry_after plus the default half-second buffer
    assert!(started.elapsed() >= Duration::from_millis(600));
    assert_eq!(summary.deleted, 1);
    assert_eq!(responder.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_rate_limit_exhausts_attempts() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/@me"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({ "retry_after": 0 })))
        .expect(3)
        .mount(&server)
        .await;

    let config = ClientConfig::builder()
        .token(TOKEN)
        .base_url(server.uri())
        .retry(RetryPolicy {
            rate_limit_buffer: Duration::ZERO,
            ..RetryPolicy::default()
        })
        .build()
        .unwrap();
    let transport = TransportClient::new(config).unwrap();

    let err = transport
        .send(Method::GET, "/users/@me", &[], None)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NoResponse { attempts: 3, .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_network_failure_exhausts_attempts() {
    let (base_url, accepted) = flaky_server(usize::MAX).await;
    let transport = TransportClient::new(raw_http_config(&base_url)).unwrap();

    let started = Instant::now();
    let err = transport
        .send(Method::DELETE, "/channels/1/messages/2", &[], None)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NoResponse { source: Some(_), .. }));
    assert_eq!(accepted.load(Ordering::SeqCst), 3);
    // Two retry delays, none after the final attempt
    assert!(started.elapsed() >= Duration::from_millis(200));
}

#[tokio::test]
async fn test_network_failure_then_success() {
    let (base_url, accepted) = flaky_server(1).await;
    let transport = TransportClient::new(raw_http_config(&base_url)).unwrap();

    let started = Instant::now();
    let response = transport
        .send(Method::DELETE, "/channels/1/messages/2", &[], None)
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 204);
    assert_eq!(accepted.load(Ordering::SeqCst), 2);
    assert!(started.elapsed() >= Duration::from_millis(100));
}

#[tokio::test]
async fn test_network_failure_during_purge_is_counted() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ClientConfig::builder()
        .token(TOKEN)
        .base_url(format!("http://{addr}"))
        .pacing(PacingConfig::none())
        .network_retry_delay(Duration::from_millis(10))
        .build()
        .unwrap();
    let transport = TransportClient::new(config).unwrap();

    let summary = PurgeExecutor::new(&transport)
        .purge(&[reference(1), reference(2)], PurgeOptions::default(), &Preconfirmed, &mut NoopObserver)
        .await;

    assert_eq!(summary.status, PurgeStatus::Completed);
    assert_eq!(summary.failed, 2);
    assert!(summary
        .outcomes
        .iter()
        .all(|o| o.reason == DeletionReason::NoResponse));
}
