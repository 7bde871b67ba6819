use std::collections::BTreeSet;
use std::convert::Infallible;
use std::future::Future;
use std::net::{SocketAddr, TcpListener};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Request, Response, Server, StatusCode};

use loadforge_burst::executor::aggregate::summarize;
use loadforge_burst::executor::{Dispatch, Dispatcher};
use loadforge_burst::models::outcome::OutcomeStatus;
use loadforge_burst::models::run_config::RunConfig;

const USERS: &str = r#"[{"id": 1, "name": "Alice"}, {"id": 2, "name": "Bob"}]"#;

/// Starts an HTTP server on an ephemeral port that answers every request
/// with `handler`.
fn serve<F, Fut>(handler: F) -> SocketAddr
where
    F: Fn(Request<Body>) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Response<Body>> + Send + 'static,
{
    let make = make_service_fn(move |_conn| {
        let handler = handler.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |req| {
                let response = handler(req);
                async move { Ok::<_, Infallible>(response.await) }
            }))
        }
    });

    let server = Server::bind(&SocketAddr::from(([127, 0, 0, 1], 0))).serve(make);
    let addr = server.local_addr();
    tokio::spawn(server);
    addr
}

fn respond(status: StatusCode, body: &'static str) -> Response<Body> {
    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

fn config_for(addr: SocketAddr, total_requests: u64, concurrency: usize) -> RunConfig {
    RunConfig {
        target: format!("http://{}/users/", addr),
        total_requests,
        concurrency,
        timeout_ms: Some(5_000),
        quiet: true,
    }
}

async fn dispatch(config: &RunConfig) -> Dispatch {
    let dispatcher = Dispatcher::new(config).unwrap();
    dispatcher.preflight().await.unwrap();
    dispatcher.run().await
}

fn request_ids(dispatch: &Dispatch) -> BTreeSet<u64> {
    dispatch.outcomes.iter().map(|o| o.request_id()).collect()
}

#[tokio::test]
async fn empty_array_is_a_success_with_zero_items() {
    let addr = serve(|_req| async { respond(StatusCode::OK, "[]") });

    let result = dispatch(&config_for(addr, 1, 1)).await;

    assert_eq!(result.outcomes.len(), 1);
    let outcome = &result.outcomes[0];
    assert_eq!(outcome.status(), OutcomeStatus::Success);
    assert_eq!(outcome.item_count(), Some(0));
    assert!(outcome.duration().is_some());

    let summary = summarize(&result.outcomes, result.wall_time);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 0);
}

#[tokio::test]
async fn every_request_counts_returned_users() {
    let addr = serve(|_req| async { respond(StatusCode::OK, USERS) });

    let result = dispatch(&config_for(addr, 20, 4)).await;

    assert_eq!(request_ids(&result), (1..=20).collect());
    assert!(result.outcomes.iter().all(|o| o.item_count() == Some(2)));

    let summary = summarize(&result.outcomes, result.wall_time);
    assert_eq!(summary.total_requests, 20);
    assert_eq!(summary.succeeded, 20);
    assert_eq!(summary.failed, 0);
    assert!(summary.average_success_latency.is_some());
    assert!(summary.total_wall_time > 0.0);
}

#[tokio::test]
async fn not_found_is_a_failure_mentioning_status() {
    let addr = serve(|_req| async {
        respond(StatusCode::NOT_FOUND, r#"{"detail": "User not found"}"#)
    });

    let result = dispatch(&config_for(addr, 3, 3)).await;

    for outcome in &result.outcomes {
        assert_eq!(outcome.status(), OutcomeStatus::Failure);
        assert!(outcome.error().unwrap().to_string().contains("404"));
        assert!(outcome.item_count().is_none());
    }
    let summary = summarize(&result.outcomes, result.wall_time);
    assert_eq!(summary.failed, 3);
    assert_eq!(summary.average_success_latency, None);
    assert_eq!(summary.failure_counts.get("HTTP 404"), Some(&3));
}

#[tokio::test]
async fn malformed_body_is_a_parse_failure() {
    let addr = serve(|req: Request<Body>| async move {
        if req.uri().path() == "/object/" {
            respond(StatusCode::OK, r#"{"users": []}"#)
        } else {
            respond(StatusCode::OK, "<html>oops</html>")
        }
    });

    for path in ["/users/", "/object/"] {
        let config = RunConfig {
            target: format!("http://{}{}", addr, path),
            ..config_for(addr, 2, 2)
        };
        let result = dispatch(&config).await;

        assert_eq!(result.outcomes.len(), 2);
        for outcome in &result.outcomes {
            assert_eq!(outcome.error().map(|e| e.kind()), Some("PARSE".to_string()));
        }
    }
}

#[tokio::test]
async fn unreachable_target_fails_every_request() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let config = RunConfig {
        target: format!("http://127.0.0.1:{}/users/", port),
        total_requests: 5,
        concurrency: 5,
        timeout_ms: Some(5_000),
        quiet: true,
    };

    let result = dispatch(&config).await;
    let summary = summarize(&result.outcomes, result.wall_time);

    assert_eq!(summary.total_requests, 5);
    assert_eq!(summary.succeeded, 0);
    assert_eq!(summary.failed, 5);
    assert_eq!(summary.average_success_latency, None);
    assert_eq!(summary.failure_counts.get("TRANSPORT"), Some(&5));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrency_limit_bounds_requests_in_flight() {
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let addr = {
        let in_flight = Arc::clone(&in_flight);
        let peak = Arc::clone(&peak);
        serve(move |_req| {
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                respond(StatusCode::OK, USERS)
            }
        })
    };

    let result = dispatch(&config_for(addr, 100, 10)).await;

    assert_eq!(result.outcomes.len(), 100);
    assert_eq!(request_ids(&result), (1..=100).collect());
    let peak = peak.load(Ordering::SeqCst);
    assert!(peak <= 10, "saw {} requests in flight", peak);
    assert!(peak >= 1);

    let summary = summarize(&result.outcomes, result.wall_time);
    assert_eq!(summary.succeeded, 100);
}

#[tokio::test]
async fn slow_target_times_out() {
    let addr = serve(|_req| async {
        tokio::time::sleep(Duration::from_millis(500)).await;
        respond(StatusCode::OK, USERS)
    });
    let config = RunConfig {
        timeout_ms: Some(50),
        ..config_for(addr, 2, 2)
    };

    let result = dispatch(&config).await;

    assert_eq!(result.outcomes.len(), 2);
    for outcome in &result.outcomes {
        assert_eq!(outcome.error().map(|e| e.kind()), Some("TIMEOUT".to_string()));
        assert!(outcome.duration().is_none());
    }
}

#[tokio::test]
async fn failures_do_not_disturb_other_requests() {
    let counter = Arc::new(AtomicUsize::new(0));
    let addr = serve(move |_req| {
        let counter = Arc::clone(&counter);
        async move {
            if counter.fetch_add(1, Ordering::SeqCst) % 2 == 0 {
                respond(StatusCode::OK, "[1]")
            } else {
                respond(StatusCode::INTERNAL_SERVER_ERROR, "boom")
            }
        }
    });

    let result = dispatch(&config_for(addr, 10, 3)).await;
    let summary = summarize(&result.outcomes, result.wall_time);

    assert_eq!(request_ids(&result), (1..=10).collect());
    assert_eq!(summary.succeeded, 5);
    assert_eq!(summary.failed, 5);
    assert_eq!(summary.succeeded + summary.failed, summary.total_requests);
    assert_eq!(summary.failure_counts.get("HTTP 500"), Some(&5));
}

#[tokio::test]
async fn zero_requests_produce_an_empty_summary() {
    let addr = serve(|_req| async { respond(StatusCode::OK, "[]") });

    let result = dispatch(&config_for(addr, 0, 4)).await;
    let summary = summarize(&result.outcomes, result.wall_time);

    assert!(result.outcomes.is_empty());
    assert_eq!(summary.total_requests, 0);
    assert_eq!(summary.average_success_latency, None);
}
