pub mod aggregate;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use tokio::task;
use tracing::{debug, info, warn};

use crate::client::{self, HttpsClient, Target};
use crate::error::{RequestError, RunError};
use crate::models::outcome::RequestOutcome;
use crate::models::run_config::RunConfig;
use crate::report;
use crate::utils::timer;

/// Everything collected while dispatching, in completion order.
#[derive(Debug)]
pub struct Dispatch {
    pub outcomes: Vec<RequestOutcome>,
    pub wall_time: f64,
}

/// Fans a burst of GET requests out over a bounded number of in-flight
/// slots and gathers every outcome.
pub struct Dispatcher {
    client: Arc<HttpsClient>,
    target: Arc<Target>,
    total_requests: u64,
    concurrency: usize,
    request_timeout: Option<Duration>,
    echo: bool,
}

impl Dispatcher {
    pub fn new(config: &RunConfig) -> Result<Self, RunError> {
        config.validate()?;
        let target = Target::parse(&config.target)?;

        Ok(Self {
            client: Arc::new(client::build_client(config.concurrency)),
            target: Arc::new(target),
            total_requests: config.total_requests,
            concurrency: config.concurrency,
            request_timeout: config.request_timeout(),
            echo: !config.quiet,
        })
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Fails when the target host does not resolve at all.
    pub async fn preflight(&self) -> Result<(), RunError> {
        client::resolve(&self.target).await
    }

    /// Runs every request to completion. Each request id in
    /// `1..=total_requests` yields exactly one outcome, failures included;
    /// a worker that panics is recorded as an aborted failure.
    pub async fn run(&self) -> Dispatch {
        let client = Arc::clone(&self.client);
        let target = Arc::clone(&self.target);
        let deadline = self.request_timeout;
        let echo = self.echo;

        self.run_with(move |request_id| {
            let client = Arc::clone(&client);
            let target = Arc::clone(&target);
            async move {
                let outcome = client::execute(&client, request_id, &target, deadline).await;
                if echo {
                    println!("{}", report::status_line(&outcome));
                }
                outcome
            }
        })
        .await
    }

    async fn run_with<W, Fut>(&self, worker: W) -> Dispatch
    where
        W: Fn(u64) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = RequestOutcome> + Send + 'static,
    {
        info!(
            url = %self.target.as_str(),
            requests = self.total_requests,
            concurrency = self.concurrency,
            "dispatching"
        );

        let slots = Arc::new(Semaphore::new(self.concurrency));
        let started = timer::start();

        let mut in_flight = FuturesUnordered::new();
        for request_id in 1..=self.total_requests {
            let slots = Arc::clone(&slots);
            let worker = worker.clone();

            let handle = task::spawn(async move {
                let _permit = match slots.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        return RequestOutcome::failure(
                            request_id,
                            RequestError::Aborted(e.to_string()),
                        )
                    }
                };
                worker(request_id).await
            });

            in_flight.push(async move { (request_id, handle.await) });
        }

        let mut outcomes = Vec::with_capacity(self.total_requests as usize);
        while let Some((request_id, joined)) = in_flight.next().await {
            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(request_id, error = %e, "worker did not finish");
                    RequestOutcome::failure(request_id, RequestError::Aborted(e.to_string()))
                }
            };
            debug!(
                request_id,
                success = outcome.is_success(),
                duration = ?outcome.duration(),
                "request finished"
            );
            outcomes.push(outcome);
        }

        let wall_time = timer::elapsed(started);
        info!(
            collected = outcomes.len(),
            wall_time_secs = wall_time,
            "all requests finished"
        );

        Dispatch {
            outcomes,
            wall_time,
        }
    }
}
