use std::time::Duration;

use hyper::header::ACCEPT;
use hyper::{Body, Client, Method, Request, Uri};
use hyper_tls::HttpsConnector;
use serde::de::IgnoredAny;
use tokio::time::timeout;
use url::{Host, Url};

use crate::error::{RequestError, RunError};
use crate::models::outcome::RequestOutcome;
use crate::utils::timer;

pub type HttpsClient = Client<HttpsConnector<hyper::client::HttpConnector>>;

/// Builds the shared client. Idle connections per host are capped at the
/// concurrency limit since no more than that are ever in use at once.
pub fn build_client(max_idle_per_host: usize) -> HttpsClient {
    let https = HttpsConnector::new();
    Client::builder()
        .pool_max_idle_per_host(max_idle_per_host)
        .build::<_, Body>(https)
}

/// An endpoint that has already been checked to be an absolute
/// `http`/`https` URL with a host.
#[derive(Debug, Clone)]
pub struct Target {
    url: Url,
    uri: Uri,
}

impl Target {
    pub fn parse(raw: &str) -> Result<Self, RunError> {
        let invalid = |reason: String| RunError::InvalidTarget {
            target: raw.to_string(),
            reason,
        };

        let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme `{}`", url.scheme())));
        }
        if url.host().is_none() {
            return Err(invalid("missing host".to_string()));
        }

        let uri = url
            .as_str()
            .parse::<Uri>()
            .map_err(|e| invalid(e.to_string()))?;

        Ok(Self { url, uri })
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

/// Resolves the target host once before the run starts. An address that
/// resolves to nothing would fail every request the same way, so it is
/// reported as a single fatal error instead.
pub async fn resolve(target: &Target) -> Result<(), RunError> {
    let host = match target.url.host() {
        Some(Host::Domain(domain)) => domain.to_string(),
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => return Ok(()),
        None => {
            return Err(RunError::InvalidTarget {
                target: target.as_str().to_string(),
                reason: "missing host".to_string(),
            })
        }
    };
    let port = target.url.port_or_known_default().unwrap_or(80);

    let mut addrs = tokio::net::lookup_host((host.as_str(), port))
        .await
        .map_err(|e| RunError::Unresolvable {
            host: host.clone(),
            reason: e.to_string(),
        })?;

    match addrs.next() {
        Some(_) => Ok(()),
        None => Err(RunError::Unresolvable {
            host: host.clone(),
            reason: "no addresses returned".to_string(),
        }),
    }
}

/// Issues one GET against `target` and turns whatever happens into an
/// outcome. The duration covers the request, the full body and the JSON
/// parse.
pub async fn execute(
    client: &HttpsClient,
    request_id: u64,
    target: &Target,
    deadline: Option<Duration>,
) -> RequestOutcome {
    let started = timer::start();

    let exchange = fetch_items(client, target);
    let result = match deadline {
        Some(limit) => timeout(limit, exchange)
            .await
            .unwrap_or(Err(RequestError::Timeout(limit))),
        None => exchange.await,
    };

    match result {
        Ok(count) => RequestOutcome::success(request_id, timer::elapsed(started), count),
        Err(err) => RequestOutcome::failure(request_id, err),
    }
}

async fn fetch_items(client: &HttpsClient, target: &Target) -> Result<usize, RequestError> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(target.uri().clone())
        .header(ACCEPT, "application/json")
        .body(Body::empty())
        .map_err(|e| RequestError::Transport(e.to_string()))?;

    let response = client
        .request(request)
        .await
        .map_err(|e| RequestError::from_hyper(&e))?;

    let status = response.status();
    if status.as_u16() >= 400 {
        return Err(RequestError::Status(status));
    }

    let body = hyper::body::to_bytes(response.into_body())
        .await
        .map_err(|e| RequestError::from_hyper(&e))?;

    let items: Vec<IgnoredAny> =
        serde_json::from_slice(&body).map_err(|e| RequestError::Parse(e.to_string()))?;
    Ok(items.len())
}
