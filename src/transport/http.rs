use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::Extension;
use axum::routing::{get, post};
use axum::Router;
use dashmap::DashMap;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;

use super::handlers;
use super::protocol::{
    DEFAULT_TTL, ENDPOINT_KELIPS, ENDPOINT_PEER, ENDPOINT_STATS, HEADER_GROUP, HEADER_ORIGINATOR,
    HEADER_TTL, REQUEST_TIMEOUT_SECS,
};
use super::Transport;
use crate::contacts::Peer;
use crate::error::KelipsError;
use crate::group::{AffinityGroup, GroupContact, LookupRequest};

/// Shared state between the transport handle and the axum handlers.
pub(crate) struct HttpState {
    /// Local advertise address, learned from group registration.
    pub(crate) host: OnceLock<String>,
    /// Registered affinity groups, keyed by group id.
    pub(crate) groups: DashMap<u64, Arc<dyn AffinityGroup>>,
    client: reqwest::Client,
    shutdown: Mutex<Option<oneshot::Sender<()>>>,
    serving: Mutex<Option<JoinHandle<()>>>,
}

/// HTTP implementation of the [`Transport`] contract.
#[derive(Clone)]
pub struct HttpTransport {
    state: Arc<HttpState>,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            state: Arc::new(HttpState {
                host: OnceLock::new(),
                groups: DashMap::new(),
                client: reqwest::Client::new(),
                shutdown: Mutex::new(None),
                serving: Mutex::new(None),
            }),
        }
    }

    fn local_host(&self) -> String {
        self.state.host.get().cloned().unwrap_or_default()
    }

    fn request(
        &self,
        method: reqwest::Method,
        contact: &GroupContact,
        endpoint: &str,
        key: &str,
        ttl: Option<u32>,
    ) -> reqwest::RequestBuilder {
        let url = format!("http://{}{}/{}", contact.host, endpoint, key);
        let mut req = self
            .state
            .client
            .request(method, url)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .header(HEADER_GROUP, contact.id)
            .header(HEADER_ORIGINATOR, self.local_host());
        if let Some(ttl) = ttl {
            req = req.header(HEADER_TTL, ttl);
        }
        req
    }
}

async fn read_response(resp: reqwest::Response) -> Result<String, KelipsError> {
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| KelipsError::Transport(e.to_string()))?;
    if status != reqwest::StatusCode::OK {
        if body.is_empty() {
            return Err(KelipsError::Transport(status.to_string()));
        }
        return Err(KelipsError::Transport(body));
    }
    Ok(body)
}

#[async_trait]
impl Transport for HttpTransport {
    async fn insert(&self, target: &GroupContact, key: &[u8]) -> Result<String, KelipsError> {
        let key = String::from_utf8_lossy(key);
        let resp = self
            .request(
                reqwest::Method::POST,
                target,
                ENDPOINT_KELIPS,
                &key,
                Some(DEFAULT_TTL),
            )
            .send()
            .await
            .map_err(|e| KelipsError::Transport(e.to_string()))?;
        read_response(resp).await
    }

    async fn lookup(
        &self,
        target: &GroupContact,
        req: &LookupRequest,
    ) -> Result<String, KelipsError> {
        let key = String::from_utf8_lossy(&req.key);
        let resp = self
            .request(
                reqwest::Method::GET,
                target,
                ENDPOINT_KELIPS,
                &key,
                Some(req.ttl),
            )
            .header(HEADER_ORIGINATOR, req.originator.to_string())
            .send()
            .await
            .map_err(|e| KelipsError::Transport(e.to_string()))?;
        read_response(resp).await
    }

    async fn add_peer(&self, target: &GroupContact, peer: &Peer) -> Result<(), KelipsError> {
        let resp = self
            .request(reqwest::Method::POST, target, ENDPOINT_PEER, &peer.host, None)
            .send()
            .await
            .map_err(|e| KelipsError::Transport(e.to_string()))?;
        read_response(resp).await.map(|_| ())
    }

    fn register(&self, contact: GroupContact, group: Arc<dyn AffinityGroup>) {
        // All registrations come from the local node.
        let _ = self.state.host.set(contact.host.clone());
        self.state.groups.insert(contact.id, group);
    }

    async fn start(&self, listener: TcpListener) -> Result<(), KelipsError> {
        let app = Router::new()
            .route(
                &format!("{}/*key", ENDPOINT_KELIPS),
                get(handlers::handle_lookup).post(handlers::handle_insert),
            )
            .route(&format!("{}/:peer", ENDPOINT_PEER), post(handlers::handle_add_peer))
            // The keyless endpoint forms are an explicit 404, not a router
            // fallback.
            .route(
                ENDPOINT_KELIPS,
                get(handlers::handle_empty_key).post(handlers::handle_empty_key),
            )
            .route(
                &format!("{}/", ENDPOINT_KELIPS),
                get(handlers::handle_empty_key).post(handlers::handle_empty_key),
            )
            .route(ENDPOINT_PEER, post(handlers::handle_empty_key))
            .route(&format!("{}/", ENDPOINT_PEER), post(handlers::handle_empty_key))
            .route(ENDPOINT_STATS, get(handlers::handle_stats))
            .layer(Extension(self.state.clone()));

        let (tx, rx) = oneshot::channel::<()>();
        *self.state.shutdown.lock().await = Some(tx);

        let handle = tokio::spawn(async move {
            let served = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = rx.await;
            });
            if let Err(e) = served.await {
                tracing::error!("HTTP transport server: {}", e);
            }
        });
        *self.state.serving.lock().await = Some(handle);

        Ok(())
    }

    async fn shutdown(&self, deadline: Duration) -> Result<(), KelipsError> {
        if let Some(tx) = self.state.shutdown.lock().await.take() {
            let _ = tx.send(());
        }

        if let Some(handle) = self.state.serving.lock().await.take() {
            tokio::time::timeout(deadline, handle)
                .await
                .map_err(|_| KelipsError::Transport("shutdown deadline exceeded".to_string()))?
                .map_err(|e| KelipsError::Transport(e.to_string()))?;
        }
        Ok(())
    }
}
