//! HTTP Transport Handlers
//!
//! Translate incoming RPCs into calls on the registered affinity groups.
//! The `Affinity-Group` header selects the target group; the key (or peer
//! address) rides in the path. Success answers are the owning host as plain
//! text, failures carry the error text with a 400.

use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use sysinfo::System;

use super::http::HttpState;
use super::protocol::{
    DEFAULT_TTL, HEADER_GROUP, HEADER_ORIGINATOR, HEADER_TTL, NodeStatsResponse,
};
use crate::contacts::Peer;
use crate::group::{AffinityGroup, GroupContact, LookupRequest};

/// Resolves the target group from the `Affinity-Group` header.
fn target_group(
    state: &HttpState,
    headers: &HeaderMap,
) -> Result<Arc<dyn AffinityGroup>, (StatusCode, String)> {
    let raw = headers
        .get(HEADER_GROUP)
        .and_then(|value| value.to_str().ok())
        .ok_or((StatusCode::BAD_REQUEST, "no affinity group".to_string()))?;

    let id: u64 = raw
        .parse()
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("no affinity group: {}", e)))?;

    state
        .groups
        .get(&id)
        .map(|group| group.clone())
        .ok_or((StatusCode::NOT_FOUND, String::new()))
}

/// Builds a `LookupRequest` from the TTL and originator headers.
fn parse_request(key: String, headers: &HeaderMap) -> Result<LookupRequest, (StatusCode, String)> {
    let ttl = match headers.get(HEADER_TTL).and_then(|value| value.to_str().ok()) {
        Some(raw) => raw
            .parse()
            .map_err(|e| (StatusCode::BAD_REQUEST, format!("bad ttl: {}", e)))?,
        None => DEFAULT_TTL,
    };

    let originator = match headers
        .get(HEADER_ORIGINATOR)
        .and_then(|value| value.to_str().ok())
    {
        Some(raw) => raw
            .parse()
            .map_err(|e| (StatusCode::BAD_REQUEST, format!("bad originator: {}", e)))?,
        None => GroupContact::default(),
    };

    Ok(LookupRequest {
        key: key.into_bytes(),
        ttl,
        originator,
    })
}

/// Explicit answer for the keyless endpoint forms (`/kelips`, `/kelips/`,
/// `/peer`, `/peer/`): the group header is still validated, then the
/// missing key is a 404.
pub(crate) async fn handle_empty_key(
    Extension(state): Extension<Arc<HttpState>>,
    headers: HeaderMap,
) -> (StatusCode, String) {
    if let Err(err) = target_group(&state, &headers) {
        return err;
    }
    (StatusCode::NOT_FOUND, String::new())
}

pub(crate) async fn handle_lookup(
    Extension(state): Extension<Arc<HttpState>>,
    Path(key): Path<String>,
    headers: HeaderMap,
) -> (StatusCode, String) {
    let group = match target_group(&state, &headers) {
        Ok(group) => group,
        Err(err) => return err,
    };
    if key.is_empty() {
        return (StatusCode::NOT_FOUND, String::new());
    }
    let req = match parse_request(key, &headers) {
        Ok(req) => req,
        Err(err) => return err,
    };

    match group.lookup(&req).await {
        Ok(host) => (StatusCode::OK, host),
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()),
    }
}

pub(crate) async fn handle_insert(
    Extension(state): Extension<Arc<HttpState>>,
    Path(key): Path<String>,
    headers: HeaderMap,
) -> (StatusCode, String) {
    let group = match target_group(&state, &headers) {
        Ok(group) => group,
        Err(err) => return err,
    };
    if key.is_empty() {
        return (StatusCode::NOT_FOUND, String::new());
    }

    match group.insert(key.as_bytes()).await {
        Ok(host) => (StatusCode::OK, host),
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()),
    }
}

pub(crate) async fn handle_add_peer(
    Extension(state): Extension<Arc<HttpState>>,
    Path(peer): Path<String>,
    headers: HeaderMap,
) -> (StatusCode, String) {
    let group = match target_group(&state, &headers) {
        Ok(group) => group,
        Err(err) => return err,
    };
    if peer.is_empty() {
        return (StatusCode::NOT_FOUND, String::new());
    }

    tracing::debug!("Transport add peer {}", peer);
    match group.add_peer(Peer::new(peer)) {
        Ok(()) => (StatusCode::OK, String::new()),
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()),
    }
}

pub(crate) async fn handle_stats(
    Extension(state): Extension<Arc<HttpState>>,
) -> Json<NodeStatsResponse> {
    let mut groups: Vec<u64> = state.groups.iter().map(|entry| *entry.key()).collect();
    groups.sort_unstable();

    let mut sys = System::new_all();
    sys.refresh_cpu();
    sys.refresh_memory();
    // sysinfo reports memory in bytes.
    let mem_total_mb = sys.total_memory() / (1024 * 1024);
    let mem_used_mb = sys.used_memory() / (1024 * 1024);

    Json(NodeStatsResponse {
        host: state.host.get().cloned().unwrap_or_default(),
        groups,
        cpu_usage: sys.global_cpu_info().cpu_usage(),
        mem_used_mb,
        mem_total_mb,
    })
}
