//! Loopback HTTP endpoint for shells to post notifications back to their
//! tab.
//!
//! The endpoint is unauthenticated: it only binds to 127.0.0.1, session ids
//! are v4 UUIDs that prevent accidental cross-tab interference, and the
//! impact is limited to showing notifications and focusing terminal tabs.

pub mod config;

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use tracing::{error, info};

use libtabnudge::{Notifier, NotifyResult};
use tabnudge_protocol::NotificationRequest;

/// The notify endpoint, POST-only.
pub fn app(notifier: Arc<Notifier>) -> Router {
    Router::new()
        .route("/api/notify", post(notify))
        .with_state(notifier)
}

async fn notify(State(notifier): State<Arc<Notifier>>, body: String) -> (StatusCode, String) {
    let request = match NotificationRequest::parse(&body) {
        Ok(request) => request,
        Err(reason) => return (StatusCode::BAD_REQUEST, reason.to_string()),
    };

    match notifier.notify(request) {
        NotifyResult::Accepted => (StatusCode::ACCEPTED, String::new()),
        NotifyResult::SessionNotFound => (StatusCode::NOT_FOUND, "Session not found".to_string()),
    }
}

/// Bind the endpoint on loopback and serve it in the background.
///
/// `port` may be 0 to let the OS pick; the actually bound address is
/// returned so [`endpoint_url`] can be injected into spawned shells.
pub async fn serve(notifier: Arc<Notifier>, port: u16) -> anyhow::Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind((Ipv4Addr::LOCALHOST, port))
        .await
        .with_context(|| format!("failed to bind notify endpoint on 127.0.0.1:{port}"))?;
    let addr = listener.local_addr()?;
    info!(%addr, "notify endpoint listening");

    tokio::spawn(async move {
        if let Err(error) = axum::serve(listener, app(notifier)).await {
            error!(%error, "notify endpoint terminated");
        }
    });

    Ok(addr)
}

/// URL a spawned shell should POST to; pair with
/// [`libtabnudge::launch::ENV_ENDPOINT`].
pub fn endpoint_url(addr: SocketAddr) -> String {
    format!("http://{addr}/api/notify")
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use super::endpoint_url;

    #[test]
    fn endpoint_url_includes_path() {
        let addr: SocketAddr = "127.0.0.1:8099".parse().unwrap();
        assert_eq!(endpoint_url(addr), "http://127.0.0.1:8099/api/notify");
    }
}
