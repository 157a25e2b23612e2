//! Console page server.
//!
//! Embeds an axum HTTP server that renders the review console as an HTML
//! page and exposes the same operations as a JSON API. Only one server runs
//! per process; its handle is kept in a global so it can be stopped from
//! anywhere.

use crate::services::console_api::{api_routes, not_found, page_routes};
use crate::services::console_session::SharedSession;
use crate::services::navigation::Navigator;
use axum::Router;
use std::net::SocketAddr;
use std::sync::OnceLock;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

/// Shared state for the console routes.
#[derive(Clone)]
pub struct ConsoleState {
    pub session: SharedSession,
    pub navigator: Navigator,
}

impl ConsoleState {
    pub fn new(session: SharedSession) -> Self {
        Self {
            session,
            navigator: Navigator::new(),
        }
    }
}

/// Handle to control the running server.
struct ConsoleServerHandle {
    cancel_token: CancellationToken,
    addr: SocketAddr,
    task: JoinHandle<()>,
}

/// Global handle to the running server (None if stopped).
fn server_handle() -> &'static Mutex<Option<ConsoleServerHandle>> {
    static SERVER_HANDLE: OnceLock<Mutex<Option<ConsoleServerHandle>>> = OnceLock::new();
    SERVER_HANDLE.get_or_init(|| Mutex::new(None))
}

/// Build the full router for `state`.
pub fn build_router(state: ConsoleState) -> Router {
    Router::new()
        .merge(page_routes())
        .merge(api_routes())
        .fallback(not_found)
        .with_state(state)
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
}

/// Start the console server on `addr`.
///
/// Returns the bound address (useful when `addr` has port 0). Fails if a
/// server is already running or the address is unavailable.
pub async fn start_console_server(addr: SocketAddr, state: ConsoleState) -> Result<SocketAddr, String> {
    let mut handle_guard = server_handle().lock().await;

    if handle_guard.is_some() {
        return Err("Console server is already running".into());
    }

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;
    let bound = listener
        .local_addr()
        .map_err(|e| format!("Failed to read bound address: {}", e))?;

    let cancel_token = CancellationToken::new();
    let cancel_clone = cancel_token.clone();
    let app = build_router(state);

    log::info!("[console] Server starting on http://{}", bound);

    let task = tokio::spawn(async move {
        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            cancel_clone.cancelled().await;
        });

        if let Err(e) = server.await {
            log::error!("[console] Server error: {}", e);
        }

        log::info!("[console] Server stopped");
    });

    *handle_guard = Some(ConsoleServerHandle {
        cancel_token,
        addr: bound,
        task,
    });
    Ok(bound)
}

/// Stop the running server gracefully and wait for it to finish.
///
/// No-op if the server is not running.
pub async fn stop_console_server() {
    let handle = server_handle().lock().await.take();

    if let Some(handle) = handle {
        log::info!("[console] Stopping server on {}", handle.addr);
        handle.cancel_token.cancel();
        if let Err(e) = handle.task.await {
            log::warn!("[console] Server task ended abnormally: {}", e);
        }
    }
}
