//! Review Console - instructor tool for deciding student reviewer requests.
//!
//! The core (`models`, `services::review_console`) is independent of any
//! rendering surface. Two adapters sit on top of it: the `review-console`
//! command-line binary and an embedded HTML page server.

pub mod commands;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

use commands::settings::AppSettings;
use error::AppError;
use services::console_server::{start_console_server, stop_console_server, ConsoleState};
use services::console_session::LoadScope;
use services::{ConsoleSession, RequestStore, SqliteRequestStore};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

/// Initialized application: settings plus an open request store.
pub struct App {
    pub settings: AppSettings,
    pub store: Arc<SqliteRequestStore>,
}

impl App {
    /// Open (and migrate) the database named by `settings`.
    pub async fn initialize(settings: AppSettings, data_dir: &Path) -> Result<Self, AppError> {
        let db_path = settings.database_path_in(data_dir);
        let pool = db::initialize(&db_path).await?;

        Ok(Self {
            settings,
            store: Arc::new(SqliteRequestStore::new(pool)),
        })
    }

    pub fn store(&self) -> Arc<dyn RequestStore> {
        self.store.clone()
    }

    /// Open a console session over the requests selected by `scope`.
    pub async fn open_session(&self, scope: LoadScope) -> ConsoleSession {
        ConsoleSession::open_scoped(
            self.store(),
            self.settings.instructor.clone(),
            self.settings.review.transition_policy,
            scope,
        )
        .await
    }

    /// Serve the console page until Ctrl-C.
    pub async fn serve(&self) -> Result<(), AppError> {
        let server = &self.settings.server;
        let addr: SocketAddr = format!("{}:{}", server.bind_address, server.port)
            .parse()
            .map_err(|e| {
                AppError::invalid_input_field(
                    format!("invalid bind address {}: {}", server.bind_address, e),
                    "server.bindAddress",
                )
            })?;

        let state = ConsoleState::new(self.open_session(LoadScope::Pending).await.into_shared());
        let bound = start_console_server(addr, state)
            .await
            .map_err(AppError::internal)?;
        println!("Review console running at http://{}", bound);

        tokio::signal::ctrl_c().await?;
        stop_console_server().await;
        Ok(())
    }
}
