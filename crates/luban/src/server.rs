use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::apps::StorageAppStore;
use crate::config::ServiceConfig;
use crate::error::{CoreError, CoreResult};
use crate::service::EntryService;
use crate::storage::{FileStorage, MemoryStorage, SharedStorage};
use crate::users::StorageUserStore;

pub mod app;
pub mod entry;
pub mod error;
pub mod identity;
pub mod openapi;

pub struct Server {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl Server {
    /// Binds `config.bind_addr` and serves until [`Server::shutdown`] or drop.
    pub async fn new(config: ServiceConfig) -> CoreResult<Self> {
        let state = Arc::new(ServerState::from_config(config));
        let listener = TcpListener::bind(&state.config.bind_addr)
            .await
            .map_err(|error| {
                CoreError::Internal(format!(
                    "failed to bind {}: {error}",
                    state.config.bind_addr
                ))
            })?;
        let addr = listener.local_addr().map_err(|error| {
            CoreError::Internal(format!("failed to read bound address: {error}"))
        })?;
        let app = router(state);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            if let Err(error) = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
            {
                tracing::error!(%error, "server stopped");
            }
        });
        tracing::info!(%addr, "listening");

        Ok(Server {
            addr,
            shutdown: Some(shutdown_tx),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn shutdown(&mut self) -> CoreResult<()> {
        if let Some(sender) = self.shutdown.take() {
            sender.send(()).map_err(|_| {
                CoreError::Internal("failed to send server shutdown signal".to_string())
            })
        } else {
            Ok(())
        }
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

pub fn router(state: Arc<ServerState>) -> Router {
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/currentUser", get(entry::current_user))
        .route(
            "/currentUser/entry",
            get(entry::list_entries)
                .post(entry::create_entry)
                .delete(entry::delete_entry),
        )
        .route("/app", get(app::load_app).post(app::save_app))
        .layer(TraceLayer::new_for_http());
    if state.config.cors_allow_any {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }
    app.with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// File storage under `data_dir` when set, otherwise in memory.
pub fn open_storage(config: &ServiceConfig) -> SharedStorage {
    match &config.data_dir {
        Some(dir) => Arc::new(FileStorage::new(dir.clone())),
        None => {
            tracing::warn!("no data directory configured, entries are kept in memory");
            Arc::new(MemoryStorage::new())
        }
    }
}

pub struct ServerState {
    pub(crate) service: EntryService,
    pub(crate) config: ServiceConfig,
}

impl ServerState {
    pub fn new(service: EntryService, config: ServiceConfig) -> Self {
        Self { service, config }
    }

    pub fn from_config(config: ServiceConfig) -> Self {
        let storage = open_storage(&config);
        let service = EntryService::new(
            Arc::new(StorageUserStore::new(storage.clone())),
            Arc::new(StorageAppStore::new(storage)),
        )
        .with_auto_provision(config.auto_provision_users);
        Self::new(service, config)
    }
}
