use crate::config::ReplayConfig;
use crate::domain::{EventStore, PacingPolicy};
use crate::infrastructure::{log_messages, StatusSink};
use crate::stream::{Dispatcher, ShutdownHandle};
use crate::Result;
use axum::Router;
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{error, info, instrument};

/// Listening-socket failures. Fatal: the server stops.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("listen tcp {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serve: {0}")]
    Serve(#[source] std::io::Error),
}

/// Owns the configuration and the loaded events, and runs the listener
pub struct Application {
    config: ReplayConfig,
    store: EventStore,
    status: StatusSink,
    shutdown: ShutdownHandle,
}

impl Application {
    /// Load the event source. No network I/O happens here; a source that
    /// fails to load means the server never binds.
    #[instrument(skip_all, fields(source = %config.source_path))]
    pub async fn new(config: ReplayConfig, status: StatusSink) -> Result<Self> {
        let store = EventStore::load(config.source_path.as_path()).await?;
        info!(events = store.len(), "Loaded event source");

        Ok(Self {
            config,
            store,
            status,
            shutdown: ShutdownHandle::new(),
        })
    }

    pub fn config(&self) -> &ReplayConfig {
        &self.config
    }

    pub fn store(&self) -> &EventStore {
        &self.store
    }

    /// Handle that stops the listener and cancels every live session
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Router with the dispatcher mounted on the configured stream path
    pub fn router(&self) -> Router {
        Dispatcher::new(
            self.store.events(),
            PacingPolicy::new(self.config.interval),
            self.status.clone(),
            self.shutdown.signal(),
        )
        .into_router(&self.config.stream_path)
    }

    /// Bind `host:port` and serve until shutdown or a transport failure
    #[instrument(skip(self), fields(host = %self.config.host, port = %self.config.port))]
    pub async fn run(self) -> Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = match TcpListener::bind(&addr).await {
            Ok(listener) => listener,
            Err(source) => return Err(self.fail(TransportError::Bind { addr, source })),
        };
        self.serve(listener).await
    }

    /// Serve on an already bound listener
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let port = listener.local_addr()?.port();
        info!(port, path = %self.config.stream_path, "Server listening");
        self.status
            .emit(log_messages::server::listening(port, &self.config.stream_path));

        let mut signal = self.shutdown.signal();
        let status = self.status.clone();
        let app = self
            .router()
            .into_make_service_with_connect_info::<SocketAddr>();

        let served = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                signal.cancelled().await;
                info!("Shutdown requested");
                status.emit(log_messages::server::shutting_down());
            })
            .await;

        match served {
            Ok(()) => {
                info!("Server stopped");
                Ok(())
            }
            Err(source) => Err(self.fail(TransportError::Serve(source))),
        }
    }

    fn fail(&self, err: TransportError) -> crate::Error {
        error!(error = %err, "Server error");
        self.status.emit(log_messages::server::error(&err));
        err.into()
    }
}
